use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;

fn success_rate(results: &[ScenarioResult]) -> f64 {
    let total = results.len();
    if total == 0 {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / total as f64) * 100.0;
    rate
}

fn top_winners(results: &[ScenarioResult]) -> Vec<(String, usize)> {
    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for outcome in results.iter().flat_map(|r| &r.outcomes) {
        if let Some(winner) = outcome.winner.as_deref() {
            *tally.entry(winner).or_default() += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = tally
        .into_iter()
        .map(|(name, wins)| (name.to_string(), wins))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(5);
    ranked
}

pub fn generate_console_report(
    out: &mut impl Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Arena Audit Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "======================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total scenarios: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, result.scenario_name.bold())?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations(),
            result.iterations_run
        )?;
        writeln!(
            out,
            "   Victors: {}/{} | Average days: {:.1}",
            result.victories(),
            result.outcomes.len(),
            result.average_days()
        )?;
        for outcome in &result.outcomes {
            writeln!(out, "   🏆 seed {}: {}", outcome.seed, outcome.headline())?;
        }
        writeln!(
            out,
            "   Average time: {:?} (slowest {:?})",
            result.average_duration(),
            result.slowest_run
        )?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let winners = top_winners(results);
    if !winners.is_empty() {
        writeln!(out, "{}", "🏆 Most Frequent Victors".bright_yellow().bold())?;
        writeln!(out, "{}", "=======================".yellow())?;
        for (name, wins) in winners {
            writeln!(out, "{name}: {wins}")?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut impl Write, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut impl Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Cornucopia Arena Audit Results\n")?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {}\n", status, result.scenario_name)?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations(),
            result.iterations_run
        )?;
        writeln!(out, "- **Average days**: {:.1}", result.average_days())?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration())?;
        if !result.outcomes.is_empty() {
            writeln!(
                out,
                "\n| Seed | Arena | Victor | Kills | Days | Podium | Major events | Fingerprint |"
            )?;
            writeln!(out, "|---|---|---|---|---|---|---|---|")?;
            for outcome in &result.outcomes {
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {} | {} | {} | `{:016x}` |",
                    outcome.seed,
                    outcome.arena,
                    outcome.winner.as_deref().unwrap_or("none"),
                    outcome.winner_kills,
                    outcome.days,
                    outcome.podium.join(" > "),
                    outcome.major_events,
                    outcome.fingerprint
                )?;
            }
        }
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(passed: bool, winner: Option<&str>) -> ScenarioResult {
        let failures: Vec<&str> = if passed {
            Vec::new()
        } else {
            vec!["step 2: T1 came back to life"]
        };
        let podium = [winner.unwrap_or("Foxface"), "Cato", "Thresh"];
        let json = serde_json::json!({
            "scenario_name": "Temperate Forest / book roster / seed 1",
            "seed": 1,
            "passed": passed,
            "iterations_run": 1,
            "failures": failures,
            "outcomes": [{
                "seed": 1,
                "arena": "Temperate Forest",
                "winner": winner,
                "winner_kills": 3,
                "days": 6,
                "deaths": 23,
                "podium": podium,
                "major_events": 41,
                "fingerprint": 0xABCD,
            }],
            "total_time": 4,
            "slowest_run": 4,
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn markdown_report_lists_outcomes_and_failures() {
        let mut buffer = Vec::new();
        generate_markdown_report(&mut buffer, &[sample(false, Some("Rue"))]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("# Cornucopia Arena Audit Results"));
        assert!(text.contains(
            "| 1 | Temperate Forest | Rue | 3 | 6 | Rue > Cato > Thresh | 41 | `000000000000abcd` |"
        ));
        assert!(text.contains("came back to life"));
    }

    #[test]
    fn console_report_ranks_victors() {
        let mut buffer = Vec::new();
        let results = [
            sample(true, Some("Thresh")),
            sample(true, Some("Thresh")),
            sample(true, Some("Clove")),
        ];
        generate_console_report(&mut buffer, &results, Duration::from_millis(10)).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Thresh: 2"));
        assert!(
            text.contains("seed 1: Clove wins with 3 kills after 6 days, podium: Clove > Cato > Thresh")
        );
        assert!(text.contains("Success rate: 100.0%"));
    }

    #[test]
    fn json_report_is_an_array() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &[sample(true, None)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
    }
}
