use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use cornucopia_game::{
    ArenaChoice, Catalog, EventKind, GameDay, GameRunner, GameSettings, RosterSet, RunState,
    TributeId,
};

use crate::logic::audit::{StepSnapshot, audit_step};

/// Steps beyond `max_days` a run may take before it is reported as stuck.
const STEP_SLACK: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Pacing {
    /// Run each game to completion without narration
    #[default]
    Instant,
    /// Narrate each day as it is published
    Stream,
}

/// Places reported on the podium line.
const PODIUM_SIZE: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub seed: u64,
    pub arena: String,
    pub winner: Option<String>,
    pub winner_kills: u32,
    pub days: u32,
    pub deaths: usize,
    /// Top finishers, winner first.
    pub podium: Vec<String>,
    /// Logged events that changed the course of the game.
    pub major_events: usize,
    pub fingerprint: u64,
}

impl RunOutcome {
    /// One-line account of how the run ended.
    #[must_use]
    pub fn headline(&self) -> String {
        let verdict = self.winner.as_ref().map_or_else(
            || "no victor".to_string(),
            |name| format!("{name} wins with {} kills", self.winner_kills),
        );
        format!(
            "{verdict} after {} days, podium: {}",
            self.days,
            self.podium.join(" > ")
        )
    }
}

/// Every audited run for one starting seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub failures: Vec<String>,
    pub outcomes: Vec<RunOutcome>,
    #[serde(with = "duration_serde")]
    pub total_time: Duration,
    #[serde(with = "duration_serde")]
    pub slowest_run: Duration,
}

impl ScenarioResult {
    fn new(scenario_name: String, seed: u64) -> Self {
        Self {
            scenario_name,
            seed,
            passed: true,
            iterations_run: 0,
            failures: Vec::new(),
            outcomes: Vec::new(),
            total_time: Duration::ZERO,
            slowest_run: Duration::ZERO,
        }
    }

    fn record(
        &mut self,
        iteration_seed: u64,
        attempt: Result<RunOutcome, String>,
        elapsed: Duration,
    ) {
        self.iterations_run += 1;
        self.total_time += elapsed;
        self.slowest_run = self.slowest_run.max(elapsed);
        match attempt {
            Ok(outcome) => self.outcomes.push(outcome),
            Err(err) => {
                self.passed = false;
                self.failures.push(format!(
                    "Iteration {} (seed {iteration_seed}): {err}",
                    self.iterations_run
                ));
            }
        }
    }

    #[must_use]
    pub fn successful_iterations(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn average_duration(&self) -> Duration {
        match u32::try_from(self.iterations_run) {
            Ok(0) => Duration::ZERO,
            Ok(runs) => self.total_time / runs,
            Err(_) => self.slowest_run,
        }
    }

    #[must_use]
    pub fn average_days(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let total: u32 = self.outcomes.iter().map(|o| o.days).sum();
        f64::from(total) / f64::from(u32::try_from(self.outcomes.len()).unwrap_or(u32::MAX))
    }

    #[must_use]
    pub fn victories(&self) -> usize {
        self.outcomes.iter().filter(|o| o.winner.is_some()).count()
    }
}

pub struct LogicTester<'a> {
    catalog: &'a Catalog,
    verbose: bool,
    show_log: bool,
    pacing: Pacing,
    event_delay: Duration,
}

impl<'a> LogicTester<'a> {
    pub const fn new(catalog: &'a Catalog, verbose: bool) -> Self {
        Self {
            catalog,
            verbose,
            show_log: false,
            pacing: Pacing::Instant,
            event_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn with_pacing(mut self, pacing: Pacing, event_delay: Duration) -> Self {
        self.pacing = pacing;
        self.event_delay = event_delay;
        self
    }

    #[must_use]
    pub const fn with_log(mut self, show_log: bool) -> Self {
        self.show_log = show_log;
        self
    }

    /// Audit `iterations` consecutive seeds starting from each listed seed.
    pub fn run_scenario(
        &self,
        settings: &GameSettings,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| self.sweep_from(settings, seed, iterations))
            .collect()
    }

    fn sweep_from(&self, settings: &GameSettings, seed: u64, iterations: usize) -> ScenarioResult {
        let label = scenario_label(settings);
        if self.verbose {
            println!("🧪 Sweeping {} from seed {seed}", label.bright_white());
        }
        let mut result = ScenarioResult::new(format!("{label} / seed {seed}"), seed);
        for iteration_seed in iteration_seeds(seed, iterations) {
            let run_settings = GameSettings {
                seed: iteration_seed,
                ..settings.clone()
            };
            let started = Instant::now();
            let attempt = self.run_once(&run_settings);
            let elapsed = started.elapsed();
            if self.verbose {
                match &attempt {
                    Ok(outcome) => println!(
                        "  ✅ seed {iteration_seed} ({elapsed:?}) {}",
                        outcome.headline()
                    ),
                    Err(err) => println!("  ❌ seed {iteration_seed}: {}", err.as_str().red()),
                }
            }
            result.record(iteration_seed, attempt, elapsed);
        }
        result
    }

    /// Play one game step by step, auditing the roster after each step.
    fn run_once(&self, settings: &GameSettings) -> Result<RunOutcome, String> {
        let mut runner =
            GameRunner::new(self.catalog, settings.clone()).map_err(|e| e.to_string())?;
        let streaming = matches!(self.pacing, Pacing::Stream);
        if streaming {
            println!(
                "{}",
                format!("🏟️  {} (seed {})", runner.arena().name, settings.seed)
                    .bright_cyan()
                    .bold()
            );
            for day in runner.log() {
                self.narrate(day);
            }
        }

        let step_limit = settings.max_days.saturating_add(STEP_SLACK);
        let mut steps = 0;
        let mut violations = Vec::new();
        while runner.state().is_running() {
            if steps > step_limit {
                return Err(format!("run did not finish within {step_limit} steps"));
            }
            steps += 1;

            let before = runner.tributes().to_vec();
            let published_from = runner.log().len();
            let last_day_tag = runner.log().last().map(|day| day.day);
            runner.step();

            let published = &runner.log()[published_from..];
            let snapshot = StepSnapshot {
                before: &before,
                after: runner.tributes(),
                published,
                last_day_tag,
                running: runner.state().is_running(),
            };
            violations.extend(
                audit_step(&snapshot)
                    .into_iter()
                    .map(|violation| format!("step {steps}: {violation}")),
            );
            if streaming {
                for day in published {
                    self.narrate(day);
                }
            }
        }

        if let RunState::Unstable(message) = runner.state() {
            violations.push(message.clone());
        }
        if !violations.is_empty() {
            return Err(violations.join(" | "));
        }

        if self.show_log && !streaming {
            for day in runner.log() {
                self.narrate(day);
            }
        }

        let summary = runner.summary();
        let tribute_of = |id: TributeId| {
            runner
                .tributes()
                .iter()
                .find(|t| t.id == id)
        };
        let winner = summary.winner.and_then(tribute_of);
        let podium = summary
            .placements
            .iter()
            .take(PODIUM_SIZE)
            .filter_map(|id| tribute_of(*id).map(|t| t.name.clone()))
            .collect();
        let major_events = runner
            .log()
            .iter()
            .flat_map(|day| &day.events)
            .filter(|event| event.kind.is_major())
            .count();
        Ok(RunOutcome {
            seed: settings.seed,
            arena: runner.arena().name.clone(),
            winner: winner.map(|t| t.name.clone()),
            winner_kills: winner.map_or(0, |t| t.kills),
            days: runner.day(),
            deaths: summary.timeline.len(),
            podium,
            major_events,
            fingerprint: runner.fingerprint().map_err(|e| e.to_string())?,
        })
    }

    /// Print one published day. Major events stand out and carry the pacing delay.
    fn narrate(&self, day: &GameDay) {
        println!();
        println!("{}", day_label(day.day).bright_yellow().bold());
        println!("{}", day.summary.italic());
        for event in &day.events {
            let text = colorize(event.kind, &event.text);
            if event.kind.is_major() {
                println!("  [{}] {}", event.timestamp.dimmed(), text.bold());
                if !self.event_delay.is_zero() {
                    std::thread::sleep(self.event_delay);
                }
            } else {
                println!("  [{}] {text}", event.timestamp.dimmed());
            }
        }
        for death in &day.deaths {
            println!("  💀 {} - {}", death.tribute_name.red(), death.cause);
        }
    }
}

#[must_use]
pub fn scenario_label(settings: &GameSettings) -> String {
    let arena = match &settings.arena {
        ArenaChoice::Named(name) => name.as_str(),
        ArenaChoice::Random => "Random arena",
    };
    let roster = match settings.roster {
        RosterSet::Book => "book roster",
        RosterSet::Generic => "generic roster",
    };
    format!("{arena} / {roster}")
}

fn iteration_seeds(seed: u64, iterations: usize) -> impl Iterator<Item = u64> {
    (0..iterations).map(move |offset| seed.wrapping_add(u64::try_from(offset).unwrap_or(u64::MAX)))
}

fn day_label(day: f64) -> String {
    if day <= 0.0 {
        "Training".to_string()
    } else if day.fract().abs() < f64::EPSILON {
        format!("Day {day:.0}")
    } else {
        format!("Day {day:.1}")
    }
}

fn colorize(kind: EventKind, text: &str) -> ColoredString {
    match kind {
        EventKind::Death | EventKind::Betrayal => text.red(),
        EventKind::Combat | EventKind::Trap => text.bright_red(),
        EventKind::Alliance | EventKind::Positive => text.green(),
        EventKind::Arena => text.magenta(),
        EventKind::Item | EventKind::Crafting => text.cyan(),
        EventKind::Negative => text.yellow(),
        EventKind::Neutral => text.normal(),
    }
}

/// Durations travel as whole milliseconds.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::load_from_static().unwrap()
    }

    #[test]
    fn day_labels_cover_training_and_half_days() {
        assert_eq!(day_label(0.0), "Training");
        assert_eq!(day_label(3.0), "Day 3");
        assert_eq!(day_label(9.5), "Day 9.5");
    }

    #[test]
    fn scenario_passes_and_records_outcomes() {
        let catalog = catalog();
        let tester = LogicTester::new(&catalog, false);
        let results = tester.run_scenario(&GameSettings::default(), &[7], 2);
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.successful_iterations(), 2);
        assert_eq!(result.outcomes[1].seed, 8);
        assert!(result.average_days() >= 1.0);
        assert!(result.slowest_run <= result.total_time);
    }

    #[test]
    fn outcomes_carry_podium_and_major_events() {
        let catalog = catalog();
        let tester = LogicTester::new(&catalog, false);
        let results = tester.run_scenario(&GameSettings::default(), &[3], 1);
        let outcome = &results[0].outcomes[0];
        assert_eq!(outcome.podium.len(), 3);
        if let Some(winner) = &outcome.winner {
            assert_eq!(&outcome.podium[0], winner);
            assert!(outcome.headline().starts_with(&format!("{winner} wins with")));
        }
        assert!(outcome.major_events > 0);
        assert!(outcome.headline().contains(" > "));
    }

    #[test]
    fn failed_runs_are_recorded_against_their_seed() {
        let mut result = ScenarioResult::new("Arena".into(), 40);
        result.record(40, Err("T3 came back to life".into()), Duration::from_millis(5));
        result.record(41, Err("stuck".into()), Duration::from_millis(9));
        assert!(!result.passed);
        assert_eq!(result.iterations_run, 2);
        assert_eq!(result.successful_iterations(), 0);
        assert_eq!(result.failures[1], "Iteration 2 (seed 41): stuck");
        assert_eq!(result.slowest_run, Duration::from_millis(9));
        assert_eq!(result.average_duration(), Duration::from_millis(7));
    }

    #[test]
    fn iteration_seeds_wrap_at_the_top_of_the_range() {
        let seeds: Vec<u64> = iteration_seeds(u64::MAX, 2).collect();
        assert_eq!(seeds, vec![u64::MAX, 0]);
    }

    #[test]
    fn identical_settings_share_a_fingerprint() {
        let catalog = catalog();
        let tester = LogicTester::new(&catalog, false);
        let settings = GameSettings {
            roster: RosterSet::Generic,
            ..GameSettings::default()
        };
        let first = tester.run_scenario(&settings, &[11], 1);
        let second = tester.run_scenario(&settings, &[11], 1);
        assert_eq!(
            first[0].outcomes[0].fingerprint,
            second[0].outcomes[0].fingerprint
        );
    }

    #[test]
    fn scenario_result_serializes_durations_as_millis() {
        let mut result = ScenarioResult::new("Arena".into(), 1);
        result.record(1, Err("boom".into()), Duration::from_millis(12));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total_time"], 12);
        assert_eq!(json["slowest_run"], 12);
        let restored: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(restored.total_time, Duration::from_millis(12));
    }
}
