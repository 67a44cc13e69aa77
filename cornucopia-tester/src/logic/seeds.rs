use anyhow::{Context, Result, bail};

const DEFAULT_SEED: u64 = 1337;
const MAX_RANGE_SEEDS: u64 = 10_000;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Resolve CLI seed tokens into concrete seeds.
///
/// Supports decimal integers (negative values use their magnitude), `0x`
/// hex literals and inclusive ranges such as `10..=20` or half-open `10..20`.
/// Duplicates are dropped, first occurrence wins.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once("..") {
            let (end, inclusive) = end
                .strip_prefix('=')
                .map_or((end, false), |rest| (rest, true));
            let start = parse_single(start)?;
            let end = parse_single(end)?;
            let last = if inclusive { end } else { end.saturating_sub(1) };
            if last < start {
                bail!("Empty seed range: {token}");
            }
            if last - start >= MAX_RANGE_SEEDS {
                bail!("Seed range {token} expands past {MAX_RANGE_SEEDS} seeds");
            }
            seeds.extend(start..=last);
            continue;
        }

        seeds.push(parse_single(token)?);
    }

    let mut deduped: Vec<u64> = Vec::with_capacity(seeds.len());
    for seed in seeds {
        if !deduped.contains(&seed) {
            deduped.push(seed);
        }
    }

    if deduped.is_empty() {
        deduped.push(DEFAULT_SEED);
    }

    Ok(deduped)
}

fn parse_single(token: &str) -> Result<u64> {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(&hex.replace('_', ""), 16)
            .with_context(|| format!("Unrecognized hex seed: {token}"));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }
    bail!("Unrecognized seed token: {token}")
}
