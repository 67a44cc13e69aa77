//! Narrative template pools, death-cause phrasing and trap definitions.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::rng::RandomSource;
use crate::tribute::Stat;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceActionPools {
    pub positive: Vec<String>,
    pub neutral: Vec<String>,
    pub negative: Vec<String>,
}

/// Death-cause phrasing grouped by how the tribute died.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathCauses {
    pub unarmed: Vec<String>,
    pub weapon: Vec<String>,
    pub betrayal: Vec<String>,
    pub environment: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapPenalty {
    pub stat: Stat,
    pub change: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub name: String,
    pub detection_dc: u32,
    pub evasion_dc: u32,
    pub damage: i32,
    #[serde(default)]
    pub penalty: Option<TrapPenalty>,
    pub description: String,
    pub success_description: String,
    pub evade_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorText {
    pub training: Vec<String>,
    pub neutral: Vec<String>,
    pub negative: Vec<String>,
    pub alliance_form: Vec<String>,
    pub alliance_actions: AllianceActionPools,
    pub crafting: Vec<String>,
    /// Universal arena-wide events, mixed with each arena's own pool.
    pub arena: Vec<String>,
    pub alliance_adjectives: Vec<String>,
    pub alliance_nouns: Vec<String>,
    pub deaths: DeathCauses,
    pub traps: Vec<Trap>,
}

impl FlavorText {
    /// Parse flavor text from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the flavor shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Named pools that must never be empty at runtime.
    #[must_use]
    pub fn required_pools(&self) -> [(&'static str, usize); 16] {
        [
            ("training", self.training.len()),
            ("neutral", self.neutral.len()),
            ("negative", self.negative.len()),
            ("alliance_form", self.alliance_form.len()),
            ("alliance_actions.positive", self.alliance_actions.positive.len()),
            ("alliance_actions.neutral", self.alliance_actions.neutral.len()),
            ("alliance_actions.negative", self.alliance_actions.negative.len()),
            ("crafting", self.crafting.len()),
            ("arena", self.arena.len()),
            ("alliance_adjectives", self.alliance_adjectives.len()),
            ("alliance_nouns", self.alliance_nouns.len()),
            ("deaths.unarmed", self.deaths.unarmed.len()),
            ("deaths.weapon", self.deaths.weapon.len()),
            ("deaths.betrayal", self.deaths.betrayal.len()),
            ("deaths.environment", self.deaths.environment.len()),
            ("traps", self.traps.len()),
        ]
    }

    /// Environment causes that mention `needle`, falling back to the whole pool.
    #[must_use]
    pub fn environment_causes_mentioning(&self, needle: &str) -> Vec<&str> {
        let matching: Vec<&str> = self
            .deaths
            .environment
            .iter()
            .filter(|cause| cause.to_lowercase().contains(needle))
            .map(String::as_str)
            .collect();
        if matching.is_empty() {
            self.deaths.environment.iter().map(String::as_str).collect()
        } else {
            matching
        }
    }
}

/// Draw one line from a template pool.
///
/// # Errors
///
/// Returns [`SimulationError::EmptyPool`] when the pool has no entries.
pub fn pick_line<'a, S>(
    pool: &'a [S],
    label: &'static str,
    rng: &mut impl RandomSource,
) -> Result<&'a str, SimulationError>
where
    S: AsRef<str>,
{
    rng.pick(pool)
        .map(AsRef::as_ref)
        .ok_or(SimulationError::EmptyPool(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    #[test]
    fn pick_line_reports_empty_pools() {
        let mut rng = ScriptedRng::new([0.6], 0.0);
        let pool = vec!["a".to_string(), "b".to_string()];
        assert_eq!(pick_line(&pool, "neutral", &mut rng), Ok("b"));
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            pick_line(&empty, "crafting", &mut rng),
            Err(SimulationError::EmptyPool("crafting"))
        );
    }

    #[test]
    fn environment_causes_filter_by_keyword() {
        let flavor = FlavorText {
            deaths: DeathCauses {
                environment: vec![
                    "Succumbed to starvation.".to_string(),
                    "Succumbed to dehydration.".to_string(),
                    "Died in a tragic accident.".to_string(),
                ],
                ..DeathCauses::default()
            },
            ..FlavorText::default()
        };
        assert_eq!(
            flavor.environment_causes_mentioning("dehydration"),
            vec!["Succumbed to dehydration."]
        );
        assert_eq!(flavor.environment_causes_mentioning("lava").len(), 3);
    }
}
