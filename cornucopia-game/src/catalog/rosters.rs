//! Reaping reference data: the fixed book roster and per-district generation profiles.

use serde::{Deserialize, Serialize};

use crate::tribute::{Gender, Skill, Stat, Stats, Trait};

/// A tribute as written in the book roster, before ids and vitals are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TributeTemplate {
    pub name: String,
    pub district: u8,
    pub gender: Gender,
    pub stats: Stats,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub traits: Vec<Trait>,
}

/// How generic tributes from a district are rolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictProfile {
    pub district: u8,
    pub name: String,
    #[serde(default)]
    pub career: bool,
    #[serde(default)]
    pub bias: Vec<Stat>,
    #[serde(default)]
    pub weakness: Vec<Stat>,
    #[serde(default)]
    pub skill_pool: Vec<Skill>,
    #[serde(default)]
    pub trait_pool: Vec<Trait>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterData {
    pub book: Vec<TributeTemplate>,
    pub district_profiles: Vec<DistrictProfile>,
}

impl RosterData {
    /// Parse roster data from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the roster shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn profile(&self, district: u8) -> Option<&DistrictProfile> {
        self.district_profiles
            .iter()
            .find(|profile| profile.district == district)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_templates_and_profiles() {
        let data = RosterData::from_json(
            r#"{
                "book": [
                    {"name": "Rue", "district": 11, "gender": "female",
                     "stats": {"strength": 3, "agility": 9, "speed": 9, "intelligence": 7, "charisma": 6},
                     "skills": ["stealth", "naturalist"]}
                ],
                "district_profiles": [
                    {"district": 3, "name": "Technology", "bias": ["intelligence"],
                     "weakness": ["strength", "charisma"], "skill_pool": ["technologist"],
                     "trait_pool": ["paranoid"]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(data.book[0].skills, vec![Skill::Stealth, Skill::Naturalist]);
        assert!(data.book[0].traits.is_empty());
        let profile = data.profile(3).unwrap();
        assert!(!profile.career);
        assert_eq!(profile.weakness, vec![Stat::Strength, Stat::Charisma]);
        assert!(data.profile(13).is_none());
    }
}
