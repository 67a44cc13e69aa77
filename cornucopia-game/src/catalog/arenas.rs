//! Arena descriptors and their district stat effects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tribute::{Stat, Tribute};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Forest,
    Desert,
    Jungle,
    Tundra,
    Urban,
    Mountain,
    Swamp,
}

impl Terrain {
    /// Dense canopy hampers ranged weapons and favors stealth.
    #[must_use]
    pub const fn is_canopy(self) -> bool {
        matches!(self, Self::Forest | Self::Jungle)
    }
}

/// Stat buffs and nerfs granted to tributes from the listed districts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictEffect {
    pub districts: Vec<u8>,
    #[serde(default)]
    pub buffs: BTreeMap<Stat, i32>,
    #[serde(default)]
    pub nerfs: BTreeMap<Stat, i32>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena {
    pub name: String,
    pub terrain: Terrain,
    pub description: String,
    #[serde(default)]
    pub effects: Vec<DistrictEffect>,
    /// Arena-specific event lines, mixed with the universal pool at night.
    #[serde(default)]
    pub events: Vec<String>,
    /// Findable resources described by the arena's flavor text.
    #[serde(default)]
    pub forage_finds: Vec<String>,
}

impl Arena {
    /// First effect that covers `district`.
    #[must_use]
    pub fn effect_for(&self, district: u8) -> Option<&DistrictEffect> {
        self.effects
            .iter()
            .find(|effect| effect.districts.contains(&district))
    }

    /// Apply the tribute's district effect once, keeping stats within `1..=10`.
    /// Returns the stats that changed.
    pub fn apply_effects(&self, tribute: &mut Tribute) -> Vec<Stat> {
        let Some(effect) = self.effect_for(tribute.district) else {
            return Vec::new();
        };
        let mut touched = Vec::new();
        for (stat, amount) in &effect.buffs {
            if tribute.stats.adjust(*stat, *amount) != 0 {
                touched.push(*stat);
            }
        }
        for (stat, amount) in &effect.nerfs {
            if tribute.stats.adjust(*stat, -*amount) != 0 {
                touched.push(*stat);
            }
        }
        touched
    }
}
