//! Tribute state model: raw stats, vitals, inventory, relationships.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::catalog::{Item, ItemKind};
use crate::constants::{
    CAREER_DISTRICTS, MAX_HEALTH_FLOOR, MORALE_MAX, MORALE_MIN, RELATIONSHIP_MAX,
    RELATIONSHIP_MIN, STARTING_FOOD, STARTING_HEALTH, STARTING_WATER, STAT_MAX, STAT_MIN,
    VITAL_MAX,
};

/// Stable roster identifier assigned at reaping.
pub type TributeId = u32;

/// Ally list; alliances rarely exceed three partners.
pub type AllyList = SmallVec<[TributeId; 4]>;

/// The five raw attributes every tribute carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Strength,
    Agility,
    Speed,
    Intelligence,
    Charisma,
}

impl Stat {
    pub const ALL: [Self; 5] = [
        Self::Strength,
        Self::Agility,
        Self::Speed,
        Self::Intelligence,
        Self::Charisma,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Agility => "agility",
            Self::Speed => "speed",
            Self::Intelligence => "intelligence",
            Self::Charisma => "charisma",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw stat block, each value kept within `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub strength: i32,
    pub agility: i32,
    pub speed: i32,
    pub intelligence: i32,
    pub charisma: i32,
}

impl Stats {
    #[must_use]
    pub const fn uniform(value: i32) -> Self {
        Self {
            strength: value,
            agility: value,
            speed: value,
            intelligence: value,
            charisma: value,
        }
    }

    #[must_use]
    pub const fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Agility => self.agility,
            Stat::Speed => self.speed,
            Stat::Intelligence => self.intelligence,
            Stat::Charisma => self.charisma,
        }
    }

    const fn slot(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Strength => &mut self.strength,
            Stat::Agility => &mut self.agility,
            Stat::Speed => &mut self.speed,
            Stat::Intelligence => &mut self.intelligence,
            Stat::Charisma => &mut self.charisma,
        }
    }

    /// Shift a stat by `delta`, clamped to `1..=10`. Returns the applied change.
    pub fn adjust(&mut self, stat: Stat, delta: i32) -> i32 {
        let slot = self.slot(stat);
        let before = *slot;
        *slot = (before + delta).clamp(STAT_MIN, STAT_MAX);
        *slot - before
    }

    pub fn set(&mut self, stat: Stat, value: i32) {
        *self.slot(stat) = value.clamp(STAT_MIN, STAT_MAX);
    }

    #[must_use]
    pub fn in_bounds(&self) -> bool {
        Stat::ALL
            .iter()
            .all(|stat| (STAT_MIN..=STAT_MAX).contains(&self.get(*stat)))
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::uniform(5)
    }
}

/// Passive and active abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Assassin,
    Brawler,
    Marksman,
    Fortified,
    Berserker,
    Ambusher,
    Survivalist,
    Medic,
    Scavenger,
    Stealth,
    Gourmand,
    Naturalist,
    Technologist,
    Charismatic,
    Sprinter,
    Trapper,
    Camouflage,
    Pharmacist,
    Intimidating,
    Resourceful,
}

impl Skill {
    pub const ALL: [Self; 20] = [
        Self::Assassin,
        Self::Brawler,
        Self::Marksman,
        Self::Fortified,
        Self::Berserker,
        Self::Ambusher,
        Self::Survivalist,
        Self::Medic,
        Self::Scavenger,
        Self::Stealth,
        Self::Gourmand,
        Self::Naturalist,
        Self::Technologist,
        Self::Charismatic,
        Self::Sprinter,
        Self::Trapper,
        Self::Camouflage,
        Self::Pharmacist,
        Self::Intimidating,
        Self::Resourceful,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assassin => "Assassin",
            Self::Brawler => "Brawler",
            Self::Marksman => "Marksman",
            Self::Fortified => "Fortified",
            Self::Berserker => "Berserker",
            Self::Ambusher => "Ambusher",
            Self::Survivalist => "Survivalist",
            Self::Medic => "Medic",
            Self::Scavenger => "Scavenger",
            Self::Stealth => "Stealth",
            Self::Gourmand => "Gourmand",
            Self::Naturalist => "Naturalist",
            Self::Technologist => "Technologist",
            Self::Charismatic => "Charismatic",
            Self::Sprinter => "Sprinter",
            Self::Trapper => "Trapper",
            Self::Camouflage => "Camouflage",
            Self::Pharmacist => "Pharmacist",
            Self::Intimidating => "Intimidating",
            Self::Resourceful => "Resourceful",
        }
    }
}

/// Negative personality quirks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Clumsy,
    Arrogant,
    Cowardly,
    Paranoid,
    Reckless,
    Unstable,
    Loud,
    Trusting,
    WeakStomach,
    ShortTempered,
    Overconfident,
    Vain,
    Illiterate,
}

impl Trait {
    pub const ALL: [Self; 13] = [
        Self::Clumsy,
        Self::Arrogant,
        Self::Cowardly,
        Self::Paranoid,
        Self::Reckless,
        Self::Unstable,
        Self::Loud,
        Self::Trusting,
        Self::WeakStomach,
        Self::ShortTempered,
        Self::Overconfident,
        Self::Vain,
        Self::Illiterate,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clumsy => "Clumsy",
            Self::Arrogant => "Arrogant",
            Self::Cowardly => "Cowardly",
            Self::Paranoid => "Paranoid",
            Self::Reckless => "Reckless",
            Self::Unstable => "Unstable",
            Self::Loud => "Loud",
            Self::Trusting => "Trusting",
            Self::WeakStomach => "Weak Stomach",
            Self::ShortTempered => "Short-tempered",
            Self::Overconfident => "Overconfident",
            Self::Vain => "Vain",
            Self::Illiterate => "Illiterate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Alive,
    Dead,
}

/// Banded view of a relationship score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipLevel {
    Enemy,
    Neutral,
    Ally,
    CloseAlly,
    MaximumAlly,
}

impl RelationshipLevel {
    #[must_use]
    pub const fn from_score(score: i32) -> Self {
        if score >= 80 {
            Self::MaximumAlly
        } else if score >= 60 {
            Self::CloseAlly
        } else if score >= 20 {
            Self::Ally
        } else if score > -20 {
            Self::Neutral
        } else {
            Self::Enemy
        }
    }
}

/// One directed affinity entry; the level always matches the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub score: i32,
    pub level: RelationshipLevel,
}

impl Relationship {
    #[must_use]
    pub const fn new(score: i32) -> Self {
        let score = if score < RELATIONSHIP_MIN {
            RELATIONSHIP_MIN
        } else if score > RELATIONSHIP_MAX {
            RELATIONSHIP_MAX
        } else {
            score
        };
        Self {
            score,
            level: RelationshipLevel::from_score(score),
        }
    }
}

/// A single competitor and everything the engine tracks about them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tribute {
    pub id: TributeId,
    pub name: String,
    pub district: u8,
    pub gender: Gender,
    #[serde(default)]
    pub status: Status,
    pub stats: Stats,
    pub health: f64,
    pub max_health: f64,
    pub food: i32,
    pub water: i32,
    #[serde(default)]
    pub morale: i32,
    #[serde(default)]
    pub inventory: Vec<Item>,
    #[serde(default)]
    pub allies: AllyList,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub days_survived: u32,
    #[serde(default)]
    pub cause_of_death: Option<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub traits: Vec<Trait>,
    #[serde(default)]
    pub relationships: BTreeMap<TributeId, Relationship>,
    #[serde(default)]
    pub alliance_name: Option<String>,
}

impl Tribute {
    /// Fresh tribute with starting vitals and no history.
    #[must_use]
    pub fn new(id: TributeId, name: impl Into<String>, district: u8, gender: Gender) -> Self {
        Self {
            id,
            name: name.into(),
            district,
            gender,
            status: Status::Alive,
            stats: Stats::default(),
            health: STARTING_HEALTH,
            max_health: STARTING_HEALTH,
            food: STARTING_FOOD,
            water: STARTING_WATER,
            morale: 0,
            inventory: Vec::new(),
            allies: AllyList::new(),
            kills: 0,
            days_survived: 0,
            cause_of_death: None,
            skills: Vec::new(),
            traits: Vec::new(),
            relationships: BTreeMap::new(),
            alliance_name: None,
        }
    }

    #[must_use]
    pub const fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    #[must_use]
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = Skill>) -> Self {
        self.skills = skills.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_traits(mut self, traits: impl IntoIterator<Item = Trait>) -> Self {
        self.traits = traits.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: Item) -> Self {
        self.inventory.push(item);
        self
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self.status, Status::Alive)
    }

    #[must_use]
    pub fn has_skill(&self, skill: Skill) -> bool {
        self.skills.contains(&skill)
    }

    #[must_use]
    pub fn has_trait(&self, quirk: Trait) -> bool {
        self.traits.contains(&quirk)
    }

    #[must_use]
    pub fn is_career_district(&self) -> bool {
        CAREER_DISTRICTS.contains(&self.district)
    }

    #[must_use]
    pub fn is_allied_with(&self, other: TributeId) -> bool {
        self.allies.contains(&other)
    }

    /// Score toward `other`, if an entry exists.
    #[must_use]
    pub fn relationship(&self, other: TributeId) -> Option<Relationship> {
        self.relationships.get(&other).copied()
    }

    /// Score toward `other`, treating a missing entry as `fallback`.
    #[must_use]
    pub fn relationship_score_or(&self, other: TributeId, fallback: i32) -> i32 {
        self.relationships
            .get(&other)
            .map_or(fallback, |relationship| relationship.score)
    }

    /// Shift the score toward `other` by `delta`. Missing entries start at 0;
    /// adjusting toward oneself does nothing.
    pub fn adjust_relationship(&mut self, other: TributeId, delta: i32) {
        if other == self.id {
            return;
        }
        let current = self.relationship_score_or(other, 0);
        self.relationships
            .insert(other, Relationship::new(current.saturating_add(delta)));
    }

    pub fn set_relationship(&mut self, other: TributeId, score: i32) {
        if other == self.id {
            return;
        }
        self.relationships.insert(other, Relationship::new(score));
    }

    pub fn adjust_morale(&mut self, delta: i32) {
        self.morale = (self.morale + delta).clamp(MORALE_MIN, MORALE_MAX);
    }

    /// Subtract health, never below zero.
    pub fn take_damage(&mut self, amount: f64) {
        self.health = (self.health - amount).max(0.0);
    }

    /// Restore health up to the current maximum.
    pub fn recover(&mut self, amount: f64) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Permanently lower maximum health, floored at 20; health follows it down.
    pub fn scar(&mut self, amount: f64) {
        self.max_health = (self.max_health - amount).max(MAX_HEALTH_FLOOR);
        self.health = self.health.min(self.max_health);
    }

    pub fn adjust_food(&mut self, delta: i32) {
        self.food = (self.food + delta).clamp(0, VITAL_MAX);
    }

    pub fn adjust_water(&mut self, delta: i32) {
        self.water = (self.water + delta).clamp(0, VITAL_MAX);
    }

    /// Highest-damage weapon held, first listed on ties.
    #[must_use]
    pub fn best_weapon(&self) -> Option<&Item> {
        self.inventory
            .iter()
            .filter(|item| item.kind == ItemKind::Weapon)
            .fold(None, |best: Option<&Item>, item| match best {
                Some(current) if current.damage() >= item.damage() => Some(current),
                _ => Some(item),
            })
    }

    #[must_use]
    pub fn has_weapon(&self) -> bool {
        self.inventory.iter().any(|item| item.kind == ItemKind::Weapon)
    }

    /// First medicine in the inventory.
    #[must_use]
    pub fn first_medicine(&self) -> Option<&Item> {
        self.inventory
            .iter()
            .find(|item| item.kind == ItemKind::Medicine)
    }

    /// Count of inventory entries carrying `name`.
    #[must_use]
    pub fn count_named(&self, name: &str) -> usize {
        self.inventory.iter().filter(|item| item.name == name).count()
    }

    /// Remove the first entry named `name`, returning it.
    pub fn take_named(&mut self, name: &str) -> Option<Item> {
        let index = self.inventory.iter().position(|item| item.name == name)?;
        Some(self.inventory.remove(index))
    }
}
