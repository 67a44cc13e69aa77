//! Read-only evaluators: effective stats, power score, personality, injury wording.

use serde::{Deserialize, Serialize};

use crate::constants::{
    COMBAT_FOCUS_THRESHOLD, GRAVELY_WOUNDED_HEALTH, HUNGRY_THRESHOLD, ILLITERATE_INT_PENALTY,
    MAIMED_MAX_HEALTH, SCARRED_MAX_HEALTH, STAT_MIN, UNARMED_DAMAGE, WOUNDED_HEALTH,
};
use crate::tribute::{Skill, Stats, Trait, Tribute};

/// Stats after wounds, hunger, scars and traits are taken into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedStats {
    pub strength: i32,
    pub agility: i32,
    pub speed: i32,
    pub intelligence: i32,
    pub charisma: i32,
}

fn lower(value: &mut i32, by: i32) {
    *value = (*value - by).max(STAT_MIN);
}

/// Effective stats for combat and checks. Raw stats are left untouched.
#[must_use]
pub fn modified_stats(tribute: &Tribute) -> ModifiedStats {
    let Stats {
        mut strength,
        mut agility,
        mut speed,
        mut intelligence,
        charisma,
    } = tribute.stats;

    if tribute.health < WOUNDED_HEALTH {
        lower(&mut strength, 1);
        lower(&mut agility, 1);
        lower(&mut speed, 1);
    }
    if tribute.health < GRAVELY_WOUNDED_HEALTH {
        lower(&mut strength, 2);
    }
    if tribute.food < HUNGRY_THRESHOLD || tribute.water < HUNGRY_THRESHOLD {
        lower(&mut strength, 1);
        lower(&mut intelligence, 1);
    }
    if tribute.max_health < SCARRED_MAX_HEALTH {
        lower(&mut speed, 1);
        lower(&mut agility, 1);
    }
    if tribute.max_health < MAIMED_MAX_HEALTH {
        lower(&mut speed, 1);
    }
    if tribute.has_trait(Trait::Illiterate) {
        lower(&mut intelligence, ILLITERATE_INT_PENALTY);
    }

    ModifiedStats {
        strength,
        agility,
        speed,
        intelligence,
        charisma,
    }
}

/// Damage of the best weapon held, or the unarmed baseline.
#[must_use]
pub fn weapon_damage(tribute: &Tribute) -> i32 {
    tribute.best_weapon().map_or(UNARMED_DAMAGE, crate::catalog::Item::damage)
}

/// Heuristic strength used for relative comparisons only.
#[must_use]
pub fn power_score(tribute: &Tribute) -> f64 {
    let stats = modified_stats(tribute);
    tribute.health
        + f64::from(stats.strength) * 1.5
        + f64::from(stats.agility)
        + f64::from(stats.speed)
        + f64::from(weapon_damage(tribute)) / 2.0
        + f64::from(tribute.morale)
}

/// Behavioral archetype derived from raw stats, traits and district.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Brute,
    Career,
    Strategist,
    Survivor,
    Runner,
    Charmer,
}

impl Personality {
    /// Archetypes that throw themselves into fights.
    #[must_use]
    pub const fn is_aggressive(self) -> bool {
        matches!(self, Self::Career | Self::Brute)
    }
}

#[must_use]
pub fn personality(tribute: &Tribute) -> Personality {
    let stats = &tribute.stats;
    let combat_focused = stats.strength + stats.agility > COMBAT_FOCUS_THRESHOLD;

    if tribute.has_trait(Trait::Reckless) {
        return Personality::Brute;
    }
    if (tribute.is_career_district() || combat_focused) && !tribute.has_trait(Trait::Cowardly) {
        return Personality::Career;
    }
    if tribute.has_skill(Skill::Charismatic) || (stats.charisma >= 8 && stats.intelligence >= 6) {
        return Personality::Charmer;
    }
    if tribute.has_skill(Skill::Sprinter) || (stats.speed >= 8 && stats.agility >= 7) {
        return Personality::Runner;
    }
    if stats.strength >= 8 && stats.intelligence <= 5 {
        return Personality::Brute;
    }
    if tribute.has_skill(Skill::Technologist) || stats.intelligence >= 8 {
        return Personality::Strategist;
    }
    Personality::Survivor
}

/// Narrative wording for an amount of damage.
#[must_use]
pub fn injury_description(damage: f64) -> &'static str {
    if damage <= 0.0 {
        "no injuries"
    } else if damage <= 10.0 {
        "minor injuries"
    } else if damage <= 25.0 {
        "a moderate injury"
    } else if damage <= 40.0 {
        "a major injury"
    } else if damage >= 90.0 {
        "a fatal injury"
    } else {
        "a critical injury"
    }
}
