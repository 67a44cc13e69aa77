//! Per-tribute decision policy for an action round.

use std::collections::HashMap;

use crate::catalog::{ItemCatalog, ItemKind, Recipe};
use crate::constants::{
    AGGRESSOR_HUNT_DISCOUNT, CRAFT_DECISION_ROLL, DESPERATE_REST_HEALTH, DESPERATE_REST_ROLL,
    EARLY_GAME_DAYS, EARLY_HUNT_URGE, HEAL_HEALTH, HUNT_EXCLUSION_RELATIONSHIP, HUNT_URGE,
    PECKISH_FORAGE_ROLL, PECKISH_NEED, PLANNER_CRAFT_ROLL, RESOURCEFUL_CRAFT_BONUS,
    TECHNOLOGIST_CRAFT_BONUS, TIRED_HEALTH, TIRED_REST_ROLL, UNARMED_DAMAGE, URGENT_FORAGE_ROLL,
    URGENT_NEED,
};
use crate::error::SimulationError;
use crate::evaluation::{Personality, modified_stats, personality, power_score, weapon_damage};
use crate::rng::RandomSource;
use crate::tribute::{Skill, Trait, Tribute, TributeId};

/// What a tribute does with one action round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Heal,
    Rest,
    Forage,
    Craft(Recipe),
    Hunt(TributeId),
    Neutral,
}

/// True when the inventory holds every component of `recipe`, counted by name.
///
/// # Errors
///
/// Returns [`SimulationError::UnknownItem`] if the recipe names an unknown component.
pub fn can_craft(
    tribute: &Tribute,
    recipe: &Recipe,
    items: &ItemCatalog,
) -> Result<bool, SimulationError> {
    let mut needed: HashMap<&str, usize> = HashMap::new();
    for name in items.component_names(recipe)? {
        *needed.entry(name).or_insert(0) += 1;
    }
    Ok(needed
        .into_iter()
        .all(|(name, count)| tribute.count_named(name) >= count))
}

fn craft_bonus(tribute: &Tribute) -> i32 {
    let mut bonus = 0;
    if tribute.has_skill(Skill::Technologist) {
        bonus += TECHNOLOGIST_CRAFT_BONUS;
    }
    if tribute.has_skill(Skill::Resourceful) {
        bonus += RESOURCEFUL_CRAFT_BONUS;
    }
    bonus
}

/// First recipe in a fresh shuffle that passes `extra` and that the tribute
/// is clever enough and equipped to craft.
fn find_recipe(
    tribute: &Tribute,
    items: &ItemCatalog,
    rng: &mut impl RandomSource,
    extra: impl Fn(&Recipe) -> Result<bool, SimulationError>,
) -> Result<Option<Recipe>, SimulationError> {
    let mut recipes: Vec<&Recipe> = items.recipes.iter().collect();
    rng.shuffle(&mut recipes);
    let intelligence = modified_stats(tribute).intelligence;
    let bonus = craft_bonus(tribute);
    for recipe in recipes {
        if extra(recipe)?
            && intelligence >= recipe.intelligence_threshold - bonus
            && can_craft(tribute, recipe, items)?
        {
            return Ok(Some(recipe.clone()));
        }
    }
    Ok(None)
}

/// Pick the most attractive hunting target, if the tribute is willing to hunt.
#[must_use]
pub fn find_best_target<'a>(
    tribute: &Tribute,
    candidates: &[&'a Tribute],
    day: u32,
) -> Option<&'a Tribute> {
    if tribute.has_trait(Trait::Cowardly) {
        return None;
    }
    let archetype = personality(tribute);
    let my_power = power_score(tribute);

    let mut eligible: Vec<&'a Tribute> = candidates
        .iter()
        .copied()
        .filter(|candidate| {
            if tribute.is_allied_with(candidate.id) {
                return false;
            }
            let relationship = tribute.relationship_score_or(candidate.id, 0);
            if relationship > HUNT_EXCLUSION_RELATIONSHIP {
                return false;
            }
            let their_power = power_score(candidate);
            if tribute.has_trait(Trait::Overconfident) {
                return relationship < 10 || their_power < my_power * 1.4;
            }
            match archetype {
                Personality::Brute => relationship < 0 || their_power < my_power * 1.2,
                Personality::Career if day <= EARLY_GAME_DAYS => {
                    relationship < 10 || their_power < my_power * 1.25
                }
                Personality::Career => relationship < 10 || their_power < my_power * 1.1,
                Personality::Strategist => relationship < -20 || their_power < my_power * 0.8,
                Personality::Survivor | Personality::Runner | Personality::Charmer => {
                    relationship < -40 && their_power < my_power * 0.9
                }
            }
        })
        .collect();

    eligible.sort_by(|a, b| {
        tribute
            .relationship_score_or(a.id, 0)
            .cmp(&tribute.relationship_score_or(b.id, 0))
            .then(a.health.total_cmp(&b.health))
    });
    eligible.first().copied()
}

/// Choose the tribute's action for this round.
///
/// `living` is the round's roster of living tributes; the tribute itself,
/// its allies and anyone who has since died are ignored as hunting targets.
///
/// # Errors
///
/// Returns [`SimulationError::UnknownItem`] if a recipe references an unknown item.
pub fn select_action(
    tribute: &Tribute,
    living: &[&Tribute],
    day: u32,
    items: &ItemCatalog,
    rng: &mut impl RandomSource,
) -> Result<Action, SimulationError> {
    let has_medicine = tribute
        .inventory
        .iter()
        .any(|item| item.kind == ItemKind::Medicine);
    if tribute.health < HEAL_HEALTH && has_medicine {
        return Ok(Action::Heal);
    }
    if tribute.health < DESPERATE_REST_HEALTH && rng.d20() > DESPERATE_REST_ROLL {
        return Ok(Action::Rest);
    }
    if tribute.water < URGENT_NEED && rng.d20() > URGENT_FORAGE_ROLL {
        return Ok(Action::Forage);
    }
    if tribute.food < URGENT_NEED && rng.d20() > URGENT_FORAGE_ROLL {
        return Ok(Action::Forage);
    }

    let archetype = personality(tribute);
    let decision = rng.d20();

    let best_damage = weapon_damage(tribute).max(UNARMED_DAMAGE);
    let upgrade = find_recipe(tribute, items, rng, |recipe| {
        Ok(items.recipe_result(recipe)?.damage() > best_damage)
    })?;
    if let Some(recipe) = upgrade
        && (archetype == Personality::Strategist || decision > CRAFT_DECISION_ROLL)
    {
        return Ok(Action::Craft(recipe));
    }

    let mut urge = if day <= EARLY_GAME_DAYS {
        EARLY_HUNT_URGE
    } else {
        HUNT_URGE
    };
    if archetype.is_aggressive() {
        urge = urge.saturating_sub(AGGRESSOR_HUNT_DISCOUNT);
    }
    if decision > urge {
        let candidates: Vec<&Tribute> = living
            .iter()
            .copied()
            .filter(|other| {
                other.id != tribute.id && other.is_alive() && !tribute.is_allied_with(other.id)
            })
            .collect();
        if let Some(target) = find_best_target(tribute, &candidates, day) {
            return Ok(Action::Hunt(target.id));
        }
    }

    if tribute.health < TIRED_HEALTH && decision > TIRED_REST_ROLL {
        return Ok(Action::Rest);
    }
    if (tribute.water < PECKISH_NEED || tribute.food < PECKISH_NEED) && decision > PECKISH_FORAGE_ROLL
    {
        return Ok(Action::Forage);
    }

    match archetype {
        Personality::Runner | Personality::Survivor => Ok(Action::Forage),
        Personality::Strategist => {
            if decision > PLANNER_CRAFT_ROLL
                && let Some(recipe) = find_recipe(tribute, items, rng, |_| Ok(true))?
            {
                return Ok(Action::Craft(recipe));
            }
            Ok(Action::Forage)
        }
        Personality::Brute | Personality::Career | Personality::Charmer => Ok(Action::Neutral),
    }
}
