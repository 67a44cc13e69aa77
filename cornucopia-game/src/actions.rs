//! Action handlers: what happens once a tribute has chosen how to spend a round,
//! plus the random hazards and gifts that can interrupt it.

use crate::catalog::pick_line;
use crate::constants::{
    FORAGE_ARENA_FIND_ROLL, FORAGE_NOTHING, FORAGE_PROVISION_ROLL, FORAGE_SUCCESS,
    FORAGE_WATER_SOURCE, FORTIFIED_MULTIPLIER, MEDIC_MULTIPLIER, NATURALIST_DETECTION_BONUS,
    PARANOIA_MARKER, REST_BASE, REST_SIDES, SPONSOR_KILL_WEIGHT, SPONSOR_MORALE,
    SPONSOR_PITY_BONUS, SPONSOR_PITY_HEALTH, SPONSOR_THRESHOLD, SPRINTER_EVASION_BONUS,
    SURVIVALIST_FORAGE_BONUS, TECHNOLOGIST_DETECTION_BONUS, TRAP_EVASION_DIVISOR,
    WEAK_STOMACH_DAMAGE, WEAK_STOMACH_ROLL,
};
use crate::day::Stage;
use crate::encounter::{Clash, resolve_encounter};
use crate::error::SimulationError;
use crate::evaluation::{injury_description, modified_stats};
use crate::numbers::{floor_div, u32_to_i32};
use crate::policy::{Action, can_craft};
use crate::report::{DayReport, EventKind};
use crate::rng::RandomSource;
use crate::roster::Roster;
use crate::template::{Bindings, render};
use crate::tribute::{Skill, Trait, TributeId};

/// Spring a random arena trap on `actor`.
///
/// Returns `true` if the trap killed the tribute.
///
/// # Errors
///
/// Returns an error if the tribute is missing or no traps are catalogued.
pub fn spring_trap(
    roster: &mut Roster,
    report: &mut DayReport,
    stage: Stage<'_>,
    actor: TributeId,
    timestamp: &str,
    rng: &mut impl RandomSource,
) -> Result<bool, SimulationError> {
    let trap = rng
        .pick(&stage.catalog.flavor.traps)
        .ok_or(SimulationError::EmptyPool("traps"))?;
    let tribute = roster.require_mut(actor)?;
    let name = tribute.name.clone();
    let bindings = Bindings::new().with("name", name.as_str());
    let stats = modified_stats(tribute);

    let mut detection = rng.d20() + floor_div(stats.intelligence, 2).max(0).unsigned_abs();
    if tribute.has_skill(Skill::Technologist) {
        detection += TECHNOLOGIST_DETECTION_BONUS;
    } else if tribute.has_skill(Skill::Naturalist) {
        detection += NATURALIST_DETECTION_BONUS;
    }
    if detection >= trap.detection_dc {
        report.push(
            EventKind::Positive,
            render(&trap.success_description, &bindings),
            timestamp,
        );
        return Ok(false);
    }

    let mut evasion = rng.d20() + floor_div(stats.agility, 2).max(0).unsigned_abs();
    if tribute.has_skill(Skill::Sprinter) {
        evasion += SPRINTER_EVASION_BONUS;
    }
    let cause = if evasion >= trap.evasion_dc {
        let damage = (f64::from(trap.damage) / TRAP_EVASION_DIVISOR).floor();
        tribute.take_damage(damage);
        report.push(
            EventKind::Neutral,
            render(&trap.evade_description, &bindings),
            timestamp,
        );
        format!("Succumbed to injuries while narrowly escaping a {}.", trap.name)
    } else {
        let mut damage = f64::from(trap.damage);
        if tribute.has_skill(Skill::Fortified) {
            damage *= FORTIFIED_MULTIPLIER;
        }
        let damage = damage.floor();
        tribute.take_damage(damage);
        let mut text = render(&trap.description, &bindings);
        if let Some(penalty) = trap.penalty {
            tribute.stats.adjust(penalty.stat, penalty.change);
            text.push_str(&format!(" Their {} is temporarily reduced!", penalty.stat));
        }
        text.push_str(&format!(" They suffer {}.", injury_description(damage)));
        report.push(EventKind::Trap, text, timestamp);
        format!("Was killed by a {}.", trap.name)
    };

    if tribute.health <= 0.0 {
        return roster.kill(actor, &cause, timestamp, report);
    }
    Ok(false)
}

/// Roll for a sponsor gift; popular, deadly or pitiable tributes are favored.
///
/// Returns `true` when a gift was delivered.
///
/// # Errors
///
/// Returns an error if the tribute is missing or the sponsor pool is empty.
pub fn sponsor_gift(
    roster: &mut Roster,
    report: &mut DayReport,
    stage: Stage<'_>,
    actor: TributeId,
    timestamp: &str,
    rng: &mut impl RandomSource,
) -> Result<bool, SimulationError> {
    let tribute = roster.require_mut(actor)?;
    let mut appeal = f64::from(rng.d20())
        + f64::from(tribute.stats.charisma) / 2.0
        + f64::from(u32_to_i32(tribute.kills).saturating_mul(SPONSOR_KILL_WEIGHT));
    if tribute.health < SPONSOR_PITY_HEALTH {
        appeal += f64::from(SPONSOR_PITY_BONUS);
    }
    if appeal <= f64::from(SPONSOR_THRESHOLD) {
        return Ok(false);
    }
    let pool = stage.catalog.items.sponsor_pool();
    let gift = rng
        .pick(&pool)
        .ok_or(SimulationError::EmptyPool("sponsor gifts"))?;
    report.push(
        EventKind::Positive,
        format!(
            "A sponsor drone descends, delivering a {} to {}! The crowd cheers.",
            gift.name, tribute.name
        ),
        timestamp,
    );
    tribute.inventory.push((*gift).clone());
    tribute.adjust_morale(SPONSOR_MORALE);
    log::trace!("sponsor gift for {}", tribute.name);
    Ok(true)
}

/// Carry out a chosen action.
///
/// # Errors
///
/// Returns an error if a tribute is missing, an item is unknown, or a
/// template pool is empty.
pub fn perform_action(
    roster: &mut Roster,
    report: &mut DayReport,
    stage: Stage<'_>,
    actor: TributeId,
    action: Action,
    timestamp: &str,
    rng: &mut impl RandomSource,
) -> Result<(), SimulationError> {
    match action {
        Action::Heal => heal(roster, report, actor, timestamp),
        Action::Rest => rest(roster, report, actor, timestamp, rng),
        Action::Forage => forage(roster, report, stage, actor, timestamp, rng),
        Action::Craft(recipe) => {
            let items = &stage.catalog.items;
            let tribute = roster.require_mut(actor)?;
            if !can_craft(tribute, &recipe, items)? {
                report.push(
                    EventKind::Negative,
                    format!("{} tries to craft something, but fails.", tribute.name),
                    timestamp,
                );
                return Ok(());
            }
            for component in items.component_names(&recipe)? {
                tribute.take_named(component);
            }
            let result = items.recipe_result(&recipe)?.clone();
            let template = pick_line(&stage.catalog.flavor.crafting, "crafting", rng)?;
            let text = render(
                template,
                &Bindings::new()
                    .with("name", tribute.name.as_str())
                    .with("item", result.name.as_str()),
            );
            tribute.inventory.push(result);
            report.push(EventKind::Crafting, text, timestamp);
            Ok(())
        }
        Action::Hunt(target) => {
            if roster.is_alive(target) {
                resolve_encounter(roster, report, stage, Clash::new(actor, target, timestamp), rng)?;
            }
            Ok(())
        }
        Action::Neutral => neutral(roster, report, stage, actor, timestamp, rng),
    }
}

fn heal(
    roster: &mut Roster,
    report: &mut DayReport,
    actor: TributeId,
    timestamp: &str,
) -> Result<(), SimulationError> {
    let tribute = roster.require_mut(actor)?;
    let Some(name) = tribute.first_medicine().map(|item| item.name.clone()) else {
        return Ok(());
    };
    let Some(medicine) = tribute.take_named(&name) else {
        return Ok(());
    };
    let mut amount = f64::from(medicine.healing());
    if tribute.has_skill(Skill::Medic) {
        amount *= MEDIC_MULTIPLIER;
    }
    tribute.recover(amount);
    report.push(
        EventKind::Positive,
        format!("{} uses a {name} and recovers some health.", tribute.name),
        timestamp,
    );
    Ok(())
}

fn rest(
    roster: &mut Roster,
    report: &mut DayReport,
    actor: TributeId,
    timestamp: &str,
    rng: &mut impl RandomSource,
) -> Result<(), SimulationError> {
    let tribute = roster.require_mut(actor)?;
    tribute.recover(REST_BASE + f64::from(rng.roll(REST_SIDES)));
    report.push(
        EventKind::Positive,
        format!(
            "{} finds a safe place to rest and recovers some health.",
            tribute.name
        ),
        timestamp,
    );
    Ok(())
}

fn forage(
    roster: &mut Roster,
    report: &mut DayReport,
    stage: Stage<'_>,
    actor: TributeId,
    timestamp: &str,
    rng: &mut impl RandomSource,
) -> Result<(), SimulationError> {
    let tribute = roster.require_mut(actor)?;
    let name = tribute.name.clone();
    let intelligence = modified_stats(tribute).intelligence;
    let mut search = rng.d20() + floor_div(intelligence, 2).max(0).unsigned_abs();
    if tribute.has_skill(Skill::Survivalist) {
        search += SURVIVALIST_FORAGE_BONUS;
    }

    if search > FORAGE_SUCCESS {
        let find = rng.d20();
        if find > FORAGE_ARENA_FIND_ROLL && !stage.arena.forage_finds.is_empty() {
            tribute.adjust_water(FORAGE_WATER_SOURCE);
            report.push(
                EventKind::Positive,
                format!("{name} finds a clean source of water."),
                timestamp,
            );
            return Ok(());
        }
        let pool = if find > FORAGE_PROVISION_ROLL {
            stage.catalog.items.provisions()
        } else {
            stage.catalog.items.materials()
        };
        let item = rng
            .pick(&pool)
            .ok_or(SimulationError::EmptyPool("forage finds"))?;
        report.push(
            EventKind::Item,
            format!("{name} forages and finds a {}.", item.name),
            timestamp,
        );
        tribute.inventory.push((*item).clone());
    } else if search > FORAGE_NOTHING {
        report.push(
            EventKind::Neutral,
            format!("{name} searches for resources but finds nothing of use."),
            timestamp,
        );
    } else if tribute.has_trait(Trait::WeakStomach) && rng.d20() > WEAK_STOMACH_ROLL {
        tribute.take_damage(WEAK_STOMACH_DAMAGE);
        report.push(
            EventKind::Negative,
            format!("{name} eats some strange berries and gets sick."),
            timestamp,
        );
    } else {
        report.push(
            EventKind::Negative,
            format!("{name}'s foraging attempt is unsuccessful and wastes energy."),
            timestamp,
        );
    }
    Ok(())
}

fn neutral(
    roster: &mut Roster,
    report: &mut DayReport,
    stage: Stage<'_>,
    actor: TributeId,
    timestamp: &str,
    rng: &mut impl RandomSource,
) -> Result<(), SimulationError> {
    let tribute = roster.require(actor)?;
    let flavor = &stage.catalog.flavor;
    let mut pool: Vec<&str> = flavor.neutral.iter().map(String::as_str).collect();
    if tribute.has_trait(Trait::Paranoid) {
        pool.extend(
            flavor
                .negative
                .iter()
                .filter(|line| line.to_lowercase().contains(PARANOIA_MARKER))
                .map(String::as_str),
        );
    }
    let template = pick_line(&pool, "neutral", rng)?;
    let others: Vec<&str> = roster
        .living()
        .filter(|other| other.id != actor)
        .map(|other| other.name.as_str())
        .collect();
    let other = rng.pick(&others).copied().unwrap_or("another tribute");
    let text = render(
        template,
        &Bindings::new()
            .with("name", tribute.name.as_str())
            .with("name2", other),
    );
    report.push(EventKind::Neutral, text, timestamp);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::rng::ScriptedRng;
    use crate::tribute::{Gender, Stats, Tribute};

    fn roster_of(tributes: Vec<Tribute>) -> Roster {
        Roster::new(tributes)
    }

    fn plain(id: TributeId) -> Tribute {
        Tribute::new(id, format!("T{id}"), 8, Gender::Male).with_stats(Stats::uniform(4))
    }

    #[test]
    fn detected_trap_does_no_harm() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let mut roster = roster_of(vec![plain(1)]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::new([0.0, ScriptedRng::die(20, 20)], 0.0);
        let died = spring_trap(&mut roster, &mut report, stage, 1, "08:00", &mut rng).unwrap();
        assert!(!died);
        assert!((roster.require(1).unwrap().health - 100.0).abs() < f64::EPSILON);
        assert_eq!(report.events[0].kind, EventKind::Positive);
    }

    #[test]
    fn failed_trap_applies_penalty_and_damage() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let trap = &catalog.flavor.traps[0];
        let mut roster = roster_of(vec![plain(1)]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::new([0.0], 0.0);
        spring_trap(&mut roster, &mut report, stage, 1, "08:00", &mut rng).unwrap();
        let victim = roster.require(1).unwrap();
        assert!((victim.health - (100.0 - f64::from(trap.damage))).abs() < f64::EPSILON);
        let event = &report.events[0];
        assert_eq!(event.kind, EventKind::Trap);
        if let Some(penalty) = trap.penalty {
            assert_eq!(victim.stats.get(penalty.stat), 4 + penalty.change);
            assert!(event.text.contains("temporarily reduced"));
        }
    }

    #[test]
    fn lethal_trap_records_cause() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let mut frail = plain(1);
        frail.health = 1.0;
        let mut roster = roster_of(vec![frail]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::new([0.0], 0.0);
        assert!(spring_trap(&mut roster, &mut report, stage, 1, "08:00", &mut rng).unwrap());
        assert_eq!(report.deaths.len(), 1);
        assert!(report.deaths[0].cause.starts_with("Was killed by a "));
    }

    #[test]
    fn sponsors_favor_killers() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let mut killer = plain(1);
        killer.kills = 4;
        let mut roster = roster_of(vec![killer, plain(2)]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::from_rolls(&[(16, 20)], 0.0);
        assert!(sponsor_gift(&mut roster, &mut report, stage, 1, "08:15", &mut rng).unwrap());
        assert_eq!(roster.require(1).unwrap().inventory.len(), 1);
        assert_eq!(roster.require(1).unwrap().morale, 4);

        let mut rng = ScriptedRng::from_rolls(&[(16, 20)], 0.0);
        assert!(!sponsor_gift(&mut roster, &mut report, stage, 2, "08:15", &mut rng).unwrap());
    }

    #[test]
    fn crafting_consumes_components() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let vine = catalog.items.get("vine").unwrap().clone();
        let rope = catalog
            .items
            .recipes
            .iter()
            .find(|recipe| recipe.result == "rope")
            .unwrap()
            .clone();
        let crafter = plain(1).with_item(vine.clone()).with_item(vine);
        let mut roster = roster_of(vec![crafter]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::new([], 0.0);
        perform_action(
            &mut roster,
            &mut report,
            stage,
            1,
            Action::Craft(rope),
            "12:00",
            &mut rng,
        )
        .unwrap();
        let crafter = roster.require(1).unwrap();
        assert_eq!(crafter.count_named(&vine_name(&catalog)), 0);
        assert_eq!(crafter.inventory.len(), 1);
        assert_eq!(report.events[0].kind, EventKind::Crafting);
    }

    fn vine_name(catalog: &Catalog) -> String {
        catalog.items.get("vine").unwrap().name.clone()
    }

    #[test]
    fn healing_uses_one_medicine() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let bandages = catalog.items.get("bandages").unwrap().clone();
        let mut medic = plain(1)
            .with_skills([Skill::Medic])
            .with_item(bandages.clone())
            .with_item(bandages.clone());
        medic.health = 30.0;
        let mut roster = roster_of(vec![medic]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::new([], 0.0);
        perform_action(&mut roster, &mut report, stage, 1, Action::Heal, "08:00", &mut rng)
            .unwrap();
        let medic = roster.require(1).unwrap();
        let expected = 30.0 + f64::from(bandages.healing()) * MEDIC_MULTIPLIER;
        assert!((medic.health - expected).abs() < f64::EPSILON);
        assert_eq!(medic.count_named(&bandages.name), 1);
    }

    #[test]
    fn rest_never_exceeds_max_health() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let mut tired = plain(1);
        tired.health = 98.0;
        let mut roster = roster_of(vec![tired]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::from_rolls(&[(5, 5)], 0.0);
        perform_action(&mut roster, &mut report, stage, 1, Action::Rest, "08:00", &mut rng)
            .unwrap();
        assert!((roster.require(1).unwrap().health - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn good_forage_finds_a_provision() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let mut roster = roster_of(vec![plain(1)]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::from_rolls(&[(20, 20), (14, 20)], 0.0);
        perform_action(&mut roster, &mut report, stage, 1, Action::Forage, "08:00", &mut rng)
            .unwrap();
        let finder = roster.require(1).unwrap();
        assert_eq!(finder.inventory.len(), 1);
        assert!(finder.inventory[0].kind.is_provision());
        assert_eq!(report.events[0].kind, EventKind::Item);
    }

    #[test]
    fn weak_stomach_sickens_on_bad_forage() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let forager = plain(1).with_traits([Trait::WeakStomach]);
        let mut roster = roster_of(vec![forager]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::from_rolls(&[(1, 20), (15, 20)], 0.0);
        perform_action(&mut roster, &mut report, stage, 1, Action::Forage, "08:00", &mut rng)
            .unwrap();
        assert!((roster.require(1).unwrap().health - 90.0).abs() < f64::EPSILON);
        assert_eq!(report.events[0].kind, EventKind::Negative);
    }

    #[test]
    fn hunting_a_dead_tribute_does_nothing() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let mut roster = roster_of(vec![plain(1), plain(2)]);
        let mut report = DayReport::new("day");
        roster.kill(2, "fell", "08:00", &mut report).unwrap();
        let mut rng = ScriptedRng::new([], 0.0);
        perform_action(&mut roster, &mut report, stage, 1, Action::Hunt(2), "08:00", &mut rng)
            .unwrap();
        assert!(report.events.is_empty());
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn neutral_lines_name_the_actor() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let mut roster = roster_of(vec![plain(1), plain(2)]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::new([], 0.0);
        perform_action(&mut roster, &mut report, stage, 1, Action::Neutral, "08:00", &mut rng)
            .unwrap();
        assert!(report.events[0].text.contains("T1"));
        assert!(!report.events[0].text.contains('{'));
    }
}
