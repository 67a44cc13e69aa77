//! Evening social phase: alliance activities, new alliances and betrayals.

use std::collections::BTreeSet;

use crate::catalog::pick_line;
use crate::constants::{
    ALLIANCE_BASE_CHANCE, ALLIANCE_FORMED_RELATIONSHIP, ALLIANCE_MAX_ALLIES,
    ALLIANCE_NEGATIVE_ROLL, ALLIANCE_POSITIVE_ROLL, ALLIANCE_SPLIT_MARKER, BETRAYAL_BASE_CHANCE,
    BETRAYER_EDGE, CAREER_ALLIANCE_BONUS, CHARMER_ALLIANCE_BONUS, DISTRICT_ALLIANCE_BONUS,
    FOILED_BETRAYAL_DAMAGE, RESENTMENT_BETRAYAL_BONUS, RESENTMENT_RELATIONSHIP,
    SHORT_TEMPER_BETRAYAL_BONUS, UNSTABLE_BETRAYAL_BONUS, VENGEANCE_RELATIONSHIP,
    VULNERABLE_ALLY_HEALTH, VULNERABLE_BETRAYAL_BONUS,
};
use crate::day::Stage;
use crate::error::SimulationError;
use crate::evaluation::{Personality, modified_stats, personality, power_score};
use crate::numbers::{floor_div, u32_to_i32};
use crate::report::{DayReport, EventKind};
use crate::rng::RandomSource;
use crate::roster::Roster;
use crate::template::{Bindings, render};
use crate::tribute::{Trait, TributeId};

/// Pick an unused "The {adjective} {noun}" name.
fn coin_alliance_name(
    stage: Stage<'_>,
    taken: &BTreeSet<String>,
    rng: &mut impl RandomSource,
) -> Result<String, SimulationError> {
    let flavor = &stage.catalog.flavor;
    let candidates: Vec<String> = flavor
        .alliance_adjectives
        .iter()
        .flat_map(|adjective| {
            flavor
                .alliance_nouns
                .iter()
                .map(move |noun| format!("The {adjective} {noun}"))
        })
        .filter(|name| !taken.contains(name))
        .collect();
    if let Some(name) = rng.pick(&candidates) {
        return Ok(name.clone());
    }
    let adjective = pick_line(&flavor.alliance_adjectives, "alliance_adjectives", rng)?;
    let noun = pick_line(&flavor.alliance_nouns, "alliance_nouns", rng)?;
    Ok(format!("The {adjective} {noun} {}", taken.len() + 1))
}

/// One narrated activity per living alliance group.
///
/// Unnamed groups are named first. An activity that splits the group
/// removes the named member from every alliance.
///
/// # Errors
///
/// Returns an error if an alliance pool or the Cornucopia stock is empty.
pub fn alliance_actions(
    roster: &mut Roster,
    report: &mut DayReport,
    stage: Stage<'_>,
    timestamp: &str,
    rng: &mut impl RandomSource,
) -> Result<(), SimulationError> {
    let mut taken: BTreeSet<String> = roster
        .alliance_groups()
        .into_iter()
        .filter_map(|group| group.name)
        .collect();
    let mut processed = BTreeSet::new();
    let pools = &stage.catalog.flavor.alliance_actions;
    let stock = stage.catalog.items.cornucopia_items();

    for id in roster.living_ids() {
        if processed.contains(&id) || roster.living_allies(id).is_empty() {
            continue;
        }
        let group = roster.group_of(id);
        processed.extend(group.iter().copied());

        let existing = group
            .iter()
            .find_map(|member| roster.get(*member).and_then(|t| t.alliance_name.clone()));
        let name = match existing {
            Some(name) => name,
            None => {
                let name = coin_alliance_name(stage, &taken, rng)?;
                taken.insert(name.clone());
                name
            }
        };
        roster.name_group(&group, &name);

        let roll = rng.d20();
        let (pool, label, kind) = if roll > ALLIANCE_POSITIVE_ROLL {
            (&pools.positive, "alliance_actions.positive", EventKind::Alliance)
        } else if roll < ALLIANCE_NEGATIVE_ROLL {
            (&pools.negative, "alliance_actions.negative", EventKind::Negative)
        } else {
            (&pools.neutral, "alliance_actions.neutral", EventKind::Neutral)
        };
        let template = pick_line(pool, label, rng)?;
        let item = rng
            .pick(&stock)
            .ok_or(SimulationError::EmptyPool("cornucopia items"))?;
        let item2 = rng
            .pick(&stock)
            .ok_or(SimulationError::EmptyPool("cornucopia items"))?;
        let Some(&first) = rng.pick(&group) else {
            continue;
        };
        let others: Vec<TributeId> = group.iter().copied().filter(|m| *m != first).collect();
        let second = rng.pick(&others).copied().unwrap_or(first);

        let text = render(
            template,
            &Bindings::new()
                .with("alliance", name.as_str())
                .with("item", item.name.as_str())
                .with("item2", item2.name.as_str())
                .with("name1", roster.require(first)?.name.as_str())
                .with("name2", roster.require(second)?.name.as_str()),
        );
        let splits = text.contains(ALLIANCE_SPLIT_MARKER);
        report.push(kind, text, timestamp);
        if splits {
            log::debug!("{name} loses a member");
            roster.leave_alliances(first);
        }
    }
    Ok(())
}

/// Give pairs of living tributes a chance to ally, at most one new ally per initiator.
///
/// # Errors
///
/// Returns an error if the formation pool is empty.
pub fn form_alliances(
    roster: &mut Roster,
    report: &mut DayReport,
    stage: Stage<'_>,
    timestamp: &str,
    rng: &mut impl RandomSource,
) -> Result<(), SimulationError> {
    let living = roster.living_ids();
    for (index, &first) in living.iter().enumerate() {
        let initiator = roster.require(first)?;
        if initiator.allies.len() > ALLIANCE_MAX_ALLIES
            || initiator.has_trait(Trait::Paranoid)
            || initiator.has_trait(Trait::Arrogant)
        {
            continue;
        }
        for &second in &living[index + 1..] {
            let initiator = roster.require(first)?;
            let target = roster.require(second)?;
            if target.allies.len() > ALLIANCE_MAX_ALLIES || initiator.is_allied_with(second) {
                continue;
            }
            let mut chance = ALLIANCE_BASE_CHANCE + modified_stats(initiator).charisma;
            if personality(initiator) == Personality::Charmer {
                chance += CHARMER_ALLIANCE_BONUS;
            }
            if initiator.is_career_district() && target.is_career_district() {
                chance += CAREER_ALLIANCE_BONUS;
            }
            if initiator.district == target.district {
                chance += DISTRICT_ALLIANCE_BONUS;
            }
            let relationship = initiator.relationship_score_or(second, 0);
            if relationship > 0 {
                chance += floor_div(relationship, 10);
            }
            if u32_to_i32(rng.d20()) >= chance {
                continue;
            }

            let template = pick_line(&stage.catalog.flavor.alliance_form, "alliance_form", rng)?;
            let text = render(
                template,
                &Bindings::new()
                    .with("name1", initiator.name.as_str())
                    .with("name2", target.name.as_str()),
            );
            roster.link(first, second)?;
            let (a, b) = roster.pair_mut(first, second)?;
            a.adjust_relationship(second, ALLIANCE_FORMED_RELATIONSHIP);
            b.adjust_relationship(first, ALLIANCE_FORMED_RELATIONSHIP);
            report.push(EventKind::Alliance, text, timestamp);
            break;
        }
    }
    roster.normalize_alliance_names();
    Ok(())
}

/// Let unstable, resentful or opportunistic tributes turn on their allies.
///
/// # Errors
///
/// Returns an error if the betrayal death pool is empty.
pub fn betrayals(
    roster: &mut Roster,
    report: &mut DayReport,
    stage: Stage<'_>,
    timestamp: &str,
    rng: &mut impl RandomSource,
) -> Result<(), SimulationError> {
    for betrayer in roster.living_ids() {
        let allies = roster.require(betrayer)?.allies.clone();
        for ally in allies {
            if !roster.is_alive(betrayer) || !roster.is_alive(ally) {
                continue;
            }
            let traitor = roster.require(betrayer)?;
            let victim = roster.require(ally)?;
            let mut chance = BETRAYAL_BASE_CHANCE;
            if traitor.has_trait(Trait::Unstable) {
                chance += UNSTABLE_BETRAYAL_BONUS;
            }
            if traitor.has_trait(Trait::ShortTempered) {
                chance += SHORT_TEMPER_BETRAYAL_BONUS;
            }
            if traitor.relationship_score_or(ally, 0) < RESENTMENT_RELATIONSHIP {
                chance += RESENTMENT_BETRAYAL_BONUS;
            }
            if victim.health < VULNERABLE_ALLY_HEALTH {
                chance += VULNERABLE_BETRAYAL_BONUS;
            }
            if u32_to_i32(rng.d20()) >= chance {
                continue;
            }

            let traitor_name = traitor.name.clone();
            let victim_name = victim.name.clone();
            report.push(
                EventKind::Betrayal,
                format!("{traitor_name} turns on their ally, {victim_name}!"),
                timestamp,
            );
            let attack = power_score(traitor) + BETRAYER_EDGE + f64::from(rng.d20());
            let defense = power_score(victim) + f64::from(rng.d20());
            if attack > defense {
                let template = pick_line(&stage.catalog.flavor.deaths.betrayal, "deaths.betrayal", rng)?;
                let cause = render(
                    template,
                    &Bindings::new().with("attacker", traitor_name.as_str()),
                );
                roster.kill(ally, &cause, timestamp, report)?;
                roster.require_mut(betrayer)?.kills += 1;
            } else {
                let (a, b) = roster.pair_mut(betrayer, ally)?;
                b.take_damage(FOILED_BETRAYAL_DAMAGE);
                a.adjust_relationship(ally, VENGEANCE_RELATIONSHIP);
                b.adjust_relationship(betrayer, VENGEANCE_RELATIONSHIP);
                report.push(
                    EventKind::Combat,
                    format!(
                        "{victim_name} manages to fight off the betrayal, but is wounded. The alliance is shattered."
                    ),
                    timestamp,
                );
            }
            roster.unlink(betrayer, ally);
            roster.normalize_alliance_names();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::rng::ScriptedRng;
    use crate::tribute::{Gender, Stats, Tribute};

    fn tribute(id: TributeId, district: u8) -> Tribute {
        Tribute::new(id, format!("T{id}"), district, Gender::Female).with_stats(Stats::uniform(5))
    }

    #[test]
    fn unnamed_groups_get_a_shared_name() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let mut roster = Roster::new(vec![tribute(1, 3), tribute(2, 5), tribute(3, 6)]);
        roster.link(1, 2).unwrap();
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::new([0.0, ScriptedRng::die(10, 20)], 0.0);
        alliance_actions(&mut roster, &mut report, stage, "20:00", &mut rng).unwrap();

        let groups = roster.alliance_groups();
        assert_eq!(groups.len(), 1);
        let name = groups[0].name.clone().unwrap();
        assert!(name.starts_with("The "));
        assert_eq!(roster.require(2).unwrap().alliance_name.as_deref(), Some(name.as_str()));
        assert!(roster.require(3).unwrap().alliance_name.is_none());
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].kind, EventKind::Neutral);
    }

    #[test]
    fn split_line_removes_the_named_member() {
        let mut catalog = Catalog::load_from_static().unwrap();
        catalog.flavor.alliance_actions.negative =
            vec!["{alliance} splits up after a bitter argument, with {name1} leaving.".into()];
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let mut roster = Roster::new(vec![tribute(1, 3), tribute(2, 5), tribute(3, 6)]);
        roster.link(1, 2).unwrap();
        roster.link(2, 3).unwrap();
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::from_rolls(&[(1, 20)], 0.0);
        alliance_actions(&mut roster, &mut report, stage, "20:00", &mut rng).unwrap();

        let leaver = roster.require(1).unwrap();
        assert!(leaver.allies.is_empty());
        assert!(leaver.alliance_name.is_none());
        assert_eq!(roster.alliance_groups().len(), 1);
        assert!(report.events[0].text.contains("splits up"));
    }

    #[test]
    fn district_partners_ally_readily() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let mut roster = Roster::new(vec![tribute(1, 7), tribute(2, 7)]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::from_rolls(&[(19, 20)], 0.0);
        form_alliances(&mut roster, &mut report, stage, "20:00", &mut rng).unwrap();
        assert!(roster.require(1).unwrap().is_allied_with(2));
        assert!(roster.require(2).unwrap().is_allied_with(1));
        assert_eq!(roster.require(1).unwrap().relationship_score_or(2, 0), 40);
        assert_eq!(report.events[0].kind, EventKind::Alliance);
    }

    #[test]
    fn paranoid_tributes_never_initiate() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let loner = tribute(1, 7).with_traits([Trait::Paranoid]);
        let mut roster = Roster::new(vec![loner, tribute(2, 9)]);
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::from_rolls(&[(20, 20)], 0.0);
        form_alliances(&mut roster, &mut report, stage, "20:00", &mut rng).unwrap();
        assert!(report.events.is_empty());
        assert_eq!(rng.consumed(), 0, "the only pair starts with the paranoid tribute");
    }

    #[test]
    fn successful_betrayal_kills_and_breaks_the_alliance() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let traitor = tribute(1, 3).with_traits([Trait::Unstable]);
        let mut victim = tribute(2, 5);
        victim.health = 30.0;
        let mut roster = Roster::new(vec![traitor, victim]);
        roster.link(1, 2).unwrap();
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::from_rolls(&[(1, 20), (10, 20), (10, 20)], 0.0);
        betrayals(&mut roster, &mut report, stage, "20:00", &mut rng).unwrap();

        assert!(!roster.is_alive(2));
        assert_eq!(roster.require(1).unwrap().kills, 1);
        assert!(roster.require(1).unwrap().allies.is_empty());
        assert_eq!(report.events[0].kind, EventKind::Betrayal);
        assert!(report.deaths[0].cause.contains("T1"));
    }

    #[test]
    fn foiled_betrayal_wounds_the_defender() {
        let catalog = Catalog::load_from_static().unwrap();
        let stage = Stage::new(&catalog, &catalog.arenas[0]);
        let traitor = tribute(1, 3).with_traits([Trait::Unstable]);
        let mut champion = tribute(2, 5);
        champion.stats = Stats::uniform(10);
        let mut roster = Roster::new(vec![traitor, champion]);
        roster.link(1, 2).unwrap();
        let mut report = DayReport::new("day");
        let mut rng = ScriptedRng::from_rolls(&[(1, 20), (1, 20), (20, 20)], 0.0);
        betrayals(&mut roster, &mut report, stage, "20:00", &mut rng).unwrap();

        assert!(roster.is_alive(2));
        assert!((roster.require(2).unwrap().health - 75.0).abs() < f64::EPSILON);
        let traitor = roster.require(1).unwrap();
        assert!((traitor.health - 100.0).abs() < f64::EPSILON);
        assert_eq!(traitor.relationship_score_or(2, 0), -100);
        assert!(traitor.allies.is_empty());
        assert_eq!(report.events[1].kind, EventKind::Combat);
    }
}
