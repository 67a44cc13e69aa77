//! Day orchestration: the normal day, training, culling, finale and sudden death.
//!
//! Every entry point takes a snapshot of the caller's tributes, advances a
//! private copy and hands back the new roster with its report. A failed phase
//! leaves the caller's roster untouched.

use serde::{Deserialize, Serialize};

use crate::actions::{perform_action, sponsor_gift, spring_trap};
use crate::catalog::{Arena, Catalog, ItemKind, pick_line};
use crate::constants::{
    ACTION_ROUND_HOURS, ACTION_ROUND_MINUTES, ARENA_EVENT_ROLL, CAREER_PACK_RELATIONSHIP,
    DECAY_SIDES, DEFAULT_BLOODBATH_DEATHS, DEHYDRATION_DAMAGE, EVENING_MIN_LIVING,
    FINALE_CONTESTANTS, FOOD_DECAY_BASE, MIN_FLEEING_NARRATED, SAME_DISTRICT_RELATIONSHIP,
    STARVATION_DAMAGE, STAT_MAX, STAT_MIN, TRAINING_EVALUATION_COUNT, TRAINING_EVENT_COUNT,
    TRAP_CHANCE_ROLL, WATER_DECAY_BASE,
};
use crate::encounter::{Clash, resolve_encounter};
use crate::error::SimulationError;
use crate::evaluation::{personality, power_score};
use crate::numbers::u32_to_i32;
use crate::policy::select_action;
use crate::report::{DayReport, EventKind};
use crate::rng::RandomSource;
use crate::roster::Roster;
use crate::social::{alliance_actions, betrayals, form_alliances};
use crate::template::{Bindings, mentions, render};
use crate::tribute::{Stat, Trait, Tribute, TributeId};

const DAY_ONE_SUMMARY: &str = "The Cornucopia horn sounds, signaling the start of the bloody spectacle. Tributes either rush for supplies or flee into the wilderness.";
const DAY_SUMMARY: &str =
    "As a new day dawns, the remaining tributes face the harsh realities of the arena.";
const TRAINING_SUMMARY: &str = "The tributes spend their final days before the games in the training center, honing their skills and forming tentative bonds or rivalries.";
const CULLING_SUMMARY: &str = "To expedite the finale, the Gamemakers unleash a swift and brutal culling of the weakest tributes.";
const SUDDEN_DEATH_SUMMARY: &str = "The games have dragged on for too long. The Gamemakers initiate a sudden death event to force a conclusion, shrinking the arena and unleashing deadly mutts.";
const CULLING_CAUSES: [&str; 3] = [
    "Was eliminated by a targeted Gamemaker trap.",
    "Cornered and killed by a pack of mutts released by the Gamemakers.",
    "Died in a sudden, localized arena event engineered by the Gamemakers.",
];
const INJURY_CAUSE: &str = "Succumbed to their injuries.";
const FINALE_CAUSE: &str = "Succumbed to their injuries after the final battle.";
const MUTT_CAUSE: &str = "Was mauled to death by a pack of vicious muttations.";

/// Reference data a phase reads: the catalog plus the arena in play.
#[derive(Debug, Clone, Copy)]
pub struct Stage<'a> {
    pub catalog: &'a Catalog,
    pub arena: &'a Arena,
}

impl<'a> Stage<'a> {
    #[must_use]
    pub const fn new(catalog: &'a Catalog, arena: &'a Arena) -> Self {
        Self { catalog, arena }
    }
}

/// Per-day knobs taken from the game settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOptions {
    /// Maximum number of bloodbath pairings on day one.
    pub bloodbath_deaths: usize,
}

impl Default for DayOptions {
    fn default() -> Self {
        Self {
            bloodbath_deaths: DEFAULT_BLOODBATH_DEATHS,
        }
    }
}

/// New roster and narrated report produced by one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct DayResult {
    pub tributes: Vec<Tribute>,
    pub report: DayReport,
}

impl DayResult {
    fn from_parts(roster: Roster, report: DayReport) -> Self {
        Self {
            tributes: roster.into_inner(),
            report,
        }
    }
}

/// Seed pairwise relationships before the games begin.
///
/// Career pairs start at 15, other district partners at 25, everyone else at 0.
pub fn initialize_relationships(tributes: &mut [Tribute]) {
    let profiles: Vec<(TributeId, u8, bool)> = tributes
        .iter()
        .map(|t| (t.id, t.district, t.is_career_district()))
        .collect();
    for tribute in tributes.iter_mut() {
        let career = tribute.is_career_district();
        for &(other, district, other_career) in &profiles {
            if other == tribute.id {
                continue;
            }
            let score = if career && other_career {
                CAREER_PACK_RELATIONSHIP
            } else if district == tribute.district {
                SAME_DISTRICT_RELATIONSHIP
            } else {
                0
            };
            tribute.set_relationship(other, score);
        }
    }
}

fn shuffled_living(roster: &Roster, rng: &mut impl RandomSource) -> Vec<TributeId> {
    let mut ids = roster.living_ids();
    rng.shuffle(&mut ids);
    ids
}

/// Stateless phase runner over an immutable catalog.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    catalog: &'a Catalog,
}

impl<'a> Engine<'a> {
    #[must_use]
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub const fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Pre-game training: flavor events and small stat swings.
    ///
    /// # Errors
    ///
    /// Returns an error if the training pool is empty.
    pub fn run_training_phase(
        &self,
        tributes: &[Tribute],
        rng: &mut impl RandomSource,
    ) -> Result<DayResult, SimulationError> {
        let mut roster = Roster::snapshot(tributes);
        let mut report = DayReport::new(TRAINING_SUMMARY);
        let weapons: Vec<&str> = self
            .catalog
            .items
            .of_kind(ItemKind::Weapon)
            .map(|item| item.name.as_str())
            .collect();

        for step in 0..TRAINING_EVENT_COUNT {
            let order = shuffled_living(&roster, rng);
            let Some(&lead) = order.first() else {
                break;
            };
            let template = pick_line(&self.catalog.flavor.training, "training", rng)?;
            let names = (0..3)
                .map(|index| {
                    let id = order.get(index).copied().unwrap_or(lead);
                    roster.require(id).map(|t| t.name.as_str())
                })
                .collect::<Result<Vec<&str>, SimulationError>>()?;
            let leader = roster.require(lead)?;
            let skill = leader.skills.first().map_or("combat", |skill| skill.label());
            let district = leader.district.to_string();
            let mut bindings = Bindings::new()
                .with("name1", names[0])
                .with("name2", names[1])
                .with("name3", names[2])
                .with("district", district)
                .with("skill", skill);
            if mentions(template, "weapon") {
                let weapon = rng.pick(&weapons).copied().unwrap_or("spear");
                bindings.set("weapon", weapon);
            }
            let timestamp = format!("Day {}", i64::try_from(step).unwrap_or(0) - 3);
            report.push(EventKind::Neutral, render(template, &bindings), &timestamp);
        }

        let mut order = shuffled_living(&roster, rng);
        order.truncate(TRAINING_EVALUATION_COUNT);
        for id in order {
            let Some(&stat) = rng.pick(&Stat::ALL) else {
                continue;
            };
            let delta = if rng.roll(3) > 1 { 1 } else { -1 };
            let tribute = roster.require_mut(id)?;
            let next = tribute.stats.get(stat) + delta;
            if !(STAT_MIN..=STAT_MAX).contains(&next) {
                continue;
            }
            tribute.stats.set(stat, next);
            let (kind, text) = if delta > 0 {
                (
                    EventKind::Positive,
                    format!(
                        "{} showed great promise in training, improving their {stat}.",
                        tribute.name
                    ),
                )
            } else {
                (
                    EventKind::Negative,
                    format!(
                        "{} struggled in training, showing weakness in their {stat}.",
                        tribute.name
                    ),
                )
            };
            report.push(kind, text, "Evaluation");
        }

        log::debug!("training complete with {} events", report.events.len());
        Ok(DayResult::from_parts(roster, report))
    }

    /// One full arena day.
    ///
    /// # Errors
    ///
    /// Returns an error if a tribute lookup fails or a template pool is empty.
    pub fn run_normal_day(
        &self,
        tributes: &[Tribute],
        day: u32,
        arena: &Arena,
        options: DayOptions,
        rng: &mut impl RandomSource,
    ) -> Result<DayResult, SimulationError> {
        let stage = Stage::new(self.catalog, arena);
        let mut roster = Roster::snapshot(tributes);
        let mut report = DayReport::new(if day == 1 { DAY_ONE_SUMMARY } else { DAY_SUMMARY });

        self.consume_vitals(&mut roster, &mut report, rng)?;
        if day == 1 {
            Self::bloodbath(&mut roster, &mut report, stage, options, rng)?;
        }

        for hour in ACTION_ROUND_HOURS {
            let round = shuffled_living(&roster, rng);
            for id in round.iter().copied() {
                if !roster.is_alive(id) {
                    continue;
                }
                let minute = rng.pick(&ACTION_ROUND_MINUTES).copied().unwrap_or(0);
                let timestamp = format!("{hour:02}:{minute:02}");
                if rng.d20() < TRAP_CHANCE_ROLL
                    && spring_trap(&mut roster, &mut report, stage, id, &timestamp, rng)?
                {
                    continue;
                }
                let action = {
                    let living: Vec<&Tribute> = roster
                        .tributes()
                        .iter()
                        .filter(|t| round.contains(&t.id))
                        .collect();
                    select_action(roster.require(id)?, &living, day, &self.catalog.items, rng)?
                };
                log::trace!("tribute {id} at {timestamp}: {action:?}");
                perform_action(&mut roster, &mut report, stage, id, action, &timestamp, rng)?;
                if roster.is_alive(id) {
                    sponsor_gift(&mut roster, &mut report, stage, id, &timestamp, rng)?;
                }
            }
        }

        if roster.living_count() > EVENING_MIN_LIVING {
            alliance_actions(&mut roster, &mut report, stage, "20:00", rng)?;
            form_alliances(&mut roster, &mut report, stage, "20:00", rng)?;
            betrayals(&mut roster, &mut report, stage, "20:00", rng)?;
        }

        if rng.d20() > ARENA_EVENT_ROLL {
            let pool: Vec<&str> = arena
                .events
                .iter()
                .chain(&self.catalog.flavor.arena)
                .map(String::as_str)
                .collect();
            let line = pick_line(&pool, "arena events", rng)?;
            report.push(EventKind::Arena, line, "22:00");
        }

        let fallen: Vec<TributeId> = roster
            .living()
            .filter(|t| t.health <= 0.0)
            .map(|t| t.id)
            .collect();
        for id in fallen {
            roster.kill(id, INJURY_CAUSE, "23:00", &mut report)?;
        }

        log::debug!(
            "day {day}: {} events, {} deaths, {} alive",
            report.events.len(),
            report.deaths.len(),
            roster.living_count()
        );
        Ok(DayResult::from_parts(roster, report))
    }

    fn consume_vitals(
        &self,
        roster: &mut Roster,
        report: &mut DayReport,
        rng: &mut impl RandomSource,
    ) -> Result<(), SimulationError> {
        for id in shuffled_living(roster, rng) {
            let tribute = roster.require_mut(id)?;
            tribute.days_survived += 1;
            tribute.adjust_food(-(FOOD_DECAY_BASE + u32_to_i32(rng.roll(DECAY_SIDES))));
            tribute.adjust_water(-(WATER_DECAY_BASE + u32_to_i32(rng.roll(DECAY_SIDES))));
            if tribute.food <= 0 {
                tribute.take_damage(STARVATION_DAMAGE);
            }
            if tribute.water <= 0 {
                tribute.take_damage(DEHYDRATION_DAMAGE);
            }
            if tribute.health > 0.0 {
                continue;
            }
            let needle = if tribute.water <= 0 {
                "dehydration"
            } else {
                "starvation"
            };
            let causes = self.catalog.flavor.environment_causes_mentioning(needle);
            let cause = pick_line(&causes, "deaths.environment", rng)?.to_string();
            roster.kill(id, &cause, "06:00", report)?;
        }
        Ok(())
    }

    fn bloodbath(
        roster: &mut Roster,
        report: &mut DayReport,
        stage: Stage<'_>,
        options: DayOptions,
        rng: &mut impl RandomSource,
    ) -> Result<(), SimulationError> {
        let (mut contestants, runners): (Vec<&Tribute>, Vec<&Tribute>) = roster
            .living()
            .partition(|t| personality(t).is_aggressive() || t.has_trait(Trait::Reckless));
        rng.shuffle(&mut contestants);
        let contestants: Vec<TributeId> = contestants.iter().map(|t| t.id).collect();

        let fleeing = (runners.len() / 2).max(MIN_FLEEING_NARRATED);
        for runner in runners.iter().take(fleeing) {
            report.push(
                EventKind::Neutral,
                format!(
                    "{} immediately flees the Cornucopia, disappearing into the arena.",
                    runner.name
                ),
                "00:01",
            );
        }

        for pairing in 0..options.bloodbath_deaths {
            let mut standing: Vec<TributeId> = contestants
                .iter()
                .copied()
                .filter(|id| roster.is_alive(*id))
                .collect();
            if standing.len() < 2 {
                break;
            }
            rng.shuffle(&mut standing);
            let timestamp = format!("00:{:02}", pairing + 2);
            let clash = Clash::new(standing[0], standing[1], &timestamp).bloodbath();
            resolve_encounter(roster, report, stage, clash, rng)?;
        }
        Ok(())
    }

    /// Kill the weakest living tributes until `target` remain.
    ///
    /// # Errors
    ///
    /// Returns an error if a tribute lookup fails.
    pub fn run_culling(
        &self,
        tributes: &[Tribute],
        target: usize,
        rng: &mut impl RandomSource,
    ) -> Result<DayResult, SimulationError> {
        let mut roster = Roster::snapshot(tributes);
        let mut report = DayReport::new(CULLING_SUMMARY);
        let mut ranked: Vec<(TributeId, f64)> = roster
            .living()
            .map(|t| (t.id, power_score(t)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        let excess = ranked.len().saturating_sub(target);
        for (index, (id, _)) in ranked.into_iter().take(excess).enumerate() {
            let cause = rng.pick(&CULLING_CAUSES).copied().unwrap_or(CULLING_CAUSES[0]);
            roster.kill(id, cause, &format!("18:{:02}", index + 1), &mut report)?;
        }
        log::debug!("culling removed {excess} tributes");
        Ok(DayResult::from_parts(roster, report))
    }

    /// Final confrontation between the last two tributes.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Invariant`] unless exactly two tributes are alive.
    pub fn run_finale(
        &self,
        tributes: &[Tribute],
        arena: &Arena,
        rng: &mut impl RandomSource,
    ) -> Result<DayResult, SimulationError> {
        let mut roster = Roster::snapshot(tributes);
        let finalists = roster.living_ids();
        let &[first, second] = finalists.as_slice() else {
            return Err(SimulationError::Invariant(format!(
                "finale needs {FINALE_CONTESTANTS} living tributes, found {}",
                finalists.len()
            )));
        };
        let mut report = DayReport::new(format!(
            "The arena falls silent. Only two tributes remain: {} and {}. The Gamemakers force them together for a final, decisive confrontation.",
            roster.require(first)?.name,
            roster.require(second)?.name
        ));
        let stage = Stage::new(self.catalog, arena);
        resolve_encounter(
            &mut roster,
            &mut report,
            stage,
            Clash::new(first, second, "12:00"),
            rng,
        )?;
        if roster.is_alive(first) && roster.is_alive(second) {
            let weaker = if roster.require(first)?.health <= roster.require(second)?.health {
                first
            } else {
                second
            };
            roster.kill(weaker, FINALE_CAUSE, "12:30", &mut report)?;
        }
        log::debug!("finale resolved, {} alive", roster.living_count());
        Ok(DayResult::from_parts(roster, report))
    }

    /// Force a conclusion once the day limit has passed.
    ///
    /// # Errors
    ///
    /// Returns an error if a tribute lookup fails or a death pool is empty.
    pub fn run_sudden_death(
        &self,
        tributes: &[Tribute],
        arena: &Arena,
        rng: &mut impl RandomSource,
    ) -> Result<DayResult, SimulationError> {
        let stage = Stage::new(self.catalog, arena);
        let mut roster = Roster::snapshot(tributes);
        let mut report = DayReport::new(SUDDEN_DEATH_SUMMARY);
        report.push(
            EventKind::Arena,
            "The borders of the arena begin to rapidly shrink, forcing all tributes towards the center!",
            "08:00",
        );
        while roster.living_count() > 1 {
            let pair = shuffled_living(&roster, rng);
            let clash = Clash::new(pair[0], pair[1], "10:00");
            resolve_encounter(&mut roster, &mut report, stage, clash, rng)?;
            if roster.living_count() > 1 {
                let victims = shuffled_living(&roster, rng);
                roster.kill(victims[0], MUTT_CAUSE, "14:00", &mut report)?;
            }
        }
        log::debug!("sudden death over after {} deaths", report.deaths.len());
        Ok(DayResult::from_parts(roster, report))
    }
}
