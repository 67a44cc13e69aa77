//! Two-tribute encounter resolution.
//!
//! An encounter runs a fixed sequence of phases: flee, defensive trap,
//! ambush, then the standard exchange. Each phase can end the encounter,
//! in which case later phases draw no randomness at all.

use crate::catalog::{ItemKind, Terrain, pick_line};
use crate::constants::{
    ALLY_ATTACK_BONUS, ALLY_DEFENSE_BONUS, ALLY_HELP_BASE, ALLY_HELP_OPPONENT_DEFAULT,
    AMBUSH_BASE, AMBUSH_CRITICAL_MULTIPLIER, AMBUSH_MULTIPLIER, AMBUSHER_AMBUSH_BONUS,
    ARROGANT_MULTIPLIER, ASSASSIN_AMBUSH_MULTIPLIER, ASSASSIN_BONUS, BERSERKER_DIVISOR,
    BRAWLER_BONUS, CAMOUFLAGE_AMBUSH_BONUS, CANOPY_MARKSMAN_MULTIPLIER, CLUMSY_PENALTY,
    COUNTER_BLOODBATH_MULTIPLIER, COUNTER_DAMAGE_BASE, COUNTER_DAMAGE_FLOOR,
    COUNTER_DAMAGE_SCALE, COUNTER_DAMAGE_SIDES, COWARD_FLEE_BONUS, CRITICAL_ROLL,
    CRITICAL_SCORE_MULTIPLIER, DEFEATED_MORALE, DEFENSIVE_TRAP_BASE_DAMAGE, DEFENSIVE_TRAP_ROLL,
    EVEN_MATCH_DAMAGE, EVEN_MATCH_MARGIN, EVEN_MATCH_SIDES, FLEE_TARGET, FORTIFIED_MULTIPLIER,
    GRUDGE_RELATIONSHIP, INTIMIDATION_FLEE_BONUS, KILL_MORALE, LOOT_LIMIT,
    MARKSMAN_MULTIPLIER, MARKSMAN_WEAPON_FAMILIES, RECKLESS_BONUS, SCAR_DAMAGE_THRESHOLD,
    SCAR_SIDES, SPRINTER_FLEE_ROLL, STEALTH_AMBUSH_BONUS, VENGEANCE_RELATIONSHIP,
    VICTOR_MORALE, WINNER_BLOODBATH_MULTIPLIER, WINNER_DAMAGE_BASE, WINNER_DAMAGE_FLOOR,
    WINNER_DAMAGE_SCALE, WINNER_DAMAGE_SIDES, WITNESS_ROLL,
};
use crate::day::Stage;
use crate::error::SimulationError;
use crate::evaluation::{ModifiedStats, injury_description, modified_stats};
use crate::numbers::{floor_div, u32_to_i32, usize_to_f64};
use crate::report::{DayReport, EventKind};
use crate::rng::RandomSource;
use crate::roster::Roster;
use crate::template::{Bindings, render};
use crate::tribute::{Skill, Trait, Tribute, TributeId};

/// Who meets whom, when, and under which rules.
#[derive(Debug, Clone, Copy)]
pub struct Clash<'a> {
    pub initiator: TributeId,
    pub target: TributeId,
    pub timestamp: &'a str,
    /// Bloodbath clashes never end in a draw and hit much harder.
    pub bloodbath: bool,
}

impl<'a> Clash<'a> {
    #[must_use]
    pub const fn new(initiator: TributeId, target: TributeId, timestamp: &'a str) -> Self {
        Self {
            initiator,
            target,
            timestamp,
            bloodbath: false,
        }
    }

    #[must_use]
    pub const fn bloodbath(mut self) -> Self {
        self.bloodbath = true;
        self
    }
}

/// Which branch ended the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterOutcome {
    Fled,
    TrapKill,
    AmbushKill,
    EvenlyMatched,
    InitiatorWon,
    TargetWon,
}

#[derive(Debug, Clone, Copy, Default)]
struct TerrainBonus {
    attack: i32,
    defense: i32,
}

/// Terrain advantages read from raw stats.
fn terrain_bonus(tribute: &Tribute, terrain: Terrain) -> TerrainBonus {
    let stats = &tribute.stats;
    let mut bonus = TerrainBonus::default();
    match terrain {
        Terrain::Forest | Terrain::Jungle => {
            if stats.agility > 7 {
                bonus.defense += 1;
            }
            if tribute.has_skill(Skill::Stealth) {
                bonus.attack += 2;
            }
        }
        Terrain::Urban => {
            if stats.intelligence > 7 {
                bonus.attack += 2;
            }
            if stats.agility > 6 {
                bonus.defense += 1;
            }
        }
        Terrain::Mountain => {
            if stats.strength > 7 {
                bonus.attack += 1;
            }
            if stats.agility > 8 {
                bonus.defense += 2;
            }
        }
        Terrain::Desert | Terrain::Tundra => {
            if tribute.has_skill(Skill::Survivalist) {
                bonus.defense += 1;
            }
        }
        Terrain::Swamp => {}
    }
    bonus
}

fn weapon_bonus(tribute: &Tribute, terrain: Terrain) -> f64 {
    let Some(weapon) = tribute.best_weapon() else {
        return 0.0;
    };
    let mut bonus = f64::from(weapon.damage());
    let ranged = MARKSMAN_WEAPON_FAMILIES
        .iter()
        .any(|family| weapon.name.contains(family));
    if tribute.has_skill(Skill::Marksman) && ranged {
        bonus *= MARKSMAN_MULTIPLIER;
        if terrain.is_canopy() {
            bonus *= CANOPY_MARKSMAN_MULTIPLIER;
        }
    }
    bonus
}

fn skill_bonus(tribute: &Tribute) -> f64 {
    let mut bonus = 0.0;
    if tribute.has_skill(Skill::Brawler) && !tribute.has_weapon() {
        bonus += BRAWLER_BONUS;
    }
    if tribute.has_skill(Skill::Berserker) {
        bonus += ((100.0 - tribute.health) / BERSERKER_DIVISOR).floor();
    }
    if tribute.has_skill(Skill::Assassin) {
        bonus += ASSASSIN_BONUS;
    }
    bonus
}

fn trait_modifier(tribute: &Tribute) -> f64 {
    let mut modifier = 0.0;
    if tribute.has_trait(Trait::Clumsy) {
        modifier += CLUMSY_PENALTY;
    }
    if tribute.has_trait(Trait::Reckless) {
        modifier += RECKLESS_BONUS;
    }
    modifier
}

fn stealth_bonus(tribute: &Tribute) -> i32 {
    let mut bonus = 0;
    if tribute.has_skill(Skill::Stealth) {
        bonus += STEALTH_AMBUSH_BONUS;
    }
    if tribute.has_skill(Skill::Camouflage) {
        bonus += CAMOUFLAGE_AMBUSH_BONUS;
    }
    if tribute.has_skill(Skill::Ambusher) {
        bonus += AMBUSHER_AMBUSH_BONUS;
    }
    bonus
}

/// Exchange score before ally help, criticals and arrogance.
fn exchange_score(
    tribute: &Tribute,
    stats: &ModifiedStats,
    terrain_term: i32,
    terrain: Terrain,
    rng: &mut impl RandomSource,
) -> f64 {
    f64::from(stats.strength)
        + f64::from(stats.agility) * 0.5
        + f64::from(tribute.morale)
        + weapon_bonus(tribute, terrain)
        + skill_bonus(tribute)
        + trait_modifier(tribute)
        + f64::from(terrain_term)
        + f64::from(rng.d20())
}

/// Subtract damage; heavy blows also scar, permanently lowering max health.
fn apply_damage(
    roster: &mut Roster,
    id: TributeId,
    damage: f64,
    rng: &mut impl RandomSource,
) -> Result<(), SimulationError> {
    let tribute = roster.require_mut(id)?;
    tribute.take_damage(damage);
    if damage > SCAR_DAMAGE_THRESHOLD {
        let scar = rng.roll(SCAR_SIDES);
        tribute.scar(f64::from(scar));
    }
    Ok(())
}

fn is_down(roster: &Roster, id: TributeId) -> Result<bool, SimulationError> {
    Ok(roster.require(id)?.health <= 0.0)
}

/// Living allies of `side` that join the fight against `opponent`.
fn rally(
    roster: &Roster,
    side: TributeId,
    opponent: TributeId,
    rng: &mut impl RandomSource,
) -> Vec<TributeId> {
    roster
        .living_allies(side)
        .into_iter()
        .filter(|ally| *ally != opponent)
        .filter(|ally| {
            let Some(helper) = roster.get(*ally) else {
                return false;
            };
            let toward_side = helper.relationship_score_or(side, 0);
            let toward_opponent = helper.relationship_score_or(opponent, ALLY_HELP_OPPONENT_DEFAULT);
            let chance = ALLY_HELP_BASE + floor_div(toward_side, 10) - floor_div(toward_opponent, 20);
            u32_to_i32(rng.d20()) < chance
        })
        .collect()
}

fn names(roster: &Roster, ids: &[TributeId]) -> String {
    ids.iter()
        .filter_map(|id| roster.get(*id).map(|tribute| tribute.name.as_str()))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Record a combat death: cause, kill credit, looting, and witnesses.
///
/// # Errors
///
/// Returns an error if either tribute is missing or a death pool is empty.
pub fn handle_combat_death(
    roster: &mut Roster,
    report: &mut DayReport,
    stage: Stage<'_>,
    victim: TributeId,
    killer: TributeId,
    timestamp: &str,
    rng: &mut impl RandomSource,
) -> Result<(), SimulationError> {
    let victim_name = roster.require(victim)?.name.clone();
    let killer_ref = roster.require(killer)?;
    let killer_name = killer_ref.name.clone();
    let weapon = killer_ref.best_weapon().map(|item| item.name.clone());
    let deaths = &stage.catalog.flavor.deaths;

    let bindings = Bindings::new()
        .with("attacker", killer_name.as_str())
        .with("victim", victim_name.as_str());
    let (cause, text) = if let Some(weapon) = &weapon {
        let template = pick_line(&deaths.weapon, "deaths.weapon", rng)?;
        (
            render(template, &bindings.with("weapon", weapon.as_str())),
            format!(
                "{victim_name} couldn't defend against the onslaught and was killed by {killer_name} with a {weapon}."
            ),
        )
    } else {
        let template = pick_line(&deaths.unarmed, "deaths.unarmed", rng)?;
        (
            render(template, &bindings),
            format!("{victim_name} was beaten to death by {killer_name}."),
        )
    };
    report.push(EventKind::Death, text, timestamp);

    let witnesses: Vec<TributeId> = roster
        .living_allies(victim)
        .into_iter()
        .filter(|id| *id != killer)
        .collect();

    roster.kill(victim, &cause, timestamp, report)?;

    let (dead, winner) = roster.pair_mut(victim, killer)?;
    winner.kills += 1;
    winner.adjust_morale(KILL_MORALE);
    let mut looted = Vec::new();
    while looted.len() < LOOT_LIMIT {
        let Some(index) = dead
            .inventory
            .iter()
            .position(|item| item.kind != ItemKind::Material)
        else {
            break;
        };
        looted.push(dead.inventory.remove(index));
    }
    if !looted.is_empty() {
        let loot_names: Vec<&str> = looted.iter().map(|item| item.name.as_str()).collect();
        report.push(
            EventKind::Item,
            format!(
                "{killer_name} loots {} from {victim_name}'s body.",
                loot_names.join(", ")
            ),
            timestamp,
        );
        winner.inventory.extend(looted);
    }

    for witness in witnesses {
        if !roster.is_alive(witness) || rng.d20() <= WITNESS_ROLL {
            continue;
        }
        let (seer, culprit) = roster.pair_mut(witness, killer)?;
        seer.adjust_relationship(killer, VENGEANCE_RELATIONSHIP);
        let witness_name = seer.name.clone();
        if seer.is_allied_with(killer) {
            seer.allies.retain(|ally| *ally != killer);
            culprit.allies.retain(|ally| *ally != witness);
            seer.alliance_name = None;
            culprit.alliance_name = None;
            report.push(
                EventKind::Betrayal,
                format!("The alliance between {witness_name} and {killer_name} shatters."),
                timestamp,
            );
            roster.normalize_alliance_names();
        }
        report.push(
            EventKind::Betrayal,
            format!(
                "{witness_name} learns that {killer_name} killed their ally, {victim_name}. Vengeance is sworn."
            ),
            timestamp,
        );
    }
    Ok(())
}

/// Resolve one encounter between two living tributes.
///
/// # Errors
///
/// Returns an error if either tribute is missing or a flavor pool is empty.
pub fn resolve_encounter(
    roster: &mut Roster,
    report: &mut DayReport,
    stage: Stage<'_>,
    clash: Clash<'_>,
    rng: &mut impl RandomSource,
) -> Result<EncounterOutcome, SimulationError> {
    let Clash {
        initiator: a_id,
        target: b_id,
        timestamp,
        bloodbath,
    } = clash;
    let initiator = roster.require(a_id)?.clone();
    let target = roster.require(b_id)?.clone();
    let (a_name, b_name) = (initiator.name.as_str(), target.name.as_str());
    let terrain = stage.arena.terrain;
    log::trace!("encounter {a_name} -> {b_name} at {timestamp}");

    report.push(
        EventKind::Combat,
        format!("[ENCOUNTER] {a_name} encounters {b_name}."),
        timestamp,
    );

    let a_stats = modified_stats(&initiator);
    let b_stats = modified_stats(&target);

    let flee_roll = rng.d20();
    let mut flee_bonus = 0;
    if target.has_trait(Trait::Cowardly) {
        flee_bonus += COWARD_FLEE_BONUS;
    }
    if initiator.has_skill(Skill::Intimidating) {
        flee_bonus += INTIMIDATION_FLEE_BONUS;
    }
    let sprints_away = target.has_skill(Skill::Sprinter) && flee_roll > SPRINTER_FLEE_ROLL;
    let outpaces = b_stats.speed > a_stats.speed && flee_roll + flee_bonus > FLEE_TARGET;
    if sprints_away || outpaces {
        report.push(
            EventKind::Neutral,
            format!("{b_name} uses their superior speed to escape from {a_name}."),
            timestamp,
        );
        let (a, b) = roster.pair_mut(a_id, b_id)?;
        b.adjust_morale(1);
        a.adjust_morale(-1);
        return Ok(EncounterOutcome::Fled);
    }

    if target.has_skill(Skill::Trapper) && rng.d20() > DEFENSIVE_TRAP_ROLL {
        let damage = DEFENSIVE_TRAP_BASE_DAMAGE + f64::from(b_stats.intelligence);
        roster.require_mut(a_id)?.take_damage(damage);
        report.push(
            EventKind::Combat,
            format!(
                "{a_name} walks right into a hidden trap set by {b_name}, receiving {}!",
                injury_description(damage)
            ),
            timestamp,
        );
        if is_down(roster, a_id)? {
            let cause = format!("Was killed by one of {b_name}'s traps.");
            roster.kill(a_id, &cause, timestamp, report)?;
            roster.require_mut(b_id)?.kills += 1;
            return Ok(EncounterOutcome::TrapKill);
        }
    }

    let stealth = stealth_bonus(&initiator);
    let ambush = (initiator.has_skill(Skill::Assassin) || stealth > 0)
        && u32_to_i32(rng.d20()) > AMBUSH_BASE - a_stats.intelligence - stealth;
    let critical = rng.d20() > CRITICAL_ROLL;

    if ambush {
        let multiplier = if initiator.has_skill(Skill::Assassin) {
            ASSASSIN_AMBUSH_MULTIPLIER
        } else {
            AMBUSH_MULTIPLIER
        };
        let mut damage = f64::from(u32_to_i32(rng.roll(10)) + a_stats.intelligence) * multiplier;
        if target.has_skill(Skill::Fortified) {
            damage *= FORTIFIED_MULTIPLIER;
        }
        if critical {
            damage *= AMBUSH_CRITICAL_MULTIPLIER;
        }
        apply_damage(roster, b_id, damage, rng)?;
        let precision = if critical { " with deadly precision" } else { "" };
        report.push(
            EventKind::Combat,
            format!(
                "{a_name} launches a surprise attack from the shadows{precision}, dealing {} to {b_name}!",
                injury_description(damage)
            ),
            timestamp,
        );
        if is_down(roster, b_id)? {
            handle_combat_death(roster, report, stage, b_id, a_id, timestamp, rng)?;
            return Ok(EncounterOutcome::AmbushKill);
        }
    }

    let mut a_score = exchange_score(
        &initiator,
        &a_stats,
        terrain_bonus(&initiator, terrain).attack,
        terrain,
        rng,
    );
    let mut b_score = exchange_score(
        &target,
        &b_stats,
        terrain_bonus(&target, terrain).defense,
        terrain,
        rng,
    );

    let a_help = rally(roster, a_id, b_id, rng);
    let b_help = rally(roster, b_id, a_id, rng);
    if !a_help.is_empty() {
        let verb = if a_help.len() == 1 { "joins" } else { "join" };
        report.push(
            EventKind::Combat,
            format!("{} {verb} the fight to help {a_name}!", names(roster, &a_help)),
            timestamp,
        );
    }
    if !b_help.is_empty() {
        let verb = if b_help.len() == 1 { "rushes" } else { "rush" };
        report.push(
            EventKind::Combat,
            format!("{} {verb} to defend {b_name}!", names(roster, &b_help)),
            timestamp,
        );
    }
    a_score += ALLY_ATTACK_BONUS * usize_to_f64(a_help.len());
    b_score += ALLY_DEFENSE_BONUS * usize_to_f64(b_help.len());

    if critical {
        a_score *= CRITICAL_SCORE_MULTIPLIER;
    }
    if initiator.has_trait(Trait::Arrogant) {
        a_score *= ARROGANT_MULTIPLIER;
    }
    if target.has_trait(Trait::Arrogant) {
        b_score *= ARROGANT_MULTIPLIER;
    }

    let diff = a_score - b_score;
    log::trace!("exchange {a_name} {a_score:.1} vs {b_name} {b_score:.1}");

    if diff.abs() < EVEN_MATCH_MARGIN && !bloodbath && !ambush {
        let damage = EVEN_MATCH_DAMAGE + f64::from(rng.roll(EVEN_MATCH_SIDES));
        apply_damage(roster, a_id, damage, rng)?;
        apply_damage(roster, b_id, damage, rng)?;
        report.push(
            EventKind::Combat,
            format!(
                "{a_name} and {b_name} are evenly matched. After a brief, intense skirmish, they both disengage to lick their wounds, each sustaining minor injuries."
            ),
            timestamp,
        );
        if is_down(roster, a_id)? {
            handle_combat_death(roster, report, stage, a_id, b_id, timestamp, rng)?;
        } else if is_down(roster, b_id)? {
            handle_combat_death(roster, report, stage, b_id, a_id, timestamp, rng)?;
        }
        return Ok(EncounterOutcome::EvenlyMatched);
    }

    if diff >= 0.0 {
        let mut damage = (WINNER_DAMAGE_BASE
            + diff * WINNER_DAMAGE_SCALE
            + f64::from(rng.roll(WINNER_DAMAGE_SIDES)))
        .max(WINNER_DAMAGE_FLOOR);
        if bloodbath {
            damage *= WINNER_BLOODBATH_MULTIPLIER;
        }
        if target.has_skill(Skill::Fortified) {
            damage *= FORTIFIED_MULTIPLIER;
        }
        apply_damage(roster, b_id, damage, rng)?;
        report.push(
            EventKind::Combat,
            format!(
                "{a_name} overpowers {b_name}, inflicting {}.",
                injury_description(damage)
            ),
            timestamp,
        );
        let (a, b) = roster.pair_mut(a_id, b_id)?;
        b.adjust_relationship(a_id, GRUDGE_RELATIONSHIP);
        a.adjust_morale(VICTOR_MORALE);
        b.adjust_morale(DEFEATED_MORALE);
        if is_down(roster, b_id)? {
            handle_combat_death(roster, report, stage, b_id, a_id, timestamp, rng)?;
        }
        return Ok(EncounterOutcome::InitiatorWon);
    }

    let mut damage = (COUNTER_DAMAGE_BASE
        + diff.abs() * COUNTER_DAMAGE_SCALE
        + f64::from(rng.roll(COUNTER_DAMAGE_SIDES)))
    .max(COUNTER_DAMAGE_FLOOR);
    if bloodbath {
        damage *= COUNTER_BLOODBATH_MULTIPLIER;
    }
    if initiator.has_skill(Skill::Fortified) {
        damage *= FORTIFIED_MULTIPLIER;
    }
    apply_damage(roster, a_id, damage, rng)?;
    report.push(
        EventKind::Combat,
        format!(
            "{b_name} fends off {a_name}'s attack and counters, inflicting {}.",
            injury_description(damage)
        ),
        timestamp,
    );
    let (a, b) = roster.pair_mut(a_id, b_id)?;
    a.adjust_relationship(b_id, GRUDGE_RELATIONSHIP);
    b.adjust_morale(VICTOR_MORALE);
    a.adjust_morale(DEFEATED_MORALE);
    if is_down(roster, a_id)? {
        handle_combat_death(roster, report, stage, a_id, b_id, timestamp, rng)?;
    }
    Ok(EncounterOutcome::TargetWon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::rng::ScriptedRng;
    use crate::tribute::{Gender, Stats};

    const TOLERANCE: f64 = 1e-9;

    fn plain(id: TributeId) -> Tribute {
        Tribute::new(id, format!("T{id}"), 5, Gender::Female).with_stats(Stats::uniform(5))
    }

    fn clash_once(
        tributes: Vec<Tribute>,
        clash: Clash<'_>,
        rng: &mut ScriptedRng,
    ) -> (EncounterOutcome, Roster, DayReport) {
        let catalog = Catalog::load_from_static().unwrap();
        let arena = catalog.arena("Swampy Marshlands").unwrap();
        let stage = Stage::new(&catalog, arena);
        let mut roster = Roster::new(tributes);
        let mut report = DayReport::new("day");
        let outcome = resolve_encounter(&mut roster, &mut report, stage, clash, rng).unwrap();
        (outcome, roster, report)
    }

    #[test]
    fn identical_tributes_draw_evenly_without_ambush_draws() {
        let mut rng =
            ScriptedRng::from_rolls(&[(1, 20), (1, 20), (10, 20), (10, 20), (2, 4)], 0.0);
        let (outcome, roster, report) =
            clash_once(vec![plain(1), plain(2)], Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::EvenlyMatched);
        assert_eq!(rng.consumed(), 5, "flee, critical, two exchanges, damage");
        for id in [1, 2] {
            let tribute = roster.require(id).unwrap();
            assert!((tribute.health - 93.0).abs() < TOLERANCE);
            assert!((tribute.max_health - 100.0).abs() < TOLERANCE);
            assert_eq!(tribute.morale, 0);
        }
        assert!(report.events[0].text.starts_with("[ENCOUNTER]"));
        assert!(report.deaths.is_empty());
    }

    #[test]
    fn sprinter_escapes_on_a_modest_roll() {
        let target = plain(2).with_skills([Skill::Sprinter]);
        let mut rng = ScriptedRng::from_rolls(&[(7, 20)], 0.0);
        let (outcome, roster, _) =
            clash_once(vec![plain(1), target], Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::Fled);
        assert_eq!(rng.consumed(), 1);
        assert_eq!(roster.require(1).unwrap().morale, -1);
        assert_eq!(roster.require(2).unwrap().morale, 1);
    }

    #[test]
    fn faster_target_needs_to_beat_the_flee_target() {
        let fast = || {
            plain(2).with_stats(Stats {
                speed: 8,
                ..Stats::uniform(5)
            })
        };
        let clash = Clash::new(1, 2, "08:00");

        let mut rng = ScriptedRng::from_rolls(&[(13, 20)], 0.0);
        let (outcome, _, _) = clash_once(vec![plain(1), fast()], clash, &mut rng);
        assert_eq!(outcome, EncounterOutcome::Fled);

        let mut rng =
            ScriptedRng::from_rolls(&[(12, 20), (1, 20), (10, 20), (10, 20), (1, 4)], 0.0);
        let (outcome, _, _) = clash_once(vec![plain(1), fast()], clash, &mut rng);
        assert_eq!(outcome, EncounterOutcome::EvenlyMatched, "12 alone does not beat 12");

        let coward = fast().with_traits([Trait::Cowardly]);
        let mut rng = ScriptedRng::from_rolls(&[(12, 20)], 0.0);
        let (outcome, _, _) = clash_once(vec![plain(1), coward], clash, &mut rng);
        assert_eq!(outcome, EncounterOutcome::Fled);
    }

    #[test]
    fn defensive_trap_kills_a_weakened_initiator() {
        let mut initiator = plain(1);
        initiator.health = 10.0;
        let trapper = plain(2).with_skills([Skill::Trapper]);
        let mut rng = ScriptedRng::from_rolls(&[(1, 20), (17, 20)], 0.0);
        let (outcome, roster, report) =
            clash_once(vec![initiator, trapper], Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::TrapKill);
        assert_eq!(rng.consumed(), 2);
        assert!(!roster.is_alive(1));
        assert_eq!(roster.require(2).unwrap().kills, 1);
        assert_eq!(report.deaths.len(), 1);
        assert!(report.deaths[0].cause.contains("T2's traps"));
    }

    #[test]
    fn critical_assassin_ambush_is_lethal() {
        let assassin = plain(1).with_skills([Skill::Assassin]);
        let mut target = plain(2);
        target.health = 60.0;
        let mut rng = ScriptedRng::from_rolls(&[(1, 20), (14, 20), (19, 20), (10, 10)], 0.0);
        let (outcome, roster, report) =
            clash_once(vec![assassin, target], Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::AmbushKill);
        assert!(!roster.is_alive(2));
        let killer = roster.require(1).unwrap();
        assert_eq!(killer.kills, 1);
        assert_eq!(killer.morale, KILL_MORALE);
        assert!(
            report
                .events
                .iter()
                .any(|event| event.text.contains("with deadly precision"))
        );
    }

    #[test]
    fn plain_ambush_kill_without_a_critical() {
        let assassin = plain(1).with_skills([Skill::Assassin]);
        let mut target = plain(2);
        target.health = 30.0;
        let mut rng = ScriptedRng::from_rolls(&[(1, 20), (14, 20), (1, 20), (10, 10)], 0.0);
        let (outcome, roster, report) =
            clash_once(vec![assassin, target], Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::AmbushKill);
        assert!(!roster.is_alive(2));
        assert!(
            !report
                .events
                .iter()
                .any(|event| event.text.contains("deadly precision"))
        );
    }

    #[test]
    fn survived_ambush_never_ends_in_a_draw() {
        let stalker = plain(1).with_skills([Skill::Stealth]);
        let mut rng = ScriptedRng::from_rolls(
            &[
                (1, 20),
                (12, 20),
                (1, 20),
                (1, 10),
                (10, 20),
                (10, 20),
                (1, 6),
            ],
            0.0,
        );
        let (outcome, roster, _) =
            clash_once(vec![stalker, plain(2)], Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::InitiatorWon);
        let target = roster.require(2).unwrap();
        assert!((target.health - (100.0 - 10.8 - 11.0)).abs() < TOLERANCE);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn bloodbath_clash_never_ends_in_a_draw() {
        let mut rng =
            ScriptedRng::from_rolls(&[(1, 20), (1, 20), (10, 20), (10, 20), (1, 6), (1, 5)], 0.0);
        let (outcome, roster, _) = clash_once(
            vec![plain(1), plain(2)],
            Clash::new(1, 2, "08:00").bloodbath(),
            &mut rng,
        );
        assert_eq!(outcome, EncounterOutcome::InitiatorWon);
        let target = roster.require(2).unwrap();
        assert!((target.health - 67.0).abs() < TOLERANCE);
        assert!((target.max_health - 99.0).abs() < TOLERANCE, "33 damage scars");
    }

    #[test]
    fn initiator_win_scars_and_sours_the_loser() {
        let mut rng =
            ScriptedRng::from_rolls(&[(1, 20), (1, 20), (20, 20), (1, 20), (3, 6), (2, 5)], 0.0);
        let (outcome, roster, _) =
            clash_once(vec![plain(1), plain(2)], Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::InitiatorWon);
        let winner = roster.require(1).unwrap();
        let loser = roster.require(2).unwrap();
        assert!((loser.health - 58.5).abs() < TOLERANCE);
        assert!((loser.max_health - 98.0).abs() < TOLERANCE);
        assert_eq!(winner.morale, VICTOR_MORALE);
        assert_eq!(loser.morale, DEFEATED_MORALE);
        assert_eq!(loser.relationship_score_or(1, 0), GRUDGE_RELATIONSHIP);
    }

    #[test]
    fn target_win_counters_the_initiator() {
        let mut rng =
            ScriptedRng::from_rolls(&[(1, 20), (1, 20), (1, 20), (20, 20), (2, 4), (5, 5)], 0.0);
        let (outcome, roster, _) =
            clash_once(vec![plain(1), plain(2)], Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::TargetWon);
        let initiator = roster.require(1).unwrap();
        assert!((initiator.health - 65.2).abs() < TOLERANCE);
        assert!((initiator.max_health - 95.0).abs() < TOLERANCE);
        assert_eq!(initiator.relationship_score_or(2, 0), GRUDGE_RELATIONSHIP);
        assert_eq!(roster.require(2).unwrap().morale, VICTOR_MORALE);
    }

    #[test]
    fn lethal_counter_credits_the_target() {
        let mut initiator = plain(1);
        initiator.health = 10.0;
        let mut rng = ScriptedRng::from_rolls(&[(1, 20), (1, 20), (1, 20), (20, 20)], 0.0);
        let (outcome, roster, report) =
            clash_once(vec![initiator, plain(2)], Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::TargetWon);
        assert!(!roster.is_alive(1));
        let victor = roster.require(2).unwrap();
        assert_eq!(victor.kills, 1);
        assert_eq!(victor.morale, VICTOR_MORALE + KILL_MORALE);
        assert_eq!(report.deaths.len(), 1);
    }

    #[test]
    fn scarring_never_drops_max_health_below_twenty() {
        let mut target = plain(2);
        target.max_health = 22.0;
        target.health = 22.0;
        let mut rng =
            ScriptedRng::from_rolls(&[(1, 20), (1, 20), (20, 20), (1, 20), (1, 6), (5, 5)], 0.0);
        let (outcome, roster, _) =
            clash_once(vec![plain(1), target], Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::InitiatorWon);
        let target = roster.require(2).unwrap();
        assert!(!target.is_alive());
        assert!((target.max_health - 20.0).abs() < TOLERANCE);
    }

    #[test]
    fn rallying_ally_tips_an_even_exchange() {
        let mut roster_tributes = vec![plain(1), plain(2), plain(3)];
        roster_tributes[0].allies.push(3);
        roster_tributes[2].allies.push(1);
        let mut rng = ScriptedRng::from_rolls(
            &[(1, 20), (1, 20), (10, 20), (10, 20), (10, 20), (1, 6)],
            0.0,
        );
        let (outcome, _, report) =
            clash_once(roster_tributes, Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::InitiatorWon);
        assert!(
            report
                .events
                .iter()
                .any(|event| event.text == "T3 joins the fight to help T1!")
        );
    }

    #[test]
    fn defenders_ally_turns_the_fight() {
        let mut roster_tributes = vec![plain(1), plain(2), plain(3)];
        roster_tributes[1].allies.push(3);
        roster_tributes[2].allies.push(2);
        let mut rng = ScriptedRng::from_rolls(
            &[(1, 20), (1, 20), (12, 20), (10, 20), (1, 20), (1, 4)],
            0.0,
        );
        let (outcome, _, report) =
            clash_once(roster_tributes, Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::TargetWon);
        assert!(
            report
                .events
                .iter()
                .any(|event| event.text == "T3 rushes to defend T2!")
        );
    }

    #[test]
    fn reluctant_ally_stays_out() {
        let mut roster_tributes = vec![plain(1), plain(2), plain(3)];
        roster_tributes[0].allies.push(3);
        roster_tributes[2].allies.push(1);
        let mut rng = ScriptedRng::from_rolls(
            &[(1, 20), (1, 20), (10, 20), (10, 20), (11, 20), (1, 4)],
            0.0,
        );
        let (outcome, _, _) = clash_once(roster_tributes, Clash::new(1, 2, "08:00"), &mut rng);
        assert_eq!(outcome, EncounterOutcome::EvenlyMatched);
    }
}
