//! Centralized balance and tuning constants for the arena simulation.
//!
//! Every threshold the day loop, combat resolution and social subsystem
//! compare against lives here so balance changes go through review instead
//! of data files.

// Vitals -------------------------------------------------------------------
pub(crate) const STARTING_HEALTH: f64 = 100.0;
pub(crate) const STARTING_FOOD: i32 = 50;
pub(crate) const STARTING_WATER: i32 = 50;
pub(crate) const VITAL_MAX: i32 = 100;
pub(crate) const MORALE_MIN: i32 = -10;
pub(crate) const MORALE_MAX: i32 = 10;
pub(crate) const STAT_MIN: i32 = 1;
pub(crate) const STAT_MAX: i32 = 10;
pub(crate) const MAX_HEALTH_FLOOR: f64 = 20.0;
pub(crate) const SCAR_DAMAGE_THRESHOLD: f64 = 30.0;
pub(crate) const SCAR_SIDES: u32 = 5;

// Daily consumption --------------------------------------------------------
pub(crate) const FOOD_DECAY_BASE: i32 = 10;
pub(crate) const WATER_DECAY_BASE: i32 = 12;
pub(crate) const DECAY_SIDES: u32 = 5;
pub(crate) const STARVATION_DAMAGE: f64 = 15.0;
pub(crate) const DEHYDRATION_DAMAGE: f64 = 20.0;

// Modified stats -----------------------------------------------------------
pub(crate) const WOUNDED_HEALTH: f64 = 50.0;
pub(crate) const GRAVELY_WOUNDED_HEALTH: f64 = 25.0;
pub(crate) const HUNGRY_THRESHOLD: i32 = 20;
pub(crate) const SCARRED_MAX_HEALTH: f64 = 80.0;
pub(crate) const MAIMED_MAX_HEALTH: f64 = 60.0;
pub(crate) const ILLITERATE_INT_PENALTY: i32 = 2;
pub(crate) const UNARMED_DAMAGE: i32 = 2;

// Personality --------------------------------------------------------------
pub(crate) const CAREER_DISTRICTS: [u8; 3] = [1, 2, 4];
pub(crate) const COMBAT_FOCUS_THRESHOLD: i32 = 15;

// Relationships ------------------------------------------------------------
pub(crate) const RELATIONSHIP_MIN: i32 = -100;
pub(crate) const RELATIONSHIP_MAX: i32 = 100;
pub(crate) const SAME_DISTRICT_RELATIONSHIP: i32 = 25;
pub(crate) const CAREER_PACK_RELATIONSHIP: i32 = 15;
pub(crate) const ALLIANCE_FORMED_RELATIONSHIP: i32 = 40;
pub(crate) const GRUDGE_RELATIONSHIP: i32 = -40;
pub(crate) const VENGEANCE_RELATIONSHIP: i32 = -100;
pub(crate) const DEVASTATED_MORALE: i32 = -8;
pub(crate) const SADDENED_MORALE: i32 = -4;
pub(crate) const CELEBRATION_MORALE: i32 = 5;

// Encounters ---------------------------------------------------------------
pub(crate) const SPRINTER_FLEE_ROLL: u32 = 6;
pub(crate) const FLEE_TARGET: u32 = 12;
pub(crate) const COWARD_FLEE_BONUS: u32 = 5;
pub(crate) const INTIMIDATION_FLEE_BONUS: u32 = 3;
pub(crate) const DEFENSIVE_TRAP_ROLL: u32 = 16;
pub(crate) const DEFENSIVE_TRAP_BASE_DAMAGE: f64 = 5.0;
pub(crate) const AMBUSH_BASE: i32 = 18;
pub(crate) const CRITICAL_ROLL: u32 = 18;
pub(crate) const STEALTH_AMBUSH_BONUS: i32 = 2;
pub(crate) const CAMOUFLAGE_AMBUSH_BONUS: i32 = 3;
pub(crate) const AMBUSHER_AMBUSH_BONUS: i32 = 4;
pub(crate) const ASSASSIN_AMBUSH_MULTIPLIER: f64 = 2.5;
pub(crate) const AMBUSH_MULTIPLIER: f64 = 1.8;
pub(crate) const AMBUSH_CRITICAL_MULTIPLIER: f64 = 2.0;
pub(crate) const FORTIFIED_MULTIPLIER: f64 = 0.7;
pub(crate) const MARKSMAN_MULTIPLIER: f64 = 1.3;
pub(crate) const CANOPY_MARKSMAN_MULTIPLIER: f64 = 0.9;
pub(crate) const MARKSMAN_WEAPON_FAMILIES: [&str; 3] = ["Bow", "Knives", "Slingshot"];
pub(crate) const BRAWLER_BONUS: f64 = 5.0;
pub(crate) const BERSERKER_DIVISOR: f64 = 8.0;
pub(crate) const ASSASSIN_BONUS: f64 = 4.0;
pub(crate) const CLUMSY_PENALTY: f64 = -3.0;
pub(crate) const RECKLESS_BONUS: f64 = 3.0;
pub(crate) const ALLY_HELP_BASE: i32 = 10;
pub(crate) const ALLY_HELP_OPPONENT_DEFAULT: i32 = -10;
pub(crate) const ALLY_ATTACK_BONUS: f64 = 8.0;
pub(crate) const ALLY_DEFENSE_BONUS: f64 = 9.0;
pub(crate) const CRITICAL_SCORE_MULTIPLIER: f64 = 1.5;
pub(crate) const ARROGANT_MULTIPLIER: f64 = 0.9;
pub(crate) const EVEN_MATCH_MARGIN: f64 = 5.0;
pub(crate) const EVEN_MATCH_DAMAGE: f64 = 5.0;
pub(crate) const EVEN_MATCH_SIDES: u32 = 4;
pub(crate) const WINNER_DAMAGE_FLOOR: f64 = 8.0;
pub(crate) const WINNER_DAMAGE_BASE: f64 = 10.0;
pub(crate) const WINNER_DAMAGE_SCALE: f64 = 1.5;
pub(crate) const WINNER_DAMAGE_SIDES: u32 = 6;
pub(crate) const WINNER_BLOODBATH_MULTIPLIER: f64 = 3.0;
pub(crate) const COUNTER_DAMAGE_FLOOR: f64 = 5.0;
pub(crate) const COUNTER_DAMAGE_BASE: f64 = 10.0;
pub(crate) const COUNTER_DAMAGE_SCALE: f64 = 1.2;
pub(crate) const COUNTER_DAMAGE_SIDES: u32 = 4;
pub(crate) const COUNTER_BLOODBATH_MULTIPLIER: f64 = 2.5;
pub(crate) const VICTOR_MORALE: i32 = 2;
pub(crate) const DEFEATED_MORALE: i32 = -3;
pub(crate) const KILL_MORALE: i32 = 3;
pub(crate) const LOOT_LIMIT: usize = 2;
pub(crate) const WITNESS_ROLL: u32 = 8;

// Decision policy ----------------------------------------------------------
pub(crate) const HEAL_HEALTH: f64 = 35.0;
pub(crate) const DESPERATE_REST_HEALTH: f64 = 25.0;
pub(crate) const DESPERATE_REST_ROLL: u32 = 4;
pub(crate) const URGENT_NEED: i32 = 20;
pub(crate) const URGENT_FORAGE_ROLL: u32 = 3;
pub(crate) const CRAFT_DECISION_ROLL: u32 = 14;
pub(crate) const TECHNOLOGIST_CRAFT_BONUS: i32 = 2;
pub(crate) const RESOURCEFUL_CRAFT_BONUS: i32 = 2;
pub(crate) const HUNT_URGE: u32 = 8;
pub(crate) const EARLY_HUNT_URGE: u32 = 5;
pub(crate) const AGGRESSOR_HUNT_DISCOUNT: u32 = 3;
pub(crate) const EARLY_GAME_DAYS: u32 = 3;
pub(crate) const TIRED_HEALTH: f64 = 60.0;
pub(crate) const TIRED_REST_ROLL: u32 = 10;
pub(crate) const PECKISH_NEED: i32 = 50;
pub(crate) const PECKISH_FORAGE_ROLL: u32 = 8;
pub(crate) const PLANNER_CRAFT_ROLL: u32 = 10;
pub(crate) const HUNT_EXCLUSION_RELATIONSHIP: i32 = 20;

// Actions ------------------------------------------------------------------
pub(crate) const MEDIC_MULTIPLIER: f64 = 1.5;
pub(crate) const SURVIVALIST_FORAGE_BONUS: u32 = 4;
pub(crate) const FORAGE_SUCCESS: u32 = 12;
pub(crate) const FORAGE_NOTHING: u32 = 8;
pub(crate) const FORAGE_ARENA_FIND_ROLL: u32 = 16;
pub(crate) const FORAGE_PROVISION_ROLL: u32 = 12;
pub(crate) const FORAGE_WATER_SOURCE: i32 = 30;
pub(crate) const WEAK_STOMACH_ROLL: u32 = 10;
pub(crate) const WEAK_STOMACH_DAMAGE: f64 = 10.0;
pub(crate) const REST_BASE: f64 = 5.0;
pub(crate) const REST_SIDES: u32 = 5;
pub(crate) const PARANOIA_MARKER: &str = "paranoia";

// Traps --------------------------------------------------------------------
pub(crate) const TRAP_CHANCE_ROLL: u32 = 4;
pub(crate) const TECHNOLOGIST_DETECTION_BONUS: u32 = 3;
pub(crate) const NATURALIST_DETECTION_BONUS: u32 = 2;
pub(crate) const SPRINTER_EVASION_BONUS: u32 = 3;
pub(crate) const TRAP_EVASION_DIVISOR: f64 = 4.0;

// Sponsors -----------------------------------------------------------------
pub(crate) const SPONSOR_THRESHOLD: i32 = 24;
pub(crate) const SPONSOR_KILL_WEIGHT: i32 = 2;
pub(crate) const SPONSOR_PITY_HEALTH: f64 = 30.0;
pub(crate) const SPONSOR_PITY_BONUS: i32 = 3;
pub(crate) const SPONSOR_MORALE: i32 = 4;
pub(crate) const SPONSOR_DEFAULT_WEIGHT: u32 = 4;
pub(crate) const SPONSOR_HEAVY_WEAPON_DAMAGE: i32 = 15;
pub(crate) const SPONSOR_HEAVY_WEAPON_WEIGHT: u32 = 1;
pub(crate) const SPONSOR_MEDICINE_WEIGHT: u32 = 5;
pub(crate) const SPONSOR_PROVISION_WEIGHT: u32 = 6;

// Social -------------------------------------------------------------------
pub(crate) const ALLIANCE_POSITIVE_ROLL: u32 = 15;
pub(crate) const ALLIANCE_NEGATIVE_ROLL: u32 = 6;
pub(crate) const ALLIANCE_SPLIT_MARKER: &str = "splits up";
pub(crate) const ALLIANCE_MAX_ALLIES: usize = 2;
pub(crate) const ALLIANCE_BASE_CHANCE: i32 = 5;
pub(crate) const CHARMER_ALLIANCE_BONUS: i32 = 5;
pub(crate) const CAREER_ALLIANCE_BONUS: i32 = 8;
pub(crate) const DISTRICT_ALLIANCE_BONUS: i32 = 10;
pub(crate) const BETRAYAL_BASE_CHANCE: i32 = 2;
pub(crate) const UNSTABLE_BETRAYAL_BONUS: i32 = 8;
pub(crate) const SHORT_TEMPER_BETRAYAL_BONUS: i32 = 4;
pub(crate) const RESENTMENT_RELATIONSHIP: i32 = -20;
pub(crate) const RESENTMENT_BETRAYAL_BONUS: i32 = 10;
pub(crate) const VULNERABLE_ALLY_HEALTH: f64 = 40.0;
pub(crate) const VULNERABLE_BETRAYAL_BONUS: i32 = 5;
pub(crate) const BETRAYER_EDGE: f64 = 20.0;
pub(crate) const FOILED_BETRAYAL_DAMAGE: f64 = 25.0;

// Day loop -----------------------------------------------------------------
pub(crate) const ACTION_ROUND_HOURS: [u32; 3] = [8, 12, 16];
pub(crate) const ACTION_ROUND_MINUTES: [u32; 4] = [0, 15, 30, 45];
pub(crate) const ARENA_EVENT_ROLL: u32 = 14;
pub(crate) const EVENING_MIN_LIVING: usize = 2;
pub(crate) const MIN_FLEEING_NARRATED: usize = 2;
pub(crate) const TRAINING_EVENT_COUNT: usize = 5;
pub(crate) const TRAINING_EVALUATION_COUNT: usize = 5;
pub(crate) const CULLING_TARGET: usize = 4;
pub(crate) const DEFAULT_MAX_DAYS: u32 = 10;
pub(crate) const DEFAULT_BLOODBATH_DEATHS: usize = 4;
pub(crate) const MAX_BLOODBATH_DEATHS: usize = 24;
pub(crate) const FINALE_CONTESTANTS: usize = 2;

// Reaping ------------------------------------------------------------------
pub(crate) const CAREER_STAT_POINTS: i32 = 38;
pub(crate) const STAT_POINTS: i32 = 30;
pub(crate) const BASE_STAT_WEIGHT: u32 = 3;
pub(crate) const BIAS_STAT_WEIGHT: u32 = 4;
pub(crate) const WEAKNESS_STAT_PENALTY: u32 = 2;
pub(crate) const STAT_SHUFFLES: usize = 2;
pub(crate) const STAT_SHUFFLE_FLOOR: i32 = 2;
pub(crate) const CAREER_SKILL_COUNT: usize = 2;
pub(crate) const BONUS_SKILL_CHANCE: f64 = 0.1;
pub(crate) const FIRST_SKILL_CHANCE: f64 = 0.65;
pub(crate) const CAREER_TRAIT_CHANCE: f64 = 0.25;
pub(crate) const TRAIT_CHANCE: f64 = 0.15;
pub(crate) const DISTRICT_COUNT: u8 = 12;
