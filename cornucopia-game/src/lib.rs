//! Cornucopia Game Engine
//!
//! Platform-agnostic core logic for the Cornucopia arena survival simulator.
//! This crate runs seeded games from reaping to victor without any UI or
//! platform-specific dependencies.

pub mod actions;
pub mod catalog;
pub mod constants;
pub mod day;
pub mod encounter;
pub mod error;
pub mod evaluation;
pub mod numbers;
pub mod policy;
pub mod reaping;
pub mod report;
pub mod rng;
pub mod roster;
pub mod runner;
pub mod social;
pub mod template;
pub mod tribute;

// Re-export commonly used types
pub use catalog::{
    Arena, Catalog, CatalogError, CatalogSource, DistrictEffect, Item, ItemCatalog, ItemKind,
    Recipe, RosterData, StaticCatalog, Terrain,
};
pub use day::{DayOptions, DayResult, Engine, Stage, initialize_relationships};
pub use encounter::{Clash, EncounterOutcome, resolve_encounter};
pub use error::SimulationError;
pub use evaluation::{Personality, modified_stats, personality, power_score};
pub use policy::{Action, select_action};
pub use reaping::{RosterSet, reap};
pub use report::{DayReport, DeathRecord, EventKind, GameDay, GameEvent, GameSummary, TimelineEntry};
pub use rng::{CountingRng, RandomSource, RngBundle, ScriptedRng};
pub use roster::{AllianceGroup, Roster};
pub use runner::{ArenaChoice, GameRunner, GameSettings, RunState, SettingsError, StartError};
pub use tribute::{Gender, Relationship, RelationshipLevel, Skill, Stat, Stats, Status, Trait, Tribute, TributeId};
