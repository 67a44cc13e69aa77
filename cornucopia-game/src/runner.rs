//! Run orchestration: settings, the step loop and the final summary.
//!
//! The runner alone decides which phase comes next from the living count and
//! the day counter. Each step is atomic: its roster and log entries are
//! published only if every phase in the step succeeded.

use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use twox_hash::XxHash64;

use crate::catalog::{Arena, Catalog};
use crate::constants::{
    CULLING_TARGET, DEFAULT_BLOODBATH_DEATHS, DEFAULT_MAX_DAYS, FINALE_CONTESTANTS,
    MAX_BLOODBATH_DEATHS,
};
use crate::day::{DayOptions, Engine, initialize_relationships};
use crate::error::SimulationError;
use crate::numbers::usize_to_u64;
use crate::reaping::{RosterSet, reap};
use crate::report::{GameDay, GameSummary};
use crate::rng::{RandomSource, RngBundle};
use crate::tribute::{Tribute, TributeId};

pub const UNSTABLE_MESSAGE: &str =
    "A critical simulation error occurred. The arena might be unstable.";

/// Arena selection for a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaChoice {
    Named(String),
    #[default]
    Random,
}

/// Everything needed to start a reproducible run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default)]
    pub arena: ArenaChoice,
    #[serde(default)]
    pub roster: RosterSet,
    #[serde(default = "GameSettings::default_max_days")]
    pub max_days: u32,
    #[serde(default = "GameSettings::default_bloodbath_deaths")]
    pub bloodbath_deaths: usize,
    #[serde(default)]
    pub seed: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            arena: ArenaChoice::Random,
            roster: RosterSet::Book,
            max_days: Self::default_max_days(),
            bloodbath_deaths: Self::default_bloodbath_deaths(),
            seed: 0,
        }
    }
}

impl GameSettings {
    #[must_use]
    pub const fn default_max_days() -> u32 {
        DEFAULT_MAX_DAYS
    }

    #[must_use]
    pub const fn default_bloodbath_deaths() -> usize {
        DEFAULT_BLOODBATH_DEATHS
    }

    /// Parse settings from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(SettingsError::Parse)
    }

    /// Check the settings against their bounds and the catalog.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` when a field is out of range or names an unknown arena.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), SettingsError> {
        if self.max_days < 1 {
            return Err(SettingsError::MinViolation {
                field: "max_days",
                min: 1,
                value: u64::from(self.max_days),
            });
        }
        if self.bloodbath_deaths > MAX_BLOODBATH_DEATHS {
            return Err(SettingsError::RangeViolation {
                field: "bloodbath_deaths",
                min: 0,
                max: usize_to_u64(MAX_BLOODBATH_DEATHS),
                value: usize_to_u64(self.bloodbath_deaths),
            });
        }
        if let ArenaChoice::Named(name) = &self.arena
            && catalog.arena(name).is_none()
        {
            return Err(SettingsError::UnknownArena(name.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },
    #[error("arena `{0}` is not in the catalog")]
    UnknownArena(String),
}

/// Why a run could not start.
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("setup failed: {0}")]
    Setup(#[from] SimulationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Finished,
    /// Terminal: a phase failed; the last published roster and log stand.
    Unstable(String),
}

impl RunState {
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Drives one game from reaping to a winner.
#[derive(Debug)]
pub struct GameRunner<'a> {
    engine: Engine<'a>,
    arena: &'a Arena,
    settings: GameSettings,
    rng: RngBundle,
    tributes: Vec<Tribute>,
    log: Vec<GameDay>,
    day: u32,
    state: RunState,
}

impl<'a> GameRunner<'a> {
    /// Validate settings, reap the roster, seed relationships, apply arena
    /// effects and run training, which is logged as day 0.
    ///
    /// # Errors
    ///
    /// Returns [`StartError`] for invalid settings or a failed setup phase.
    pub fn new(catalog: &'a Catalog, settings: GameSettings) -> Result<Self, StartError> {
        settings.validate(catalog)?;
        let rng = RngBundle::from_user_seed(settings.seed);
        let arena = match &settings.arena {
            ArenaChoice::Named(name) => catalog
                .arena(name)
                .ok_or_else(|| SettingsError::UnknownArena(name.clone()))?,
            ArenaChoice::Random => rng
                .reaping()
                .pick(&catalog.arenas)
                .ok_or_else(|| SimulationError::UnknownArena("random".to_string()))?,
        };
        let engine = Engine::new(catalog);

        let mut tributes = reap(settings.roster, &catalog.rosters, &mut *rng.reaping())?;
        initialize_relationships(&mut tributes);
        for tribute in &mut tributes {
            let touched = arena.apply_effects(tribute);
            if !touched.is_empty() {
                log::trace!("{} adjusted {:?} for {}", arena.name, touched, tribute.name);
            }
        }
        let training = engine.run_training_phase(&tributes, &mut *rng.training())?;
        log::debug!(
            "run seeded {} in {} with {} tributes",
            settings.seed,
            arena.name,
            training.tributes.len()
        );

        Ok(Self {
            engine,
            arena,
            settings,
            rng,
            tributes: training.tributes,
            log: vec![training.report.into_day(0.0)],
            day: 0,
            state: RunState::Running,
        })
    }

    #[must_use]
    pub const fn arena(&self) -> &'a Arena {
        self.arena
    }

    #[must_use]
    pub const fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[must_use]
    pub fn tributes(&self) -> &[Tribute] {
        &self.tributes
    }

    #[must_use]
    pub fn log(&self) -> &[GameDay] {
        &self.log
    }

    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    #[must_use]
    pub const fn state(&self) -> &RunState {
        &self.state
    }

    /// Total draws across every random stream so far.
    #[must_use]
    pub fn draws(&self) -> u64 {
        self.rng.total_draws()
    }

    fn living_count(tributes: &[Tribute]) -> usize {
        tributes.iter().filter(|t| t.is_alive()).count()
    }

    /// Advance by one step: a day, possibly preceded by a culling and
    /// followed by a finale, or one of the terminal phases.
    pub fn step(&mut self) -> &RunState {
        if !self.state.is_running() {
            return &self.state;
        }
        match self.advance() {
            Ok(Step::Continue) => {}
            Ok(Step::Finished) => {
                log::debug!("run finished after day {}", self.day);
                self.state = RunState::Finished;
            }
            Err(error) => {
                log::warn!("run unstable on day {}: {error}", self.day + 1);
                self.state = RunState::Unstable(UNSTABLE_MESSAGE.to_string());
            }
        }
        &self.state
    }

    fn advance(&mut self) -> Result<Step, SimulationError> {
        let alive = Self::living_count(&self.tributes);
        if alive <= 1 {
            return Ok(Step::Finished);
        }
        if alive == FINALE_CONTESTANTS {
            let finale = self
                .engine
                .run_finale(&self.tributes, self.arena, &mut *self.rng.arena())?;
            self.tributes = finale.tributes;
            self.log.push(finale.report.into_day(f64::from(self.day + 1)));
            return Ok(Step::Finished);
        }

        let day = self.day + 1;
        if day > self.settings.max_days {
            let sudden = self
                .engine
                .run_sudden_death(&self.tributes, self.arena, &mut *self.rng.arena())?;
            self.tributes = sudden.tributes;
            self.log.push(sudden.report.into_day(f64::from(day)));
            self.day = day;
            return Ok(Step::Finished);
        }

        let mut staged = Vec::new();
        let mut working = self.tributes.clone();
        if day == self.settings.max_days && alive > CULLING_TARGET {
            let culling = self
                .engine
                .run_culling(&working, CULLING_TARGET, &mut *self.rng.arena())?;
            working = culling.tributes;
            staged.push(culling.report.into_day(f64::from(day) - 0.5));
        }

        let options = DayOptions {
            bloodbath_deaths: self.settings.bloodbath_deaths,
        };
        let normal = self.engine.run_normal_day(
            &working,
            day,
            self.arena,
            options,
            &mut *self.rng.arena(),
        )?;
        working = normal.tributes;
        staged.push(normal.report.into_day(f64::from(day)));

        let mut outcome = Step::Continue;
        match Self::living_count(&working) {
            FINALE_CONTESTANTS => {
                let finale =
                    self.engine
                        .run_finale(&working, self.arena, &mut *self.rng.arena())?;
                working = finale.tributes;
                staged.push(finale.report.into_day(f64::from(day) + 0.5));
                outcome = Step::Finished;
            }
            0 | 1 => outcome = Step::Finished,
            _ => {}
        }

        self.tributes = working;
        self.log.extend(staged);
        self.day = day;
        Ok(outcome)
    }

    /// Step until the run is no longer running.
    pub fn run_to_completion(&mut self) -> &RunState {
        while self.state.is_running() {
            self.step();
        }
        &self.state
    }

    /// Standings and log of the run so far.
    #[must_use]
    pub fn summary(&self) -> GameSummary {
        let survivors: Vec<&Tribute> = self.tributes.iter().filter(|t| t.is_alive()).collect();
        let winner = match survivors.as_slice() {
            [only] => Some(only.id),
            _ => None,
        };
        let timeline = GameSummary::timeline_from(&self.log);

        let mut ranked = survivors;
        ranked.sort_by(|a, b| b.kills.cmp(&a.kills));
        let mut placements: Vec<TributeId> = ranked.iter().map(|t| t.id).collect();
        placements.extend(timeline.iter().rev().map(|entry| entry.tribute_id));

        GameSummary {
            winner,
            placements,
            timeline,
            log: self.log.clone(),
        }
    }

    /// Stable digest of the summary, for reproducibility checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary cannot be serialized.
    pub fn fingerprint(&self) -> Result<u64, serde_json::Error> {
        let bytes = serde_json::to_vec(&self.summary())?;
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&bytes);
        Ok(hasher.finish())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Finished,
}
