use thiserror::Error;

use crate::tribute::TributeId;

/// Failures raised while advancing the arena.
///
/// Any of these aborts the phase in progress; the caller keeps the roster it
/// passed in because every phase works on its own copy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("unknown item key `{0}`")]
    UnknownItem(String),
    #[error("template pool `{0}` has no entries")]
    EmptyPool(&'static str),
    #[error("tribute {0} is not part of the roster")]
    MissingTribute(TributeId),
    #[error("arena `{0}` is not in the catalog")]
    UnknownArena(String),
    #[error("invariant violated: {0}")]
    Invariant(String),
}
