//! Day reports, events and the end-of-game summary.

use serde::{Deserialize, Serialize};

use crate::tribute::TributeId;

/// Category of a narrated event, used by callers to filter and color the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Death,
    Combat,
    Alliance,
    Betrayal,
    Item,
    Neutral,
    Arena,
    Negative,
    Crafting,
    Positive,
    Trap,
}

impl EventKind {
    /// Events that change the course of the game rather than color it.
    #[must_use]
    pub const fn is_major(self) -> bool {
        matches!(
            self,
            Self::Death | Self::Combat | Self::Alliance | Self::Betrayal | Self::Arena | Self::Trap
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub text: String,
    pub kind: EventKind,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub tribute_id: TributeId,
    pub tribute_name: String,
    pub cause: String,
}

/// What one phase produced, before the caller assigns its day marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    pub summary: String,
    pub events: Vec<GameEvent>,
    pub deaths: Vec<DeathRecord>,
}

impl DayReport {
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            events: Vec::new(),
            deaths: Vec::new(),
        }
    }

    pub fn push(&mut self, kind: EventKind, text: impl Into<String>, timestamp: &str) {
        self.events.push(GameEvent {
            text: text.into(),
            kind,
            timestamp: timestamp.to_string(),
        });
    }

    /// Tag the report with its position in the run.
    #[must_use]
    pub fn into_day(self, day: f64) -> GameDay {
        GameDay {
            day,
            summary: self.summary,
            events: self.events,
            deaths: self.deaths,
        }
    }
}

/// One published entry of the game log.
///
/// `day` is 0 for training, `n - 0.5` for a culling before day `n`, `n + 0.5`
/// for a finale after day `n`, and a whole number otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDay {
    pub day: f64,
    pub summary: String,
    pub events: Vec<GameEvent>,
    pub deaths: Vec<DeathRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub day: f64,
    pub tribute_id: TributeId,
    pub tribute_name: String,
    pub cause: String,
}

/// Final standings of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub winner: Option<TributeId>,
    /// Winner first, then surviving tributes by kills, then the fallen from last to first death.
    pub placements: Vec<TributeId>,
    pub timeline: Vec<TimelineEntry>,
    pub log: Vec<GameDay>,
}

impl GameSummary {
    /// Flatten the deaths of every logged day, in log order.
    #[must_use]
    pub fn timeline_from(log: &[GameDay]) -> Vec<TimelineEntry> {
        log.iter()
            .flat_map(|day| {
                day.deaths.iter().map(move |death| TimelineEntry {
                    day: day.day,
                    tribute_id: death.tribute_id,
                    tribute_name: death.tribute_name.clone(),
                    cause: death.cause.clone(),
                })
            })
            .collect()
    }
}
