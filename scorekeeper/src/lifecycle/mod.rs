//! Match lifecycle state machine.
//!
//! Status graph:
//!
//! ```text
//! scheduled ──start──▶ live ◀──start── paused
//!     │                 │ └───pause────▶ │
//!     └──────end────────┴──────end───────┴──▶ completed
//! ```
//!
//! `completed` and `cancelled` are terminal. The functions here mutate an
//! in-memory [`Match`](crate::matches::Match) and never persist or notify;
//! that is the match actor's job.

pub mod transitions;

pub use transitions::{advance_period, end, ensure_deletable, pause, score, start, undo};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::sport::{MatchStatus, RuleViolation};

/// Operations on a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchAction {
    Start,
    Pause,
    End,
    Score,
    Undo,
    AdvancePeriod,
    Delete,
}

impl MatchAction {
    /// Stable name used in logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchAction::Start => "start",
            MatchAction::Pause => "pause",
            MatchAction::End => "end",
            MatchAction::Score => "score",
            MatchAction::Undo => "undo",
            MatchAction::AdvancePeriod => "advance_period",
            MatchAction::Delete => "delete",
        }
    }
}

impl fmt::Display for MatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchAction::AdvancePeriod => write!(f, "advance the period of"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Rejected lifecycle operations. All of these are expected, recoverable
/// conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("cannot {action} a {status} match")]
    IllegalTransition {
        action: MatchAction,
        status: MatchStatus,
    },

    #[error("no score events to undo")]
    NoEventToUndo,

    #[error("already in the final period ({periods})")]
    FinalPeriodReached { periods: u32 },

    #[error("only scheduled matches can be deleted, match is {0}")]
    NotDeletable(MatchStatus),

    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

impl LifecycleError {
    /// True for validation failures of the scoring action itself
    pub fn is_validation(&self) -> bool {
        matches!(self, LifecycleError::Rule(_))
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
