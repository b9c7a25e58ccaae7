//! Match actor message types.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::errors::MatchResult;
use super::models::{Match, ScoreEvent};
use crate::sport::{MatchOutcome, Side};

/// Messages that can be sent to a `MatchActor`
#[derive(Debug)]
pub enum MatchCommand {
    Start {
        response: oneshot::Sender<MatchResult<Match>>,
    },

    Pause {
        response: oneshot::Sender<MatchResult<Match>>,
    },

    End {
        response: oneshot::Sender<MatchResult<Match>>,
    },

    Score {
        side: Side,
        points: u32,
        response: oneshot::Sender<MatchResult<ScoreRecorded>>,
    },

    /// Reverse the most recent non-undone score event
    Undo {
        response: oneshot::Sender<MatchResult<Match>>,
    },

    AdvancePeriod {
        response: oneshot::Sender<MatchResult<Match>>,
    },

    /// Delete a scheduled match; the actor stops afterwards
    Delete {
        response: oneshot::Sender<MatchResult<()>>,
    },
}

/// Result of a successful score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecorded {
    #[serde(rename = "match")]
    pub snapshot: Match,
    pub event: ScoreEvent,
    /// The sport says the current period is decided
    pub period_ended: bool,
    /// Advisory only; the match is ended explicitly
    pub outcome: MatchOutcome,
}
