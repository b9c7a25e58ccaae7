//! Messages pushed to realtime subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matches::models::{Match, MatchId, ScoreEvent};
use crate::sport::MatchStatus;
use crate::tournament::models::{TeamId, TournamentId};

/// Wire format of a realtime update. Serialized as JSON with a snake_case
/// `type` tag and camelCase fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum RealtimeMessage {
    /// Full score snapshot, sent after an undo
    MatchUpdate {
        match_id: MatchId,
        home_score: u32,
        away_score: u32,
        home_period_scores: Vec<u32>,
        away_period_scores: Vec<u32>,
        current_period: u32,
        status: MatchStatus,
    },
    ScoreEvent {
        match_id: MatchId,
        event: ScoreEvent,
        home_score: u32,
        away_score: u32,
        home_period_scores: Vec<u32>,
        away_period_scores: Vec<u32>,
    },
    MatchStarted {
        match_id: MatchId,
        started_at: Option<DateTime<Utc>>,
    },
    MatchPaused {
        match_id: MatchId,
        status: MatchStatus,
    },
    MatchEnded {
        match_id: MatchId,
        winner_id: Option<TeamId>,
        home_score: u32,
        away_score: u32,
        ended_at: Option<DateTime<Utc>>,
    },
    PeriodChanged {
        match_id: MatchId,
        current_period: u32,
        home_period_scores: Vec<u32>,
        away_period_scores: Vec<u32>,
    },
    MatchDeleted {
        match_id: MatchId,
    },
    /// Tournament-room summary of any match change
    TournamentMatchUpdate {
        tournament_id: TournamentId,
        match_id: MatchId,
        home_score: u32,
        away_score: u32,
        home_period_scores: Vec<u32>,
        away_period_scores: Vec<u32>,
        current_period: u32,
        status: MatchStatus,
    },
}

impl RealtimeMessage {
    pub fn match_update(m: &Match) -> Self {
        RealtimeMessage::MatchUpdate {
            match_id: m.id,
            home_score: m.home_score,
            away_score: m.away_score,
            home_period_scores: m.home_period_scores.clone(),
            away_period_scores: m.away_period_scores.clone(),
            current_period: m.current_period,
            status: m.status,
        }
    }

    pub fn score_event(m: &Match, event: ScoreEvent) -> Self {
        RealtimeMessage::ScoreEvent {
            match_id: m.id,
            event,
            home_score: m.home_score,
            away_score: m.away_score,
            home_period_scores: m.home_period_scores.clone(),
            away_period_scores: m.away_period_scores.clone(),
        }
    }

    pub fn match_started(m: &Match) -> Self {
        RealtimeMessage::MatchStarted {
            match_id: m.id,
            started_at: m.started_at,
        }
    }

    pub fn match_paused(m: &Match) -> Self {
        RealtimeMessage::MatchPaused {
            match_id: m.id,
            status: m.status,
        }
    }

    pub fn match_ended(m: &Match) -> Self {
        RealtimeMessage::MatchEnded {
            match_id: m.id,
            winner_id: m.winner_id,
            home_score: m.home_score,
            away_score: m.away_score,
            ended_at: m.ended_at,
        }
    }

    pub fn period_changed(m: &Match) -> Self {
        RealtimeMessage::PeriodChanged {
            match_id: m.id,
            current_period: m.current_period,
            home_period_scores: m.home_period_scores.clone(),
            away_period_scores: m.away_period_scores.clone(),
        }
    }

    pub fn tournament_match_update(m: &Match) -> Self {
        RealtimeMessage::TournamentMatchUpdate {
            tournament_id: m.tournament_id,
            match_id: m.id,
            home_score: m.home_score,
            away_score: m.away_score,
            home_period_scores: m.home_period_scores.clone(),
            away_period_scores: m.away_period_scores.clone(),
            current_period: m.current_period,
            status: m.status,
        }
    }

    /// Value of the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            RealtimeMessage::MatchUpdate { .. } => "match_update",
            RealtimeMessage::ScoreEvent { .. } => "score_event",
            RealtimeMessage::MatchStarted { .. } => "match_started",
            RealtimeMessage::MatchPaused { .. } => "match_paused",
            RealtimeMessage::MatchEnded { .. } => "match_ended",
            RealtimeMessage::PeriodChanged { .. } => "period_changed",
            RealtimeMessage::MatchDeleted { .. } => "match_deleted",
            RealtimeMessage::TournamentMatchUpdate { .. } => "tournament_match_update",
        }
    }
}

/// A match-scoped event together with the ids needed to route it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub event: RealtimeMessage,
    /// Match after the change; `None` once the match is gone
    pub snapshot: Option<Match>,
}

impl Notification {
    /// Event about `m` in its current state
    pub fn for_match(m: &Match, event: RealtimeMessage) -> Self {
        Self {
            tournament_id: m.tournament_id,
            match_id: m.id,
            event,
            snapshot: Some(m.clone()),
        }
    }

    pub fn deleted(tournament_id: TournamentId, match_id: MatchId) -> Self {
        Self {
            tournament_id,
            match_id,
            event: RealtimeMessage::MatchDeleted { match_id },
            snapshot: None,
        }
    }

    /// What the tournament room receives for this event
    pub fn tournament_event(&self) -> RealtimeMessage {
        match &self.snapshot {
            Some(m) => RealtimeMessage::tournament_match_update(m),
            None => self.event.clone(),
        }
    }
}
