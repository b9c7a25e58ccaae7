//! Match and score event models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bracket::Stage;
use crate::sport::{MatchState, MatchStatus, Side};
use crate::tournament::models::{GroupId, TeamId, TournamentId};

/// Match ID type
pub type MatchId = i64;

/// Score event ID type
pub type EventId = i64;

/// A scheduled or played match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// `None` while the team is still to be decided
    pub home_team_id: Option<TeamId>,
    pub away_team_id: Option<TeamId>,
    pub home_score: u32,
    pub away_score: u32,
    /// Index 0 is period 1
    pub home_period_scores: Vec<u32>,
    pub away_period_scores: Vec<u32>,
    pub current_period: u32,
    pub stage: Stage,
    pub round: u32,
    pub match_number: u32,
    pub group_id: Option<GroupId>,
    pub status: MatchStatus,
    pub winner_id: Option<TeamId>,
    pub is_bye: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Scoring view of this match
    pub fn state(&self) -> MatchState {
        MatchState {
            home_score: self.home_score,
            away_score: self.away_score,
            home_period_scores: self.home_period_scores.clone(),
            away_period_scores: self.away_period_scores.clone(),
            current_period: self.current_period,
            status: self.status,
        }
    }

    /// Copy scores, periods and status back from a scoring view
    pub fn set_state(&mut self, state: MatchState) {
        self.home_score = state.home_score;
        self.away_score = state.away_score;
        self.home_period_scores = state.home_period_scores;
        self.away_period_scores = state.away_period_scores;
        self.current_period = state.current_period;
        self.status = state.status;
    }

    /// Team playing on `side`
    pub fn team(&self, side: Side) -> Option<TeamId> {
        match side {
            Side::Home => self.home_team_id,
            Side::Away => self.away_team_id,
        }
    }
}

/// Entry of the append-only score log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEvent {
    pub id: EventId,
    pub match_id: MatchId,
    pub team_side: Side,
    pub points: u32,
    /// Period the points were scored in
    pub period: u32,
    /// Free-text label ("Three pointer")
    pub action: String,
    pub undone: bool,
    pub created_at: DateTime<Utc>,
}

/// Score event before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScoreEvent {
    pub match_id: MatchId,
    pub team_side: Side,
    pub points: u32,
    pub period: u32,
    pub action: String,
}

/// Match row produced by schedule generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub home_team_id: Option<TeamId>,
    pub away_team_id: Option<TeamId>,
    pub stage: Stage,
    pub round: u32,
    pub match_number: u32,
    /// Index into the groups created alongside this match
    pub group_index: Option<usize>,
    pub is_bye: bool,
}

impl NewMatch {
    /// Materialize with storage-assigned ids
    pub fn into_match(
        self,
        id: MatchId,
        tournament_id: TournamentId,
        group_id: Option<GroupId>,
    ) -> Match {
        Match {
            id,
            tournament_id,
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            home_score: 0,
            away_score: 0,
            home_period_scores: vec![0],
            away_period_scores: vec![0],
            current_period: 1,
            stage: self.stage,
            round: self.round,
            match_number: self.match_number,
            group_id,
            status: MatchStatus::Scheduled,
            winner_id: None,
            is_bye: self.is_bye,
            started_at: None,
            ended_at: None,
        }
    }
}
