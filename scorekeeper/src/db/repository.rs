//! Repository traits over tournament and match storage.

use async_trait::async_trait;

use super::errors::StorageResult;
use crate::matches::models::{EventId, Match, MatchId, NewMatch, NewScoreEvent, ScoreEvent};
use crate::sport::SportConfig;
use crate::tournament::models::{
    Group, NewGroup, NewTeam, NewTournament, Schedule, SeedUpdate, Team, Tournament,
    TournamentId,
};

/// Tournament, team and schedule storage
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    async fn create_tournament(&self, tournament: &NewTournament) -> StorageResult<Tournament>;

    async fn get_tournament(&self, id: TournamentId) -> StorageResult<Option<Tournament>>;

    async fn list_tournaments(&self) -> StorageResult<Vec<Tournament>>;

    /// Register a team; fails with `NotFound` for an unknown tournament
    async fn add_team(&self, tournament_id: TournamentId, team: &NewTeam) -> StorageResult<Team>;

    async fn list_teams(&self, tournament_id: TournamentId) -> StorageResult<Vec<Team>>;

    /// Apply every seed change or none of them. A team outside the
    /// tournament fails with `NotFound`. Returns the tournament's teams.
    async fn update_seeds(
        &self,
        tournament_id: TournamentId,
        updates: &[SeedUpdate],
    ) -> StorageResult<Vec<Team>>;

    async fn list_groups(&self, tournament_id: TournamentId) -> StorageResult<Vec<Group>>;

    /// Atomically drop the tournament's groups, matches and score events and
    /// store the new ones. `NewMatch::group_index` points into `groups`.
    /// Team group assignments are rewritten to match.
    async fn replace_schedule(
        &self,
        tournament_id: TournamentId,
        groups: Vec<NewGroup>,
        matches: Vec<NewMatch>,
    ) -> StorageResult<Schedule>;
}

/// Match and score event storage
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn get_match(&self, id: MatchId) -> StorageResult<Option<Match>>;

    /// Matches in schedule order
    async fn list_matches(&self, tournament_id: TournamentId) -> StorageResult<Vec<Match>>;

    /// Sport rules of the tournament the match belongs to
    async fn sport_for_match(&self, id: MatchId) -> StorageResult<Option<SportConfig>>;

    /// Persist status, scores, periods, winner and timestamps
    async fn update_match(&self, m: &Match) -> StorageResult<()>;

    /// Append a score event and persist `m` in one transaction
    async fn record_score(&self, m: &Match, event: NewScoreEvent) -> StorageResult<ScoreEvent>;

    /// Most recent event of the match that has not been undone
    async fn latest_active_event(&self, match_id: MatchId) -> StorageResult<Option<ScoreEvent>>;

    /// Flag `event_id` undone and persist `m` in one transaction
    async fn undo_event(&self, m: &Match, event_id: EventId) -> StorageResult<()>;

    /// Full event log, oldest first
    async fn list_events(&self, match_id: MatchId) -> StorageResult<Vec<ScoreEvent>>;

    async fn delete_match(&self, id: MatchId) -> StorageResult<()>;
}

/// Everything the kernel needs from storage
pub trait Store: TournamentRepository + MatchRepository {}

impl<T: TournamentRepository + MatchRepository> Store for T {}
