//! In-memory store for tests and database-less deployments.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::errors::{StorageError, StorageResult};
use super::repository::{MatchRepository, TournamentRepository};
use crate::matches::models::{EventId, Match, MatchId, NewMatch, NewScoreEvent, ScoreEvent};
use crate::sport::SportConfig;
use crate::tournament::models::{
    Group, GroupId, NewGroup, NewTeam, NewTournament, Schedule, SeedUpdate, Team, TeamId,
    Tournament, TournamentId,
};

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    tournaments: BTreeMap<TournamentId, Tournament>,
    teams: BTreeMap<TeamId, Team>,
    groups: BTreeMap<GroupId, Group>,
    matches: BTreeMap<MatchId, Match>,
    events: BTreeMap<EventId, ScoreEvent>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn store_match(&mut self, m: &Match) -> StorageResult<()> {
        match self.matches.get_mut(&m.id) {
            Some(stored) => {
                *stored = m.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("Match", m.id)),
        }
    }
}

/// Store backed by maps behind a single lock. Every operation holds the
/// lock for its whole duration, so multi-step writes are atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn create_tournament(&self, tournament: &NewTournament) -> StorageResult<Tournament> {
        let mut state = self.state.write().await;
        let created = Tournament {
            id: state.next_id(),
            name: tournament.name.clone(),
            format: tournament.format,
            sport: tournament.sport.clone(),
            created_at: Utc::now(),
        };
        state.tournaments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_tournament(&self, id: TournamentId) -> StorageResult<Option<Tournament>> {
        Ok(self.state.read().await.tournaments.get(&id).cloned())
    }

    async fn list_tournaments(&self) -> StorageResult<Vec<Tournament>> {
        Ok(self.state.read().await.tournaments.values().cloned().collect())
    }

    async fn add_team(&self, tournament_id: TournamentId, team: &NewTeam) -> StorageResult<Team> {
        let mut state = self.state.write().await;
        if !state.tournaments.contains_key(&tournament_id) {
            return Err(StorageError::not_found("Tournament", tournament_id));
        }

        let created = Team {
            id: state.next_id(),
            tournament_id,
            name: team.name.clone(),
            short_name: team.short_name.clone(),
            seed: team.seed,
            group_id: None,
        };
        state.teams.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_teams(&self, tournament_id: TournamentId) -> StorageResult<Vec<Team>> {
        Ok(self
            .state
            .read()
            .await
            .teams
            .values()
            .filter(|t| t.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn update_seeds(
        &self,
        tournament_id: TournamentId,
        updates: &[SeedUpdate],
    ) -> StorageResult<Vec<Team>> {
        let mut state = self.state.write().await;
        if let Some(missing) = updates.iter().find(|u| {
            !state
                .teams
                .get(&u.team_id)
                .is_some_and(|t| t.tournament_id == tournament_id)
        }) {
            return Err(StorageError::not_found("Team", missing.team_id));
        }

        for update in updates {
            if let Some(team) = state.teams.get_mut(&update.team_id) {
                team.seed = update.seed;
            }
        }

        Ok(state
            .teams
            .values()
            .filter(|t| t.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn list_groups(&self, tournament_id: TournamentId) -> StorageResult<Vec<Group>> {
        Ok(self
            .state
            .read()
            .await
            .groups
            .values()
            .filter(|g| g.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn replace_schedule(
        &self,
        tournament_id: TournamentId,
        groups: Vec<NewGroup>,
        matches: Vec<NewMatch>,
    ) -> StorageResult<Schedule> {
        let mut state = self.state.write().await;
        if !state.tournaments.contains_key(&tournament_id) {
            return Err(StorageError::not_found("Tournament", tournament_id));
        }

        let old_matches: Vec<MatchId> = state
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .map(|m| m.id)
            .collect();
        state.events.retain(|_, e| !old_matches.contains(&e.match_id));
        state.matches.retain(|_, m| m.tournament_id != tournament_id);
        state.groups.retain(|_, g| g.tournament_id != tournament_id);
        for team in state.teams.values_mut() {
            if team.tournament_id == tournament_id {
                team.group_id = None;
            }
        }

        let mut schedule = Schedule::default();
        for group in groups {
            let stored = Group {
                id: state.next_id(),
                tournament_id,
                name: group.name,
                team_ids: group.team_ids,
            };
            for team_id in &stored.team_ids {
                if let Some(team) = state.teams.get_mut(team_id) {
                    team.group_id = Some(stored.id);
                }
            }
            state.groups.insert(stored.id, stored.clone());
            schedule.groups.push(stored);
        }

        for new_match in matches {
            let group_id = new_match
                .group_index
                .and_then(|i| schedule.groups.get(i))
                .map(|g| g.id);
            let id = state.next_id();
            let stored = new_match.into_match(id, tournament_id, group_id);
            state.matches.insert(stored.id, stored.clone());
            schedule.matches.push(stored);
        }

        Ok(schedule)
    }
}

#[async_trait]
impl MatchRepository for MemoryStore {
    async fn get_match(&self, id: MatchId) -> StorageResult<Option<Match>> {
        Ok(self.state.read().await.matches.get(&id).cloned())
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> StorageResult<Vec<Match>> {
        let state = self.state.read().await;
        let mut matches: Vec<Match> = state
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.match_number, m.id));
        Ok(matches)
    }

    async fn sport_for_match(&self, id: MatchId) -> StorageResult<Option<SportConfig>> {
        let state = self.state.read().await;
        Ok(state
            .matches
            .get(&id)
            .and_then(|m| state.tournaments.get(&m.tournament_id))
            .map(|t| t.sport.clone()))
    }

    async fn update_match(&self, m: &Match) -> StorageResult<()> {
        self.state.write().await.store_match(m)
    }

    async fn record_score(&self, m: &Match, event: NewScoreEvent) -> StorageResult<ScoreEvent> {
        let mut state = self.state.write().await;
        state.store_match(m)?;

        let stored = ScoreEvent {
            id: state.next_id(),
            match_id: event.match_id,
            team_side: event.team_side,
            points: event.points,
            period: event.period,
            action: event.action,
            undone: false,
            created_at: Utc::now(),
        };
        state.events.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn latest_active_event(&self, match_id: MatchId) -> StorageResult<Option<ScoreEvent>> {
        Ok(self
            .state
            .read()
            .await
            .events
            .values()
            .rev()
            .find(|e| e.match_id == match_id && !e.undone)
            .cloned())
    }

    async fn undo_event(&self, m: &Match, event_id: EventId) -> StorageResult<()> {
        let mut state = self.state.write().await;
        if !state.events.contains_key(&event_id) {
            return Err(StorageError::not_found("Score event", event_id));
        }

        state.store_match(m)?;
        if let Some(event) = state.events.get_mut(&event_id) {
            event.undone = true;
        }
        Ok(())
    }

    async fn list_events(&self, match_id: MatchId) -> StorageResult<Vec<ScoreEvent>> {
        Ok(self
            .state
            .read()
            .await
            .events
            .values()
            .filter(|e| e.match_id == match_id)
            .cloned()
            .collect())
    }

    async fn delete_match(&self, id: MatchId) -> StorageResult<()> {
        let mut state = self.state.write().await;
        if state.matches.remove(&id).is_none() {
            return Err(StorageError::not_found("Match", id));
        }
        state.events.retain(|_, e| e.match_id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{Stage, TournamentFormat};
    use crate::sport::{Side, SportKind};

    fn new_match(number: u32, group_index: Option<usize>) -> NewMatch {
        NewMatch {
            home_team_id: None,
            away_team_id: None,
            stage: Stage::Group,
            round: 1,
            match_number: number,
            group_index,
            is_bye: false,
        }
    }

    async fn tournament(store: &MemoryStore) -> Tournament {
        store
            .create_tournament(&NewTournament::with_preset(
                "Cup",
                TournamentFormat::GroupKnockout,
                SportKind::Soccer,
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_team_requires_tournament() {
        let store = MemoryStore::new();
        let err = store.add_team(42, &NewTeam::new("Ghosts")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "Tournament", id: 42 }));
    }

    #[tokio::test]
    async fn test_replace_schedule_swaps_everything() {
        let store = MemoryStore::new();
        let t = tournament(&store).await;
        let a = store.add_team(t.id, &NewTeam::new("A")).await.unwrap();

        let first = store
            .replace_schedule(
                t.id,
                vec![NewGroup {
                    name: "Group A".to_string(),
                    team_ids: vec![a.id],
                }],
                vec![new_match(1, Some(0)), new_match(2, None)],
            )
            .await
            .unwrap();
        let old = &first.matches[0];
        let mut live = old.clone();
        live.status = crate::sport::MatchStatus::Live;
        store
            .record_score(
                &live,
                NewScoreEvent {
                    match_id: old.id,
                    team_side: Side::Home,
                    points: 1,
                    period: 1,
                    action: "Goal".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(old.group_id, Some(first.groups[0].id));
        assert_eq!(
            store.list_teams(t.id).await.unwrap()[0].group_id,
            Some(first.groups[0].id)
        );

        let second = store.replace_schedule(t.id, vec![], vec![new_match(1, None)]).await.unwrap();
        assert_eq!(store.list_matches(t.id).await.unwrap(), second.matches);
        assert!(store.list_groups(t.id).await.unwrap().is_empty());
        assert!(store.list_events(old.id).await.unwrap().is_empty());
        assert_eq!(store.list_teams(t.id).await.unwrap()[0].group_id, None);
    }

    #[tokio::test]
    async fn test_latest_active_event_skips_undone() {
        let store = MemoryStore::new();
        let t = tournament(&store).await;
        let schedule = store.replace_schedule(t.id, vec![], vec![new_match(1, None)]).await.unwrap();
        let m = &schedule.matches[0];

        let mut events = Vec::new();
        for side in [Side::Home, Side::Away] {
            let event = NewScoreEvent {
                match_id: m.id,
                team_side: side,
                points: 1,
                period: 1,
                action: "Goal".to_string(),
            };
            events.push(store.record_score(m, event).await.unwrap());
        }

        assert_eq!(store.latest_active_event(m.id).await.unwrap(), Some(events[1].clone()));
        store.undo_event(m, events[1].id).await.unwrap();
        assert_eq!(store.latest_active_event(m.id).await.unwrap(), Some(events[0].clone()));
        assert_eq!(store.list_events(m.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sport_for_match() {
        let store = MemoryStore::new();
        let t = tournament(&store).await;
        let schedule = store.replace_schedule(t.id, vec![], vec![new_match(1, None)]).await.unwrap();
        assert_eq!(
            store.sport_for_match(schedule.matches[0].id).await.unwrap(),
            Some(SportConfig::soccer())
        );
        assert_eq!(store.sport_for_match(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_match() {
        let store = MemoryStore::new();
        let t = tournament(&store).await;
        let schedule = store.replace_schedule(t.id, vec![], vec![new_match(1, None)]).await.unwrap();
        let id = schedule.matches[0].id;
        store.delete_match(id).await.unwrap();
        assert_eq!(store.get_match(id).await.unwrap(), None);
        assert!(store.delete_match(id).await.is_err());
    }
}
