//! Tournament service: registration and schedule generation.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{
    GroupId, NewGroup, NewTeam, NewTournament, Schedule, SeedUpdate, Team, Tournament,
    TournamentId, sort_by_seed,
};
use super::standings::{Standing, standings};
use crate::bracket::{self, BracketError, BracketOptions, TournamentFormat};
use crate::db::{StorageError, Store};
use crate::matches::models::{Match, NewMatch};
use crate::tournament::models::Group;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Bracket(#[from] BracketError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TournamentError {
    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::NotFound(_) => "Tournament not found".to_string(),
            TournamentError::Storage(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

pub type TournamentResult<T> = Result<T, TournamentError>;

/// League table of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStandings {
    pub group_id: GroupId,
    pub name: String,
    pub table: Vec<Standing>,
}

/// Map a generated bracket onto concrete teams. `teams` must already be in
/// seed order.
pub fn plan_schedule<R: Rng + ?Sized>(
    format: TournamentFormat,
    teams: &[Team],
    options: &BracketOptions,
    rng: &mut R,
) -> Result<(Vec<NewGroup>, Vec<NewMatch>), BracketError> {
    let bracket = bracket::generate_with_rng(format, teams.len(), options, rng)?;
    let team_id = |index: usize| teams[index].id;

    let groups = bracket
        .groups
        .into_iter()
        .map(|g| NewGroup {
            name: g.name,
            team_ids: g.teams.into_iter().map(team_id).collect(),
        })
        .collect();

    let matches = bracket
        .matches
        .into_iter()
        .map(|m| NewMatch {
            home_team_id: m.home.map(team_id),
            away_team_id: m.away.map(team_id),
            stage: m.stage,
            round: m.round,
            match_number: m.match_number,
            group_index: m.group,
            is_bye: m.is_bye,
        })
        .collect();

    Ok((groups, matches))
}

/// Tournament operations on top of a [`Store`]
#[derive(Clone)]
pub struct TournamentService {
    store: Arc<dyn Store>,
}

impl TournamentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, tournament: &NewTournament) -> TournamentResult<Tournament> {
        if tournament.name.trim().is_empty() {
            return Err(TournamentError::InvalidRequest(
                "tournament name is empty".to_string(),
            ));
        }
        tournament
            .sport
            .validate()
            .map_err(TournamentError::InvalidRequest)?;

        let created = self.store.create_tournament(tournament).await?;
        log::info!(
            "Created tournament {} '{}' ({}, {})",
            created.id,
            created.name,
            created.format,
            created.sport.kind
        );
        Ok(created)
    }

    pub async fn get(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.store
            .get_tournament(id)
            .await?
            .ok_or(TournamentError::NotFound(id))
    }

    pub async fn list(&self) -> TournamentResult<Vec<Tournament>> {
        Ok(self.store.list_tournaments().await?)
    }

    pub async fn add_team(&self, id: TournamentId, team: &NewTeam) -> TournamentResult<Team> {
        if team.name.trim().is_empty() {
            return Err(TournamentError::InvalidRequest("team name is empty".to_string()));
        }

        self.get(id).await?;
        Ok(self.store.add_team(id, team).await?)
    }

    pub async fn teams(&self, id: TournamentId) -> TournamentResult<Vec<Team>> {
        self.get(id).await?;
        Ok(self.store.list_teams(id).await?)
    }

    /// Change several seeds at once. Takes effect at the next schedule
    /// generation; existing matches are not touched.
    pub async fn update_seeds(
        &self,
        id: TournamentId,
        updates: &[SeedUpdate],
    ) -> TournamentResult<Vec<Team>> {
        let mut team_ids: Vec<_> = updates.iter().map(|u| u.team_id).collect();
        team_ids.sort_unstable();
        if team_ids.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(TournamentError::InvalidRequest(
                "a team appears more than once".to_string(),
            ));
        }

        self.get(id).await?;
        let teams = self.store.update_seeds(id, updates).await?;
        log::info!("Updated {} seeds in tournament {}", updates.len(), id);
        Ok(teams)
    }

    pub async fn groups(&self, id: TournamentId) -> TournamentResult<Vec<Group>> {
        self.get(id).await?;
        Ok(self.store.list_groups(id).await?)
    }

    pub async fn matches(&self, id: TournamentId) -> TournamentResult<Vec<Match>> {
        self.get(id).await?;
        Ok(self.store.list_matches(id).await?)
    }

    /// Generate (or regenerate) the schedule, replacing all existing groups,
    /// matches and score events of the tournament in one step. Seeds are read
    /// here and nowhere else.
    pub async fn generate_schedule(
        &self,
        id: TournamentId,
        options: &BracketOptions,
    ) -> TournamentResult<Schedule> {
        let tournament = self.get(id).await?;
        let mut teams = self.store.list_teams(id).await?;
        sort_by_seed(&mut teams);

        let (groups, matches) =
            plan_schedule(tournament.format, &teams, options, &mut rand::rng())?;
        let schedule = self.store.replace_schedule(id, groups, matches).await?;

        log::info!(
            "Generated {} schedule for tournament {}: {} teams, {} groups, {} matches",
            tournament.format,
            id,
            teams.len(),
            schedule.groups.len(),
            schedule.matches.len()
        );
        Ok(schedule)
    }

    /// League tables for every group, from completed group matches
    pub async fn standings(&self, id: TournamentId) -> TournamentResult<Vec<GroupStandings>> {
        let groups = self.groups(id).await?;
        let matches = self.store.list_matches(id).await?;

        Ok(groups
            .into_iter()
            .map(|group| {
                let played: Vec<Match> = matches
                    .iter()
                    .filter(|m| m.group_id == Some(group.id))
                    .cloned()
                    .collect();
                GroupStandings {
                    group_id: group.id,
                    table: standings(&group.team_ids, &played),
                    name: group.name,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::sport::SportKind;
    use rand::{SeedableRng, rngs::StdRng};

    fn service() -> TournamentService {
        TournamentService::new(Arc::new(MemoryStore::new()))
    }

    async fn with_teams(
        service: &TournamentService,
        format: TournamentFormat,
        seeds: &[Option<i32>],
    ) -> Tournament {
        let t = service
            .create(&NewTournament::with_preset("Cup", format, SportKind::Basketball))
            .await
            .unwrap();
        for (i, seed) in seeds.iter().enumerate() {
            let team = NewTeam {
                name: format!("Team {i}"),
                short_name: None,
                seed: *seed,
            };
            service.add_team(t.id, &team).await.unwrap();
        }
        t
    }

    #[tokio::test]
    async fn test_generation_uses_seed_order() {
        let service = service();
        let t = with_teams(
            &service,
            TournamentFormat::SingleElimination,
            &[None, Some(2), Some(1), Some(4)],
        )
        .await;
        let teams = service.teams(t.id).await.unwrap();

        let schedule = service
            .generate_schedule(t.id, &BracketOptions::default())
            .await
            .unwrap();

        // seed order is [seed 1, seed 2, seed 4, unseeded]; 1 plays the last
        let first = &schedule.matches[0];
        assert_eq!(first.home_team_id, Some(teams[2].id));
        assert_eq!(first.away_team_id, Some(teams[0].id));
        assert_eq!(schedule.matches.len(), 3);
    }

    #[tokio::test]
    async fn test_seed_edits_apply_to_next_generation_only() {
        let service = service();
        let t = with_teams(
            &service,
            TournamentFormat::SingleElimination,
            &[Some(1), Some(2), Some(3), Some(4)],
        )
        .await;
        let teams = service.teams(t.id).await.unwrap();

        let before = service
            .generate_schedule(t.id, &BracketOptions::default())
            .await
            .unwrap();
        assert_eq!(before.matches[0].home_team_id, Some(teams[0].id));
        assert_eq!(before.matches[0].away_team_id, Some(teams[3].id));

        // Swap the top and bottom seeds
        let updates = [
            SeedUpdate {
                team_id: teams[0].id,
                seed: Some(4),
            },
            SeedUpdate {
                team_id: teams[3].id,
                seed: Some(1),
            },
        ];
        let updated = service.update_seeds(t.id, &updates).await.unwrap();
        assert_eq!(updated[0].seed, Some(4));
        assert_eq!(updated[3].seed, Some(1));

        assert_eq!(service.matches(t.id).await.unwrap(), before.matches);

        let after = service
            .generate_schedule(t.id, &BracketOptions::default())
            .await
            .unwrap();
        assert_eq!(after.matches[0].home_team_id, Some(teams[3].id));
        assert_eq!(after.matches[0].away_team_id, Some(teams[0].id));
    }

    #[tokio::test]
    async fn test_seed_edits_are_all_or_nothing() {
        let service = service();
        let t = with_teams(&service, TournamentFormat::RoundRobin, &[Some(1), Some(2)]).await;
        let other = with_teams(&service, TournamentFormat::RoundRobin, &[Some(1)]).await;
        let teams = service.teams(t.id).await.unwrap();
        let foreign = service.teams(other.id).await.unwrap()[0].id;

        let updates = [
            SeedUpdate {
                team_id: teams[0].id,
                seed: None,
            },
            SeedUpdate {
                team_id: foreign,
                seed: Some(9),
            },
        ];
        assert!(matches!(
            service.update_seeds(t.id, &updates).await,
            Err(TournamentError::Storage(StorageError::NotFound { entity: "Team", .. }))
        ));
        assert_eq!(service.teams(t.id).await.unwrap(), teams);

        let duplicate = [updates[0], updates[0]];
        assert!(matches!(
            service.update_seeds(t.id, &duplicate).await,
            Err(TournamentError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_tournament() {
        let service = service();
        assert!(matches!(
            service.generate_schedule(9, &BracketOptions::default()).await,
            Err(TournamentError::NotFound(9))
        ));
        assert!(matches!(
            service.add_team(9, &NewTeam::new("A")).await,
            Err(TournamentError::NotFound(9))
        ));
    }

    #[tokio::test]
    async fn test_not_enough_teams() {
        let service = service();
        let t = with_teams(&service, TournamentFormat::RoundRobin, &[Some(1)]).await;
        assert!(matches!(
            service.generate_schedule(t.id, &BracketOptions::default()).await,
            Err(TournamentError::Bracket(BracketError::NotEnoughTeams(1)))
        ));
    }

    #[tokio::test]
    async fn test_group_stage_assigns_groups() {
        let service = service();
        let seeds: Vec<Option<i32>> = (1..=8).map(Some).collect();
        let t = with_teams(&service, TournamentFormat::GroupKnockout, &seeds).await;

        let schedule = service
            .generate_schedule(t.id, &BracketOptions::default())
            .await
            .unwrap();
        assert_eq!(schedule.groups.len(), 2);
        assert_eq!(schedule.matches.len(), 15);

        let teams = service.teams(t.id).await.unwrap();
        assert!(teams.iter().all(|team| team.group_id.is_some()));
        assert_ne!(teams[0].group_id, teams[1].group_id);

        let tables = service.standings(t.id).await.unwrap();
        assert_eq!(tables.len(), 2);
        assert!(tables.iter().all(|g| g.table.len() == 4));
    }

    #[tokio::test]
    async fn test_rejects_empty_names() {
        let service = service();
        let bad = NewTournament::with_preset(" ", TournamentFormat::RoundRobin, SportKind::Soccer);
        assert!(matches!(
            service.create(&bad).await,
            Err(TournamentError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_plan_schedule_maps_indices_to_ids() {
        let teams: Vec<Team> = (0..4)
            .map(|i| Team {
                id: 100 + i,
                tournament_id: 1,
                name: format!("T{i}"),
                short_name: None,
                seed: Some(i as i32),
                group_id: None,
            })
            .collect();
        let (groups, matches) = plan_schedule(
            TournamentFormat::RoundRobin,
            &teams,
            &BracketOptions::default(),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();

        assert!(groups.is_empty());
        assert_eq!(matches.len(), 6);
        assert!(matches.iter().all(|m| {
            m.home_team_id.is_some_and(|id| (100..104).contains(&id))
                && m.away_team_id.is_some_and(|id| (100..104).contains(&id))
        }));
    }
}
