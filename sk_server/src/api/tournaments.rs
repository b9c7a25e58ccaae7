//! Tournament API handlers.
//!
//! Reads are public; creating tournaments, registering teams and generating
//! schedules require the admin password.
//!
//! # Examples
//!
//! Create a basketball round robin:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments \
//!   -H "x-admin-password: $ADMIN_PASSWORD" \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "City League", "format": "round_robin", "sport": "basketball"}'
//! ```
//!
//! Generate the schedule:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments/1/generate \
//!   -H "x-admin-password: $ADMIN_PASSWORD" \
//!   -H "Content-Type: application/json" \
//!   -d '{"useSeeding": true}'
//! ```

use std::time::Instant;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use scorekeeper::bracket::{BracketOptions, TournamentFormat};
use scorekeeper::sport::{SportConfig, SportKind};
use scorekeeper::tournament::{
    Group, GroupStandings, NewTeam, NewTournament, Schedule, SeedUpdate, Team, Tournament,
    TournamentId,
};
use scorekeeper::Match;
use serde::Deserialize;

use super::AppState;
use super::errors::{ApiResult, tournament_error};
use super::request_id::RequestId;
use crate::{logging, metrics};

/// Sport of a new tournament: a preset name or a full rule set
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SportSelection {
    Preset(SportKind),
    Custom(SportConfig),
}

impl From<SportSelection> for SportConfig {
    fn from(selection: SportSelection) -> Self {
        match selection {
            SportSelection::Preset(kind) => SportConfig::preset(kind),
            SportSelection::Custom(config) => config,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
    pub format: TournamentFormat,
    pub sport: SportSelection,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSeedsRequest {
    pub seeds: Vec<SeedUpdate>,
}

/// Schedule generation options; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateRequest {
    pub use_seeding: Option<bool>,
    pub group_count: Option<usize>,
    pub advancing_per_group: Option<usize>,
    pub third_place_match: Option<bool>,
}

impl From<GenerateRequest> for BracketOptions {
    fn from(req: GenerateRequest) -> Self {
        let defaults = BracketOptions::default();
        BracketOptions {
            use_seeding: req.use_seeding.unwrap_or(defaults.use_seeding),
            group_count: req.group_count.unwrap_or(defaults.group_count),
            advancing_per_group: req
                .advancing_per_group
                .unwrap_or(defaults.advancing_per_group),
            third_place_match: req.third_place_match.unwrap_or(defaults.third_place_match),
        }
    }
}

/// `POST /api/v1/tournaments`
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(req): Json<CreateTournamentRequest>,
) -> ApiResult<(StatusCode, Json<Tournament>)> {
    let new = NewTournament {
        name: req.name,
        format: req.format,
        sport: req.sport.into(),
    };

    let tournament = state
        .tournaments
        .create(&new)
        .await
        .map_err(tournament_error)?;

    logging::log_admin_action(
        "create",
        "tournament",
        tournament.id,
        Some(tournament.name.as_str()),
    );
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// `GET /api/v1/tournaments`
pub async fn list_tournaments(State(state): State<AppState>) -> ApiResult<Json<Vec<Tournament>>> {
    let tournaments = state.tournaments.list().await.map_err(tournament_error)?;
    Ok(Json(tournaments))
}

/// `GET /api/v1/tournaments/{id}`
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
) -> ApiResult<Json<Tournament>> {
    let tournament = state.tournaments.get(id).await.map_err(tournament_error)?;
    Ok(Json(tournament))
}

/// `POST /api/v1/tournaments/{id}/teams`
pub async fn add_team(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
    Json(team): Json<NewTeam>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    let team = state
        .tournaments
        .add_team(id, &team)
        .await
        .map_err(tournament_error)?;

    logging::log_admin_action("register", "team", team.id, Some(team.name.as_str()));
    Ok((StatusCode::CREATED, Json(team)))
}

/// `GET /api/v1/tournaments/{id}/teams`
pub async fn list_teams(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Team>>> {
    let teams = state.tournaments.teams(id).await.map_err(tournament_error)?;
    Ok(Json(teams))
}

/// `PUT /api/v1/tournaments/{id}/teams/seeds`
///
/// Applies all seed changes or none. Existing matches keep their pairings
/// until the schedule is generated again.
pub async fn update_seeds(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
    Json(req): Json<UpdateSeedsRequest>,
) -> ApiResult<Json<Vec<Team>>> {
    let teams = state
        .tournaments
        .update_seeds(id, &req.seeds)
        .await
        .map_err(tournament_error)?;

    logging::log_admin_action(
        "reseed",
        "tournament",
        id,
        Some(format!("{} teams", req.seeds.len()).as_str()),
    );
    Ok(Json(teams))
}

/// `GET /api/v1/tournaments/{id}/groups`
pub async fn list_groups(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Group>>> {
    let groups = state.tournaments.groups(id).await.map_err(tournament_error)?;
    Ok(Json(groups))
}

/// `POST /api/v1/tournaments/{id}/generate`
///
/// Replaces any existing groups, matches and score events.
pub async fn generate_schedule(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
    request_id: RequestId,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<Json<Schedule>> {
    let options = BracketOptions::from(req);
    let started = Instant::now();

    let schedule = state
        .tournaments
        .generate_schedule(id, &options)
        .await
        .map_err(tournament_error)?;

    // Actors of replaced matches reload from storage; drop the ones that stopped
    state.matches.prune().await;

    let elapsed = started.elapsed().as_millis() as u64;
    logging::log_performance("generate_schedule", elapsed, Some(request_id.as_str()));
    logging::log_admin_action(
        "generate",
        "tournament",
        id,
        Some(format!("{} matches", schedule.matches.len()).as_str()),
    );

    if let Ok(tournament) = state.tournaments.get(id).await {
        metrics::schedule_generations_total(tournament.format.as_str(), schedule.matches.len());
    }

    Ok(Json(schedule))
}

/// `GET /api/v1/tournaments/{id}/matches`
pub async fn list_matches(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Match>>> {
    let matches = state.tournaments.matches(id).await.map_err(tournament_error)?;
    Ok(Json(matches))
}

/// `GET /api/v1/tournaments/{id}/standings`
pub async fn standings(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
) -> ApiResult<Json<Vec<GroupStandings>>> {
    let tables = state
        .tournaments
        .standings(id)
        .await
        .map_err(tournament_error)?;
    Ok(Json(tables))
}
