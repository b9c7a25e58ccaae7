//! Match API handlers.
//!
//! Every write is forwarded to the match's actor through the
//! [`MatchManager`](scorekeeper::MatchManager), which stores the change and
//! notifies subscribers before the handler answers.
//!
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/matches/12/score \
//!   -H "x-admin-password: $ADMIN_PASSWORD" \
//!   -H "Content-Type: application/json" \
//!   -d '{"side": "home", "points": 3}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use scorekeeper::lifecycle::MatchAction;
use scorekeeper::matches::{MatchId, MatchResult, ScoreRecorded};
use scorekeeper::sport::{AvailableAction, Side};
use scorekeeper::{Match, ScoreEvent};
use serde::Deserialize;

use super::AppState;
use super::errors::{ApiResult, match_error};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub side: Side,
    pub points: u32,
}

/// Count and log the outcome of a match write, then map errors
fn finish<T>(action: MatchAction, id: MatchId, result: MatchResult<T>) -> ApiResult<T> {
    match result {
        Ok(value) => {
            metrics::match_transitions_total(action.as_str());
            logging::log_admin_action(action.as_str(), "match", id, None);
            Ok(value)
        }
        Err(e) => {
            metrics::match_rejections_total(action.as_str());
            tracing::debug!(match_id = id, action = action.as_str(), "Rejected: {}", e);
            Err(match_error(e))
        }
    }
}

/// `GET /api/v1/matches/{id}`
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    let m = state.matches.get(id).await.map_err(match_error)?;
    Ok(Json(m))
}

/// `GET /api/v1/matches/{id}/events`, oldest first, undone events included
pub async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<Json<Vec<ScoreEvent>>> {
    let events = state.matches.events(id).await.map_err(match_error)?;
    Ok(Json(events))
}

/// `GET /api/v1/matches/{id}/actions`
pub async fn available_actions(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<Json<Vec<AvailableAction>>> {
    let actions = state
        .matches
        .available_actions(id)
        .await
        .map_err(match_error)?;
    Ok(Json(actions))
}

/// `POST /api/v1/matches/{id}/start`
pub async fn start_match(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    let result = state.matches.start(id).await;
    finish(MatchAction::Start, id, result).map(Json)
}

/// `POST /api/v1/matches/{id}/pause`
pub async fn pause_match(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    let result = state.matches.pause(id).await;
    finish(MatchAction::Pause, id, result).map(Json)
}

/// `POST /api/v1/matches/{id}/end`
pub async fn end_match(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    let result = state.matches.end(id).await;
    finish(MatchAction::End, id, result).map(Json)
}

/// `POST /api/v1/matches/{id}/score`
pub async fn score(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
    Json(req): Json<ScoreRequest>,
) -> ApiResult<Json<ScoreRecorded>> {
    let result = state.matches.score(id, req.side, req.points).await;
    let recorded = finish(MatchAction::Score, id, result)?;

    metrics::score_events_total(req.side.as_str(), req.points);
    Ok(Json(recorded))
}

/// `POST /api/v1/matches/{id}/undo`
pub async fn undo(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    let result = state.matches.undo(id).await;
    finish(MatchAction::Undo, id, result).map(Json)
}

/// `POST /api/v1/matches/{id}/next-period`
pub async fn next_period(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    let result = state.matches.advance_period(id).await;
    finish(MatchAction::AdvancePeriod, id, result).map(Json)
}

/// `DELETE /api/v1/matches/{id}`, scheduled matches only
pub async fn delete_match(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<StatusCode> {
    let result = state.matches.delete(id).await;
    finish(MatchAction::Delete, id, result)?;
    Ok(StatusCode::NO_CONTENT)
}
