//! Mapping of domain errors onto HTTP responses.

use axum::{Json, http::StatusCode};
use scorekeeper::db::StorageError;
use scorekeeper::{LifecycleError, MatchError, TournamentError};
use serde::{Deserialize, Serialize};

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn storage_status(e: &StorageError) -> StatusCode {
    match e {
        StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn lifecycle_status(e: &LifecycleError) -> StatusCode {
    if e.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::CONFLICT
    }
}

/// Status and client-safe body for a match error. Server faults are logged
/// with their real cause.
pub fn match_error(e: MatchError) -> ApiError {
    let status = match &e {
        MatchError::NotFound(_) => StatusCode::NOT_FOUND,
        MatchError::Lifecycle(inner) => lifecycle_status(inner),
        MatchError::Storage(inner) => storage_status(inner),
        MatchError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    if status.is_server_error() {
        tracing::error!(error = %e, "Match operation failed");
    }
    error_response(status, e.client_message())
}

pub fn tournament_error(e: TournamentError) -> ApiError {
    let status = match &e {
        TournamentError::NotFound(_) => StatusCode::NOT_FOUND,
        TournamentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        TournamentError::Bracket(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TournamentError::Storage(inner) => storage_status(inner),
    };

    if status.is_server_error() {
        tracing::error!(error = %e, "Tournament operation failed");
    }
    error_response(status, e.client_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorekeeper::lifecycle::MatchAction;
    use scorekeeper::{BracketError, MatchStatus, RuleViolation};

    #[test]
    fn test_rule_violation_is_unprocessable() {
        let (status, _) = match_error(MatchError::Lifecycle(LifecycleError::Rule(
            RuleViolation::MatchNotLive {
                status: MatchStatus::Scheduled,
            },
        )));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_illegal_transition_is_conflict() {
        let (status, Json(body)) = match_error(MatchError::Lifecycle(
            LifecycleError::IllegalTransition {
                action: MatchAction::Pause,
                status: MatchStatus::Completed,
            },
        ));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error, "cannot pause a completed match");

        let (status, _) = match_error(MatchError::Lifecycle(LifecycleError::NoEventToUndo));
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_storage_failure_hides_cause() {
        let (status, Json(body)) =
            match_error(MatchError::Storage(StorageError::Corrupt("bad row".to_string())));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }

    #[test]
    fn test_tournament_errors() {
        let (status, _) = tournament_error(TournamentError::NotFound(4));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = tournament_error(TournamentError::Bracket(BracketError::NotEnoughTeams(1)));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
