//! Match operation errors.

use thiserror::Error;

use super::models::MatchId;
use crate::db::StorageError;
use crate::lifecycle::LifecycleError;

/// Errors returned by match operations
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match not found: {0}")]
    NotFound(MatchId),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The match actor went away before answering
    #[error("Match {0} is unavailable")]
    Unavailable(MatchId),
}

impl MatchError {
    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            MatchError::NotFound(_) => "Match not found".to_string(),
            MatchError::Storage(e) => e.client_message(),
            MatchError::Unavailable(_) => "Match is temporarily unavailable".to_string(),
            MatchError::Lifecycle(e) => e.to_string(),
        }
    }
}

/// Result type for match operations
pub type MatchResult<T> = Result<T, MatchError>;
