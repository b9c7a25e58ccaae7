//! Storage error types.

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Stored value could not be mapped back to a model
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// Value does not fit its column
    #[error("{column} value {value} is out of range")]
    OutOfRange { column: &'static str, value: u32 },
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StorageError::NotFound { entity, id }
    }

    /// Get a client-safe error message that doesn't leak database details
    pub fn client_message(&self) -> String {
        match self {
            StorageError::NotFound { entity, .. } => format!("{entity} not found"),
            _ => "Internal server error".to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
