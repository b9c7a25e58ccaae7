//! Storage for tournaments, schedules and match scoring.
//!
//! The kernel talks to storage only through [`TournamentRepository`] and
//! [`MatchRepository`]. Two implementations ship: [`MemoryStore`] for tests
//! and single-process use, and [`PgStore`] on top of a [`Database`] pool.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod errors;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use config::DatabaseConfig;
pub use errors::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{MatchRepository, Store, TournamentRepository};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect a pool using `config`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use scorekeeper::db::{Database, DatabaseConfig, PgStore};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let db = Database::new(&DatabaseConfig::with_url("postgres://localhost/scores")).await?;
    ///     db.migrate().await?;
    ///     let store = PgStore::new(db.pool().clone());
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        log::info!(
            "Connected to database (pool {}..{})",
            config.min_connections,
            config.max_connections
        );

        Ok(Self { pool })
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
