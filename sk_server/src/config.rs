//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use argon2::password_hash::PasswordHash;
use scorekeeper::db::DatabaseConfig;
use scorekeeper::matches::ActorConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Where tournaments and matches are kept
    pub storage: StorageBackend,
    /// Database configuration, used when `storage` is Postgres
    pub database: DatabaseConfig,
    /// Argon2 PHC string of the admin password
    pub admin_password_hash: String,
    /// Per-match actor tuning
    pub actors: ActorConfig,
    /// Prometheus listener, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Storage selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Values that may come from the command line instead of the environment
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub memory: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?.unwrap_or(SocketAddr::from(([127, 0, 0, 1], 6969))),
        };

        let storage = if overrides.memory
            || std::env::var("STORAGE").is_ok_and(|v| v.eq_ignore_ascii_case("memory"))
        {
            StorageBackend::Memory
        } else {
            StorageBackend::Postgres
        };

        let database_url = overrides
            .database_url
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| DatabaseConfig::development().database_url);

        let database = DatabaseConfig {
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", 2),
            connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT_SECS", 5),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", 300),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", 1800),
        };

        let admin_password_hash =
            std::env::var("ADMIN_PASSWORD_HASH").map_err(|_| ConfigError::MissingRequired {
                var: "ADMIN_PASSWORD_HASH".to_string(),
                hint: "Generate with: sk_server --hash-password <PASSWORD>".to_string(),
            })?;

        let actors = ActorConfig {
            idle_timeout: Duration::from_secs(parse_env_or("MATCH_ACTOR_IDLE_SECS", 300)),
            inbox_capacity: parse_env_or("MATCH_ACTOR_INBOX", 64),
        };

        let config = ServerConfig {
            bind,
            storage,
            database,
            admin_password_hash: admin_password_hash.trim().to_string(),
            actors,
            metrics_bind: parse_env("METRICS_BIND")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        PasswordHash::new(&self.admin_password_hash).map_err(|e| ConfigError::Invalid {
            var: "ADMIN_PASSWORD_HASH".to_string(),
            reason: format!("Must be an Argon2 PHC string ({e})"),
        })?;

        if self.actors.idle_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "MATCH_ACTOR_IDLE_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.actors.inbox_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "MATCH_ACTOR_INBOX".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.storage == StorageBackend::Postgres {
            self.database
                .validate()
                .map_err(|reason| ConfigError::Invalid {
                    var: "DATABASE_URL".to_string(),
                    reason,
                })?;
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Optional variable that must parse when present
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(None),
    }
}
