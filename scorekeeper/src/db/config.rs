//! Database configuration.

/// Connection pool settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Default pool settings for `database_url`
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::development()
        }
    }

    /// Local development database
    pub fn development() -> Self {
        Self {
            database_url: "postgres://postgres@localhost/scorekeeper".to_string(),
            max_connections: 20,
            min_connections: 2,
            connection_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }

    /// Check pool bounds
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err("database URL is empty".to_string());
        }
        if self.max_connections == 0 {
            return Err("max connections must be positive".to_string());
        }
        if self.min_connections > self.max_connections {
            return Err(format!(
                "min connections ({}) exceeds max connections ({})",
                self.min_connections, self.max_connections
            ));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}
