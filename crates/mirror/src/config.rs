//! Connection pool settings for the mirror database

use std::time::Duration;

/// Configuration for the mirror connection pool
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    /// Attempts before startup gives up on the database
    pub connect_attempts: u32,
    pub retry_delay: Duration,
    /// Log every statement through sqlx
    pub sqlx_logging: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            connect_attempts: 3,
            retry_delay: Duration::from_secs(2),
            sqlx_logging: false,
        }
    }
}

impl MirrorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_min_connections(mut self, min_connections: u32) -> Self {
        self.min_connections = min_connections;
        self
    }

    pub fn with_connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts;
        self
    }

    pub fn with_sqlx_logging(mut self, enabled: bool) -> Self {
        self.sqlx_logging = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("max_connections must be greater than 0".to_string());
        }
        if self.min_connections > self.max_connections {
            return Err(format!(
                "min_connections ({}) cannot exceed max_connections ({})",
                self.min_connections, self.max_connections
            ));
        }
        if self.connect_attempts == 0 {
            return Err("connect_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}
