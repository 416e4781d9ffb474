//! Database configuration and environment variable handling.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default upper bound on open connections in the pool.
pub const DEFAULT_MAX_POOL_SIZE: u32 = 32;
/// Default interval between two readiness probes at startup.
pub const DEFAULT_READY_POLL_MS: u64 = 100;
/// Default time allowed for the database to become reachable at startup.
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 5000;
/// Default directory holding the ordered migration folders.
pub const DEFAULT_MIGRATIONS_DIR: &str = "./migrations";

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Time to wait for a pooled connection, in seconds
    pub connection_timeout_sec: u64,
    /// Interval between readiness probes, in milliseconds
    pub ready_poll_ms: u64,
    /// Total readiness window, in milliseconds
    pub ready_timeout_ms: u64,
    /// Directory of migrations applied at startup
    pub migrations_dir: PathBuf,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            connection_timeout_sec: 30,
            ready_poll_ms: DEFAULT_READY_POLL_MS,
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL`: Connection string (required)
    /// - `PG_POOL_MAX`: Maximum pool size (default: 32)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection checkout timeout in seconds (default: 30)
    /// - `PG_READY_POLL_MS`: Readiness probe interval (default: 100)
    /// - `PG_READY_TIMEOUT_MS`: Readiness window (default: 5000)
    /// - `MIGRATIONS_DIR`: Migration directory (default: `./migrations`)
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "DATABASE_URL environment variable not set".to_string())?;

        let defaults = Self::default();

        Ok(Self {
            database_url,
            max_pool_size: parse_var("PG_POOL_MAX", defaults.max_pool_size)?,
            connection_timeout_sec: parse_var(
                "PG_CONN_TIMEOUT_SEC",
                defaults.connection_timeout_sec,
            )?,
            ready_poll_ms: parse_var("PG_READY_POLL_MS", defaults.ready_poll_ms)?,
            ready_timeout_ms: parse_var("PG_READY_TIMEOUT_MS", defaults.ready_timeout_ms)?,
            migrations_dir: env::var("MIGRATIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.migrations_dir),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }

    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| format!("{} must be a valid number, got '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}
