//! PostgreSQL pool setup and embedded migrations

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::error::DatabaseError;

pub type DatabasePool = PgPool;

/// Pool sizing and connection lifetimes
///
/// ```rust
/// use std::time::Duration;
/// use infra_db::DatabaseConfig;
///
/// let config = DatabaseConfig::new("postgres://localhost/ownership_claims")
///     .with_pool_size(2, 20)
///     .with_acquire_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_connections, 20);
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// Upper bound on waiting for a free connection
    pub acquire_timeout: Duration,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            min_connections: 1,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(15),
            max_lifetime: Duration::from_secs(1800),
            idle_timeout: Duration::from_secs(600),
        }
    }

    /// Sets both bounds; `min` is clamped so it never exceeds `max`
    pub fn with_pool_size(mut self, min: u32, max: u32) -> Self {
        self.max_connections = max.max(1);
        self.min_connections = min.min(self.max_connections);
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .max_lifetime(self.max_lifetime)
            .idle_timeout(self.idle_timeout)
    }
}

/// Opens the pool and waits for the first connection.
pub async fn create_pool(config: DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let pool = config
        .pool_options()
        .connect(&config.url)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!(
        min_connections = config.min_connections,
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );
    Ok(pool)
}

pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Schema migrations up to date");
    Ok(())
}

/// Cheapest possible round trip, for readiness probes
pub async fn ping(pool: &DatabasePool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size_clamps_min_to_max() {
        let config = DatabaseConfig::new("postgres://test/claims").with_pool_size(30, 8);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 8);
    }

    #[test]
    fn test_zero_max_is_raised_to_one() {
        let config = DatabaseConfig::new("postgres://test/claims").with_pool_size(0, 0);

        assert_eq!(config.max_connections, 1);
        assert_eq!(config.min_connections, 0);
    }

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::new("postgres://test/claims");

        assert_eq!(config.url, "postgres://test/claims");
        assert!(config.min_connections <= config.max_connections);
        assert_eq!(config.acquire_timeout, Duration::from_secs(15));
    }
}
