//! MySQL pool construction and lifecycle.

use std::str::FromStr;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{ConnectOptions, MySqlPool};
use tracing::info;
use tracing::log::LevelFilter;

use sd_shared::config::database::DatabaseConfig;

use crate::InfrastructureError;

const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(1800);

/// Owns the SQLx MySQL pool the identity repository runs on.
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
}

impl DatabasePool {
    /// Build a pool from configuration. Statements are logged at debug,
    /// slow ones promoted to warn.
    pub async fn new(config: DatabaseConfig) -> Result<Self, InfrastructureError> {
        let options = MySqlConnectOptions::from_str(&config.url)
            .map_err(|e| InfrastructureError::Config(format!("invalid database URL: {e}")))?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_secs(1));

        let pool = MySqlPoolOptions::new()
            .min_connections(1)
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(MAX_CONNECTION_LIFETIME)
            .test_before_acquire(true)
            .connect_with(options)
            .await?;

        info!(
            max_connections = config.max_connections,
            "database pool ready"
        );
        Ok(Self { pool })
    }

    /// Reference to the underlying SQLx pool
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Verify connectivity with a trivial query
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(InfrastructureError::Database)
    }

    /// Drain and close all connections
    pub async fn close(&self) {
        info!("closing database pool");
        self.pool.close().await;
    }
}
