//! Connection pool, migrations and liveness.

use std::time::{Duration, Instant};

use shopfeed_core::AppConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::DbError;

pub(crate) const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub(crate) const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub(crate) const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Resolves to <workspace-root>/migrations/ from this crate's manifest.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    /// Pool sizing from the app config. A minimum above the maximum is
    /// lowered to the maximum, and a zero maximum becomes one.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let max_connections = config.db_max_connections.max(1);
        if config.db_min_connections > max_connections {
            tracing::warn!(
                min = config.db_min_connections,
                max = max_connections,
                "db min connections exceeds max; clamping"
            );
        }
        Self {
            max_connections,
            min_connections: config.db_min_connections.min(max_connections),
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

/// Opens a Postgres pool sized by `config`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if no connection can be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await?;
    tracing::debug!(
        max = config.max_connections,
        min = config.min_connections,
        "database pool connected"
    );
    Ok(pool)
}

/// Applies pending migrations and returns how many ran.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DbError> {
    let before = applied_count(pool).await;
    MIGRATOR.run(pool).await?;
    let applied = applied_count(pool).await.saturating_sub(before);
    tracing::info!(
        applied,
        known = MIGRATOR.iter().count(),
        "database migrations up to date"
    );
    Ok(applied)
}

// Missing bookkeeping table on a fresh database counts as zero.
async fn applied_count(pool: &PgPool) -> usize {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
        .ok()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

/// Round-trips `SELECT 1` and returns how long it took.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn health_check(pool: &PgPool) -> Result<Duration, DbError> {
    let started = Instant::now();
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(started.elapsed())
}
