//! Shared Postgres handle.
//!
//! The pool is opened once at startup, shared by every service, and closed
//! only when the process shuts down.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;

/// Open-connection cap used when `DB_MAX_OPEN` is zero. sqlx sizes its idle
/// queue from `max_connections` up front, so the cap has to stay finite.
pub const DEFAULT_MAX_OPEN: u32 = 100;

/// Connections above the warm floor are closed after sitting idle this long.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub uri: String,
    /// Zero reuses connections forever.
    pub max_lifetime: Duration,
    /// Zero falls back to [`DEFAULT_MAX_OPEN`].
    pub max_open: u32,
    /// Warm-connection floor, not an idle cap: the pool opens this many
    /// connections eagerly and keeps them. Idle connections above it are
    /// closed after [`IDLE_TIMEOUT`]. Zero keeps none warm.
    pub max_idle: u32,
}

impl From<&Config> for StoreSettings {
    fn from(config: &Config) -> Self {
        Self {
            uri: config.postgres_uri.clone(),
            max_lifetime: config.db_conn_max_lifetime,
            max_open: config.db_max_open,
            max_idle: config.db_max_idle,
        }
    }
}

impl StoreSettings {
    pub fn pool_options(&self) -> PgPoolOptions {
        let max_open = if self.max_open == 0 {
            DEFAULT_MAX_OPEN
        } else {
            self.max_open
        };
        let max_lifetime = if self.max_lifetime.is_zero() {
            None
        } else {
            Some(self.max_lifetime)
        };

        PgPoolOptions::new()
            .max_connections(max_open)
            .min_connections(self.max_idle.min(max_open))
            .max_lifetime(max_lifetime)
            .idle_timeout(IDLE_TIMEOUT)
    }
}

/// Opens the pool and establishes one connection before returning, so an
/// unreachable database fails here rather than on the first request.
pub async fn connect(settings: &StoreSettings) -> Result<PgPool, sqlx::Error> {
    settings.pool_options().connect(&settings.uri).await
}
