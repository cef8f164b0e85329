//! Wiring: configuration -> store -> services -> router -> middleware.

use std::sync::Arc;

use axum::Router;
use serde_json::json;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::StartupError;
use crate::http::RequestTimeout;
use crate::observability::Logger;
use crate::services::ping::{PingConfig, PingService};
use crate::services::users::{PgUserStore, UserStore, UsersConfig, UsersService};
use crate::services::{Mount, ServiceRouter};
use crate::store::{self, StoreSettings};

/// Mounts `services` in order and wraps the result in the request timeout.
/// A later service shadows an earlier one registered at the same path.
pub fn compose(
    services: &[Box<dyn Mount>],
    request_timeout: RequestTimeout,
) -> Result<Router, StartupError> {
    let mut router = ServiceRouter::new();
    for service in services {
        service.mount(&mut router);
    }
    Ok(request_timeout.wrap(router.into_router()?))
}

/// The ping and users services, each given its slice of the configuration.
pub async fn build_services(
    config: &Config,
    users_store: Arc<dyn UserStore>,
    logger: &Logger,
) -> Result<Vec<Box<dyn Mount>>, StartupError> {
    let ping = PingService::new(PingConfig {
        path: config.ping_path.clone(),
        response: config.ping_response.clone(),
        logger: logger.scoped("ping"),
    });

    let users = UsersService::new(UsersConfig {
        store: users_store,
        path_prefix: config.users_path_prefix.clone(),
        select_limit: config.users_select_limit,
        logger: logger.scoped("users"),
    })
    .await?;

    let services: Vec<Box<dyn Mount>> = vec![Box::new(ping), Box::new(users)];
    Ok(services)
}

pub async fn build_app(
    config: &Config,
    users_store: Arc<dyn UserStore>,
    logger: &Logger,
) -> Result<Router, StartupError> {
    let services = build_services(config, users_store, logger).await?;
    let request_timeout = RequestTimeout::new(config.req_timeout, logger.scoped("http"));
    compose(&services, request_timeout)
}

/// Connects to Postgres and builds the router on top of it. The returned
/// pool is for the caller to close at shutdown.
pub async fn bootstrap(config: &Config, logger: &Logger) -> Result<(Router, PgPool), StartupError> {
    let settings = StoreSettings::from(config);
    let pool = store::connect(&settings).await.map_err(StartupError::Connect)?;
    logger.info(
        "Connected to database",
        Some(&json!({
            "uri": settings.uri,
            "max_open": settings.max_open,
            "max_idle": settings.max_idle,
            "max_lifetime_ms": settings.max_lifetime.as_millis() as u64,
        })),
    );

    let users_store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let router = build_app(config, users_store, logger).await?;
    Ok((router, pool))
}
