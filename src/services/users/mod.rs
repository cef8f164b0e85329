//! Paginated listing of user records, newest first.

pub mod repository;
pub mod sql;

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use serde_json::json;

pub use repository::{PgUserStore, User, UserStore};

use super::{internal_error, json_response, normalize_path, Mount, ServiceRouter};
use crate::error::{ServiceError, StartupError};
use crate::observability::Logger;

#[derive(Clone)]
pub struct UsersConfig {
    pub store: Arc<dyn UserStore>,
    /// Normalized to begin with `/`.
    pub path_prefix: String,
    pub select_limit: u32,
    pub logger: Logger,
}

#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn UserStore>,
    path_prefix: String,
    select_limit: u32,
    logger: Logger,
}

impl UsersService {
    /// Creates the backing table if needed. The service cannot run without
    /// it, so a failure here is a startup error.
    pub async fn new(config: UsersConfig) -> Result<Self, StartupError> {
        config.store.create_table().await.map_err(StartupError::Schema)?;

        let service = Self {
            store: config.store,
            path_prefix: normalize_path(&config.path_prefix),
            select_limit: config.select_limit,
            logger: config.logger,
        };
        service.logger.info(
            "Users table ready",
            Some(&json!({
                "path": service.path_prefix,
                "select_limit": service.select_limit,
            })),
        );
        Ok(service)
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Up to `select_limit` users, newest first, as a JSON array.
    pub async fn get(&self) -> Result<Vec<u8>, ServiceError> {
        let users = self.store.select_many(i64::from(self.select_limit)).await?;
        Ok(serde_json::to_vec(&users)?)
    }
}

impl Mount for UsersService {
    fn mount(&self, router: &mut ServiceRouter) {
        router.route(&self.path_prefix, get(list_users).with_state(self.clone()));
    }
}

async fn list_users(State(service): State<UsersService>) -> Response {
    match service.get().await {
        Ok(body) => json_response(body),
        Err(e) => internal_error(&service.logger, &e),
    }
}
