//! Liveness endpoint answering with a fixed JSON string.

use axum::extract::State;
use axum::response::Response;
use axum::routing::get;

use super::{internal_error, json_response, normalize_path, Mount, ServiceRouter};
use crate::error::ServiceError;
use crate::observability::Logger;

#[derive(Debug, Clone)]
pub struct PingConfig {
    pub path: String,
    pub response: String,
    pub logger: Logger,
}

#[derive(Debug, Clone)]
pub struct PingService {
    path: String,
    response: String,
    logger: Logger,
}

impl PingService {
    pub fn new(config: PingConfig) -> Self {
        Self {
            path: normalize_path(&config.path),
            response: config.response,
            logger: config.logger,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The configured response text as a JSON string, quotes included.
    pub fn encode(&self) -> Result<Vec<u8>, ServiceError> {
        Ok(serde_json::to_vec(&self.response)?)
    }
}

impl Mount for PingService {
    fn mount(&self, router: &mut ServiceRouter) {
        router.route(&self.path, get(ping).with_state(self.clone()));
    }
}

async fn ping(State(service): State<PingService>) -> Response {
    match service.encode() {
        Ok(body) => json_response(body),
        Err(e) => internal_error(&service.logger, &e),
    }
}
