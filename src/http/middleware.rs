//! Request-scoped timeout.
//!
//! Each request runs under a deadline. When it passes, the handler future is
//! dropped, which also cancels any store call it is awaiting, and the client
//! receives a bare 500.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::json;

use crate::observability::Logger;

#[derive(Debug, Clone)]
pub struct RequestTimeout {
    limit: Duration,
    logger: Logger,
}

impl RequestTimeout {
    /// A zero `limit` disables the timeout.
    pub fn new(limit: Duration, logger: Logger) -> Self {
        Self { limit, logger }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn wrap(self, router: Router) -> Router {
        router.layer(middleware::from_fn_with_state(self, enforce_request_timeout))
    }
}

pub async fn enforce_request_timeout(
    State(timeout): State<RequestTimeout>,
    request: Request,
    next: Next,
) -> Response {
    if timeout.limit.is_zero() {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match tokio::time::timeout(timeout.limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            timeout.logger.error(
                "Request timed out",
                Some(&json!({
                    "error_code": "REQUEST_TIMEOUT",
                    "method": method.as_str(),
                    "path": path,
                    "timeout_ms": timeout.limit.as_millis() as u64,
                })),
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
