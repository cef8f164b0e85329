//! Services that register their handlers on a shared router.

pub mod ping;
pub mod users;

use std::collections::BTreeMap;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::Router;
use serde_json::json;

use crate::error::{ServiceError, StartupError};
use crate::observability::Logger;

/// A component that registers its HTTP handlers onto the shared router.
pub trait Mount: Send + Sync {
    fn mount(&self, router: &mut ServiceRouter);
}

/// Path table the services mount onto.
///
/// Registering a path that is already present replaces the earlier handler,
/// so a service mounted later shadows one mounted before it.
#[derive(Default)]
pub struct ServiceRouter {
    routes: BTreeMap<String, MethodRouter>,
}

impl ServiceRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&mut self, path: &str, handler: MethodRouter) -> &mut Self {
        self.routes.insert(path.to_string(), handler);
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Unregistered paths fall through to axum's default 404.
    ///
    /// Every path is matched literally, so one that axum would read as a
    /// capture or wildcard is rejected instead of registered.
    pub fn into_router(self) -> Result<Router, StartupError> {
        let mut router = Router::new();
        for (path, handler) in self.routes {
            check_literal_path(&path)?;
            router = router.route(&path, handler);
        }
        Ok(router)
    }
}

fn check_literal_path(path: &str) -> Result<(), StartupError> {
    let reason = if !path.starts_with('/') {
        "must start with '/'"
    } else if path.contains([':', '*']) {
        "':' and '*' are reserved for captures"
    } else {
        return Ok(());
    };
    Err(StartupError::Route {
        path: path.to_string(),
        reason,
    })
}

/// Lexically cleans `path` and roots it at `/`: `users` and `/users/` both
/// become `/users`, empty and `..` segments are resolved.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

pub fn json_response(body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Logs the failure and answers with a bare 500. The error text never
/// reaches the client.
pub fn internal_error(logger: &Logger, err: &ServiceError) -> Response {
    logger.error(
        "Request failed",
        Some(&json!({
            "error_code": err.code(),
            "error": err.to_string(),
        })),
    );
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
