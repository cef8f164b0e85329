//! HTTP server with per-connection read and write deadlines.
//!
//! Read deadline: time allowed to receive a request's headers.
//! Write deadline: time allowed to produce the response once the request has
//! been dispatched; expiry answers 408. Both are independent of the
//! request-scoped timeout and a zero value disables them.

use std::future::Future;
use std::time::Duration;

use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::config::Config;
use crate::observability::Logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerTimeouts {
    pub read: Duration,
    pub write: Duration,
}

impl From<&Config> for ServerTimeouts {
    fn from(config: &Config) -> Self {
        Self {
            read: config.server_read_timeout,
            write: config.server_write_timeout,
        }
    }
}

pub fn with_write_deadline(router: Router, write: Duration) -> Router {
    if write.is_zero() {
        router
    } else {
        router.layer(TimeoutLayer::new(write))
    }
}

fn connection_builder(read: Duration) -> http1::Builder {
    let mut builder = http1::Builder::new();
    if !read.is_zero() {
        builder.timer(TokioTimer::new()).header_read_timeout(read);
    }
    builder
}

/// Accepts connections until `shutdown` resolves. Connections already in
/// flight are left to finish on their own tasks.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    timeouts: ServerTimeouts,
    logger: Logger,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let addr = listener.local_addr()?;
    let router = with_write_deadline(router, timeouts.write);
    logger.info(
        "HTTP server listening",
        Some(&json!({
            "address": addr.to_string(),
            "read_timeout_ms": timeouts.read.as_millis() as u64,
            "write_timeout_ms": timeouts.write.as_millis() as u64,
        })),
    );

    tokio::pin!(shutdown);
    loop {
        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    logger.error("Failed to accept connection", Some(&json!({"error": e.to_string()})));
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            },
        };

        let service = TowerToHyperService::new(router.clone());
        let logger = logger.clone();
        let read = timeouts.read;
        tokio::spawn(async move {
            let builder = connection_builder(read);
            if let Err(e) = builder.serve_connection(TokioIo::new(stream), service).await {
                logger.warn(
                    "Connection closed with error",
                    Some(&json!({"peer": peer.to_string(), "error": e.to_string()})),
                );
            }
        });
    }

    logger.info("HTTP server stopped accepting connections", None);
    Ok(())
}
