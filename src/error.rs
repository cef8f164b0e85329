use thiserror::Error;

/// A configuration value that was present but unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

impl ConfigError {
    pub fn invalid(var: &'static str, value: &str, expected: &'static str) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            expected,
        }
    }
}

/// Failures that abort the process before it serves a single request.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("database unreachable: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("failed to create users table: {0}")]
    Schema(#[source] sqlx::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
    #[error("invalid route {path:?}: {reason}")]
    Route { path: String, reason: &'static str },
}

/// Per-request failures. These are logged and surfaced to the caller as a bare 500.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("store query failed: {0}")]
    Store(#[from] sqlx::Error),
    #[error("response encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Store(_) => "DB_QUERY_ERROR",
            ServiceError::Encode(_) => "ENCODE_ERROR",
        }
    }
}
