pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{ConfigError, ServiceError, StartupError};
pub use observability::Logger;
