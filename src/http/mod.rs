pub mod middleware;
pub mod server;

pub use middleware::RequestTimeout;
pub use server::{serve, ServerTimeouts};
