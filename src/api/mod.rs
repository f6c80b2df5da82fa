//! # HTTP API
//!
//! The orchestrator posts secret requests to `/` with a shared bearer
//! secret. `/healthz` is an unauthenticated liveness probe.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use middleware::SharedSecret;
pub use routes::{build_router, ApiState};
pub use server::start_api_server;
