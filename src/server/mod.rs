//! HTTP server for the order API
//!
//! `ServerBuilder` assembles:
//! - Order routes behind the auth middleware
//! - Health check routes
//! - Request tracing and optional CORS

pub mod builder;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
