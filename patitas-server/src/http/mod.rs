//! HTTP layer
//!
//! Axum server with:
//! - Bearer-token auth middleware with a public-path allow-list
//! - CORS (localhost only by default)
//! - Request tracing
//! - Static `/uploads` serving
//! - Graceful shutdown
//! - JSON error responses

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::run_server;
