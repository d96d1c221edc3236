//! patitas-server: HTTP backend for reporting and tracking lost & found pets
//!
//! Layering follows controller → repository → Postgres:
//! - [`http`] — axum routes, bearer-token middleware, error mapping
//! - [`db`] — connection pool, startup migrations, repositories
//! - [`models`] — validated field newtypes shared by the handlers
//! - [`uploads`] — local-disk image store served under `/uploads`

pub mod db;
pub mod http;
pub mod models;
pub mod state;
pub mod uploads;

pub use http::{run_server, ApiError};
pub use state::AppState;
