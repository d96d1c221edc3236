//! Database layer - connection pool, migrations, and repositories
//!
//! Conventions:
//! - One connection pool shared through `AppState`
//! - Repositories borrow the pool; no per-repo state
//! - Rely on DB constraints, map conflicts - no check-then-insert races
//! - Transactions for multi-step writes

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::create_pool;
pub use repos::*;
