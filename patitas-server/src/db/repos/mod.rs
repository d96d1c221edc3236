//! Repository implementations for database access
//!
//! Each repository follows the same shape: a thin struct borrowing the pool,
//! `RETURNING` on writes, JOINs on reads that need related rows, and unique
//! violations mapped to `DbError::Conflict` instead of check-then-insert.

pub mod pets;
pub mod postings;
pub mod sightings;
pub mod users;

pub use pets::{NewPet, Pet, PetRepo};
pub use postings::{NewPosting, Posting, PostingRepo};
pub use sightings::{Location, NewLocation, NewSighting, Sighting, SightingRepo, POINTS_PER_SIGHTING};
pub use users::{Badge, NewUser, User, UserChanges, UserRepo};

/// Database error type shared by all repositories
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Whether a sqlx error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
