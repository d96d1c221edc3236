//! Status enums for pets, postings, and user roles.
//!
//! Stored as TEXT in the database; wire values are the snake_case strings
//! returned by `as_str`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a status string doesn't match any variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} value: '{value}'")]
pub struct StatusParseError {
    pub field: &'static str,
    pub value: String,
}

/// Lifecycle state of a pet record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetStatus {
    /// Owner reported their own pet missing
    LostByOwner,
    /// Third party found an unknown pet wandering
    FoundStray,
    /// Back with its owner
    Reunited,
    /// Adopted into a home
    Adopted,
}

impl PetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LostByOwner => "lost_by_owner",
            Self::FoundStray => "found_stray",
            Self::Reunited => "reunited",
            Self::Adopted => "adopted",
        }
    }

    /// Whether the pet is still missing (either lost flavor).
    pub fn is_lost(&self) -> bool {
        matches!(self, Self::LostByOwner | Self::FoundStray)
    }
}

impl FromStr for PetStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lost_by_owner" => Ok(Self::LostByOwner),
            "found_stray" => Ok(Self::FoundStray),
            "reunited" => Ok(Self::Reunited),
            "adopted" => Ok(Self::Adopted),
            other => Err(StatusParseError {
                field: "pet status",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    Active,
    Resolved,
    Cancelled,
}

impl PostingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for PostingStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "resolved" => Ok(Self::Resolved),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(StatusParseError {
                field: "posting status",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(StatusParseError {
                field: "role",
                value: other.to_owned(),
            }),
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_status_round_trip() {
        for s in ["lost_by_owner", "found_stray", "reunited", "adopted"] {
            let parsed: PetStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn pet_status_rejects_unknown() {
        let err = "missing".parse::<PetStatus>().unwrap_err();
        assert_eq!(err.value, "missing");
    }

    #[test]
    fn lost_states() {
        assert!(PetStatus::LostByOwner.is_lost());
        assert!(PetStatus::FoundStray.is_lost());
        assert!(!PetStatus::Reunited.is_lost());
        assert!(!PetStatus::Adopted.is_lost());
    }

    #[test]
    fn posting_status_round_trip() {
        for s in ["active", "resolved", "cancelled"] {
            let parsed: PostingStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn serde_wire_values() {
        let json = serde_json::to_string(&PetStatus::LostByOwner).unwrap();
        assert_eq!(json, "\"lost_by_owner\"");
        let back: PetStatus = serde_json::from_str("\"adopted\"").unwrap();
        assert_eq!(back, PetStatus::Adopted);
    }

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }
}
