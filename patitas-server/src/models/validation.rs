//! Validation error types

use std::fmt;

/// Validation error for domain fields
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Field is shorter than the required minimum
    TooShort { field: &'static str, min: usize },

    /// String doesn't match required format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Invalid enum variant
    InvalidVariant { field: &'static str, value: String },

    /// Numeric value outside its allowed range
    OutOfRange { field: &'static str, reason: &'static str },

    /// Required field missing from the request
    Missing { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::TooShort { field, min } => {
                write!(f, "{} must be longer than {} characters", field, min)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
            Self::OutOfRange { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::Missing { field } => write!(f, "{} is required", field),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<patitas_core::StatusParseError> for ValidationError {
    fn from(e: patitas_core::StatusParseError) -> Self {
        Self::InvalidVariant {
            field: e.field,
            value: e.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooShort {
            field: "password",
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be longer than 6 characters");
    }

    #[test]
    fn status_error_converts() {
        let err: ValidationError = "bogus".parse::<patitas_core::PetStatus>().unwrap_err().into();
        assert!(matches!(err, ValidationError::InvalidVariant { field: "pet status", .. }));
    }
}
