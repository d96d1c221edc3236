//! Route handlers organized by resource

pub mod health;
pub mod pets;
pub mod postings;
pub mod sightings;
pub mod users;

use chrono::NaiveDate;

use crate::models::ValidationError;

/// Require a non-empty, trimmed string field.
fn required(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    let v = value.unwrap_or_default().trim();
    if v.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(v.to_owned())
}

/// Path and reference ids must be positive.
fn positive_id(field: &'static str, id: i64) -> Result<i64, ValidationError> {
    if id <= 0 {
        return Err(ValidationError::OutOfRange {
            field,
            reason: "id must be a positive number",
        });
    }
    Ok(id)
}

/// Parse an ISO `YYYY-MM-DD` date.
fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    value.parse().map_err(|_| ValidationError::InvalidFormat {
        field,
        reason: "must be an ISO date (YYYY-MM-DD)",
    })
}

/// Enforce a maximum length on an optional free-text field.
fn max_len(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    if let Some(v) = &value {
        if v.len() > max {
            return Err(ValidationError::TooLong { field, max });
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_empty() {
        assert_eq!(required("name", Some("  Luna  ")).unwrap(), "Luna");
        assert!(required("name", Some("   ")).is_err());
        assert!(required("name", None).is_err());
    }

    #[test]
    fn positive_id_bounds() {
        assert!(positive_id("id", 1).is_ok());
        assert!(positive_id("id", 0).is_err());
        assert!(positive_id("id", -3).is_err());
    }

    #[test]
    fn date_parsing() {
        assert_eq!(
            parse_date("date", "2024-06-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(parse_date("date", "01/06/2024").is_err());
        assert!(parse_date("date", "not-a-date").is_err());
    }

    #[test]
    fn max_len_enforced() {
        assert!(max_len("description", Some("x".repeat(10)), 10).is_ok());
        assert!(max_len("description", Some("x".repeat(11)), 10).is_err());
        assert!(max_len("description", None, 10).unwrap().is_none());
    }
}
