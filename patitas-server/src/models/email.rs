//! Email address validation.
//!
//! The accepted shape is `local@domain.com` (case-insensitive), matching
//! what account registration has always enforced.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for email addresses
const MAX_EMAIL_LEN: usize = 254;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[^@\s]+@[^@\s]+\.com$").expect("invalid email regex"));

/// Validated email address, trimmed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and normalize an email address.
    ///
    /// # Example
    /// ```
    /// use patitas_server::models::Email;
    ///
    /// assert!(Email::new("ana@example.com").is_ok());
    /// assert!(Email::new("ana@example.org").is_err()); // must end in .com
    /// assert!(Email::new("not-an-email").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }

        if s.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        if !EMAIL_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like name@domain.com",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_addresses() {
        assert!(Email::new("ana@example.com").is_ok());
        assert!(Email::new("ANA@EXAMPLE.COM").is_ok());
        assert!(Email::new("a.b+c@sub.domain.com").is_ok());
    }

    #[test]
    fn trims_whitespace() {
        let email = Email::new("  ana@example.com  ").unwrap();
        assert_eq!(email.as_str(), "ana@example.com");
    }

    #[test]
    fn rejects_non_com() {
        assert!(Email::new("ana@example.org").is_err());
        assert!(Email::new("ana@example.com.ar").is_err());
    }

    #[test]
    fn rejects_malformed() {
        assert!(Email::new("").is_err());
        assert!(Email::new("no-at-sign.com").is_err());
        assert!(Email::new("two@@signs.com").is_err());
        assert!(Email::new("spa ce@mail.com").is_err());
    }
}
