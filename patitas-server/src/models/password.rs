//! Password validation.

use super::ValidationError;

/// Minimum password length (exclusive): passwords must be longer than this
const MIN_PASSWORD_LEN: usize = 6;

/// Validated plaintext password, pre-hash
pub struct Password(String);

impl Password {
    /// Validate a candidate password: must be longer than 6 characters.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }
        if s.len() <= MIN_PASSWORD_LEN {
            return Err(ValidationError::TooShort {
                field: "password",
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// No Debug derive: plaintext passwords stay out of logs.
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_long_enough() {
        assert!(Password::new("1234567").is_ok());
        assert!(Password::new("a-much-longer-password").is_ok());
    }

    #[test]
    fn rejects_six_or_fewer() {
        assert!(Password::new("123456").is_err());
        assert!(Password::new("abc").is_err());
        assert!(Password::new("").is_err());
    }

    #[test]
    fn debug_hides_contents() {
        let p = Password::new("super-secret").unwrap();
        assert_eq!(format!("{:?}", p), "Password(***)");
    }
}
