//! Bearer token issuing and verification.
//!
//! HS256 JWTs with the user id as subject. The signing secret is padded
//! deterministically to the 32 bytes HS256 wants, so short development
//! secrets still produce a usable key.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum key length for HS256
const MIN_KEY_BYTES: usize = 32;

/// Default token lifetime in hours
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token subject is not a user id: '{0}'")]
    BadSubject(String),
}

/// JWT claims carried by every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, stringified
    pub sub: String,
    pub email: String,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

impl Claims {
    /// Parse the subject back into a user id.
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::BadSubject(self.sub.clone()))
    }
}

/// Issues and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    /// Build a signer from a shared secret and token lifetime in hours.
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let key = pad_secret(secret.as_bytes());
        Self {
            encoding: EncodingKey::from_secret(&key),
            decoding: DecodingKey::from_secret(&key),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for a user.
    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify a token and return its claims.
    ///
    /// Rejects expired tokens, bad signatures, and garbage input.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

/// Pad a secret to at least 32 bytes with a deterministic filler.
fn pad_secret(secret: &[u8]) -> Vec<u8> {
    if secret.len() >= MIN_KEY_BYTES {
        return secret.to_vec();
    }
    let mut padded = Vec::with_capacity(MIN_KEY_BYTES);
    padded.extend_from_slice(secret);
    for i in secret.len()..MIN_KEY_BYTES {
        padded.push(b'0' + (i % 10) as u8);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret", DEFAULT_TOKEN_TTL_HOURS)
    }

    #[test]
    fn issue_then_verify() {
        let signer = signer();
        let token = signer.issue(42, "ana@example.com").unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.email, "ana@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_garbage() {
        assert!(signer().verify("not-a-token").is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = signer().issue(7, "x@example.com").unwrap();
        let other = TokenSigner::new("different-secret", DEFAULT_TOKEN_TTL_HOURS);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn rejects_expired() {
        let expired = TokenSigner::new("test-secret", -1);
        let token = expired.issue(7, "x@example.com").unwrap();
        assert!(signer().verify(&token).is_err());
    }

    #[test]
    fn pads_short_secrets() {
        let key = pad_secret(b"abc");
        assert_eq!(key.len(), MIN_KEY_BYTES);
        assert_eq!(&key[..3], b"abc");
        // Same input, same key
        assert_eq!(key, pad_secret(b"abc"));
    }

    #[test]
    fn long_secrets_unpadded() {
        let long = vec![b'x'; 40];
        assert_eq!(pad_secret(&long), long);
    }
}
