//! Bearer token authentication
//!
//! The relay accepts a request only when its `Authorization` header is exactly
//! `Bearer <token>`. The comparison runs in constant time with respect to the
//! header contents.

use std::fmt;

use crate::types::RelayError;

const BEARER_PREFIX: &str = "Bearer ";

/// The static secret callers must present
#[derive(Clone)]
pub struct AuthToken {
    expected_header: String,
}

impl AuthToken {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            expected_header: format!("{}{}", BEARER_PREFIX, token.as_ref()),
        }
    }

    /// Check the raw `Authorization` header value
    pub fn verify(&self, header: Option<&str>) -> Result<(), RelayError> {
        match header {
            Some(value) if constant_time_eq(value.as_bytes(), self.expected_header.as_bytes()) => {
                Ok(())
            }
            Some(value) if value.starts_with(BEARER_PREFIX) => {
                tracing::warn!("Invalid bearer token provided");
                Err(RelayError::Unauthorized)
            }
            Some(_) => {
                tracing::warn!("Invalid Authorization header format");
                Err(RelayError::Unauthorized)
            }
            None => {
                tracing::warn!("Missing Authorization header");
                Err(RelayError::Unauthorized)
            }
        }
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Compare two byte strings without short-circuiting on the first mismatch
///
/// Always walks the full length of `expected`; only the length of
/// `provided` can leak.
fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    let mut diff = u8::from(provided.len() != expected.len());
    for (i, &b) in expected.iter().enumerate() {
        let p = provided.get(i).copied().unwrap_or(0);
        diff |= p ^ b;
    }
    diff == 0
}
