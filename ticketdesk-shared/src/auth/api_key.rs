/// Shared-secret API key checking
///
/// The server is configured with a single secret. A request is allowed when
/// it presents exactly that secret in the [`API_KEY_HEADER`] header.
///
/// # Security
///
/// - The configured secret is hashed with SHA-256 once, at startup
/// - Presented keys are hashed the same way and the digests are compared in
///   constant time, so comparison time does not depend on key length or on
///   the position of the first differing byte
///
/// # Example
///
/// ```
/// use ticketdesk_shared::auth::api_key::{ApiKeyCheck, ApiKeyValidator};
///
/// let validator = ApiKeyValidator::new("s3cret").unwrap();
///
/// assert_eq!(validator.check(Some("s3cret")), ApiKeyCheck::Valid);
/// assert_eq!(validator.check(Some("guess")), ApiKeyCheck::Invalid);
/// assert_eq!(validator.check(None), ApiKeyCheck::Missing);
/// ```

use sha2::{Digest, Sha256};
use std::fmt;

/// Request header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// API key configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiKeyError {
    #[error("API key must not be empty")]
    Empty,
}

/// Outcome of checking a presented key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyCheck {
    /// Key present and equal to the configured secret
    Valid,

    /// Header absent or empty
    Missing,

    /// Header present with a different value
    Invalid,
}

impl ApiKeyCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, ApiKeyCheck::Valid)
    }
}

/// Checks presented keys against the configured secret
#[derive(Clone)]
pub struct ApiKeyValidator {
    expected_hash: String,
}

impl fmt::Debug for ApiKeyValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyValidator").finish_non_exhaustive()
    }
}

impl ApiKeyValidator {
    /// Creates a validator for `secret`
    ///
    /// # Errors
    ///
    /// Returns [`ApiKeyError::Empty`] for an empty secret
    pub fn new(secret: impl AsRef<str>) -> Result<Self, ApiKeyError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ApiKeyError::Empty);
        }

        Ok(Self {
            expected_hash: hash_api_key(secret),
        })
    }

    /// Classifies the key presented with a request
    pub fn check(&self, presented: Option<&str>) -> ApiKeyCheck {
        match presented {
            None | Some("") => ApiKeyCheck::Missing,
            Some(key) if constant_time_compare(&hash_api_key(key), &self.expected_hash) => {
                ApiKeyCheck::Valid
            }
            Some(_) => ApiKeyCheck::Invalid,
        }
    }
}

/// Hex-encoded SHA-256 digest of a key
///
/// ```
/// use ticketdesk_shared::auth::api_key::hash_api_key;
///
/// let hash = hash_api_key("s3cret");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_api_key("s3cret"));
/// ```
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Constant-time string comparison
///
/// Compares every byte of equal-length inputs without short-circuiting.
/// Inputs of different length are unequal.
///
/// ```
/// use ticketdesk_shared::auth::api_key::constant_time_compare;
///
/// assert!(constant_time_compare("hello", "hello"));
/// assert!(!constant_time_compare("hello", "world"));
/// ```
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        assert_eq!(ApiKeyValidator::new("").unwrap_err(), ApiKeyError::Empty);
    }

    #[test]
    fn test_check_outcomes() {
        let validator = ApiKeyValidator::new("expected-key").unwrap();

        assert!(validator.check(Some("expected-key")).is_valid());
        assert_eq!(validator.check(Some("expected-kez")), ApiKeyCheck::Invalid);
        assert_eq!(validator.check(Some("expected-key ")), ApiKeyCheck::Invalid);
        assert_eq!(validator.check(None), ApiKeyCheck::Missing);
        assert_eq!(validator.check(Some("")), ApiKeyCheck::Missing);
    }

    #[test]
    fn test_check_is_case_sensitive() {
        let validator = ApiKeyValidator::new("Secret").unwrap();
        assert_eq!(validator.check(Some("secret")), ApiKeyCheck::Invalid);
    }

    #[test]
    fn test_hash_known_value() {
        assert_eq!(
            hash_api_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_constant_time_compare_lengths() {
        assert!(!constant_time_compare("abc", "abcd"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_debug_hides_hash() {
        let validator = ApiKeyValidator::new("s3cret").unwrap();
        let debug = format!("{:?}", validator);
        assert!(!debug.contains(&hash_api_key("s3cret")));
    }
}
