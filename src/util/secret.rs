//! Redacting wrapper for the JWT signing secret

use serde::Deserialize;
use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// Credential that never prints its value.
///
/// `AppConfig` derives `Debug`, so any credential it holds must be one of
/// these. Read the value with [`SecretString::expose_secret`], e.g. when
/// building signing keys:
///
/// ```
/// use grid::util::SecretString;
///
/// let secret = SecretString::new("hs256-signing-secret");
/// assert_eq!(format!("{secret:?}"), "[REDACTED]");
/// assert_eq!(secret.expose_secret().len(), 20);
/// ```
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Key material copied into jsonwebtoken's key types is not cleared
        self.0.clear();
        self.0.shrink_to_fit();
    }
}
