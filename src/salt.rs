//! Per-scope random salts.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::constants::SALT_LENGTH;

/// A random value binding signed URLs to one pending use of a scope.
///
/// `Debug` is redacted; the value itself is only ever written to the
/// session and fed to the digest.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt {
    value: String,
}

impl Salt {
    /// Generates a fresh salt from the operating system's CSPRNG.
    ///
    /// # Example
    ///
    /// ```
    /// use hsu::Salt;
    ///
    /// let a = Salt::generate();
    /// let b = Salt::generate();
    /// assert_ne!(a, b);
    /// assert!(!a.as_str().is_empty());
    /// ```
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self {
            value: URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    /// Wraps a salt read back from a session.
    ///
    /// Returns `None` for an empty value, which cannot have come from
    /// [`generate`](Self::generate).
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self { value })
        }
    }

    /// Returns the encoded salt.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_salts_are_unique() {
        let a = Salt::generate();
        let b = Salt::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_salt_length() {
        // 16 bytes of unpadded base64
        assert_eq!(Salt::generate().as_str().len(), 22);
    }

    #[test]
    fn generated_salt_is_url_safe() {
        let salt = Salt::generate();
        assert!(
            salt.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn from_stored_rejects_empty() {
        assert!(Salt::from_stored("").is_none());
        assert_eq!(Salt::from_stored("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn debug_is_redacted() {
        let salt = Salt::from_stored("visible").unwrap();
        assert!(!format!("{salt:?}").contains("visible"));
    }
}
