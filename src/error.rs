//! Error types for signing and verifying URLs.

use thiserror::Error;

use crate::constants::{BAD_DIGEST_CODE, TIMEOUT_CODE};

/// Errors raised while building a configuration or a scope.
///
/// These are fatal: the caller cannot sign or verify anything until the
/// configuration is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No secret, or an empty one, was supplied.
    #[error("secret is required and must not be empty")]
    MissingSecret,
    /// No scope id, or an empty one, was supplied.
    #[error("scope id is required and must not be empty; pick a name per signing flow")]
    MissingScopeId,
    /// The TTL is zero or does not fit a timestamp.
    #[error("TTL must be at least one second and fit in a signed 64-bit timestamp")]
    InvalidTtl,
    /// The session key prefix is empty.
    #[error("session key prefix must not be empty")]
    InvalidSessionKeyPrefix,
    /// An environment variable could not be used.
    #[error("environment variable '{var}' is invalid: {reason}")]
    Env {
        /// Name of the variable
        var: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Errors raised when a URL handed to the signer cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    /// The input is empty.
    #[error("URL is empty")]
    Empty,
    /// The input is not an absolute or origin-relative URL.
    #[error("failed to parse URL '{input}': {reason}")]
    Invalid {
        /// The input that failed to parse
        input: String,
        /// Parser diagnostic
        reason: String,
    },
}

/// Why an incoming signed URL was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The digest does not match, or no salt is pending for the scope.
    #[error("EBADHMACDIGEST: signature does not match; the URL was forged, altered or already used")]
    BadDigest,
    /// The digest matches but the URL is past its expiry.
    #[error("ETIMEOUTHMACDIGEST: signed URL expired at {expired_at}; request a new link")]
    Timeout {
        /// Expiry carried by the URL, seconds since epoch
        expired_at: i64,
    },
}

impl Rejection {
    /// Returns the stable code for this rejection.
    ///
    /// ```
    /// use hsu::Rejection;
    ///
    /// assert_eq!(Rejection::BadDigest.code(), "EBADHMACDIGEST");
    /// assert_eq!(Rejection::Timeout { expired_at: 0 }.code(), "ETIMEOUTHMACDIGEST");
    /// ```
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadDigest => BAD_DIGEST_CODE,
            Self::Timeout { .. } => TIMEOUT_CODE,
        }
    }

    /// Returns true if a fresh link could satisfy the request.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Any error this crate can return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Configuration or scope construction failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A URL could not be parsed.
    #[error(transparent)]
    Url(#[from] UrlError),
    /// A signed URL was refused.
    #[error(transparent)]
    Rejected(#[from] Rejection),
}
