//! Checking incoming signed URLs.

use std::sync::Arc;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::constants::{EXPIRES_PARAM, SIGNATURE_PARAM};
use crate::digest::{digest, digests_match};
use crate::error::{ConfigError, Rejection};
use crate::session::{SessionStore, pending_salt};
use crate::signable::SignableUrl;

/// Outcome of checking a URL against a scope's pending salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The digest matches and the URL has not expired.
    Valid {
        /// Expiry carried by the URL
        expires_at: i64,
    },
    /// The digest does not match, the URL is malformed, or no salt is pending.
    Invalid,
    /// The digest matches but the expiry has passed.
    TimedOut {
        /// Expiry carried by the URL
        expired_at: i64,
    },
}

impl Verification {
    /// Returns true for [`Verification::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Converts the outcome into a result the request layer can propagate.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::BadDigest` for `Invalid` and `Rejection::Timeout`
    /// for `TimedOut`.
    pub const fn into_result(self) -> Result<Verified, Rejection> {
        match self {
            Self::Valid { expires_at } => Ok(Verified { expires_at }),
            Self::Invalid => Err(Rejection::BadDigest),
            Self::TimedOut { expired_at } => Err(Rejection::Timeout { expired_at }),
        }
    }
}

/// Proof that a URL passed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verified {
    expires_at: i64,
}

impl Verified {
    /// Returns the expiry carried by the verified URL.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

/// Verifies URLs against the salt pending in the visitor's session.
///
/// Verification never changes the session: a valid URL keeps verifying until
/// it expires, is re-signed, or its scope is completed.
///
/// # Example
///
/// ```
/// use hsu::{Config, MemorySession, Signer, Verifier, Verification};
///
/// let config = Config::new("s3cr3t").unwrap();
/// let signer = Signer::new(config.clone()).unwrap();
/// let verifier = Verifier::new(config).unwrap();
/// let mut session = MemorySession::new();
///
/// let signed = signer.sign("reset", &mut session, "/reset?user=42").unwrap();
/// assert!(verifier.verify("reset", &session, signed.as_str()).is_valid());
///
/// let forged = signed.as_str().replace("user=42", "user=43");
/// assert_eq!(verifier.verify("reset", &session, &forged), Verification::Invalid);
/// ```
#[derive(Debug, Clone)]
pub struct Verifier<C = SystemClock> {
    config: Arc<Config>,
    clock: C,
}

impl Verifier {
    /// Creates a verifier using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Verifier<C> {
    /// Creates a verifier reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn with_clock(config: Config, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_shared(Arc::new(config), clock))
    }

    pub(crate) const fn from_shared(config: Arc<Config>, clock: C) -> Self {
        Self { config, clock }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checks `url` against the salt pending for `scope_id`.
    ///
    /// The digest is recomputed over the canonical form of `url` without its
    /// `signature` parameter and compared in constant time. Only when it
    /// matches is `expires` consulted; a missing or unparsable expiry counts as
    /// already expired.
    #[must_use]
    pub fn verify<S: SessionStore + ?Sized>(
        &self,
        scope_id: &str,
        session: &S,
        url: &str,
    ) -> Verification {
        let outcome = self.evaluate(scope_id, session, url);
        debug!(scope = %scope_id, ?outcome, "verified URL");
        outcome
    }

    /// Like [`verify`](Self::verify), as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the `Rejection` matching a non-valid outcome.
    pub fn check<S: SessionStore + ?Sized>(
        &self,
        scope_id: &str,
        session: &S,
        url: &str,
    ) -> Result<Verified, Rejection> {
        self.verify(scope_id, session, url).into_result()
    }

    fn evaluate<S: SessionStore + ?Sized>(
        &self,
        scope_id: &str,
        session: &S,
        url: &str,
    ) -> Verification {
        let Some(salt) = pending_salt(session, &self.config.session_key(scope_id)) else {
            return Verification::Invalid;
        };
        let Ok(url) = SignableUrl::parse(url) else {
            return Verification::Invalid;
        };

        let presented = url.param(SIGNATURE_PARAM).unwrap_or_default();
        let canonical = url.canonicalize(&[SIGNATURE_PARAM]);
        let expected = digest(salt.as_str(), self.config.secret().as_bytes(), &canonical);
        if !digests_match(&expected, &presented) {
            return Verification::Invalid;
        }

        let expires_at = url
            .param(EXPIRES_PARAM)
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(0);
        if self.clock.now() < expires_at {
            Verification::Valid { expires_at }
        } else {
            Verification::TimedOut {
                expired_at: expires_at,
            }
        }
    }
}
