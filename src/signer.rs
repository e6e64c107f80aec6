//! Issuing signed URLs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, ttl_to_secs};
use crate::constants::{EXPIRES_PARAM, SIGNATURE_PARAM};
use crate::digest::digest;
use crate::error::{ConfigError, Error};
use crate::salt::Salt;
use crate::session::{SaltStore, SessionStore};
use crate::signable::SignableUrl;

/// A URL carrying an expiry and a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    url: String,
    expires_at: i64,
}

impl SignedUrl {
    /// Returns the signed URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Returns the expiry embedded in the URL, in seconds since epoch.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Consumes the value and returns the URL string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.url
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl AsRef<str> for SignedUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

/// Signs URLs for a scope, recording the salt in the visitor's session.
///
/// Every call draws a fresh salt and overwrites the scope's pending one, so
/// only the most recently signed URL per scope verifies.
///
/// # Example
///
/// ```
/// use hsu::{Config, MemorySession, Signer};
///
/// let signer = Signer::new(Config::new("s3cr3t").unwrap()).unwrap();
/// let mut session = MemorySession::new();
///
/// let signed = signer.sign("reset", &mut session, "/reset?user=42").unwrap();
/// assert!(signed.as_str().starts_with("/reset?user=42&expires="));
/// assert!(signed.as_str().contains("&signature="));
/// ```
#[derive(Debug, Clone)]
pub struct Signer<C = SystemClock> {
    config: Arc<Config>,
    clock: C,
}

impl Signer {
    /// Creates a signer using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Signer<C> {
    /// Creates a signer reading time from `clock`.
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

    /// Signs `raw_url` for `scope_id` with the configured TTL.
    ///
    /// Any `expires` or `signature` parameters already on `raw_url` are
    /// dropped first, so re-signing a signed URL yields one of each.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an empty scope id and `Error::Url` if
    /// `raw_url` cannot be parsed. The session is untouched on error.
    pub fn sign<S: SessionStore + ?Sized>(
        &self,
        scope_id: &str,
        session: &mut S,
        raw_url: &str,
    ) -> Result<SignedUrl, Error> {
        self.sign_with_ttl(scope_id, session, raw_url, self.config.ttl())
    }

    /// Signs `raw_url` for `scope_id` with a custom TTL.
    ///
    /// # Errors
    ///
    /// As [`sign`](Self::sign), plus `Error::Config` if `ttl` is under one second.
    pub fn sign_with_ttl<S: SessionStore + ?Sized>(
        &self,
        scope_id: &str,
        session: &mut S,
        raw_url: &str,
        ttl: Duration,
    ) -> Result<SignedUrl, Error> {
        if scope_id.is_empty() {
            return Err(ConfigError::MissingScopeId.into());
        }
        let ttl_secs = ttl_to_secs(ttl)?;

        let mut url = SignableUrl::parse(raw_url)?.without_params(&[EXPIRES_PARAM, SIGNATURE_PARAM]);
        let expires_at = self.clock.now().saturating_add(ttl_secs);
        url.append_param(EXPIRES_PARAM, &expires_at.to_string());

        let salt = Salt::generate();
        let canonical = url.canonicalize(&[SIGNATURE_PARAM]);
        let signature = digest(salt.as_str(), self.config.secret().as_bytes(), &canonical);
        url.append_param(SIGNATURE_PARAM, &signature);

        SaltStore::new(&self.config, scope_id, session).replace(&salt);
        debug!(scope = %scope_id, expires_at, "signed URL");

        Ok(SignedUrl {
            url: url.to_string(),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::UrlError;
    use crate::session::MemorySession;

    const NOW: i64 = 1_700_000_000;

    fn signer() -> Signer<FixedClock> {
        Signer::with_clock(Config::new("s3cr3t").unwrap(), FixedClock::new(NOW)).unwrap()
    }

    #[test]
    fn sign_appends_expires_and_signature() {
        let mut session = MemorySession::new();
        let signed = signer().sign("reset", &mut session, "/reset?user=42").unwrap();

        let url = SignableUrl::parse(signed.as_str()).unwrap();
        assert_eq!(signed.expires_at(), NOW + 3600);
        assert_eq!(url.param("user").as_deref(), Some("42"));
        assert_eq!(url.param("expires"), Some((NOW + 3600).to_string()));
        assert_eq!(url.param("signature").map(|s| s.len()), Some(44));
        assert!(signed
            .as_str()
            .starts_with(&format!("/reset?user=42&expires={}&signature=", NOW + 3600)));
    }

    #[test]
    fn sign_writes_salt_under_prefixed_key() {
        let mut session = MemorySession::new();
        signer().sign("reset", &mut session, "/reset").unwrap();

        assert_eq!(session.len(), 1);
        assert!(session.get("hsu-reset").is_some());
    }

    #[test]
    fn resign_replaces_salt() {
        let signer = signer();
        let mut session = MemorySession::new();

        signer.sign("reset", &mut session, "/reset").unwrap();
        let first = session.get("hsu-reset").unwrap();
        signer.sign("reset", &mut session, "/reset").unwrap();
        let second = session.get("hsu-reset").unwrap();

        assert_ne!(first, second);
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn signature_covers_salt_and_canonical_form() {
        let mut session = MemorySession::new();
        let signed = signer().sign("reset", &mut session, "/reset?user=42").unwrap();

        let salt = session.get("hsu-reset").unwrap();
        let canonical = format!("/reset?expires={}&user=42", NOW + 3600);
        let expected = digest(&salt, b"s3cr3t", &canonical);

        let url = SignableUrl::parse(signed.as_str()).unwrap();
        assert_eq!(url.param("signature"), Some(expected));
    }

    #[test]
    fn resigning_signed_url_keeps_single_params() {
        let signer = signer();
        let mut session = MemorySession::new();

        let first = signer.sign("reset", &mut session, "/reset?user=42").unwrap();
        let second = signer.sign("reset", &mut session, first.as_str()).unwrap();

        let query = SignableUrl::parse(second.as_str()).unwrap().query();
        assert_eq!(query.iter().filter(|(k, _)| *k == "expires").count(), 1);
        assert_eq!(query.iter().filter(|(k, _)| *k == "signature").count(), 1);
    }

    #[test]
    fn custom_ttl() {
        let mut session = MemorySession::new();
        let signed = signer()
            .sign_with_ttl("reset", &mut session, "/reset", Duration::from_secs(60))
            .unwrap();
        assert_eq!(signed.expires_at(), NOW + 60);
    }

    #[test]
    fn zero_ttl_rejected() {
        let mut session = MemorySession::new();
        let result = signer().sign_with_ttl("reset", &mut session, "/reset", Duration::ZERO);
        assert_eq!(result, Err(Error::Config(ConfigError::InvalidTtl)));
        assert!(session.is_empty());
    }

    #[test]
    fn empty_scope_rejected() {
        let mut session = MemorySession::new();
        let result = signer().sign("", &mut session, "/reset");
        assert_eq!(result, Err(Error::Config(ConfigError::MissingScopeId)));
    }

    #[test]
    fn bad_url_leaves_session_untouched() {
        let mut session = MemorySession::new();
        let result = signer().sign("reset", &mut session, "");
        assert_eq!(result, Err(Error::Url(UrlError::Empty)));
        assert!(session.is_empty());
    }

    #[test]
    fn fragment_stays_last() {
        let mut session = MemorySession::new();
        let signed = signer()
            .sign(
                "search",
                &mut session,
                "https://www.google.com.au/webhp?sourceid=chrome-instant&ion=1&espv=2&ie=UTF-8#q=npm+hsu",
            )
            .unwrap();

        assert!(signed.as_str().starts_with(
            "https://www.google.com.au/webhp?sourceid=chrome-instant&ion=1&espv=2&ie=UTF-8&expires="
        ));
        assert!(signed.as_str().ends_with("#q=npm+hsu"));
    }

    #[test]
    fn invalid_config_rejected() {
        let config = Config::new("k").unwrap().with_ttl(Duration::ZERO);
        assert!(matches!(
            Signer::new(config),
            Err(ConfigError::InvalidTtl)
        ));
    }
}
