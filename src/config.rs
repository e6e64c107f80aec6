//! Signing configuration.

use std::fmt;
use std::time::Duration;

use crate::constants::{
    DEFAULT_SESSION_KEY_PREFIX, DEFAULT_TTL_SECS, ENV_SECRET, ENV_SESSION_KEY_PREFIX,
    ENV_TTL_SECONDS,
};
use crate::error::ConfigError;

/// The HMAC key shared by every scope.
///
/// The secret never leaves the process; its `Debug` output is redacted so it
/// cannot end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    bytes: Vec<u8>,
}

impl Secret {
    /// Creates a secret from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingSecret` if `bytes` is empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self { bytes })
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes redacted>)", self.bytes.len())
    }
}

/// Immutable settings shared by the signer and verifier.
///
/// # Example
///
/// ```
/// use hsu::Config;
/// use std::time::Duration;
///
/// let config = Config::new("s3cr3t")
///     .unwrap()
///     .with_ttl(Duration::from_secs(600))
///     .with_session_key_prefix("links-");
///
/// assert_eq!(config.ttl(), Duration::from_secs(600));
/// assert_eq!(config.session_key("reset"), "links-reset");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawConfig"))]
pub struct Config {
    secret: Secret,
    ttl: Duration,
    session_key_prefix: String,
}

impl Config {
    /// Creates a configuration with the default TTL and session key prefix.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingSecret` if `secret` is empty.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Ok(Self {
            secret: Secret::new(secret)?,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            session_key_prefix: DEFAULT_SESSION_KEY_PREFIX.to_string(),
        })
    }

    /// Reads the configuration from `HSU_SECRET`, `HSU_TTL_SECONDS` and
    /// `HSU_SESSION_KEY_PREFIX`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the secret is missing or any value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let secret = lookup(ENV_SECRET).ok_or(ConfigError::MissingSecret)?;
        let mut config = Self::new(secret)?;

        if let Some(raw) = lookup(ENV_TTL_SECONDS) {
            let secs: u64 = raw.trim().parse().map_err(|e| ConfigError::Env {
                var: ENV_TTL_SECONDS,
                reason: format!("expected whole seconds: {e}"),
            })?;
            config = config.with_ttl(Duration::from_secs(secs));
        }

        if let Some(prefix) = lookup(ENV_SESSION_KEY_PREFIX) {
            config = config.with_session_key_prefix(prefix);
        }

        config.validate()?;
        Ok(config)
    }

    /// Sets the lifetime of signed URLs.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the prefix used to key salts in the session.
    #[must_use]
    pub fn with_session_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.session_key_prefix = prefix.into();
        self
    }

    /// Checks the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTtl` if the TTL is under one second or too
    /// large for a timestamp, and `ConfigError::InvalidSessionKeyPrefix` if the
    /// prefix is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ttl_secs()?;
        if self.session_key_prefix.is_empty() {
            return Err(ConfigError::InvalidSessionKeyPrefix);
        }
        Ok(())
    }

    /// Returns the signing secret.
    #[must_use]
    pub const fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Returns the lifetime of signed URLs.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the session key prefix.
    #[must_use]
    pub fn session_key_prefix(&self) -> &str {
        &self.session_key_prefix
    }

    /// Returns the session key under which `scope_id`'s salt is stored.
    #[must_use]
    pub fn session_key(&self, scope_id: &str) -> String {
        format!("{}{scope_id}", self.session_key_prefix)
    }

    pub(crate) fn ttl_secs(&self) -> Result<i64, ConfigError> {
        ttl_to_secs(self.ttl)
    }
}

/// Converts a TTL to whole seconds, rejecting zero and overflow.
pub(crate) fn ttl_to_secs(ttl: Duration) -> Result<i64, ConfigError> {
    match i64::try_from(ttl.as_secs()) {
        Ok(0) | Err(_) => Err(ConfigError::InvalidTtl),
        Ok(secs) => Ok(secs),
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawConfig {
    secret: String,
    #[serde(default = "default_ttl_seconds")]
    ttl_seconds: u64,
    #[serde(default = "default_session_key_prefix")]
    session_key_prefix: String,
}

#[cfg(feature = "serde")]
const fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL_SECS
}

#[cfg(feature = "serde")]
fn default_session_key_prefix() -> String {
    DEFAULT_SESSION_KEY_PREFIX.to_string()
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let config = Self::new(raw.secret)?
            .with_ttl(Duration::from_secs(raw.ttl_seconds))
            .with_session_key_prefix(raw.session_key_prefix);
        config.validate()?;
        Ok(config)
    }
}
