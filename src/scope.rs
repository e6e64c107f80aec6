//! The setup, verify and complete phases of a signing scope.
//!
//! A scope is one logical signing flow ("password reset", "delete account")
//! identified by a caller-chosen id. Per visitor session a scope moves
//! through
//!
//! ```text
//! Unsigned --sign--> Pending --complete--> Unsigned
//!                     |  ^
//!                     +--+ sign (fresh salt, earlier URLs stop verifying)
//! ```
//!
//! Verification does not move the scope. A pending URL verifies as often as
//! it is presented until it expires or the caller completes the scope.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{ConfigError, Error, Rejection};
use crate::session::{SaltStore, SessionStore, pending_salt};
use crate::signer::{SignedUrl, Signer};
use crate::verifier::{Verified, Verifier};

/// Signer and verifier sharing one configuration and clock.
///
/// # Example
///
/// ```
/// use hsu::{Config, Hsu, MemorySession};
///
/// let hsu = Hsu::new(Config::new("s3cr3t").unwrap()).unwrap();
/// let scope = hsu.scope("reset").unwrap();
/// let mut session = MemorySession::new();
///
/// // Request 1: issue the link.
/// let link = scope.setup(&mut session).sign("/reset?user=42").unwrap();
///
/// // Request 2: the visitor follows it.
/// scope.verify(&session, link.as_str()).unwrap();
/// scope.complete(&mut session).run();
///
/// // The link is spent.
/// assert_eq!(scope.verify(&session, link.as_str()).unwrap_err().code(), "EBADHMACDIGEST");
/// ```
#[derive(Debug, Clone)]
pub struct Hsu<C = SystemClock> {
    signer: Signer<C>,
    verifier: Verifier<C>,
}

impl Hsu {
    /// Creates an instance using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock + Clone> Hsu<C> {
    /// Creates an instance reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn with_clock(config: Config, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let config = Arc::new(config);
        Ok(Self {
            signer: Signer::from_shared(Arc::clone(&config), clock.clone()),
            verifier: Verifier::from_shared(config, clock),
        })
    }
}

impl<C: Clock> Hsu<C> {
    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        self.signer.config()
    }

    /// Returns the signer.
    #[must_use]
    pub const fn signer(&self) -> &Signer<C> {
        &self.signer
    }

    /// Returns the verifier.
    #[must_use]
    pub const fn verifier(&self) -> &Verifier<C> {
        &self.verifier
    }

    /// Opens the scope named `id`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingScopeId` if `id` is empty.
    pub fn scope(&self, id: impl Into<String>) -> Result<Scope<'_, C>, ConfigError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ConfigError::MissingScopeId);
        }
        Ok(Scope { hsu: self, id })
    }
}

/// Where a scope stands in a given session.
///
/// Completion removes the salt, so a completed scope reads back as
/// [`ScopeState::Unsigned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    /// No salt is pending; no URL for this scope verifies.
    Unsigned,
    /// A salt is pending; the latest signed URL verifies until it expires.
    Pending,
}

/// One named signing flow.
#[derive(Debug, Clone)]
pub struct Scope<'h, C = SystemClock> {
    hsu: &'h Hsu<C>,
    id: String,
}

impl<C: Clock> Scope<'_, C> {
    /// Returns the scope id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Binds a signer to this scope and `session`.
    ///
    /// No verification happens here; the returned signer is what a handler
    /// calls to mint links for the visitor.
    pub fn setup<'s, S: SessionStore + ?Sized>(&self, session: &'s mut S) -> UrlSigner<'_, 's, C, S> {
        UrlSigner {
            signer: &self.hsu.signer,
            scope_id: &self.id,
            session,
        }
    }

    /// Verifies an incoming URL for this scope.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::BadDigest` (`EBADHMACDIGEST`) for a forged, altered
    /// or spent URL, and `Rejection::Timeout` (`ETIMEOUTHMACDIGEST`) for a
    /// genuine URL past its expiry.
    pub fn verify<S: SessionStore + ?Sized>(
        &self,
        session: &S,
        url: &str,
    ) -> Result<Verified, Rejection> {
        self.hsu
            .verifier
            .check(&self.id, session, url)
            .inspect_err(|rejection| {
                warn!(scope = %self.id, code = rejection.code(), "rejected signed URL");
            })
    }

    /// Prepares removal of this scope's pending salt.
    ///
    /// Nothing changes until [`Completion::run`] is called. Once it runs, the
    /// URL just verified and any earlier one for this scope stop verifying.
    pub fn complete<'s, S: SessionStore + ?Sized>(&self, session: &'s mut S) -> Completion<'s, S> {
        Completion {
            store: SaltStore::new(self.hsu.config(), &self.id, session),
            scope_id: self.id.clone(),
        }
    }

    /// Reports whether a salt is pending for this scope in `session`.
    #[must_use]
    pub fn state<S: SessionStore + ?Sized>(&self, session: &S) -> ScopeState {
        match pending_salt(session, &self.hsu.config().session_key(&self.id)) {
            Some(_) => ScopeState::Pending,
            None => ScopeState::Unsigned,
        }
    }
}

/// A signer bound to one scope and one session.
#[derive(Debug)]
pub struct UrlSigner<'a, 's, C, S: ?Sized> {
    signer: &'a Signer<C>,
    scope_id: &'a str,
    session: &'s mut S,
}

impl<C: Clock, S: SessionStore + ?Sized> UrlSigner<'_, '_, C, S> {
    /// Signs `url` with the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `Error::Url` if `url` cannot be parsed.
    pub fn sign(&mut self, url: &str) -> Result<SignedUrl, Error> {
        self.signer.sign(self.scope_id, &mut *self.session, url)
    }

    /// Signs `url` with a custom TTL.
    ///
    /// # Errors
    ///
    /// Returns `Error::Url` if `url` cannot be parsed and `Error::Config` if
    /// `ttl` is under one second.
    pub fn sign_with_ttl(&mut self, url: &str, ttl: Duration) -> Result<SignedUrl, Error> {
        self.signer.sign_with_ttl(self.scope_id, &mut *self.session, url, ttl)
    }
}

/// A pending removal of a scope's salt.
#[must_use = "the salt stays pending, and the URL reusable, until `run` is called"]
#[derive(Debug)]
pub struct Completion<'s, S: ?Sized> {
    store: SaltStore<'s, S>,
    scope_id: String,
}

impl<S: SessionStore + ?Sized> Completion<'_, S> {
    /// Removes the salt, spending every outstanding URL for the scope.
    pub fn run(mut self) {
        self.store.clear();
        debug!(scope = %self.scope_id, "completed scope");
    }
}
