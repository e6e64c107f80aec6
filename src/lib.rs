//! HMAC signed URLs bound to a visitor session.
//!
//! A web application signs a URL for a named *scope* (a password reset, an
//! account deletion) in one request and checks it in a later one. The signed
//! URL carries an expiry and a digest; the visitor's session carries a random
//! salt. A URL verifies only while the salt that signed it is still pending,
//! before its expiry, and with every path and query byte unchanged.
//!
//! # Overview
//!
//! ```text
//! /reset?user=42&expires=<unix seconds>&signature=<base64 digest>
//! ```
//!
//! - `expires` is covered by the digest, so it cannot be pushed forward.
//! - `signature` is `Base64(HMAC-SHA256(secret, salt "." secret "." canonical))`
//!   where `canonical` is the path plus the sorted query without `signature`.
//! - Signing again for the same scope replaces the salt, so only the latest
//!   link works. Completing the scope removes it, so no link works.
//!
//! # Quick Start
//!
//! ```rust
//! use hsu::{Config, Hsu, MemorySession, Rejection};
//!
//! let hsu = Hsu::new(Config::new("s3cr3t").unwrap()).unwrap();
//! let reset = hsu.scope("reset").unwrap();
//! let mut session = MemorySession::new();
//!
//! // setup: bind a signer to the scope and mint a link.
//! let link = reset.setup(&mut session).sign("/reset?user=42").unwrap();
//!
//! // verify: the visitor follows the link.
//! reset.verify(&session, link.as_str()).unwrap();
//!
//! // Tampering is caught.
//! let forged = link.as_str().replace("user=42", "user=1");
//! assert_eq!(reset.verify(&session, &forged), Err(Rejection::BadDigest));
//!
//! // complete: spend the link once the action has run.
//! reset.complete(&mut session).run();
//! assert!(reset.verify(&session, link.as_str()).is_err());
//! ```
//!
//! # Rejections
//!
//! | Code | Meaning |
//! |------|---------|
//! | `EBADHMACDIGEST` | Forged, altered, superseded or spent URL |
//! | `ETIMEOUTHMACDIGEST` | Genuine URL past its expiry; offer a new link |
//!
//! # Configuration
//!
//! | Setting | Default | Environment |
//! |---------|---------|-------------|
//! | secret | required | `HSU_SECRET` |
//! | TTL | 3600 s | `HSU_TTL_SECONDS` |
//! | session key prefix | `hsu-` | `HSU_SESSION_KEY_PREFIX` |
//!
//! # Features
//!
//! - `serde`: deserialize [`Config`] and (de)serialize [`MemorySession`].

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod clock;
mod config;
mod constants;
mod digest;
mod error;
pub mod prelude;
mod query;
mod salt;
mod scope;
mod session;
mod signable;
mod signer;
mod verifier;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, Secret};
pub use constants::{
    BAD_DIGEST_CODE, DEFAULT_SESSION_KEY_PREFIX, DEFAULT_TTL_SECS, ENV_SECRET,
    ENV_SESSION_KEY_PREFIX, ENV_TTL_SECONDS, EXPIRES_PARAM, SALT_LENGTH, SIGNATURE_PARAM,
    TIMEOUT_CODE,
};
pub use digest::{digest, digests_match};
pub use error::{ConfigError, Error, Rejection, UrlError};
pub use query::QueryParams;
pub use salt::Salt;
pub use scope::{Completion, Hsu, Scope, ScopeState, UrlSigner};
pub use session::{MemorySession, SaltStore, SessionStore};
pub use signable::{SignableUrl, canonicalize};
pub use signer::{SignedUrl, Signer};
pub use verifier::{Verification, Verified, Verifier};
