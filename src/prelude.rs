//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use hsu::prelude::*;
//!
//! let hsu = Hsu::new(Config::new("s3cr3t").unwrap()).unwrap();
//! let mut session = MemorySession::new();
//! let link = hsu.scope("reset").unwrap().setup(&mut session).sign("/reset").unwrap();
//! assert!(link.as_str().contains("signature="));
//! ```
//!
//! Lower-level building blocks (`digest`, `canonicalize`, `SaltStore`) are
//! left out; import them from the crate root when needed.

pub use crate::{
    // Core types
    Clock, Config, FixedClock, Hsu, MemorySession, Scope, ScopeState, SessionStore, SignedUrl,
    Signer, SystemClock, Verification, Verified, Verifier,
    // Errors
    ConfigError, Error, Rejection, UrlError,
};
