//! Session storage for pending salts.
//!
//! The crate never persists anything itself. Callers hand in whatever
//! per-visitor store they already restore on each request (a decoded cookie,
//! a row from a session table) through the [`SessionStore`] trait.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::config::Config;
use crate::salt::Salt;

/// A per-visitor key/value store of strings.
pub trait SessionStore {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String);

    /// Removes the value stored under `key`, if any.
    fn remove(&mut self, key: &str);
}

impl<S: BuildHasher> SessionStore for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        HashMap::remove(self, key);
    }
}

impl SessionStore for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        BTreeMap::remove(self, key);
    }
}

impl<T: SessionStore + ?Sized> SessionStore for &mut T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        (**self).set(key, value);
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key);
    }
}

/// An in-memory session with a stable serialized form.
///
/// With the `serde` feature it serializes as a flat JSON object, so it can be
/// stored in a cookie or a session table between requests.
///
/// # Example
///
/// ```
/// use hsu::{MemorySession, SessionStore};
///
/// let mut session = MemorySession::new();
/// session.set("hsu-reset", "salt".to_string());
/// assert_eq!(session.get("hsu-reset").as_deref(), Some("salt"));
/// session.remove("hsu-reset");
/// assert!(session.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MemorySession {
    values: BTreeMap<String, String>,
}

impl MemorySession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns an iterator over stored keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// The salt slot for one scope within one session.
///
/// Holds at most one salt; writing a new one replaces the old, which is what
/// invalidates earlier URLs for the scope.
#[derive(Debug)]
pub struct SaltStore<'s, S: ?Sized> {
    session: &'s mut S,
    key: String,
}

impl<'s, S: SessionStore + ?Sized> SaltStore<'s, S> {
    /// Opens the slot for `scope_id` in `session`.
    pub fn new(config: &Config, scope_id: &str, session: &'s mut S) -> Self {
        Self {
            session,
            key: config.session_key(scope_id),
        }
    }

    /// Returns the session key of this slot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the pending salt, if any.
    #[must_use]
    pub fn pending(&self) -> Option<Salt> {
        pending_salt(&*self.session, &self.key)
    }

    /// Stores `salt` as the pending salt, replacing any previous one.
    pub fn replace(&mut self, salt: &Salt) {
        self.session.set(&self.key, salt.as_str().to_string());
    }

    /// Removes the pending salt.
    pub fn clear(&mut self) {
        self.session.remove(&self.key);
    }
}

/// Reads the pending salt under `key` without needing mutable access.
pub(crate) fn pending_salt<S: SessionStore + ?Sized>(session: &S, key: &str) -> Option<Salt> {
    session.get(key).and_then(Salt::from_stored)
}
