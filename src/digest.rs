//! Keyed digest over a canonical URL.
//!
//! The digest is
//!
//! ```text
//! Base64(HMAC-SHA256(key = secret, message = salt "." secret "." canonical))
//! ```
//!
//! The secret appears in both the key and the message. Changing either side
//! changes every digest, so the construction must stay as written to remain
//! compatible with URLs already in circulation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the digest of `canonical` under `salt` and `secret`.
///
/// Pure and deterministic. The output is always 44 characters of standard,
/// padded base64.
///
/// # Example
///
/// ```
/// use hsu::digest;
///
/// let a = digest("salt", b"s3cr3t", "/reset?user=42");
/// let b = digest("salt", b"s3cr3t", "/reset?user=42");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 44);
/// ```
///
/// # Panics
///
/// Never in practice: HMAC-SHA256 accepts keys of any length, including
/// empty ones.
#[must_use]
pub fn digest(salt: &str, secret: &[u8], canonical: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(salt.as_bytes());
    mac.update(b".");
    mac.update(secret);
    mac.update(b".");
    mac.update(canonical.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Compares two digests in constant time with respect to their contents.
///
/// Length differences return early; every digest this crate produces has the
/// same length, so that leaks nothing about a valid digest.
#[must_use]
pub fn digests_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}
