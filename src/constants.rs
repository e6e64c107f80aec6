//! Constants for signed URL construction and verification.

/// Default lifetime of a signed URL in seconds.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Default prefix prepended to a scope id to form its session key.
pub const DEFAULT_SESSION_KEY_PREFIX: &str = "hsu-";

/// Query parameter carrying the absolute expiry (seconds since epoch).
pub const EXPIRES_PARAM: &str = "expires";

/// Query parameter carrying the base64 digest.
pub const SIGNATURE_PARAM: &str = "signature";

/// Number of random bytes in a salt before encoding.
pub const SALT_LENGTH: usize = 16;

/// Rejection code for a digest that does not match the pending salt.
pub const BAD_DIGEST_CODE: &str = "EBADHMACDIGEST";

/// Rejection code for a correctly signed URL whose expiry has passed.
pub const TIMEOUT_CODE: &str = "ETIMEOUTHMACDIGEST";

/// Environment variable holding the signing secret.
pub const ENV_SECRET: &str = "HSU_SECRET";

/// Environment variable overriding the TTL in seconds.
pub const ENV_TTL_SECONDS: &str = "HSU_TTL_SECONDS";

/// Environment variable overriding the session key prefix.
pub const ENV_SESSION_KEY_PREFIX: &str = "HSU_SESSION_KEY_PREFIX";
