//! Property-based tests for canonicalization and digests.
//!
//! These generate arbitrary paths and query parameter sets and check that the
//! signed form is stable under everything a transport may legitimately do to
//! a URL, and unstable under everything it may not.

use proptest::prelude::*;

use hsu::{Config, FixedClock, Hsu, MemorySession, QueryParams, SignableUrl, digest};

const NOW: i64 = 1_700_000_000;

/// Strategies for generating URL components.
mod strategies {
    use super::*;

    /// Characters for path segments (unreserved set)
    const SEGMENT_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-_~";

    /// Generate a path segment (1-12 chars)
    pub fn segment() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(SEGMENT_CHARS.to_vec()), 1..=12)
            .prop_map(|chars| chars.into_iter().map(char::from).collect())
    }

    /// Generate an absolute path with 1-4 segments
    pub fn path() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..=4).prop_map(|segments| format!("/{}", segments.join("/")))
    }

    /// Generate a parameter name that does not clash with the reserved ones
    pub fn name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,7}".prop_filter("reserved name", |n| n != "expires" && n != "signature")
    }

    /// Generate a parameter value, including characters that need escaping
    pub fn value() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 &=+/%?#.-]{0,12}"
    }

    /// Generate 0-6 query parameters
    pub fn params() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::vec((name(), value()), 0..=6)
    }
}

fn build_url(path: &str, params: &[(String, String)]) -> String {
    let query: QueryParams = params.iter().cloned().collect();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

proptest! {
    #[test]
    fn canonical_form_is_deterministic(path in strategies::path(), params in strategies::params()) {
        let url = build_url(&path, &params);
        let a = SignableUrl::parse(&url).unwrap().canonicalize(&["signature"]);
        let b = SignableUrl::parse(&url).unwrap().canonicalize(&["signature"]);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn canonical_form_ignores_param_order(
        path in strategies::path(),
        params in strategies::params(),
        seed in any::<u64>(),
    ) {
        let mut shuffled = params.clone();
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left(usize::try_from(seed % len as u64).unwrap());
        }

        let original = SignableUrl::parse(&build_url(&path, &params)).unwrap();
        let reordered = SignableUrl::parse(&build_url(&path, &shuffled)).unwrap();
        prop_assert_eq!(original.canonicalize(&[]), reordered.canonicalize(&[]));
    }

    #[test]
    fn canonical_query_round_trips_through_parse(params in strategies::params()) {
        let query: QueryParams = params.iter().cloned().collect();
        let reparsed = QueryParams::parse(&query.canonical()).unwrap();
        prop_assert_eq!(reparsed.canonical(), query.canonical());
        prop_assert_eq!(reparsed.len(), query.len());
    }

    #[test]
    fn digest_is_deterministic_and_fixed_length(
        salt in "[A-Za-z0-9_-]{1,32}",
        secret in prop::collection::vec(any::<u8>(), 1..64),
        canonical in "/[ -~]{0,64}",
    ) {
        let a = digest(&salt, &secret, &canonical);
        let b = digest(&salt, &secret, &canonical);
        prop_assert_eq!(a.len(), 44);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn digest_changes_with_any_input(
        salt in "[A-Za-z0-9_-]{1,32}",
        secret in "[a-z]{1,16}",
        canonical in "/[a-z]{0,16}",
    ) {
        let base = digest(&salt, secret.as_bytes(), &canonical);
        prop_assert_ne!(&base, &digest(&format!("{salt}x"), secret.as_bytes(), &canonical));
        prop_assert_ne!(&base, &digest(&salt, format!("{secret}x").as_bytes(), &canonical));
        prop_assert_ne!(&base, &digest(&salt, secret.as_bytes(), &format!("{canonical}x")));
    }

    #[test]
    fn signed_urls_verify_and_tampering_fails(
        path in strategies::path(),
        params in strategies::params(),
        extra in strategies::name(),
    ) {
        let clock = FixedClock::new(NOW);
        let hsu = Hsu::with_clock(Config::new("s3cr3t").unwrap(), clock).unwrap();
        let scope = hsu.scope("prop").unwrap();
        let mut session = MemorySession::new();

        let link = scope.setup(&mut session).sign(&build_url(&path, &params)).unwrap();
        prop_assert!(scope.verify(&session, link.as_str()).is_ok());

        let appended = format!("{link}&{extra}=1");
        prop_assert!(scope.verify(&session, &appended).is_err());
    }
}
