//! Query parameters of a URL being signed or verified.

use std::borrow::Cow;
use std::fmt;

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use crate::error::UrlError;

/// Query parameters from a URL, decoded, in their original order.
///
/// Repeated names are kept; [`get`](Self::get) returns the first value.
/// [`canonical`](Self::canonical) sorts the pairs so the signed form does not
/// depend on the order a client or proxy happens to send them in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string (without the leading `?`).
    ///
    /// `+` decodes to a space, malformed percent escapes are kept literally,
    /// and a pair without `=` has an empty value.
    ///
    /// # Errors
    ///
    /// Returns `UrlError::Invalid` if a name or value does not decode to
    /// UTF-8. Decoding such bytes lossily would let distinct queries share a
    /// canonical form.
    ///
    /// # Example
    ///
    /// ```
    /// use hsu::QueryParams;
    ///
    /// let params = QueryParams::parse("user=42&flag&name=a%20b").unwrap();
    /// assert_eq!(params.get("user"), Some("42"));
    /// assert_eq!(params.get("flag"), Some(""));
    /// assert_eq!(params.get("name"), Some("a b"));
    ///
    /// assert!(QueryParams::parse("token=%FF").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let pairs = input
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| -> Result<(String, String), UrlError> {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                Ok((decode(name, input)?, decode(value, input)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { pairs })
    }

    /// Appends a parameter after the existing ones.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Returns the first value for a parameter, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if any parameter has this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    /// Returns true if the query is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns an iterator over the parameters in original order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns a copy without any parameter whose name is in `names`.
    #[must_use]
    pub fn without(&self, names: &[&str]) -> Self {
        Self {
            pairs: self
                .pairs
                .iter()
                .filter(|(k, _)| !names.contains(&k.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Returns the order-independent serialization that gets signed.
    ///
    /// Pairs are sorted by name, then value, and form-urlencoded. Two queries
    /// holding the same pairs produce the same string however they were
    /// ordered or escaped on the wire.
    ///
    /// ```
    /// use hsu::QueryParams;
    ///
    /// let a = QueryParams::parse("z=1&a=2&a=1").unwrap();
    /// let b = QueryParams::parse("a=1&z=%31&a=2").unwrap();
    /// assert_eq!(a.canonical(), "a=1&a=2&z=1");
    /// assert_eq!(a.canonical(), b.canonical());
    /// ```
    #[must_use]
    pub fn canonical(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.pairs.iter().collect();
        sorted.sort();
        encode(sorted.into_iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

fn decode(component: &str, query: &str) -> Result<String, UrlError> {
    percent_decode_str(&component.replace('+', " "))
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| UrlError::Invalid {
            input: query.to_string(),
            reason: "query does not decode to UTF-8".to_string(),
        })
}

fn encode<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self.iter()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
