//! URLs as seen by the signer and verifier.

use std::fmt;
use std::str::FromStr;

use url::{Position, Url};

use crate::error::UrlError;
use crate::query::QueryParams;

/// Base used to resolve origin-relative inputs. Never appears in output.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// How the input was written, so output keeps the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// `https://host/path?query#fragment`
    Absolute,
    /// `//host/path?query#fragment`
    SchemeRelative,
    /// `/path?query#fragment`
    PathRelative,
}

/// A parsed URL that can be canonicalized and extended with parameters.
///
/// Only the path and query take part in signing. Scheme, host and fragment
/// are carried through untouched so the caller gets back a URL of the same
/// shape it handed in.
///
/// # Example
///
/// ```
/// use hsu::SignableUrl;
///
/// let url = SignableUrl::parse("https://example.com/reset?user=42#top").unwrap();
/// assert_eq!(url.path(), "/reset");
/// assert_eq!(url.canonicalize(&[]), "/reset?user=42");
///
/// let relative = SignableUrl::parse("/reset?user=42").unwrap();
/// assert_eq!(relative.to_string(), "/reset?user=42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableUrl {
    url: Url,
    shape: Shape,
}

impl SignableUrl {
    /// Parses an absolute, scheme-relative or origin-relative URL.
    ///
    /// A relative path without a leading slash is resolved against the root,
    /// so `reset?x=1` becomes `/reset?x=1`.
    ///
    /// Input starting with `//` is always scheme-relative: its first segment
    /// is the host, which is not signed. `//reset?x=1` therefore has host
    /// `reset` and path `/`, and signs the same as `/?x=1`. Pass request
    /// targets whose path may begin with `//` with an explicit scheme and
    /// host instead.
    ///
    /// # Errors
    ///
    /// Returns `UrlError::Empty` for blank input and `UrlError::Invalid` if the
    /// URL cannot be parsed, has no hierarchical path, or has a query that
    /// does not decode to UTF-8.
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        if input.trim().is_empty() {
            return Err(UrlError::Empty);
        }

        let invalid = |reason: String| UrlError::Invalid {
            input: input.to_string(),
            reason,
        };

        let (url, shape) = match Url::parse(input) {
            Ok(url) => (url, Shape::Absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let url = Url::parse(RELATIVE_BASE)
                    .and_then(|base| base.join(input))
                    .map_err(|e| invalid(e.to_string()))?;
                let shape = if input.starts_with("//") {
                    Shape::SchemeRelative
                } else {
                    Shape::PathRelative
                };
                (url, shape)
            }
            Err(e) => return Err(invalid(e.to_string())),
        };

        if url.cannot_be_a_base() {
            return Err(invalid("URL has no hierarchical path to sign".to_string()));
        }
        if let Some(query) = url.query() {
            QueryParams::parse(query)
                .map_err(|_| invalid("query does not decode to UTF-8".to_string()))?;
        }

        Ok(Self { url, shape })
    }

    /// Returns the percent-encoded path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Returns the query parameters in their original order.
    #[must_use]
    pub fn query(&self) -> QueryParams {
        // Checked in `parse`; appended pairs are always UTF-8.
        self.url
            .query()
            .and_then(|query| QueryParams::parse(query).ok())
            .unwrap_or_default()
    }

    /// Returns the first value of a query parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<String> {
        self.query().get(name).map(str::to_string)
    }

    /// Returns the fragment, if present.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment()
    }

    /// Returns the string that is signed and verified.
    ///
    /// This is the path, followed by `?` and the canonical query when any
    /// parameter remains after dropping those named in `exclude`.
    #[must_use]
    pub fn canonicalize(&self, exclude: &[&str]) -> String {
        let query = self.query().without(exclude);
        if query.is_empty() {
            self.path().to_string()
        } else {
            format!("{}?{}", self.path(), query.canonical())
        }
    }

    /// Returns a copy with every parameter named in `names` removed.
    ///
    /// The query is left byte-for-byte alone when none of them are present.
    #[must_use]
    pub fn without_params(&self, names: &[&str]) -> Self {
        let query = self.query();
        if !names.iter().any(|name| query.contains(name)) {
            return self.clone();
        }

        let rest = query.without(names);
        let mut stripped = self.clone();
        if rest.is_empty() {
            stripped.url.set_query(None);
        } else {
            stripped.url.set_query(Some(&rest.to_string()));
        }
        stripped
    }

    /// Appends a parameter to the query, ahead of any fragment.
    pub fn append_param(&mut self, name: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(name, value);
    }
}

impl fmt::Display for SignableUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            Shape::Absolute => f.write_str(self.url.as_str()),
            Shape::SchemeRelative => write!(f, "//{}", &self.url[Position::BeforeUsername..]),
            Shape::PathRelative => f.write_str(&self.url[Position::BeforePath..]),
        }
    }
}

impl FromStr for SignableUrl {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonicalizes `url`, dropping the parameters named in `exclude`.
///
/// # Errors
///
/// Returns `UrlError` if `url` cannot be parsed.
///
/// # Example
///
/// ```
/// use hsu::canonicalize;
///
/// let canonical = canonicalize("/reset?user=42&signature=abc", &["signature"]).unwrap();
/// assert_eq!(canonical, "/reset?user=42");
/// ```
pub fn canonicalize(url: &str, exclude: &[&str]) -> Result<String, UrlError> {
    Ok(SignableUrl::parse(url)?.canonicalize(exclude))
}
