//! Order-preserving query string handling for the OAuth endpoints.
//!
//! Shopify signs the callback over the parameters in the order it sent them,
//! so the query string is kept as a list of raw `key=value` pairs instead of
//! a map. Values are only percent-decoded when read.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::auth::oauth::{CallbackRequest, QueryParams};
//!
//! let params = QueryParams::parse("shop=my-store.myshopify.com&code=abc&hmac=00ff");
//! assert_eq!(params.to_signable_string(), "shop=my-store.myshopify.com&code=abc");
//!
//! let request = CallbackRequest::new(params);
//! assert_eq!(request.code().as_deref(), Some("abc"));
//! ```

use crate::auth::oauth::{DecodingError, StateParam};
use std::borrow::Cow;
use std::fmt;

/// Keys excluded from the signed message.
const SIGNATURE_KEYS: [&str; 2] = ["hmac", "signature"];

/// Percent-decodes a query string fragment, treating `+` as a space.
///
/// # Errors
///
/// Returns [`DecodingError::MalformedEscape`] if a `%` is not followed by two
/// hex digits, or [`DecodingError::InvalidUtf8`] if the decoded bytes are not
/// UTF-8.
pub fn percent_decode(input: &str) -> Result<String, DecodingError> {
    let bytes = input.as_bytes();
    let mut start = 0;
    while let Some(offset) = bytes[start..].iter().position(|&b| b == b'%') {
        let position = start + offset;
        let well_formed = bytes
            .get(position + 1..position + 3)
            .is_some_and(|digits| digits.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(DecodingError::MalformedEscape { position });
        }
        start = position + 3;
    }

    let spaced = input.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .map_err(|_| DecodingError::InvalidUtf8)
}

fn decode_lossy(input: &str) -> Cow<'_, str> {
    percent_decode(input).map_or(Cow::Borrowed(input), Cow::Owned)
}

/// Query parameters in the order they appeared on the request.
///
/// Duplicate keys are kept. [`get`](Self::get) returns the first value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Splits a raw (still percent-encoded) query string into pairs.
    ///
    /// A leading `?` is ignored, empty segments are skipped, and a segment
    /// without `=` is kept as a key with an empty value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = raw
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
                (key.to_string(), value.to_string())
            })
            .collect();

        Self { pairs }
    }

    /// Builds parameters from decoded pairs, percent-encoding each one.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(key, value)| {
                (
                    urlencoding::encode(key.as_ref()).into_owned(),
                    urlencoding::encode(value.as_ref()).into_owned(),
                )
            })
            .collect();

        Self { pairs }
    }

    /// Appends a decoded pair to the end of the list.
    pub fn push(&mut self, key: &str, value: &str) {
        self.pairs.push((
            urlencoding::encode(key).into_owned(),
            urlencoding::encode(value).into_owned(),
        ));
    }

    /// Returns the decoded value of the first pair named `key`.
    ///
    /// A value with broken percent-encoding is returned as received.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.pairs
            .iter()
            .find(|(k, _)| decode_lossy(k) == key)
            .map(|(_, v)| decode_lossy(v).into_owned())
    }

    /// Returns `true` if a pair named `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| decode_lossy(k) == key)
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over the raw (percent-encoded) pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns every pair except `hmac` and `signature` as `key=value`
    /// joined by `&`, in the original order and still percent-encoded.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        self.pairs
            .iter()
            .filter(|(k, _)| {
                let key = decode_lossy(k);
                !SIGNATURE_KEYS.contains(&&*key)
            })
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A request to start the install flow for a shop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationRequest {
    params: QueryParams,
}

impl AuthorizationRequest {
    /// Wraps the inbound query parameters.
    #[must_use]
    pub const fn new(params: QueryParams) -> Self {
        Self { params }
    }

    /// Parses the request from a raw query string.
    #[must_use]
    pub fn from_query(raw: &str) -> Self {
        Self::new(QueryParams::parse(raw))
    }

    /// The `shop` parameter, if present and non-empty.
    #[must_use]
    pub fn shop(&self) -> Option<String> {
        non_empty(self.params.get("shop"))
    }

    /// The full parameter list.
    #[must_use]
    pub const fn params(&self) -> &QueryParams {
        &self.params
    }
}

/// The redirect Shopify sends back after the merchant consents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackRequest {
    params: QueryParams,
}

impl CallbackRequest {
    /// Wraps the inbound query parameters.
    #[must_use]
    pub const fn new(params: QueryParams) -> Self {
        Self { params }
    }

    /// Parses the callback from a raw query string.
    #[must_use]
    pub fn from_query(raw: &str) -> Self {
        Self::new(QueryParams::parse(raw))
    }

    /// The `shop` parameter, if present and non-empty.
    #[must_use]
    pub fn shop(&self) -> Option<String> {
        non_empty(self.params.get("shop"))
    }

    /// The authorization `code`, if present and non-empty.
    #[must_use]
    pub fn code(&self) -> Option<String> {
        non_empty(self.params.get("code"))
    }

    /// The hex-encoded `hmac` signature, if present.
    #[must_use]
    pub fn hmac(&self) -> Option<String> {
        self.params.get("hmac")
    }

    /// The `state` value Shopify echoed back.
    #[must_use]
    pub fn state(&self) -> Option<StateParam> {
        non_empty(self.params.get("state")).map(StateParam::from_raw)
    }

    /// The full parameter list, including `hmac`.
    #[must_use]
    pub const fn params(&self) -> &QueryParams {
        &self.params
    }
}
