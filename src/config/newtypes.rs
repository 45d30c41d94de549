//! Configuration values that are checked once, when they are created.
//!
//! An [`AppConfig`](crate::AppConfig) built from these can never hold a blank
//! credential, a shop outside `myshopify.com`, or a URL without a host.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Range;

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into().trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// The app's OAuth client id, sent as `client_id`.
///
/// # Example
///
/// ```rust
/// use shopify_app::ApiKey;
///
/// let key = ApiKey::new(" 1a2b3c ").unwrap();
/// assert_eq!(key.as_ref(), "1a2b3c");
/// assert!(ApiKey::new("  ").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a client id, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if nothing is left after trimming.
    pub fn new(client_id: impl Into<String>) -> Result<Self, ConfigError> {
        non_blank(client_id).map(Self).ok_or(ConfigError::EmptyApiKey)
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The app's OAuth client secret.
///
/// It keys the callback HMAC and authenticates the code exchange, so it is
/// never printed: `Debug` renders `ApiSecretKey(*****)`.
///
/// # Example
///
/// ```rust
/// use shopify_app::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("shpss_0123").unwrap();
/// assert_eq!(format!("{secret:?}"), "ApiSecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Wraps a client secret, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] if nothing is left after
    /// trimming.
    pub fn new(client_secret: impl Into<String>) -> Result<Self, ConfigError> {
        non_blank(client_secret)
            .map(Self)
            .ok_or(ConfigError::EmptyApiSecretKey)
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// A shop's `*.myshopify.com` domain, the key credentials are stored under.
///
/// Input is trimmed and lowercased. A bare shop name such as `my-store`
/// becomes `my-store.myshopify.com`; any other dotted host is rejected, so
/// consent redirects and token exchanges only ever go to Shopify.
///
/// # Example
///
/// ```rust
/// use shopify_app::ShopDomain;
///
/// let domain = ShopDomain::new("My-Store").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// assert_eq!(domain.shop_name(), "my-store");
///
/// assert!(ShopDomain::new("evil.example.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShopDomain(String);

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Validates and normalizes a shop domain or bare shop name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] for blank input, a host
    /// outside `myshopify.com`, or a shop name with characters other than
    /// lowercase letters, digits and inner hyphens.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into().trim().to_lowercase();

        let name = match domain.strip_suffix(Self::SUFFIX) {
            Some(name) => name,
            None if domain.contains('.') => "",
            None => &domain,
        };

        let valid = !name.is_empty()
            && !name.starts_with('-')
            && !name.ends_with('-')
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid {
            return Err(ConfigError::InvalidShopDomain { domain });
        }

        Ok(Self(format!("{name}{}", Self::SUFFIX)))
    }

    /// The part before `.myshopify.com`.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        self.0.strip_suffix(Self::SUFFIX).unwrap_or(&self.0)
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(de::Error::custom)
    }
}

/// An absolute base URL: the app's public server URL, or a proxy in front of
/// the Shopify API.
///
/// # Example
///
/// ```rust
/// use shopify_app::HostUrl;
///
/// let url = HostUrl::new("https://myapp.example.com/").unwrap();
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), Some("myapp.example.com"));
/// assert_eq!(url.join("/callback"), "https://myapp.example.com/callback");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostUrl {
    url: String,
    host: Range<usize>,
}

impl HostUrl {
    /// Parses `scheme://host[:port][/path]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] if the scheme is missing or not
    /// alphabetic, or the host is empty.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().to_string();
        let invalid = || ConfigError::InvalidHostUrl { url: url.clone() };

        let (scheme, rest) = url.split_once("://").ok_or_else(invalid)?;
        if scheme.is_empty() || !scheme.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let start = scheme.len() + 3;
        let len = rest.find([':', '/', '?', '#']).unwrap_or(rest.len());
        if len == 0 {
            return Err(invalid());
        }

        Ok(Self {
            host: start..start + len,
            url,
        })
    }

    /// The scheme, e.g. `https`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.host.start - 3]
    }

    /// The host, without port or path.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        self.url.get(self.host.clone())
    }

    /// Appends `path` to the URL without doubling the `/` between them.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl AsRef<str> for HostUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}
