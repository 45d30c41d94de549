//! Startup configuration errors.
//!
//! Everything that can be wrong with an [`AppConfig`](crate::AppConfig) is
//! reported through [`ConfigError`] before the server binds, whether the
//! configuration came from the builder or from the process environment.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::{ConfigError, ShopDomain};
//!
//! let error = ShopDomain::new("shop.example.com").unwrap_err();
//! assert!(matches!(error, ConfigError::InvalidShopDomain { .. }));
//! ```

use thiserror::Error;

/// Why an [`AppConfig`](crate::AppConfig) or one of its parts was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The client id was blank.
    #[error("client id is empty; set SHOPIFY_CLIENT_ID to the app's API key")]
    EmptyApiKey,

    /// The client secret was blank.
    #[error("client secret is empty; set SHOPIFY_CLIENT_SECRET to the app's API secret")]
    EmptyApiSecretKey,

    /// Not a `myshopify.com` shop.
    #[error("'{domain}' is not a shop domain (use 'my-store' or 'my-store.myshopify.com')")]
    InvalidShopDomain {
        /// The rejected input, lowercased.
        domain: String,
    },

    /// Not a `YYYY-MM` release or `unstable`.
    #[error("'{version}' is not an Admin API version (use YYYY-MM, e.g. 2023-07, or 'unstable')")]
    InvalidApiVersion {
        /// The rejected input.
        version: String,
    },

    /// The scope list could not be parsed.
    #[error("bad scope list: {reason}")]
    InvalidScopes {
        /// What was wrong with it.
        reason: String,
    },

    /// [`AppConfigBuilder::build`](crate::AppConfigBuilder::build) was called
    /// before a required setter.
    #[error("'{field}' is required but was not set on the builder")]
    MissingRequiredField {
        /// The builder setter that was skipped.
        field: &'static str,
    },

    /// A required environment variable is unset or blank.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// The variable.
        name: &'static str,
    },

    /// Not an absolute `scheme://host` URL.
    #[error("'{url}' is not an absolute URL (expected e.g. 'https://myapp.example.com')")]
    InvalidHostUrl {
        /// The rejected input.
        url: String,
    },

    /// A route path does not start with `/`, or has path parameters.
    #[error("{field} '{path}' must be a literal path starting with '/'")]
    InvalidPath {
        /// The configuration field the path was given for.
        field: &'static str,
        /// The rejected path.
        path: String,
    },

    /// A route is already served for the same HTTP method.
    #[error("{field} '{path}' is already served by another GET route")]
    RouteConflict {
        /// The configuration field the path was given for.
        field: &'static str,
        /// The conflicting path.
        path: String,
    },
}
