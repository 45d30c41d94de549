//! Client layer for the Shopify API.
//!
//! # Overview
//!
//! - [`PlatformClient`]: the calls the install flow makes against Shopify
//! - [`ShopifyClient`]: the `reqwest` implementation of [`PlatformClient`]
//! - [`AccessToken`]: the result of the authorization code exchange
//! - [`PlatformError`]: failure of a single request
//!
//! # Retry Behavior
//!
//! None. Each call sends exactly one request and reports the first failure.
//! Timeouts are configured through
//! [`AppConfigBuilder::request_timeout`](crate::AppConfigBuilder::request_timeout).

mod errors;
mod http_client;
mod platform;

pub use errors::PlatformError;
pub use http_client::{ShopifyClient, SDK_VERSION};
pub use platform::{AccessToken, PlatformClient};
