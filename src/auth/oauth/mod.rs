//! The OAuth authorization code handshake.
//!
//! 1. **Consent redirect** ([`begin_auth`]): build the URL on the shop's admin
//!    where the merchant approves the requested scopes.
//! 2. **Callback** ([`CallbackRequest`]): Shopify redirects back with a
//!    one-time `code` and an `hmac` over the other parameters, checked with
//!    [`hmac::verify`].
//!
//! Exchanging the code for a token is done by the
//! [`PlatformClient`](crate::clients::PlatformClient), and the whole flow is
//! driven by the [`Installer`](crate::Installer).
//!
//! # Security Features
//!
//! - **HMAC Validation**: callbacks are verified with HMAC-SHA256 over the
//!   parameters in the order they were received
//! - **Constant-Time Comparison**: digests are compared in constant time
//! - **Host Pinning**: only `*.myshopify.com` shops are redirected to
//!
//! # Example
//!
//! ```rust
//! use shopify_app::auth::oauth::{hmac, CallbackRequest};
//!
//! let secret = "hush";
//! let message = "code=abc&shop=my-store.myshopify.com&state=xyz";
//! let query = format!("{message}&hmac={}", hmac::compute_signature(message, secret));
//!
//! let callback = CallbackRequest::from_query(&query);
//! assert_eq!(hmac::verify(callback.params(), secret), Ok(true));
//! ```

mod begin_auth;
mod error;
pub mod hmac;
mod query;
mod state;

pub use begin_auth::{begin_auth, BeginAuthResult};
pub use error::DecodingError;
pub use query::{percent_decode, AuthorizationRequest, CallbackRequest, QueryParams};
pub use state::StateParam;
