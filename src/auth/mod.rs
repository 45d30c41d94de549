//! Authorization types.
//!
//! - [`AuthScopes`]: an ordered list of OAuth scopes with implied scope handling
//! - [`oauth`]: the authorization code handshake (consent URL, callback
//!   parsing, HMAC verification)

pub mod oauth;
mod scopes;

pub use scopes::AuthScopes;
