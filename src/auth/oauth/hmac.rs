//! HMAC verification of OAuth callbacks.
//!
//! Shopify signs the callback query with the app's secret. The signed message
//! is every parameter except `hmac` and `signature`, written as `key=value`
//! pairs joined by `&` in the order they were received, then percent-decoded.
//! The `hmac` parameter carries the hex-encoded HMAC-SHA256 of that message.
//!
//! # Security
//!
//! Digests are compared in constant time.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::auth::oauth::hmac::{compute_signature, verify};
//! use shopify_app::auth::oauth::QueryParams;
//!
//! let secret = "hush";
//! let message = "code=0907a61c0c8d55e99db179b68161bc00&shop=some-shop.myshopify.com&timestamp=1337178173";
//! let raw = format!("{message}&hmac={}", compute_signature(message, secret));
//!
//! let params = QueryParams::parse(&raw);
//! assert_eq!(verify(&params, secret), Ok(true));
//! assert_eq!(verify(&params, "other-secret"), Ok(false));
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::query::percent_decode;
use crate::auth::oauth::{DecodingError, QueryParams};

type HmacSha256 = Hmac<Sha256>;

fn digest(message: &[u8], secret: &str) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Computes the lowercase hex HMAC-SHA256 of `message` keyed by `secret`.
///
/// # Example
///
/// ```rust
/// use shopify_app::auth::oauth::hmac::compute_signature;
///
/// let sig = compute_signature("test-message", "secret-key");
/// assert_eq!(sig.len(), 64);
/// ```
#[must_use]
pub fn compute_signature(message: &str, secret: &str) -> String {
    hex::encode(digest(message.as_bytes(), secret))
}

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Verifies the `hmac` parameter of a callback.
///
/// Returns `Ok(true)` only when the decoded `hmac` equals the digest of the
/// signed message. A missing, empty or non-hex `hmac` yields `Ok(false)`.
///
/// # Errors
///
/// Returns [`DecodingError`] when the signed message has malformed
/// percent-encoding or does not decode to UTF-8.
pub fn verify(params: &QueryParams, secret: &str) -> Result<bool, DecodingError> {
    let message = percent_decode(&params.to_signable_string())?;

    let Some(received) = params.get("hmac").filter(|h| !h.is_empty()) else {
        return Ok(false);
    };
    let Ok(received) = hex::decode(received) else {
        return Ok(false);
    };

    let expected = digest(message.as_bytes(), secret);
    Ok(expected.as_slice().ct_eq(received.as_slice()).into())
}
