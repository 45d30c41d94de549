//! Errors raised while reading callback query strings.
//!
//! Signature verification only fails, as opposed to returning `false`, when
//! the signed message cannot be percent-decoded.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::auth::oauth::DecodingError;
//!
//! let error = DecodingError::MalformedEscape { position: 4 };
//! assert_eq!(
//!     error.to_string(),
//!     "Malformed percent-encoding at byte 4 of the query string"
//! );
//! ```

use thiserror::Error;

/// A query string could not be percent-decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodingError {
    /// A `%` was not followed by two hexadecimal digits.
    #[error("Malformed percent-encoding at byte {position} of the query string")]
    MalformedEscape {
        /// Byte offset of the offending `%`.
        position: usize,
    },

    /// The decoded bytes are not valid UTF-8.
    #[error("Decoded query string is not valid UTF-8")]
    InvalidUtf8,
}

// Verify DecodingError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DecodingError>();
};
