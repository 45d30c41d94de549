//! Errors returned by the platform client.
//!
//! - [`PlatformError::Response`]: Shopify answered with a non-2xx status
//! - [`PlatformError::Network`]: the request could not be sent or timed out
//! - [`PlatformError::Decode`]: a 2xx body did not have the expected shape
//!
//! # Example
//!
//! ```rust
//! use shopify_app::clients::PlatformError;
//!
//! let error = PlatformError::Response {
//!     code: 400,
//!     message: "The authorization code was not found or was already used".to_string(),
//! };
//! assert_eq!(error.status(), Some(400));
//! ```

use thiserror::Error;

/// Failure of a single request to the Shopify API.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Shopify returned a non-2xx status.
    #[error("Shopify responded with status {code}: {message}")]
    Response {
        /// The HTTP status code.
        code: u16,
        /// The error message extracted from the response body.
        message: String,
    },

    /// Network or connection error, including timeouts.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Failed to decode Shopify response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PlatformError {
    /// Returns the HTTP status for [`PlatformError::Response`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response { code, .. } => Some(*code),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }

    /// Extracts a readable message from an error body.
    ///
    /// Shopify reports errors as `{"errors": ...}` (a string, list or map) or
    /// as `{"error": ..., "error_description": ...}`. Anything else is
    /// returned as received.
    #[must_use]
    pub fn message_from_body(body: &str) -> String {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
            return body.trim().to_string();
        };

        if let Some(errors) = value.get("errors") {
            return errors
                .as_str()
                .map_or_else(|| errors.to_string(), ToString::to_string);
        }

        match (
            value.get("error").and_then(serde_json::Value::as_str),
            value
                .get("error_description")
                .and_then(serde_json::Value::as_str),
        ) {
            (Some(error), Some(description)) => format!("{error}: {description}"),
            (Some(error), None) => error.to_string(),
            _ => body.trim().to_string(),
        }
    }
}

// Verify PlatformError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PlatformError>();
};
