//! Webhook registration errors.
//!
//! A [`RegistrationError`] belongs to a single topic. It is logged and
//! reported in the install outcome but never fails the install itself.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::clients::PlatformError;
//! use shopify_app::webhooks::RegistrationError;
//!
//! let error: RegistrationError = PlatformError::Response {
//!     code: 422,
//!     message: "address for this topic has already been taken".to_string(),
//! }
//! .into();
//! assert!(error.to_string().contains("already been taken"));
//! ```

use crate::clients::PlatformError;
use thiserror::Error;

/// Failure to create the subscription for one topic.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Shopify rejected the subscription or could not be reached.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The registration task panicked or was cancelled before reporting.
    #[error("Registration task failed: {reason}")]
    TaskFailed {
        /// The join error reported by the runtime.
        reason: String,
    },
}

/// A topic name that is not one of the modelled topics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown webhook topic '{topic}'")]
pub struct UnknownTopicError {
    /// The unrecognized topic name.
    pub topic: String,
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RegistrationError>();
    assert_send_sync::<UnknownTopicError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_message_is_transparent() {
        let error = RegistrationError::from(PlatformError::Response {
            code: 401,
            message: "Invalid API key or access token".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Shopify responded with status 401: Invalid API key or access token"
        );
    }

    #[test]
    fn test_task_failed_includes_reason() {
        let error = RegistrationError::TaskFailed {
            reason: "task 7 panicked".to_string(),
        };
        assert!(error.to_string().contains("task 7 panicked"));
    }

    #[test]
    fn test_unknown_topic_message() {
        let error = UnknownTopicError {
            topic: "orders/create".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown webhook topic 'orders/create'");
    }
}
