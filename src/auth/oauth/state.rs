//! The `state` nonce carried through the consent redirect.
//!
//! A fresh [`StateParam`] is generated for every authorization request and
//! embedded in the consent URL. Shopify echoes it back on the callback.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

/// Opaque nonce embedded in the consent URL.
///
/// # Example
///
/// ```rust
/// use shopify_app::auth::oauth::StateParam;
///
/// let state = StateParam::new();
/// assert_eq!(state.as_ref().len(), 15);
/// assert!(state.as_ref().chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateParam(String);

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};

impl StateParam {
    /// Length of generated nonces.
    pub const NONCE_LENGTH: usize = 15;

    /// Generates a new random alphanumeric nonce.
    #[must_use]
    pub fn new() -> Self {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LENGTH)
            .map(char::from)
            .collect();

        Self(nonce)
    }

    /// Wraps a state value received on a callback.
    #[must_use]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
