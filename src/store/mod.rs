//! Persistence of shop credentials.
//!
//! The install flow only needs to look a shop up and save the token it was
//! granted. [`CredentialStore`] is the seam; [`InMemoryCredentialStore`] is
//! the implementation the binary ships with.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use shopify_app::store::{CredentialStore, InMemoryCredentialStore};
//!
//! let store: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());
//! ```

mod memory;
mod record;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ShopDomain;

pub use memory::InMemoryCredentialStore;
pub use record::AuthorizationRecord;

/// Failure of a credential store operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("Credential store unavailable: {reason}")]
    Unavailable {
        /// What went wrong.
        reason: String,
    },

    /// The record is missing a required field.
    #[error("Invalid authorization record: {reason}")]
    InvalidRecord {
        /// Which field is missing.
        reason: String,
    },
}

// Verify StoreError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StoreError>();
};

/// Storage for [`AuthorizationRecord`]s, keyed by shop domain.
///
/// Implementations must keep at most one non-deleted record per shop.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the live record for `shop`, if any.
    async fn find_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<AuthorizationRecord>, StoreError>;

    /// Inserts or replaces the record for `record.shop`.
    ///
    /// Assigns an id when absent, sets `created_at` on first save and
    /// `updated_at` on every save. Returns the stored record.
    async fn save(&self, record: AuthorizationRecord) -> Result<AuthorizationRecord, StoreError>;

    /// Returns every live record.
    async fn find_all(&self) -> Result<Vec<AuthorizationRecord>, StoreError>;
}
