//! In-process [`CredentialStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::config::ShopDomain;
use crate::store::{AuthorizationRecord, CredentialStore, StoreError};

/// A [`CredentialStore`] backed by a `HashMap` keyed by shop domain.
///
/// Records are lost when the process exits. Saving a record for a shop that
/// already has one replaces it, keeping the original `id` and `created_at`.
///
/// # Example
///
/// ```rust
/// use shopify_app::store::{AuthorizationRecord, CredentialStore, InMemoryCredentialStore};
/// use shopify_app::ShopDomain;
///
/// # tokio_test_block_on(async {
/// let store = InMemoryCredentialStore::new();
/// let saved = store
///     .save(AuthorizationRecord::new("my-store.myshopify.com", "token"))
///     .await
///     .unwrap();
/// assert!(saved.id.is_some());
///
/// let shop = ShopDomain::new("my-store").unwrap();
/// let found = store.find_by_shop(&shop).await.unwrap();
/// assert_eq!(found.unwrap().access_token, "token");
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<String, AuthorizationRecord>>,
}

// Verify InMemoryCredentialStore is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InMemoryCredentialStore>();
};

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records, deleted ones included.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if nothing has been saved.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<AuthorizationRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(shop.as_ref())
            .filter(|record| !record.is_deleted())
            .cloned())
    }

    async fn save(&self, mut record: AuthorizationRecord) -> Result<AuthorizationRecord, StoreError> {
        if record.shop.is_empty() {
            return Err(StoreError::InvalidRecord {
                reason: "shop is empty".to_string(),
            });
        }
        if record.access_token.is_empty() {
            return Err(StoreError::InvalidRecord {
                reason: "access token is empty".to_string(),
            });
        }

        let mut records = self.records.write().await;

        if let Some(existing) = records.get(&record.shop).filter(|r| !r.is_deleted()) {
            if record.id.is_none() {
                record.id = existing.id;
            }
            if record.created_at.is_none() {
                record.created_at = existing.created_at;
            }
        }

        record.set_id();
        record.touch(Utc::now());
        records.insert(record.shop.clone(), record.clone());

        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<AuthorizationRecord>, StoreError> {
        let records = self.records.read().await;
        let mut all: Vec<_> = records
            .values()
            .filter(|record| !record.is_deleted())
            .cloned()
            .collect();
        all.sort_by(|a, b| a.shop.cmp(&b.shop));
        Ok(all)
    }
}
