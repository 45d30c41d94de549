//! The persisted credential of an installed shop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The access token granted to the app for one shop.
///
/// There is at most one live record per shop. The store assigns `id` and the
/// timestamps when the record is saved.
///
/// # Example
///
/// ```rust
/// use shopify_app::store::AuthorizationRecord;
///
/// let record = AuthorizationRecord::new("my-store.myshopify.com", "shpat_token");
/// assert!(!record.is_empty());
/// assert!(record.id.is_none());
/// assert!(AuthorizationRecord::default().is_empty());
///
/// // The token is never printed
/// assert!(!format!("{record:?}").contains("shpat_token"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    /// Store-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// The shop domain, e.g. `my-store.myshopify.com`.
    pub shop: String,
    /// The offline access token for the shop.
    pub access_token: String,
    /// When the record was first saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// When the record was soft-deleted, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AuthorizationRecord {
    /// Creates an unsaved record.
    #[must_use]
    pub fn new(shop: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            shop: shop.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if every field is unset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.shop.is_empty()
            && self.access_token.is_empty()
            && self.created_at.is_none()
            && self.updated_at.is_none()
            && self.deleted_at.is_none()
    }

    /// Returns `true` if the record has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Assigns an id if none is set.
    pub fn set_id(&mut self) {
        if self.id.is_none() {
            self.id = Some(Uuid::new_v4());
        }
    }

    /// Stamps `updated_at`, and `created_at` the first time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.updated_at = Some(now);
    }
}

impl fmt::Debug for AuthorizationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationRecord")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("access_token", &"*****")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deleted_at", &self.deleted_at)
            .finish()
    }
}
