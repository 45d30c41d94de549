//! The platform client seam.
//!
//! The [`Installer`](crate::Installer) and the
//! [`SubscriptionRegistrar`](crate::webhooks::SubscriptionRegistrar) only talk
//! to Shopify through [`PlatformClient`], so tests can substitute a fake.

use std::fmt;

use serde::Deserialize;

use crate::auth::AuthScopes;
use crate::clients::PlatformError;
use crate::config::ShopDomain;
use crate::webhooks::{Subscription, SubscriptionFilter, SubscriptionSpec};

/// The token returned by the authorization code exchange.
///
/// The `Debug` implementation masks the token.
///
/// # Example
///
/// ```rust
/// use shopify_app::clients::AccessToken;
///
/// let token = AccessToken::new("shpat_secret", "write_products".parse().unwrap());
/// assert_eq!(token.access_token, "shpat_secret");
/// assert!(!format!("{token:?}").contains("shpat_secret"));
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    /// The offline access token.
    pub access_token: String,
    /// The scopes Shopify granted.
    #[serde(default)]
    pub scope: AuthScopes,
}

impl AccessToken {
    /// Creates a token with the granted scopes.
    #[must_use]
    pub fn new(access_token: impl Into<String>, scope: AuthScopes) -> Self {
        Self {
            access_token: access_token.into(),
            scope,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"*****")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Calls the installer makes against the Shopify API.
///
/// Every method sends a single request; none of them retry.
#[async_trait::async_trait]
pub trait PlatformClient: Send + Sync {
    /// Exchanges a one-time authorization `code` for an offline access token.
    async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<AccessToken, PlatformError>;

    /// Lists the webhook subscriptions of `shop` matching `filter`.
    async fn list_subscriptions(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>, PlatformError>;

    /// Fetches one webhook subscription by id.
    async fn get_subscription(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        id: u64,
    ) -> Result<Subscription, PlatformError>;

    /// Creates a webhook subscription.
    async fn create_subscription(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        spec: &SubscriptionSpec,
    ) -> Result<Subscription, PlatformError>;

    /// Deletes a webhook subscription by id.
    async fn delete_subscription(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        id: u64,
    ) -> Result<(), PlatformError>;
}
