//! The authorization handshake.
//!
//! [`Installer`] drives the two requests of the install flow:
//!
//! 1. [`Installer::begin_authorization`] validates the shop and builds the
//!    consent URL the merchant is redirected to
//! 2. [`Installer::complete_authorization`] verifies the callback signature,
//!    exchanges the code for an access token, stores it and registers the
//!    app's webhooks
//!
//! A shop that already has stored credentials is not exchanged again; the
//! callback only lists its subscriptions for diagnostics.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use shopify_app::{AppConfig, ApiKey, ApiSecretKey, HostUrl, Installer};
//! use shopify_app::auth::oauth::AuthorizationRequest;
//! use shopify_app::clients::ShopifyClient;
//! use shopify_app::store::InMemoryCredentialStore;
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("client-id").unwrap())
//!     .api_secret_key(ApiSecretKey::new("client-secret").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .build()
//!     .unwrap();
//! let platform = ShopifyClient::new(&config).unwrap();
//!
//! let installer = Installer::new(
//!     Arc::new(config),
//!     Arc::new(InMemoryCredentialStore::new()),
//!     Arc::new(platform),
//! );
//!
//! let request = AuthorizationRequest::from_query("shop=my-store.myshopify.com");
//! let result = installer.begin_authorization(&request).unwrap();
//! assert!(result.auth_url.starts_with("https://my-store.myshopify.com/admin/oauth/authorize?"));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::auth::oauth::{
    self, hmac, AuthorizationRequest, BeginAuthResult, CallbackRequest, DecodingError,
};
use crate::clients::{PlatformClient, PlatformError};
use crate::config::{AppConfig, ShopDomain};
use crate::store::{AuthorizationRecord, CredentialStore, StoreError};
use crate::webhooks::{
    RegistrationOutcome, RegistrationSummary, Subscription, SubscriptionFilter,
    SubscriptionRegistrar, Topic,
};

/// Why an install request was rejected.
#[derive(Debug, Error)]
pub enum InstallError {
    /// A required parameter is missing or malformed.
    #[error("{reason}")]
    Validation {
        /// What is wrong with the request.
        reason: String,
    },

    /// The callback's `hmac` does not match its parameters.
    #[error("HMAC signature does not match the request parameters")]
    Signature,

    /// The callback query string is not validly percent-encoded.
    #[error(transparent)]
    Decoding(#[from] DecodingError),

    /// Shopify rejected the authorization code or could not be reached.
    #[error("Failed to exchange authorization code: {0}")]
    Exchange(#[source] PlatformError),

    /// The credential store failed.
    #[error("Failed to persist credentials: {0}")]
    Persistence(#[from] StoreError),

    /// The install task was cancelled before it finished.
    #[error("Install was interrupted before it completed")]
    Interrupted,
}

// Verify InstallError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InstallError>();
};

impl InstallError {
    fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// The HTTP status the error is reported with.
    ///
    /// Only persistence failures and interrupted installs are server errors.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Persistence(_) | Self::Interrupted => 500,
            _ => 400,
        }
    }
}

/// Result of a successful callback.
#[derive(Debug)]
pub enum InstallOutcome {
    /// The shop already had credentials; nothing was exchanged or saved.
    AlreadyInstalled {
        /// The stored record.
        record: AuthorizationRecord,
        /// The shop's current subscriptions. Empty if listing failed.
        subscriptions: Vec<Subscription>,
    },
    /// The code was exchanged and the token stored.
    Installed {
        /// The saved record.
        record: AuthorizationRecord,
        /// One outcome per required topic.
        registrations: Vec<RegistrationOutcome>,
    },
}

impl InstallOutcome {
    /// The shop's credential record.
    #[must_use]
    pub const fn record(&self) -> &AuthorizationRecord {
        match self {
            Self::AlreadyInstalled { record, .. } | Self::Installed { record, .. } => record,
        }
    }

    /// Returns `true` if this callback created the credentials.
    #[must_use]
    pub const fn is_new_install(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }
}

enum Credential {
    Existing(AuthorizationRecord),
    Created(AuthorizationRecord),
}

/// Runs the install handshake against injected collaborators.
///
/// # Thread Safety
///
/// `Installer` is `Send + Sync` and is meant to be shared behind an `Arc`.
/// Callbacks for the same shop are serialized from lookup to save, so two
/// concurrent callbacks cannot both exchange a code. A verified callback is
/// carried out on its own task: once the code is being exchanged, dropping
/// the caller does not stop the save or the webhook registration.
pub struct Installer {
    core: Arc<InstallCore>,
}

struct InstallCore {
    config: Arc<AppConfig>,
    store: Arc<dyn CredentialStore>,
    platform: Arc<dyn PlatformClient>,
    registrar: SubscriptionRegistrar,
    shop_locks: Arc<ShopLocks>,
}

// Verify Installer is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Installer>();
};

impl Installer {
    /// Creates an installer. Webhooks are delivered to the configured
    /// [`webhook_address`](AppConfig::webhook_address).
    #[must_use]
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn CredentialStore>,
        platform: Arc<dyn PlatformClient>,
    ) -> Self {
        let registrar =
            SubscriptionRegistrar::new(Arc::clone(&platform), config.webhook_address());
        Self {
            core: Arc::new(InstallCore {
                config,
                store,
                platform,
                registrar,
                shop_locks: Arc::default(),
            }),
        }
    }

    /// The application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.core.config
    }

    /// Builds the consent URL for the shop named in `request`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Validation`] if `shop` is missing, empty or not
    /// a Shopify shop domain.
    pub fn begin_authorization(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<BeginAuthResult, InstallError> {
        let shop = request
            .shop()
            .ok_or_else(|| InstallError::validation("missing \"shop\" parameter"))?;
        let shop = parse_shop(shop)?;

        let result = oauth::begin_auth(&self.core.config, &shop);
        tracing::info!(shop = %shop, "Redirecting to authorization page");
        Ok(result)
    }

    /// Completes the handshake for a callback from Shopify.
    ///
    /// # Errors
    ///
    /// - [`InstallError::Validation`] if `shop` or `code` is missing or `shop`
    ///   is not a Shopify shop domain
    /// - [`InstallError::Decoding`] if the query string is malformed
    /// - [`InstallError::Signature`] if the `hmac` does not verify
    /// - [`InstallError::Exchange`] if Shopify rejects the code
    /// - [`InstallError::Persistence`] if the store fails
    /// - [`InstallError::Interrupted`] if the runtime shut down mid-install
    ///
    /// Webhook registration failures are reported in the outcome and never
    /// fail the call.
    pub async fn complete_authorization(
        &self,
        request: &CallbackRequest,
    ) -> Result<InstallOutcome, InstallError> {
        let shop = request
            .shop()
            .ok_or_else(|| InstallError::validation("missing \"shop\" parameter"))?;
        let code = request
            .code()
            .ok_or_else(|| InstallError::validation("missing \"code\" parameter"))?;

        if !hmac::verify(request.params(), self.core.config.api_secret_key().as_ref())? {
            tracing::warn!(shop = %shop, "Rejected callback with invalid HMAC");
            return Err(InstallError::Signature);
        }

        let shop = parse_shop(shop)?;
        if let Some(state) = request.state() {
            tracing::debug!(shop = %shop, state = %state, "Callback state");
        }

        let core = Arc::clone(&self.core);
        match tokio::spawn(async move { core.install(shop, code).await }).await {
            Ok(result) => result,
            Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
            Err(_) => Err(InstallError::Interrupted),
        }
    }
}

impl InstallCore {
    async fn install(&self, shop: ShopDomain, code: String) -> Result<InstallOutcome, InstallError> {
        let credential = {
            let _lock = self.shop_locks.acquire(&shop).await;
            self.lookup_or_exchange(&shop, &code).await?
        };

        match credential {
            Credential::Existing(record) => {
                let subscriptions = self.list_for_diagnostics(&shop, &record).await;
                tracing::info!(
                    shop = %shop,
                    subscriptions = subscriptions.len(),
                    "Shop already installed"
                );
                Ok(InstallOutcome::AlreadyInstalled {
                    record,
                    subscriptions,
                })
            }
            Credential::Created(record) => {
                let registrations = self
                    .registrar
                    .register_all(&shop, &record.access_token, &Topic::REQUIRED)
                    .await;
                let summary = RegistrationSummary::from_outcomes(&registrations);
                tracing::info!(
                    shop = %shop,
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    "Shop installed"
                );
                Ok(InstallOutcome::Installed {
                    record,
                    registrations,
                })
            }
        }
    }

    /// Finds the shop's record, or exchanges `code` and saves a new one.
    /// Callers hold the shop's lock.
    async fn lookup_or_exchange(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<Credential, InstallError> {
        if let Some(record) = self.store.find_by_shop(shop).await? {
            return Ok(Credential::Existing(record));
        }

        let token = self
            .platform
            .exchange_code(shop, code)
            .await
            .map_err(|error| {
                tracing::error!(shop = %shop, error = %error, "Authorization code exchange failed");
                InstallError::Exchange(error)
            })?;

        if !token.scope.covers(self.config.scopes()) {
            tracing::warn!(
                shop = %shop,
                requested = %self.config.scopes(),
                granted = %token.scope,
                "Granted scopes do not cover the requested scopes"
            );
        }

        let record = self
            .store
            .save(AuthorizationRecord::new(shop.as_ref(), token.access_token))
            .await?;
        Ok(Credential::Created(record))
    }

    async fn list_for_diagnostics(
        &self,
        shop: &ShopDomain,
        record: &AuthorizationRecord,
    ) -> Vec<Subscription> {
        match self
            .platform
            .list_subscriptions(shop, &record.access_token, &SubscriptionFilter::default())
            .await
        {
            Ok(subscriptions) => subscriptions,
            Err(error) => {
                tracing::warn!(shop = %shop, error = %error, "Failed to list webhook subscriptions");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("config", &self.core.config)
            .field("registrar", &self.core.registrar)
            .finish_non_exhaustive()
    }
}

/// Per-shop async locks. A shop's entry lives while someone holds or waits
/// for its lock.
#[derive(Default)]
struct ShopLocks {
    slots: StdMutex<HashMap<String, ShopSlot>>,
}

struct ShopSlot {
    lock: Arc<Mutex<()>>,
    users: usize,
}

impl ShopLocks {
    fn slots(&self) -> MutexGuard<'_, HashMap<String, ShopSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn acquire(self: &Arc<Self>, shop: &ShopDomain) -> ShopLockGuard {
        let lock = {
            let mut slots = self.slots();
            let slot = slots
                .entry(shop.as_ref().to_string())
                .or_insert_with(|| ShopSlot {
                    lock: Arc::default(),
                    users: 0,
                });
            slot.users += 1;
            Arc::clone(&slot.lock)
        };
        // Registered before waiting so a dropped waiter still releases its slot.
        let registration = ShopLockRegistration {
            locks: Arc::clone(self),
            shop: shop.as_ref().to_string(),
        };
        let held = lock.lock_owned().await;

        ShopLockGuard {
            _held: held,
            _registration: registration,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots().len()
    }
}

struct ShopLockRegistration {
    locks: Arc<ShopLocks>,
    shop: String,
}

impl Drop for ShopLockRegistration {
    fn drop(&mut self) {
        let mut slots = self.locks.slots();
        if let Some(slot) = slots.get_mut(&self.shop) {
            slot.users -= 1;
            if slot.users == 0 {
                slots.remove(&self.shop);
            }
        }
    }
}

struct ShopLockGuard {
    _held: OwnedMutexGuard<()>,
    _registration: ShopLockRegistration,
}

fn parse_shop(shop: String) -> Result<ShopDomain, InstallError> {
    ShopDomain::new(shop)
        .map_err(|error| InstallError::validation(format!("invalid \"shop\" parameter: {error}")))
}
