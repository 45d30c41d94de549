//! Concurrent creation of webhook subscriptions.
//!
//! One task is spawned per topic. All tasks are awaited and every result is
//! reported; a failed topic never cancels its siblings and nothing is retried.

use std::sync::Arc;

use futures::future::join_all;

use crate::clients::PlatformClient;
use crate::config::ShopDomain;
use crate::webhooks::{RegistrationError, Subscription, SubscriptionSpec, Topic};

/// Result of registering one topic.
#[derive(Debug)]
pub struct RegistrationOutcome {
    /// The topic that was registered.
    pub topic: Topic,
    /// The created subscription, or why it could not be created.
    pub result: Result<Subscription, RegistrationError>,
}

impl RegistrationOutcome {
    /// Returns `true` if the subscription was created.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Success and failure counts over a set of [`RegistrationOutcome`]s.
///
/// # Example
///
/// ```rust
/// use shopify_app::webhooks::{RegistrationSummary, RegistrationOutcome};
///
/// let outcomes: Vec<RegistrationOutcome> = Vec::new();
/// let summary = RegistrationSummary::from_outcomes(&outcomes);
/// assert_eq!(summary.succeeded, 0);
/// assert!(summary.all_succeeded());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistrationSummary {
    /// Number of topics registered.
    pub succeeded: usize,
    /// Number of topics that failed.
    pub failed: usize,
}

impl RegistrationSummary {
    /// Counts the outcomes.
    #[must_use]
    pub fn from_outcomes(outcomes: &[RegistrationOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }

    /// Returns `true` if no topic failed.
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Registers webhook subscriptions pointing at one delivery address.
#[derive(Clone)]
pub struct SubscriptionRegistrar {
    platform: Arc<dyn PlatformClient>,
    address: Arc<str>,
}

impl SubscriptionRegistrar {
    /// Creates a registrar delivering to `address`.
    #[must_use]
    pub fn new(platform: Arc<dyn PlatformClient>, address: impl Into<String>) -> Self {
        Self {
            platform,
            address: Arc::from(address.into()),
        }
    }

    /// Returns the delivery address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Creates one subscription per topic, concurrently.
    ///
    /// Returns one outcome per topic, in the order given. The spawned tasks
    /// run to completion even if the returned future is dropped.
    pub async fn register_all(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        topics: &[Topic],
    ) -> Vec<RegistrationOutcome> {
        let access_token: Arc<str> = Arc::from(access_token);

        let handles = topics.iter().map(|&topic| {
            let platform = Arc::clone(&self.platform);
            let shop = shop.clone();
            let access_token = Arc::clone(&access_token);
            let spec = SubscriptionSpec::new(self.address.as_ref(), topic);

            tokio::spawn(async move {
                platform
                    .create_subscription(&shop, &access_token, &spec)
                    .await
                    .map_err(RegistrationError::from)
            })
        });

        let joined = join_all(handles).await;

        topics
            .iter()
            .zip(joined)
            .map(|(&topic, joined)| {
                let result = joined.unwrap_or_else(|error| {
                    Err(RegistrationError::TaskFailed {
                        reason: error.to_string(),
                    })
                });

                match &result {
                    Ok(subscription) => tracing::info!(
                        shop = %shop,
                        topic = %topic,
                        id = subscription.id,
                        "Webhook subscription created"
                    ),
                    Err(error) => tracing::error!(
                        shop = %shop,
                        topic = %topic,
                        error = %error,
                        "Failed to create webhook subscription"
                    ),
                }

                RegistrationOutcome { topic, result }
            })
            .collect()
    }
}

impl std::fmt::Debug for SubscriptionRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistrar")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
