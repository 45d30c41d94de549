//! `reqwest` implementation of [`PlatformClient`].
//!
//! [`ShopifyClient`] talks to the OAuth token endpoint and the REST webhook
//! endpoints of the shop's Admin API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clients::{AccessToken, PlatformClient, PlatformError};
use crate::config::{ApiKey, ApiSecretKey, ApiVersion, AppConfig, HostUrl, ShopDomain};
use crate::webhooks::{Subscription, SubscriptionFilter, SubscriptionSpec};

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header Shopify uses to flag calls to a deprecated API surface.
const DEPRECATED_REASON_HEADER: &str = "x-shopify-api-deprecated-reason";

#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct WebhookRequest<'a> {
    webhook: &'a SubscriptionSpec,
}

#[derive(Deserialize)]
struct WebhookResource {
    webhook: Subscription,
}

#[derive(Deserialize)]
struct WebhookResources {
    webhooks: Vec<Subscription>,
}

/// Client for the Shopify endpoints the installer needs.
///
/// The client handles:
/// - Base URI construction from the shop domain or `api_host`
/// - Default headers including User-Agent and the access token
/// - A per-request timeout
///
/// Requests are sent once; failures are returned to the caller.
///
/// # Thread Safety
///
/// `ShopifyClient` is `Send + Sync`, making it safe to share across async
/// tasks.
///
/// # Example
///
/// ```rust
/// use shopify_app::{AppConfig, ApiKey, ApiSecretKey, HostUrl, ShopDomain};
/// use shopify_app::clients::ShopifyClient;
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("client-id").unwrap())
///     .api_secret_key(ApiSecretKey::new("client-secret").unwrap())
///     .host(HostUrl::new("https://myapp.example.com").unwrap())
///     .build()
///     .unwrap();
///
/// let client = ShopifyClient::new(&config).unwrap();
/// let shop = ShopDomain::new("my-store").unwrap();
/// assert_eq!(client.base_uri(&shop), "https://my-store.myshopify.com");
/// ```
#[derive(Debug)]
pub struct ShopifyClient {
    client: reqwest::Client,
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    api_version: ApiVersion,
    api_host: Option<HostUrl>,
}

// Verify ShopifyClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyClient>();
};

impl ShopifyClient {
    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Network`] if the underlying `reqwest` client
    /// cannot be built (e.g. TLS initialization failure).
    pub fn new(config: &AppConfig) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.request_timeout())
            .user_agent(Self::user_agent(config.user_agent_prefix()))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key().clone(),
            api_secret_key: config.api_secret_key().clone(),
            api_version: config.api_version().clone(),
            api_host: config.api_host().cloned(),
        })
    }

    /// Returns the scheme and host requests for `shop` are sent to.
    #[must_use]
    pub fn base_uri(&self, shop: &ShopDomain) -> String {
        self.api_host.as_ref().map_or_else(
            || format!("https://{}", shop.as_ref()),
            |host| host.as_ref().trim_end_matches('/').to_string(),
        )
    }

    fn user_agent(prefix: Option<&str>) -> String {
        let prefix = prefix.map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        format!("{prefix}Shopify App Installer v{SDK_VERSION} | Rust {rust_version}")
    }

    fn webhooks_url(&self, shop: &ShopDomain, id: Option<u64>) -> String {
        let resource = id.map_or_else(|| "webhooks".to_string(), |id| format!("webhooks/{id}"));
        format!(
            "{}/admin/api/{}/{resource}.json",
            self.base_uri(shop),
            self.api_version
        )
    }

    fn authorized(
        &self,
        request: reqwest::RequestBuilder,
        shop: &ShopDomain,
        access_token: &str,
    ) -> reqwest::RequestBuilder {
        let request = request.header("Accept", "application/json");
        let request = if self.api_host.is_some() {
            request.header("Host", shop.as_ref())
        } else {
            request
        };

        if access_token.is_empty() {
            request
        } else {
            request.header("X-Shopify-Access-Token", access_token)
        }
    }

    /// Sends the request once and returns the body of a 2xx response.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        shop: &ShopDomain,
    ) -> Result<String, PlatformError> {
        let response = request.send().await?;
        let status = response.status();

        if let Some(reason) = response
            .headers()
            .get(DEPRECATED_REASON_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            tracing::warn!(
                shop = %shop,
                url = %response.url(),
                reason,
                "Deprecated request to Shopify API"
            );
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = PlatformError::message_from_body(&body);
            tracing::debug!(shop = %shop, status = status.as_u16(), %message, "Shopify request failed");
            return Err(PlatformError::Response {
                code: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        shop: &ShopDomain,
    ) -> Result<T, PlatformError> {
        let body = self.execute(request, shop).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PlatformClient for ShopifyClient {
    async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<AccessToken, PlatformError> {
        let url = format!("{}/admin/oauth/access_token", self.base_uri(shop));
        let body = TokenExchangeRequest {
            client_id: self.api_key.as_ref(),
            client_secret: self.api_secret_key.as_ref(),
            code,
        };

        let request = self.authorized(self.client.post(url), shop, "").json(&body);
        self.execute_json(request, shop).await
    }

    async fn list_subscriptions(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>, PlatformError> {
        let mut request =
            self.authorized(self.client.get(self.webhooks_url(shop, None)), shop, access_token);
        let query = filter.to_query();
        if !query.is_empty() {
            request = request.query(&query);
        }

        let resources: WebhookResources = self.execute_json(request, shop).await?;
        Ok(resources.webhooks)
    }

    async fn get_subscription(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        id: u64,
    ) -> Result<Subscription, PlatformError> {
        let request =
            self.authorized(self.client.get(self.webhooks_url(shop, Some(id))), shop, access_token);

        let resource: WebhookResource = self.execute_json(request, shop).await?;
        Ok(resource.webhook)
    }

    async fn create_subscription(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        spec: &SubscriptionSpec,
    ) -> Result<Subscription, PlatformError> {
        let request = self
            .authorized(self.client.post(self.webhooks_url(shop, None)), shop, access_token)
            .json(&WebhookRequest { webhook: spec });

        let resource: WebhookResource = self.execute_json(request, shop).await?;
        Ok(resource.webhook)
    }

    async fn delete_subscription(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        id: u64,
    ) -> Result<(), PlatformError> {
        let request = self.authorized(
            self.client.delete(self.webhooks_url(shop, Some(id))),
            shop,
            access_token,
        );

        self.execute(request, shop).await.map(|_| ())
    }
}
