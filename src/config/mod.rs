//! Configuration types for the installer.
//!
//! # Overview
//!
//! - [`AppConfig`]: immutable settings shared by every request through an `Arc`
//! - [`AppConfigBuilder`]: a builder for constructing [`AppConfig`] instances
//! - [`ApiKey`]: a validated API key (OAuth client id)
//! - [`ApiSecretKey`]: a validated API secret key with masked debug output
//! - [`ShopDomain`]: a validated Shopify shop domain
//! - [`HostUrl`]: a validated base URL
//! - [`ApiVersion`]: the Admin API version used for webhook calls
//!
//! # Example
//!
//! ```rust
//! use shopify_app::{AppConfig, ApiKey, ApiSecretKey, HostUrl};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("client-id").unwrap())
//!     .api_secret_key(ApiSecretKey::new("client-secret").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.redirect_uri(), "https://myapp.example.com/callback");
//! assert_eq!(config.scopes().to_string(), "read_products,write_products");
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain};
pub use version::ApiVersion;

use crate::auth::AuthScopes;
use crate::error::ConfigError;
use std::time::Duration;

/// Scopes requested when none are configured.
pub const DEFAULT_SCOPES: &str = "read_products,write_products";

/// Default route Shopify redirects to after consent.
pub const DEFAULT_CALLBACK_PATH: &str = "/callback";

/// Default route registered as the webhook delivery address.
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";

/// Default route the merchant lands on after a successful install.
pub const DEFAULT_APP_PATH: &str = "/app";

/// GET routes the server always serves. `/shopify/callback` is the callback
/// alias, so `callback_path` may reuse it.
pub const FIXED_GET_ROUTES: [&str; 4] = ["/authorize", "/shopify", "/shopify/callback", "/health"];

const CALLBACK_ALIAS: &str = "/shopify/callback";

/// Default timeout applied to every request sent to Shopify.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the install flow.
///
/// Built once at startup and never mutated afterwards.
///
/// # Thread Safety
///
/// `AppConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    host: HostUrl,
    scopes: AuthScopes,
    api_version: ApiVersion,
    api_host: Option<HostUrl>,
    callback_path: String,
    webhook_path: String,
    app_path: String,
    request_timeout: Duration,
    user_agent_prefix: Option<String>,
}

impl AppConfig {
    /// Creates a new builder for constructing an `AppConfig`.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Reads the configuration from the process environment.
    ///
    /// | Variable | Required | Meaning |
    /// |---|---|---|
    /// | `SHOPIFY_CLIENT_ID` | yes | API key |
    /// | `SHOPIFY_CLIENT_SECRET` | yes | API secret key |
    /// | `SERVER_URL` | yes | public base URL of this server |
    /// | `SHOPIFY_SCOPES` | no | comma-separated scopes |
    /// | `SHOPIFY_API_VERSION` | no | Admin API version |
    /// | `SHOPIFY_API_HOST` | no | send platform calls to this host instead |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when a required variable is
    /// unset or empty, or the validation error of the offending value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// [`from_env`](Self::from_env) delegates here with `std::env::var`.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingEnvVar { name })
        };
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut builder = Self::builder()
            .api_key(ApiKey::new(required("SHOPIFY_CLIENT_ID")?)?)
            .api_secret_key(ApiSecretKey::new(required("SHOPIFY_CLIENT_SECRET")?)?)
            .host(HostUrl::new(required("SERVER_URL")?)?);

        if let Some(scopes) = optional("SHOPIFY_SCOPES") {
            builder = builder.scopes(scopes.parse()?);
        }
        if let Some(version) = optional("SHOPIFY_API_VERSION") {
            builder = builder.api_version(version.parse()?);
        }
        if let Some(api_host) = optional("SHOPIFY_API_HOST") {
            builder = builder.api_host(HostUrl::new(api_host)?);
        }

        builder.build()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the public base URL of this server.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        &self.host
    }

    /// Returns the scopes requested on the consent redirect.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the Admin API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the host platform calls are sent to instead of the shop, if set.
    #[must_use]
    pub const fn api_host(&self) -> Option<&HostUrl> {
        self.api_host.as_ref()
    }

    /// Returns the callback route.
    #[must_use]
    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// Returns the webhook delivery route.
    #[must_use]
    pub fn webhook_path(&self) -> &str {
        &self.webhook_path
    }

    /// Returns the post-install landing route.
    #[must_use]
    pub fn app_path(&self) -> &str {
        &self.app_path
    }

    /// Returns the timeout applied to platform requests.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// The `redirect_uri` sent on the consent redirect.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        self.host.join(&self.callback_path)
    }

    /// The address every webhook subscription delivers to.
    #[must_use]
    pub fn webhook_address(&self) -> String {
        self.host.join(&self.webhook_path)
    }
}

// Verify AppConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppConfig>();
};

/// Builder for constructing [`AppConfig`] instances.
///
/// Required fields are `api_key`, `api_secret_key` and `host`.
///
/// # Defaults
///
/// - `scopes`: `read_products,write_products`
/// - `api_version`: `2023-07`
/// - `callback_path`: `/callback`
/// - `webhook_path`: `/webhook`
/// - `app_path`: `/app`
/// - `request_timeout`: 30 seconds
/// - `api_host`, `user_agent_prefix`: `None`
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use shopify_app::{AppConfig, ApiKey, ApiSecretKey, ApiVersion, HostUrl};
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .host(HostUrl::new("https://myapp.example.com").unwrap())
///     .api_version(ApiVersion::V2024_01)
///     .callback_path("/shopify/callback")
///     .request_timeout(Duration::from_secs(10))
///     .user_agent_prefix("MyApp/1.0")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.redirect_uri(), "https://myapp.example.com/shopify/callback");
/// ```
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    host: Option<HostUrl>,
    scopes: Option<AuthScopes>,
    api_version: Option<ApiVersion>,
    api_host: Option<HostUrl>,
    callback_path: Option<String>,
    webhook_path: Option<String>,
    app_path: Option<String>,
    request_timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl AppConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the public base URL of this server (required).
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the requested OAuth scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the Admin API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sends every platform request to `host` instead of the shop domain.
    ///
    /// The shop domain still appears in logs and results. Useful for proxies
    /// and mock servers.
    #[must_use]
    pub fn api_host(mut self, host: HostUrl) -> Self {
        self.api_host = Some(host);
        self
    }

    /// Sets the callback route.
    #[must_use]
    pub fn callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = Some(path.into());
        self
    }

    /// Sets the webhook delivery route.
    #[must_use]
    pub fn webhook_path(mut self, path: impl Into<String>) -> Self {
        self.webhook_path = Some(path.into());
        self
    }

    /// Sets the post-install landing route.
    #[must_use]
    pub fn app_path(mut self, path: impl Into<String>) -> Self {
        self.app_path = Some(path.into());
        self
    }

    /// Sets the timeout for platform requests.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for platform requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`AppConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingRequiredField`] if `api_key`, `api_secret_key`
    ///   or `host` are not set
    /// - [`ConfigError::InvalidPath`] if a route does not start with `/` or
    ///   contains path parameters
    /// - [`ConfigError::RouteConflict`] if `callback_path` or `app_path` is
    ///   already a GET route
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;
        let host = self
            .host
            .ok_or(ConfigError::MissingRequiredField { field: "host" })?;

        let scopes = match self.scopes {
            Some(scopes) => scopes,
            None => DEFAULT_SCOPES.parse()?,
        };

        let callback_path = route("callback_path", self.callback_path, DEFAULT_CALLBACK_PATH)?;
        let webhook_path = route("webhook_path", self.webhook_path, DEFAULT_WEBHOOK_PATH)?;
        let app_path = route("app_path", self.app_path, DEFAULT_APP_PATH)?;

        // The webhook route is the only POST route, so only GET routes can clash.
        if callback_path != CALLBACK_ALIAS && FIXED_GET_ROUTES.contains(&callback_path.as_str()) {
            return Err(ConfigError::RouteConflict {
                field: "callback_path",
                path: callback_path,
            });
        }
        if app_path == callback_path || FIXED_GET_ROUTES.contains(&app_path.as_str()) {
            return Err(ConfigError::RouteConflict {
                field: "app_path",
                path: app_path,
            });
        }

        Ok(AppConfig {
            api_key,
            api_secret_key,
            host,
            scopes,
            api_version: self.api_version.unwrap_or_default(),
            api_host: self.api_host,
            callback_path,
            webhook_path,
            app_path,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

fn route(
    field: &'static str,
    path: Option<String>,
    default: &str,
) -> Result<String, ConfigError> {
    let path = path.unwrap_or_else(|| default.to_string());
    let literal = !path.contains(['{', '}', '*']) && !path.split('/').any(|s| s.starts_with(':'));
    if path.starts_with('/') && literal {
        Ok(path)
    } else {
        Err(ConfigError::InvalidPath { field, path })
    }
}
