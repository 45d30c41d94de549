//! # Shopify App Installer
//!
//! The install handshake of a Shopify app: the OAuth authorization code flow
//! that grants the app an access token for a shop, followed by registration of
//! the webhooks the app needs.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`AppConfig`] and [`AppConfigBuilder`]
//! - Validated newtypes for API credentials and domain values
//! - OAuth scope handling with implied scope support
//! - Consent URL construction and callback HMAC verification via [`auth::oauth`]
//! - A credential store interface and an in-memory implementation via [`store`]
//! - A Shopify API client for the token exchange and webhook endpoints via [`clients`]
//! - Concurrent webhook registration via [`webhooks`]
//! - The [`Installer`] that ties them together, and an `axum` router via [`server`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_app::{AppConfig, ApiKey, ApiSecretKey, ApiVersion, HostUrl};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("your-client-id").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-client-secret").unwrap())
//!     .host(HostUrl::new("https://your-app.example.com").unwrap())
//!     .scopes("read_products,write_products".parse().unwrap())
//!     .api_version(ApiVersion::V2023_07)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.redirect_uri(), "https://your-app.example.com/callback");
//! ```
//!
//! ## Install Flow
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopify_app::{AppConfig, Installer, InstallOutcome};
//! use shopify_app::auth::oauth::{AuthorizationRequest, CallbackRequest};
//! use shopify_app::clients::ShopifyClient;
//! use shopify_app::store::InMemoryCredentialStore;
//!
//! let config = Arc::new(AppConfig::from_env()?);
//! let platform = Arc::new(ShopifyClient::new(&config)?);
//! let installer = Installer::new(config, Arc::new(InMemoryCredentialStore::new()), platform);
//!
//! // Step 1: redirect the merchant to the consent page
//! let result = installer.begin_authorization(&AuthorizationRequest::from_query(raw_query))?;
//!
//! // Step 2: Shopify redirects back with a signed query string
//! match installer.complete_authorization(&CallbackRequest::from_query(raw_query)).await? {
//!     InstallOutcome::Installed { registrations, .. } => { /* new shop */ }
//!     InstallOutcome::AlreadyInstalled { subscriptions, .. } => { /* returning shop */ }
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and injected via `Arc`
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All shared types are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod install;
pub mod server;
pub mod store;
pub mod webhooks;

// Re-export public types at crate root for convenience
pub use auth::AuthScopes;
pub use config::{
    ApiKey, ApiSecretKey, ApiVersion, AppConfig, AppConfigBuilder, HostUrl, ShopDomain,
};
pub use error::ConfigError;
pub use install::{InstallError, InstallOutcome, Installer};
