//! HTTP surface of the installer.
//!
//! | Route | Behavior |
//! |---|---|
//! | `GET /authorize`, `GET /shopify` | 303 to the consent URL |
//! | `GET /callback`, `GET /shopify/callback` | completes the install, 303 to the app path |
//! | `POST /webhook` | 200, body ignored |
//! | `GET /app` | placeholder page |
//! | `GET /health` | `ok` |
//!
//! The callback and webhook paths follow the configuration. Failures are
//! answered with an [`ErrorBody`].
//!
//! Handlers read the raw query string so the callback signature is checked
//! against the parameters in the order Shopify sent them.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use shopify_app::{AppConfig, ApiKey, ApiSecretKey, HostUrl, Installer};
//! use shopify_app::clients::ShopifyClient;
//! use shopify_app::server::{router, AppState};
//! use shopify_app::store::InMemoryCredentialStore;
//!
//! let config = Arc::new(
//!     AppConfig::builder()
//!         .api_key(ApiKey::new("client-id").unwrap())
//!         .api_secret_key(ApiSecretKey::new("client-secret").unwrap())
//!         .host(HostUrl::new("https://myapp.example.com").unwrap())
//!         .build()
//!         .unwrap(),
//! );
//! let platform = Arc::new(ShopifyClient::new(&config).unwrap());
//! let store = Arc::new(InMemoryCredentialStore::new());
//!
//! let installer = Arc::new(Installer::new(config, store, platform));
//! let app = router(AppState::new(installer));
//! ```

mod response;

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::oauth::{AuthorizationRequest, CallbackRequest};
use crate::install::{InstallError, Installer};

pub use response::ErrorBody;

/// Shared state of the HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    installer: Arc<Installer>,
}

impl AppState {
    /// Wraps the installer.
    #[must_use]
    pub const fn new(installer: Arc<Installer>) -> Self {
        Self { installer }
    }

    /// The installer handlers delegate to.
    #[must_use]
    pub fn installer(&self) -> &Installer {
        &self.installer
    }
}

/// Builds the router with request tracing.
pub fn router(state: AppState) -> Router {
    let config = state.installer.config();
    let callback_path = config.callback_path().to_string();
    let webhook_path = config.webhook_path().to_string();
    let app_path = config.app_path().to_string();

    let mut router = Router::new()
        .route("/authorize", get(authorize))
        .route("/shopify", get(authorize))
        .route("/shopify/callback", get(callback))
        .route("/health", get(health))
        .route(&webhook_path, post(webhook))
        .route(&app_path, get(app));

    if callback_path != "/shopify/callback" {
        router = router.route(&callback_path, get(callback));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn authorize(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Redirect, InstallError> {
    let request = AuthorizationRequest::from_query(query.as_deref().unwrap_or_default());
    let result = state.installer.begin_authorization(&request)?;
    Ok(Redirect::to(&result.auth_url))
}

async fn callback(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Redirect, InstallError> {
    let request = CallbackRequest::from_query(query.as_deref().unwrap_or_default());
    state.installer.complete_authorization(&request).await?;
    Ok(Redirect::to(state.installer.config().app_path()))
}

async fn webhook() -> StatusCode {
    StatusCode::OK
}

async fn app() -> Response {
    "App installed.".into_response()
}

async fn health() -> &'static str {
    "ok"
}
