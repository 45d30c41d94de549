//! Shopify app installer server.
//!
//! Reads its configuration from the environment (and `.env` if present),
//! then serves the install routes on `BIND_ADDR` (default `0.0.0.0:3434`).
//!
//! Logging is controlled with `RUST_LOG`; set `LOG_FORMAT=json` for JSON
//! lines.

use std::error::Error;
use std::sync::Arc;

use shopify_app::clients::ShopifyClient;
use shopify_app::server::{router, AppState};
use shopify_app::store::InMemoryCredentialStore;
use shopify_app::{AppConfig, Installer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3434";

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "shopify_app=info,shopify_app_installer=info,tower_http=info".into()
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine; the environment may already be set
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Arc::new(AppConfig::from_env().map_err(|error| {
        tracing::error!(error = %error, "Invalid configuration");
        error
    })?);

    let platform = Arc::new(ShopifyClient::new(&config)?);
    let store = Arc::new(InMemoryCredentialStore::new());
    let installer = Arc::new(Installer::new(Arc::clone(&config), store, platform));
    let app = router(AppState::new(installer));

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let host: &str = config.host().as_ref();
    tracing::info!(
        addr = %addr,
        host,
        api_version = %config.api_version(),
        "Installer listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
