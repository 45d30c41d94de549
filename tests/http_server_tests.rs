//! Integration tests for the HTTP routes.
//!
//! The router is driven with `tower::ServiceExt::oneshot`; Shopify is a
//! wiremock server reached through the `api_host` override.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::json;
use shopify_app::auth::oauth::hmac::compute_signature;
use shopify_app::clients::ShopifyClient;
use shopify_app::server::{router, AppState, ErrorBody};
use shopify_app::store::{AuthorizationRecord, CredentialStore, InMemoryCredentialStore};
use shopify_app::{ApiKey, ApiSecretKey, AppConfig, HostUrl, Installer, ShopDomain};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "test-client-secret";
const SHOP: &str = "test-shop.myshopify.com";

/// Builds the router against the mock server and returns the store it uses
fn create_app(mock_server: &MockServer) -> (Router, Arc<InMemoryCredentialStore>) {
    let config = Arc::new(
        AppConfig::builder()
            .api_key(ApiKey::new("test-client-id").unwrap())
            .api_secret_key(ApiSecretKey::new(SECRET).unwrap())
            .host(HostUrl::new("https://myapp.example.com").unwrap())
            .api_host(HostUrl::new(mock_server.uri()).unwrap())
            .build()
            .unwrap(),
    );
    let platform = Arc::new(ShopifyClient::new(&config).unwrap());
    let store = Arc::new(InMemoryCredentialStore::new());
    let installer = Arc::new(Installer::new(config, store.clone(), platform));
    (router(AppState::new(installer)), store)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn signed_callback_uri(message: &str) -> String {
    let hmac = compute_signature(message, SECRET);
    format!("/callback?{message}&hmac={hmac}")
}

async fn error_body(response: axum::response::Response) -> ErrorBody {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_returns_ok() {
    let mock_server = MockServer::start().await;
    let (app, _) = create_app(&mock_server);

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_authorize_redirects_to_consent_page() {
    let mock_server = MockServer::start().await;

    for route in ["/authorize", "/shopify"] {
        let (app, _) = create_app(&mock_server);
        let response = app
            .oneshot(get(&format!("{route}?shop={SHOP}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with(
            "https://test-shop.myshopify.com/admin/oauth/authorize?client_id=test-client-id&"
        ));
    }
}

#[tokio::test]
async fn test_authorize_without_shop_is_bad_request() {
    let mock_server = MockServer::start().await;
    let (app, _) = create_app(&mock_server);

    let response = app.oneshot(get("/authorize")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_body(response).await,
        ErrorBody {
            errors: "missing \"shop\" parameter".to_string()
        }
    );
}

#[tokio::test]
async fn test_callback_with_bad_hmac_is_bad_request() {
    let mock_server = MockServer::start().await;
    let (app, store) = create_app(&mock_server);

    let response = app
        .oneshot(get(&format!("/callback?code=abc&shop={SHOP}&hmac=deadbeef")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_body(response).await.errors.contains("HMAC"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_callback_installs_shop_and_redirects_to_app() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "shpat_installed",
            "scope": "write_products"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2023-07/webhooks.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "webhook": {
                "id": 1,
                "address": "https://myapp.example.com/webhook",
                "topic": "products/create",
                "format": "json"
            }
        })))
        .expect(4)
        .mount(&mock_server)
        .await;

    let (app, store) = create_app(&mock_server);
    let uri = signed_callback_uri(&format!(
        "code=abc&shop={SHOP}&state=0123456789abcde&timestamp=1337178173"
    ));

    let response = app.oneshot(get(&uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/app");

    let record = store
        .find_by_shop(&ShopDomain::new(SHOP).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.access_token, "shpat_installed");
}

#[tokio::test]
async fn test_callback_alias_for_installed_shop_only_lists() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2023-07/webhooks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "webhooks": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (app, store) = create_app(&mock_server);
    store
        .save(AuthorizationRecord::new(SHOP, "shpat_existing"))
        .await
        .unwrap();

    let message = format!("code=abc&shop={SHOP}&timestamp=1337178173");
    let hmac = compute_signature(&message, SECRET);
    let response = app
        .oneshot(get(&format!("/shopify/callback?{message}&hmac={hmac}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/app");
}

#[tokio::test]
async fn test_callback_with_rejected_code_is_bad_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_request",
            "error_description": "The authorization code was not found or was already used"
        })))
        .mount(&mock_server)
        .await;

    let (app, store) = create_app(&mock_server);
    let uri = signed_callback_uri(&format!("code=used&shop={SHOP}"));

    let response = app.oneshot(get(&uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_body(response)
        .await
        .errors
        .contains("already used"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_webhook_accepts_any_body() {
    let mock_server = MockServer::start().await;
    let (app, _) = create_app(&mock_server);

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"id": 1}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_app_page_is_served() {
    let mock_server = MockServer::start().await;
    let (app, _) = create_app(&mock_server);

    let response = app.oneshot(get("/app")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_router_with_callback_on_alias_and_custom_app_path() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(
        AppConfig::builder()
            .api_key(ApiKey::new("test-client-id").unwrap())
            .api_secret_key(ApiSecretKey::new(SECRET).unwrap())
            .host(HostUrl::new("https://myapp.example.com").unwrap())
            .api_host(HostUrl::new(mock_server.uri()).unwrap())
            .callback_path("/shopify/callback")
            .app_path("/welcome")
            .build()
            .unwrap(),
    );
    let platform = Arc::new(ShopifyClient::new(&config).unwrap());
    let installer = Installer::new(config, Arc::new(InMemoryCredentialStore::new()), platform);
    let app = router(AppState::new(Arc::new(installer)));

    let welcome = app.clone().oneshot(get("/welcome")).await.unwrap();
    assert_eq!(welcome.status(), StatusCode::OK);

    let callback = app
        .oneshot(get(&format!("/shopify/callback?code=abc&shop={SHOP}&hmac=00")))
        .await
        .unwrap();
    assert_eq!(callback.status(), StatusCode::BAD_REQUEST);
}
