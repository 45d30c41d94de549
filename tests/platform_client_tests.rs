//! Integration tests for the Shopify platform client.
//!
//! Requests are sent to a wiremock server through the `api_host` override;
//! paths and bodies are the ones Shopify expects.

use serde_json::json;
use shopify_app::clients::{PlatformClient, PlatformError, ShopifyClient};
use shopify_app::webhooks::{SubscriptionFilter, SubscriptionFormat, SubscriptionSpec, Topic};
use shopify_app::{ApiKey, ApiSecretKey, AppConfig, HostUrl, ShopDomain};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEBHOOKS_PATH: &str = "/admin/api/2023-07/webhooks.json";

/// Creates a client that sends every request to the mock server
fn create_client(mock_server: &MockServer) -> ShopifyClient {
    let config = AppConfig::builder()
        .api_key(ApiKey::new("test-client-id").unwrap())
        .api_secret_key(ApiSecretKey::new("test-client-secret").unwrap())
        .host(HostUrl::new("https://myapp.example.com").unwrap())
        .api_host(HostUrl::new(mock_server.uri()).unwrap())
        .build()
        .unwrap();
    ShopifyClient::new(&config).unwrap()
}

fn shop() -> ShopDomain {
    ShopDomain::new("test-shop").unwrap()
}

fn webhook_json(id: u64, topic: &str) -> serde_json::Value {
    json!({
        "id": id,
        "address": "https://myapp.example.com/webhook",
        "topic": topic,
        "created_at": "2023-07-15T10:30:00-04:00",
        "updated_at": "2023-07-15T10:30:00-04:00",
        "format": "json",
        "fields": [],
        "metafield_namespaces": [],
        "api_version": "2023-07",
        "private_metafield_namespaces": []
    })
}

// === Token exchange ===

#[tokio::test]
async fn test_exchange_code_posts_credentials_and_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .and(body_json(json!({
            "client_id": "test-client-id",
            "client_secret": "test-client-secret",
            "code": "auth-code"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "shpat_new_token",
            "scope": "write_products"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let token = client.exchange_code(&shop(), "auth-code").await.unwrap();

    assert_eq!(token.access_token, "shpat_new_token");
    assert_eq!(token.scope.to_string(), "write_products");
    assert!(token.scope.covers(&"read_products,write_products".parse().unwrap()));
}

#[tokio::test]
async fn test_exchange_code_rejected_code_is_response_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_request",
            "error_description": "The authorization code was not found or was already used"
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.exchange_code(&shop(), "used-code").await;

    match result {
        Err(PlatformError::Response { code, message }) => {
            assert_eq!(code, 400);
            assert_eq!(
                message,
                "invalid_request: The authorization code was not found or was already used"
            );
        }
        other => panic!("Expected Response error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_exchange_code_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.exchange_code(&shop(), "auth-code").await;

    assert!(matches!(result, Err(PlatformError::Decode(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Nothing listens on port 1
    let config = AppConfig::builder()
        .api_key(ApiKey::new("test-client-id").unwrap())
        .api_secret_key(ApiSecretKey::new("test-client-secret").unwrap())
        .host(HostUrl::new("https://myapp.example.com").unwrap())
        .api_host(HostUrl::new("http://127.0.0.1:1").unwrap())
        .build()
        .unwrap();
    let client = ShopifyClient::new(&config).unwrap();

    let result = client.exchange_code(&shop(), "auth-code").await;

    assert!(matches!(result, Err(PlatformError::Network(_))));
}

// === Webhook subscriptions ===

#[tokio::test]
async fn test_list_subscriptions_sends_token_and_decodes_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WEBHOOKS_PATH))
        .and(header("X-Shopify-Access-Token", "shpat_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "webhooks": [
                webhook_json(1, "products/create"),
                webhook_json(2, "orders/create")
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let subscriptions = client
        .list_subscriptions(&shop(), "shpat_token", &SubscriptionFilter::default())
        .await
        .unwrap();

    assert_eq!(subscriptions.len(), 2);
    assert_eq!(subscriptions[0].known_topic(), Some(Topic::ProductsCreate));
    assert_eq!(subscriptions[1].topic, "orders/create");
    assert_eq!(subscriptions[1].known_topic(), None);
    assert_eq!(subscriptions[0].api_version.as_deref(), Some("2023-07"));
}

#[tokio::test]
async fn test_list_subscriptions_sends_filter_as_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WEBHOOKS_PATH))
        .and(query_param("topic", "app/uninstalled"))
        .and(query_param("address", "https://myapp.example.com/webhook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "webhooks": [webhook_json(3, "app/uninstalled")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let filter = SubscriptionFilter::default()
        .topic(Topic::AppUninstalled)
        .address("https://myapp.example.com/webhook");
    let subscriptions = client
        .list_subscriptions(&shop(), "shpat_token", &filter)
        .await
        .unwrap();

    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].id, 3);
}

#[tokio::test]
async fn test_get_subscription_by_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2023-07/webhooks/4759306.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "webhook": webhook_json(4_759_306, "products/delete") })),
        )
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let subscription = client
        .get_subscription(&shop(), "shpat_token", 4_759_306)
        .await
        .unwrap();

    assert_eq!(subscription.id, 4_759_306);
    assert_eq!(subscription.known_topic(), Some(Topic::ProductsDelete));
    assert!(subscription.created_at.is_some());
}

#[tokio::test]
async fn test_create_subscription_posts_webhook_object() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(WEBHOOKS_PATH))
        .and(header("X-Shopify-Access-Token", "shpat_token"))
        .and(body_json(json!({
            "webhook": {
                "address": "https://myapp.example.com/webhook",
                "topic": "products/update",
                "format": "json"
            }
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "webhook": webhook_json(7, "products/update") })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let spec = SubscriptionSpec::new("https://myapp.example.com/webhook", Topic::ProductsUpdate);
    let subscription = client
        .create_subscription(&shop(), "shpat_token", &spec)
        .await
        .unwrap();

    assert_eq!(subscription.id, 7);
    assert_eq!(subscription.format, SubscriptionFormat::Json);
}

#[tokio::test]
async fn test_create_subscription_conflict_reports_errors_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(WEBHOOKS_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": { "address": ["for this topic has already been taken"] }
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let spec = SubscriptionSpec::new("https://myapp.example.com/webhook", Topic::ProductsCreate);
    let error = client
        .create_subscription(&shop(), "shpat_token", &spec)
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(422));
    assert!(error.to_string().contains("already been taken"));
}

#[tokio::test]
async fn test_delete_subscription() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/admin/api/2023-07/webhooks/7.json"))
        .and(header("X-Shopify-Access-Token", "shpat_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    client
        .delete_subscription(&shop(), "shpat_token", 7)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_missing_subscription_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/admin/api/2023-07/webhooks/8.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": "Not Found" })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let error = client
        .delete_subscription(&shop(), "shpat_token", 8)
        .await
        .unwrap_err();

    match error {
        PlatformError::Response { code, message } => {
            assert_eq!(code, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("Expected Response error, got: {other:?}"),
    }
}
