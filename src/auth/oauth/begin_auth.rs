//! Consent URL generation.
//!
//! [`begin_auth`] is the first step of the authorization code flow. It
//! generates a fresh [`StateParam`] and the URL on the shop's admin where the
//! merchant approves the requested scopes.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::{AppConfig, ApiKey, ApiSecretKey, HostUrl, ShopDomain};
//! use shopify_app::auth::oauth::begin_auth;
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("client-id").unwrap())
//!     .api_secret_key(ApiSecretKey::new("client-secret").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let shop = ShopDomain::new("example-shop").unwrap();
//! let result = begin_auth(&config, &shop);
//!
//! assert!(result
//!     .auth_url
//!     .starts_with("https://example-shop.myshopify.com/admin/oauth/authorize?client_id=client-id&"));
//! ```

use crate::auth::oauth::state::StateParam;
use crate::config::{AppConfig, ShopDomain};

/// The consent URL and the nonce embedded in it.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The full authorization URL to redirect the merchant to.
    pub auth_url: String,

    /// The nonce sent as the `state` parameter.
    pub state: StateParam,
}

// Verify BeginAuthResult is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BeginAuthResult>();
};

/// Builds the consent URL for `shop`.
///
/// The query carries `client_id`, `scope`, `state` and `redirect_uri`, in that
/// order, with values percent-encoded. `redirect_uri` is the
/// configured host followed by the callback path.
#[must_use]
pub fn begin_auth(config: &AppConfig, shop: &ShopDomain) -> BeginAuthResult {
    let state = StateParam::new();

    let mut auth_url = format!("https://{shop}/admin/oauth/authorize");
    let scope = config.scopes().to_string();
    let redirect_uri = config.redirect_uri();
    let pairs: [(&str, &str); 4] = [
        ("client_id", config.api_key().as_ref()),
        ("scope", &scope),
        ("state", state.as_ref()),
        ("redirect_uri", &redirect_uri),
    ];
    for (i, (key, value)) in pairs.into_iter().enumerate() {
        auth_url.push(if i == 0 { '?' } else { '&' });
        auth_url.push_str(key);
        auth_url.push('=');
        auth_url.push_str(&urlencoding::encode(value));
    }

    BeginAuthResult { auth_url, state }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey, HostUrl};

    fn config() -> AppConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("consent-client").unwrap())
            .api_secret_key(ApiSecretKey::new("consent-secret").unwrap())
            .host(HostUrl::new("https://myapp.example.com").unwrap())
            .build()
            .unwrap()
    }

    fn query_keys(url: &str) -> Vec<String> {
        let (_, query) = url.split_once('?').unwrap();
        query
            .split('&')
            .map(|pair| pair.split_once('=').unwrap().0.to_string())
            .collect()
    }

    #[test]
    fn test_begin_auth_targets_shop_admin() {
        let result = begin_auth(&config(), &ShopDomain::new("acme").unwrap());

        assert!(result
            .auth_url
            .starts_with("https://acme.myshopify.com/admin/oauth/authorize?client_id=consent-client&"));
    }

    #[test]
    fn test_begin_auth_orders_parameters() {
        let result = begin_auth(&config(), &ShopDomain::new("acme").unwrap());

        assert_eq!(
            query_keys(&result.auth_url),
            vec!["client_id", "scope", "state", "redirect_uri"]
        );
    }

    #[test]
    fn test_begin_auth_encodes_values() {
        let result = begin_auth(&config(), &ShopDomain::new("acme").unwrap());

        assert!(result
            .auth_url
            .contains("scope=read_products%2Cwrite_products"));
        let expected = urlencoding::encode("https://myapp.example.com/callback");
        assert!(result
            .auth_url
            .ends_with(&format!("redirect_uri={expected}")));
    }

    #[test]
    fn test_begin_auth_state_in_url_matches_returned_state() {
        let result = begin_auth(&config(), &ShopDomain::new("acme").unwrap());

        assert!(result
            .auth_url
            .contains(&format!("&state={}&", result.state.as_ref())));
    }

    #[test]
    fn test_begin_auth_unique_states() {
        let config = config();
        let shop = ShopDomain::new("acme").unwrap();

        let first = begin_auth(&config, &shop);
        let second = begin_auth(&config, &shop);

        assert_ne!(first.state, second.state);
    }
}
