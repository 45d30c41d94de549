//! Webhook subscription types.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::webhooks::{SubscriptionFormat, SubscriptionSpec, Topic};
//!
//! let spec = SubscriptionSpec::new("https://myapp.example.com/webhook", Topic::ProductsCreate);
//! assert_eq!(spec.format, SubscriptionFormat::Json);
//!
//! let json = serde_json::to_value(&spec).unwrap();
//! assert_eq!(json["topic"], "products/create");
//! assert_eq!(json["format"], "json");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UnknownTopicError;

/// Event topics the installer subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// A product was created.
    #[serde(rename = "products/create")]
    ProductsCreate,
    /// A product was updated.
    #[serde(rename = "products/update")]
    ProductsUpdate,
    /// A product was deleted.
    #[serde(rename = "products/delete")]
    ProductsDelete,
    /// The app was uninstalled from the shop.
    #[serde(rename = "app/uninstalled")]
    AppUninstalled,
}

impl Topic {
    /// The topics registered after every fresh install.
    pub const REQUIRED: [Self; 4] = [
        Self::ProductsCreate,
        Self::ProductsUpdate,
        Self::ProductsDelete,
        Self::AppUninstalled,
    ];

    /// Returns the wire name of the topic, e.g. `products/create`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProductsCreate => "products/create",
            Self::ProductsUpdate => "products/update",
            Self::ProductsDelete => "products/delete",
            Self::AppUninstalled => "app/uninstalled",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = UnknownTopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::REQUIRED
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| UnknownTopicError {
                topic: s.to_string(),
            })
    }
}

/// Payload encoding of a subscription.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionFormat {
    /// JSON payloads.
    #[default]
    Json,
    /// XML payloads.
    Xml,
}

/// A subscription to create: where to deliver which topic, and how.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubscriptionSpec {
    /// The URL events are delivered to.
    pub address: String,
    /// The subscribed topic.
    pub topic: Topic,
    /// The payload format.
    pub format: SubscriptionFormat,
}

impl SubscriptionSpec {
    /// Creates a JSON subscription for `topic` delivering to `address`.
    #[must_use]
    pub fn new(address: impl Into<String>, topic: Topic) -> Self {
        Self {
            address: address.into(),
            topic,
            format: SubscriptionFormat::Json,
        }
    }
}

/// A webhook subscription as stored by Shopify.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Shopify's id for the subscription.
    pub id: u64,
    /// The delivery URL.
    pub address: String,
    /// The topic wire name. Subscriptions created outside this app may use
    /// topics [`Topic`] does not model.
    pub topic: String,
    /// The payload format.
    #[serde(default)]
    pub format: SubscriptionFormat,
    /// When the subscription was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the subscription was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Payload fields included in deliveries. Empty means all.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Metafield namespaces included in deliveries.
    #[serde(default)]
    pub metafield_namespaces: Vec<String>,
    /// Private metafield namespaces included in deliveries.
    #[serde(default)]
    pub private_metafield_namespaces: Vec<String>,
    /// The API version payloads are rendered with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl Subscription {
    /// Returns the topic if it is one the installer knows.
    #[must_use]
    pub fn known_topic(&self) -> Option<Topic> {
        self.topic.parse().ok()
    }
}

/// Optional filters for listing subscriptions.
///
/// # Example
///
/// ```rust
/// use shopify_app::webhooks::{SubscriptionFilter, Topic};
///
/// let filter = SubscriptionFilter::default().topic(Topic::AppUninstalled);
/// assert_eq!(
///     filter.to_query(),
///     vec![("topic", "app/uninstalled".to_string())]
/// );
/// assert!(SubscriptionFilter::default().to_query().is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    /// Only subscriptions delivering to this address.
    pub address: Option<String>,
    /// Only subscriptions for this topic.
    pub topic: Option<Topic>,
}

impl SubscriptionFilter {
    /// Restricts the listing to `address`.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Restricts the listing to `topic`.
    #[must_use]
    pub const fn topic(mut self, topic: Topic) -> Self {
        self.topic = Some(topic);
        self
    }

    /// The query parameters for the filters that are set.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(address) = &self.address {
            query.push(("address", address.clone()));
        }
        if let Some(topic) = self.topic {
            query.push(("topic", topic.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_topics_are_the_four_fixed_topics() {
        let names: Vec<_> = Topic::REQUIRED.iter().map(|t| t.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "products/create",
                "products/update",
                "products/delete",
                "app/uninstalled"
            ]
        );
    }

    #[test]
    fn test_topic_parses_wire_names() {
        assert_eq!("products/update".parse::<Topic>().unwrap(), Topic::ProductsUpdate);
        assert_eq!(
            "orders/create".parse::<Topic>(),
            Err(UnknownTopicError {
                topic: "orders/create".to_string()
            })
        );
    }

    #[test]
    fn test_spec_serializes_to_wire_shape() {
        let spec = SubscriptionSpec::new("https://app.example.com/webhook", Topic::AppUninstalled);
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            serde_json::json!({
                "address": "https://app.example.com/webhook",
                "topic": "app/uninstalled",
                "format": "json"
            })
        );
    }

    #[test]
    fn test_subscription_deserializes_platform_payload() {
        let subscription: Subscription = serde_json::from_value(serde_json::json!({
            "id": 4_759_306,
            "address": "https://app.example.com/webhook",
            "topic": "products/create",
            "created_at": "2023-07-12T10:00:00-04:00",
            "updated_at": "2023-07-12T10:00:00-04:00",
            "format": "json",
            "fields": [],
            "metafield_namespaces": [],
            "api_version": "2023-07",
            "private_metafield_namespaces": []
        }))
        .unwrap();

        assert_eq!(subscription.id, 4_759_306);
        assert_eq!(subscription.known_topic(), Some(Topic::ProductsCreate));
        assert_eq!(
            subscription.created_at.unwrap().to_rfc3339(),
            "2023-07-12T14:00:00+00:00"
        );
        assert_eq!(subscription.api_version.as_deref(), Some("2023-07"));
    }

    #[test]
    fn test_subscription_tolerates_missing_optional_fields() {
        let subscription: Subscription = serde_json::from_value(serde_json::json!({
            "id": 1,
            "address": "https://app.example.com/webhook",
            "topic": "orders/create"
        }))
        .unwrap();

        assert_eq!(subscription.format, SubscriptionFormat::Json);
        assert!(subscription.fields.is_empty());
        assert_eq!(subscription.known_topic(), None);
    }

    #[test]
    fn test_filter_query_includes_set_fields_only() {
        let filter = SubscriptionFilter::default()
            .address("https://app.example.com/webhook")
            .topic(Topic::ProductsDelete);

        assert_eq!(
            filter.to_query(),
            vec![
                ("address", "https://app.example.com/webhook".to_string()),
                ("topic", "products/delete".to_string()),
            ]
        );
    }
}
