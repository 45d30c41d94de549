//! Webhook subscriptions created at install time.
//!
//! # Overview
//!
//! - [`Topic`]: the event topics the app subscribes to
//! - [`SubscriptionSpec`]: a subscription to create
//! - [`Subscription`]: a subscription as Shopify reports it
//! - [`SubscriptionFilter`]: optional filters for listing subscriptions
//! - [`SubscriptionRegistrar`]: creates one subscription per topic concurrently
//! - [`RegistrationError`]: why one topic could not be registered
//!
//! # Example
//!
//! ```rust
//! use shopify_app::webhooks::Topic;
//!
//! let names: Vec<_> = Topic::REQUIRED.iter().map(|t| t.as_str()).collect();
//! assert_eq!(
//!     names,
//!     ["products/create", "products/update", "products/delete", "app/uninstalled"]
//! );
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are `Send + Sync`, making them safe to share
//! across async tasks.

mod errors;
mod registrar;
mod types;

pub use errors::{RegistrationError, UnknownTopicError};
pub use registrar::{RegistrationOutcome, RegistrationSummary, SubscriptionRegistrar};
pub use types::{Subscription, SubscriptionFilter, SubscriptionFormat, SubscriptionSpec, Topic};
