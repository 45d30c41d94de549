//! OAuth scope handling.
//!
//! This module provides the [`AuthScopes`] type: the scopes requested on the
//! consent redirect and the scopes granted in the token response.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// An ordered, de-duplicated list of OAuth scopes.
///
/// The order in which scopes were given is kept, so the consent URL carries
/// `scope=read_products,write_products` exactly as configured.
///
/// # Implied Scopes
///
/// Shopify reports only the strongest scope it granted, so [`covers`]
/// expands implied scopes before comparing:
/// - `write_products` implies `read_products`
/// - `unauthenticated_write_products` implies `unauthenticated_read_products`
///
/// [`covers`]: AuthScopes::covers
///
/// # Example
///
/// ```rust
/// use shopify_app::AuthScopes;
///
/// let requested: AuthScopes = "read_products, write_products".parse().unwrap();
/// assert_eq!(requested.to_string(), "read_products,write_products");
///
/// let granted: AuthScopes = "write_products".parse().unwrap();
/// assert!(granted.covers(&requested));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: Vec<String>,
}

impl AuthScopes {
    /// Creates an empty scope list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no scope is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the number of scopes, not counting implied ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if every scope in `other` is present in, or implied by,
    /// this list.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        let expanded = self.expanded();
        other.scopes.iter().all(|s| expanded.contains(s.as_str()))
    }

    /// Returns an iterator over the scopes in their original order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn expanded(&self) -> HashSet<String> {
        self.scopes
            .iter()
            .flat_map(|scope| std::iter::once(scope.clone()).chain(Self::implied_scope(scope)))
            .collect()
    }

    fn implied_scope(scope: &str) -> Option<String> {
        scope
            .strip_prefix("unauthenticated_write_")
            .map(|rest| format!("unauthenticated_read_{rest}"))
            .or_else(|| {
                scope
                    .strip_prefix("write_")
                    .map(|rest| format!("read_{rest}"))
            })
    }

    fn push_unique(&mut self, scope: &str) {
        if !self.scopes.iter().any(|s| s == scope) {
            self.scopes.push(scope.to_string());
        }
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut auth_scopes = Self::new();

        for scope in s.split(',') {
            let scope = scope.trim();
            if scope.is_empty() {
                continue;
            }

            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }

            auth_scopes.push_unique(scope);
        }

        Ok(auth_scopes)
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(","))
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_configured_order() {
        let scopes: AuthScopes = "write_products,read_products".parse().unwrap();
        assert_eq!(scopes.to_string(), "write_products,read_products");
        assert_eq!(scopes.len(), 2);
    }

    #[test]
    fn test_removes_duplicates_and_blanks() {
        let scopes: AuthScopes = " read_products,, read_products ,write_products".parse().unwrap();
        assert_eq!(scopes.to_string(), "read_products,write_products");
    }

    #[test]
    fn test_covers_uses_implied_scopes() {
        let granted: AuthScopes = "write_products".parse().unwrap();
        let requested: AuthScopes = "read_products,write_products".parse().unwrap();
        assert!(granted.covers(&requested));

        let narrower: AuthScopes = "read_products".parse().unwrap();
        assert!(!narrower.covers(&requested));
    }

    #[test]
    fn test_covers_unauthenticated_scopes() {
        let granted: AuthScopes = "unauthenticated_write_checkouts".parse().unwrap();
        let requested: AuthScopes = "unauthenticated_read_checkouts".parse().unwrap();
        assert!(granted.covers(&requested));
    }

    #[test]
    fn test_rejects_invalid_characters() {
        let result: Result<AuthScopes, _> = "read_products,write products".parse();
        assert!(matches!(result, Err(ConfigError::InvalidScopes { .. })));
    }

    #[test]
    fn test_serializes_as_comma_separated_string() {
        let scopes: AuthScopes = "read_products,write_products".parse().unwrap();
        let json = serde_json::to_string(&scopes).unwrap();
        assert_eq!(json, r#""read_products,write_products""#);

        let back: AuthScopes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scopes);
    }
}
