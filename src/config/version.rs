//! Admin API version selection.
//!
//! The version is only used to build the webhook endpoints
//! (`/admin/api/{version}/webhooks.json`); the OAuth endpoints are not
//! versioned.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Shopify Admin API version.
///
/// Versions are released quarterly. Known versions get their own variant and
/// any other well-formed `YYYY-MM` string parses to [`ApiVersion::Custom`].
///
/// # Example
///
/// ```rust
/// use shopify_app::ApiVersion;
///
/// assert_eq!(ApiVersion::default(), ApiVersion::V2023_07);
///
/// let version: ApiVersion = "2024-01".parse().unwrap();
/// assert_eq!(version.to_string(), "2024-01");
///
/// let custom: ApiVersion = "2026-04".parse().unwrap();
/// assert_eq!(custom, ApiVersion::Custom("2026-04".to_string()));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// API version 2023-07, the version the installer was built against.
    #[default]
    V2023_07,
    /// API version 2023-10
    V2023_10,
    /// API version 2024-01
    V2024_01,
    /// API version 2024-04
    V2024_04,
    /// Unstable API version for development and testing.
    Unstable,
    /// Any other `YYYY-MM` version string.
    Custom(String),
}

impl ApiVersion {
    /// Returns `true` if this is a known stable API version.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        !matches!(self, Self::Unstable | Self::Custom(_))
    }

    fn is_valid_version_format(s: &str) -> bool {
        let Some((year, month)) = s.split_once('-') else {
            return false;
        };

        if year.len() != 4 || month.len() != 2 {
            return false;
        }
        if !year.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }

        matches!(month.parse::<u8>(), Ok(1..=12))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version_str = match self {
            Self::V2023_07 => "2023-07",
            Self::V2023_10 => "2023-10",
            Self::V2024_01 => "2024-01",
            Self::V2024_04 => "2024-04",
            Self::Unstable => "unstable",
            Self::Custom(s) => s,
        };
        f.write_str(version_str)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        match s.as_str() {
            "2023-07" => Ok(Self::V2023_07),
            "2023-10" => Ok(Self::V2023_10),
            "2024-01" => Ok(Self::V2024_01),
            "2024-04" => Ok(Self::V2024_04),
            "unstable" => Ok(Self::Unstable),
            _ if Self::is_valid_version_format(&s) => Ok(Self::Custom(s)),
            _ => Err(ConfigError::InvalidApiVersion { version: s }),
        }
    }
}
