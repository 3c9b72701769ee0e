//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A validated user pool app client ID.
///
/// The client ID is a public identifier, so it is not masked in debug output.
///
/// # Example
///
/// ```rust
/// use console_session::ClientId;
///
/// let id = ClientId::new("4f1ah2kq8example").unwrap();
/// assert_eq!(id.as_ref(), "4f1ah2kq8example");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new validated client ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientId`] if the ID is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        let id = id.trim();
        if id.is_empty() {
            return Err(ConfigError::EmptyClientId);
        }
        Ok(Self(id.to_string()))
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated AWS region name such as `ap-northeast-1`.
///
/// # Example
///
/// ```rust
/// use console_session::Region;
///
/// let region = Region::new("us-east-1").unwrap();
/// assert_eq!(region.as_ref(), "us-east-1");
/// assert!(Region::new("Tokyo").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region(String);

impl Region {
    /// The region used when none is configured.
    pub const DEFAULT: &'static str = "ap-northeast-1";

    /// Creates a new validated region.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRegion`] unless the value is made of
    /// lowercase letters and digits in dash-separated parts, ending in a number.
    pub fn new(region: impl Into<String>) -> Result<Self, ConfigError> {
        let region = region.into().trim().to_string();

        let parts: Vec<&str> = region.split('-').collect();
        let well_formed = parts.len() >= 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
            && parts
                .last()
                .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()));

        if !well_formed {
            return Err(ConfigError::InvalidRegion { region });
        }
        Ok(Self(region))
    }
}

impl Default for Region {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated user pool ID of the form `<region>_<id>`.
///
/// # Example
///
/// ```rust
/// use console_session::UserPoolId;
///
/// let pool = UserPoolId::new("ap-northeast-1_AbC123").unwrap();
/// assert_eq!(pool.region().as_ref(), "ap-northeast-1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPoolId {
    id: String,
    region: Region,
}

impl UserPoolId {
    /// Creates a new validated user pool ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUserPoolId`] if the ID has no `_`
    /// separator, an empty suffix, or an invalid region prefix.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into().trim().to_string();
        let invalid = || ConfigError::InvalidUserPoolId { id: id.clone() };

        let (region, suffix) = id.split_once('_').ok_or_else(invalid)?;
        if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
        let region = Region::new(region).map_err(|_| invalid())?;

        Ok(Self { id, region })
    }

    /// Returns the region encoded in the pool ID.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }
}

impl AsRef<str> for UserPoolId {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

/// A validated absolute `http` or `https` base URL.
///
/// Trailing slashes are removed so that paths can be appended with
/// [`BaseUrl::join`].
///
/// # Example
///
/// ```rust
/// use console_session::BaseUrl;
///
/// let url = BaseUrl::new("https://api.example.com/prod/").unwrap();
/// assert_eq!(url.as_ref(), "https://api.example.com/prod");
/// assert_eq!(url.join("/todos"), "https://api.example.com/prod/todos");
/// assert_eq!(url.host_name(), Some("api.example.com"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl {
    url: String,
    host_start: usize,
    host_end: usize,
}

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the URL has no `http`/`https`
    /// scheme or no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();

        let scheme_end = url
            .find("://")
            .ok_or_else(|| ConfigError::InvalidUrl { url: url.clone() })?;

        let scheme = &url[..scheme_end];
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(ConfigError::InvalidUrl { url: url.clone() });
        }

        let host_start = scheme_end + 3;
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);

        if host_end == host_start {
            return Err(ConfigError::InvalidUrl { url: url.clone() });
        }

        Ok(Self {
            url,
            host_start,
            host_end,
        })
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        let host = &self.url[self.host_start..self.host_end];
        if host.is_empty() {
            None
        } else {
            Some(host)
        }
    }

    /// Appends `path` to the base URL, inserting exactly one `/` between them.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return self.url.clone();
        }
        format!("{}/{}", self.url, path)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}
