//! Configuration for the catalog engine.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Catalog configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Catalog service connection
    pub service: ServiceConfig,
    /// Engine behaviour
    pub engine: EngineConfig,
}

/// Catalog service connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Products requested per page
    pub page_size: u32,
    /// How long `dispatch` waits for a terminal outcome, in seconds
    pub dispatch_timeout_secs: u64,
    /// Capacity of the action broadcast channel
    pub broadcast_capacity: usize,
}

impl EngineConfig {
    /// `dispatch_timeout_secs` as a [`Duration`].
    #[must_use]
    pub const fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            dispatch_timeout_secs: 60,
            broadcast_capacity: 256,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to their defaults; call
    /// [`validate`](Self::validate) before use.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            service: ServiceConfig {
                base_url: lookup("CATALOG_BASE_URL").unwrap_or(defaults.service.base_url),
                request_timeout_secs: lookup("CATALOG_REQUEST_TIMEOUT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.service.request_timeout_secs),
            },
            engine: EngineConfig {
                page_size: lookup("CATALOG_PAGE_SIZE")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.engine.page_size),
                dispatch_timeout_secs: lookup("CATALOG_DISPATCH_TIMEOUT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.engine.dispatch_timeout_secs),
                broadcast_capacity: lookup("CATALOG_BROADCAST_CAPACITY")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.engine.broadcast_capacity),
            },
        }
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.service.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.service.base_url.clone()));
        }
        if self.service.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("Request timeout"));
        }
        if self.engine.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.engine.dispatch_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("Dispatch timeout"));
        }
        if self.engine.broadcast_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = CatalogConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.service.base_url, "http://localhost:5000/api");
        assert_eq!(config.engine.page_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_and_bad_numbers() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("CATALOG_BASE_URL", "https://shop.example.com/api"),
            ("CATALOG_PAGE_SIZE", "24"),
            ("CATALOG_DISPATCH_TIMEOUT", "soon"),
        ]));

        assert_eq!(config.service.base_url, "https://shop.example.com/api");
        assert_eq!(config.engine.page_size, 24);
        assert_eq!(config.engine.dispatch_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let mut config = CatalogConfig::default();
        config.service.base_url = "localhost:5000".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl("localhost:5000".to_string()))
        );

        let mut config = CatalogConfig::default();
        config.engine.page_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPageSize));

        let mut config = CatalogConfig::default();
        config.service.request_timeout_secs = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout("Request timeout")));

        let mut config = CatalogConfig::default();
        config.engine.broadcast_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }
}
