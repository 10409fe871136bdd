//! Configuration management for registration sessions.
//!
//! Loads configuration from environment variables with sensible defaults.

use composable_forms_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Registration REST backend
    pub api: ApiConfig,
    /// Runtime store tuning
    pub store: StoreSettings,
    /// Log filter directive (default: info)
    pub log_filter: String,
}

/// REST backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
}

/// Store tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Capacity of the action broadcast channel (default: 16)
    pub broadcast_capacity: usize,
    /// Graceful shutdown timeout in seconds (default: 30)
    pub shutdown_timeout: u64,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `REGISTRATION_API_URL` | `http://localhost:8080/api` |
    /// | `REGISTRATION_API_TOKEN` | none |
    /// | `RUST_LOG` | `info` |
    /// | `STORE_BROADCAST_CAPACITY` | `16` |
    /// | `SHUTDOWN_TIMEOUT` | `30` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: lookup("REGISTRATION_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| "http://localhost:8080/api".to_string()),
                token: lookup("REGISTRATION_API_TOKEN").filter(|t| !t.is_empty()),
            },
            store: StoreSettings {
                broadcast_capacity: lookup("STORE_BROADCAST_CAPACITY")
                    .and_then(|s| s.parse().ok())
                    .filter(|capacity| *capacity > 0)
                    .unwrap_or(16),
                shutdown_timeout: lookup("SHUTDOWN_TIMEOUT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Runtime store configuration derived from these settings
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig::new(
            self.store.broadcast_capacity,
            Duration::from_secs(self.store.shutdown_timeout),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
