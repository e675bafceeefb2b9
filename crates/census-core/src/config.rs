//! Store configuration
//!
//! Settings arrive from the host as an untyped JSON document; `StoreConfig`
//! turns that into an immutable value constructed once at startup and passed
//! by reference into [`Store::connect`](crate::db::Store::connect).

use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Default bound on a connect attempt, in seconds
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default store endpoint: a local database file in the working directory
pub const DEFAULT_CONNECT_URI: &str = "census.db";

/// Default upper bound on concurrent store operations
pub const DEFAULT_MAX_POOL_SIZE: u32 = 100;

/// Default logical database namespace
pub const DEFAULT_DATABASE: &str = "inventory";

/// Connection settings for the document store.
///
/// Every field has a default; a recognized settings key present with the
/// wrong type fails with [`Error::Configuration`] before any network
/// attempt. Unrecognized keys are ignored, since host envelopes may carry
/// settings for other collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Bounds the connect attempt (not individual operations)
    pub timeout: Duration,
    /// Local path, `:memory:`, or a `libsql://`/`http(s)://` endpoint
    pub connect_uri: String,
    /// Upper bound on concurrent operations against the store handle
    pub max_pool_size: u32,
    /// Logical database namespace collections live under
    pub database: String,
    /// Credential for remote endpoints
    pub auth_token: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_uri: DEFAULT_CONNECT_URI.to_string(),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            database: DEFAULT_DATABASE.to_string(),
            auth_token: None,
        }
    }
}

impl StoreConfig {
    /// Build a configuration from a host-supplied settings document.
    pub fn from_settings(settings: &Map<String, Value>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = settings.get("timeout") {
            let secs = value.as_u64().ok_or_else(|| Error::Configuration {
                key: "timeout".to_string(),
                expected: "unsigned number of seconds",
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(value) = settings.get("connect_uri") {
            config.connect_uri = require_string(value, "connect_uri")?;
        }

        if let Some(value) = settings.get("max_pool_size") {
            let size = value
                .as_u64()
                .and_then(|size| u32::try_from(size).ok())
                .filter(|size| *size > 0)
                .ok_or_else(|| Error::Configuration {
                    key: "max_pool_size".to_string(),
                    expected: "positive integer",
                })?;
            config.max_pool_size = size;
        }

        if let Some(value) = settings.get("database") {
            config.database = require_string(value, "database")?;
        }

        if let Some(value) = settings.get("auth_token") {
            config.auth_token = Some(require_string(value, "auth_token")?);
        }

        Ok(config)
    }
}

fn require_string(value: &Value, key: &str) -> Result<String> {
    value
        .as_str()
        .map(std::string::ToString::to_string)
        .ok_or_else(|| Error::Configuration {
            key: key.to_string(),
            expected: "string",
        })
}
