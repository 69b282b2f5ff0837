//! Configuration for the facade core

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Facade configuration.
///
/// Every field has a default matching the production values, so a partial
/// config file (or none at all) is always usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// Base URL of the upstream provider API
    pub upstream_base_url: String,

    /// Base URL used when building self-referential navigation links
    pub public_base_url: String,

    /// TTL in seconds for per-credential session caches
    pub private_ttl_secs: u64,

    /// Timeout in seconds applied to every upstream call
    pub request_timeout_secs: u64,

    /// Capacity ceiling for the session registry; least-recently-used
    /// sessions are evicted beyond this
    pub max_sessions: usize,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            upstream_base_url: "https://api.aiven.io".to_string(),
            public_base_url: "http://localhost:8000".to_string(),
            private_ttl_secs: 60,
            request_timeout_secs: 30,
            max_sessions: 256,
        }
    }
}

impl FacadeConfig {
    /// Load configuration from a YAML file; missing fields fall back to defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: FacadeConfig = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values no deployment can work with.
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.upstream_base_url.is_empty() {
            return Err(ConfigError::Invalid(
                "upstream_base_url must not be empty".to_string(),
            ));
        }
        if self.public_base_url.is_empty() {
            return Err(ConfigError::Invalid(
                "public_base_url must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// TTL applied to every per-credential session cache
    pub fn private_ttl(&self) -> Duration {
        Duration::from_secs(self.private_ttl_secs)
    }

    /// Timeout applied to every upstream call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
