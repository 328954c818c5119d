//! Gateway configuration.

use crate::consts::gateway_consts::{
    HEALTH_ENDPOINT, startup_retry, timeouts, transient_retry,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};

/// Tunables for the gateway client, persisted as JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Backend origin, e.g. `http://localhost:3000`. Falls back to the environment's URL.
    pub base_url: Option<String>,
    /// Per-attempt timeout for ordinary requests.
    pub base_timeout_ms: u64,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    /// Unreachable auth attempts tolerated before switching to offline mode.
    pub max_startup_retries: u32,
    /// Cap on a single server-starting delay.
    pub max_startup_delay_ms: u64,
    /// Relative endpoint probed by the health check.
    pub health_endpoint: String,
    /// Timeout for the health probe.
    pub health_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            base_timeout_ms: timeouts::BASE_TIMEOUT_MS,
            max_retries: transient_retry::MAX_RETRIES,
            max_startup_retries: startup_retry::MAX_STARTUP_RETRIES,
            max_startup_delay_ms: startup_retry::MAX_BACKOFF_MS,
            health_endpoint: HEALTH_ENDPOINT.to_string(),
            health_timeout_ms: timeouts::HEALTH_CHECK_TIMEOUT_MS,
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: GatewayConfig = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, std::io::Error> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// `~/.craft/gateway.json`
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let home_path = home::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Failed to determine home directory",
        )
    })?;
    Ok(home_path.join(".craft").join("gateway.json"))
}
