//! Application configuration
//!
//! Persistent client configuration stored as JSON. Loading a missing or empty
//! file yields the defaults, so first launch needs no setup step.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client configuration
///
/// # Example
/// ```rust,no_run
/// use pocketchat::config::Config;
///
/// // Load config (returns defaults if the file doesn't exist)
/// let config = Config::load("pocketchat.json").expect("Failed to load config");
///
/// println!("API: {}", config.api_url);
/// println!("Polling every {:?}", config.poll_interval());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the chat backend API
    pub api_url: String,
    /// Conversation poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Enable local notifications
    pub enable_notifications: bool,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to the config file
    ///
    /// # Returns
    /// The loaded configuration, or defaults if the file doesn't exist
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        // Handle empty file (return defaults)
        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to save the config file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, json)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get the poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            poll_interval_ms: 5_000, // near-real-time without a push channel
            enable_notifications: true,
        }
    }
}
