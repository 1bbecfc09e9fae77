//! Storage endpoint settings

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vitrine_core::{Result, VitrineError};

pub const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com/v0";
pub const DEFAULT_PREFIX: &str = "models/glb";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// `[storage]` section of the Vitrine config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub base_url: String,
    pub bucket: Option<String>,
    /// Folder every model lives under
    pub prefix: String,
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
    /// Bearer token sent with every request, when set
    pub token: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORAGE_URL.to_string(),
            bucket: None,
            prefix: DEFAULT_PREFIX.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }
}

impl StorageConfig {
    pub fn bucket(&self) -> Result<&str> {
        self.bucket
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| {
                VitrineError::Config(
                    "Storage bucket not configured. Set VITRINE_STORAGE_BUCKET or add to .vitrine/config.toml"
                        .to_string(),
                )
            })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Prefix without surrounding slashes
    pub fn folder(&self) -> &str {
        self.prefix.trim_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.folder(), "models/glb");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert!(matches!(config.bucket(), Err(VitrineError::Config(_))));
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let config: StorageConfig = from_json(r#"{"bucket": "demo.appspot.com", "prefix": "/models/glb/"}"#);
        assert_eq!(config.bucket().unwrap(), "demo.appspot.com");
        assert_eq!(config.folder(), "models/glb");
        assert_eq!(config.base_url, DEFAULT_STORAGE_URL);
    }

    fn from_json(json: &str) -> StorageConfig {
        serde_json::from_str(json).unwrap()
    }
}
