//! Remote asset download

use std::io::Read;
use std::time::Duration;
use vitrine_core::{Result, VitrineError};

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Capability to download a URL into memory
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP(S) fetcher backed by a `ureq` agent. No retries.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            agent: build_agent(REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(secs: u64) -> Self {
        Self {
            agent: build_agent(secs),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {}", url);
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| VitrineError::Network(format!("Failed to fetch {}: {}", url, e)))?;

        let mut reader = response.into_body().into_reader();
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| VitrineError::Network(format!("Failed to read {}: {}", url, e)))?;
        Ok(bytes)
    }
}

fn build_agent(timeout_secs: u64) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .build();
    config.into()
}
