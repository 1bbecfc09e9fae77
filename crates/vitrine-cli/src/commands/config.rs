//! `vitrine config`

use anyhow::{Context, Result};
use vitrine_runtime::VitrineConfig;

pub fn run() -> Result<()> {
    let mut config = VitrineConfig::load().context("Failed to load config")?;
    if config.storage.token.is_some() {
        config.storage.token = Some("<redacted>".to_string());
    }
    print!("{}", config.to_toml_string()?);
    Ok(())
}
