//! Layered configuration
//!
//! Loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `VITRINE_STORAGE_URL`, `VITRINE_STORAGE_BUCKET`,
//!    `VITRINE_STORAGE_TOKEN`
//! 2. Project-local: `.vitrine/config.toml`
//! 3. Global: `~/.vitrine/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vitrine_cloud::StorageConfig;
use vitrine_core::{Result, VitrineError};
use vitrine_export::ExportOptions;
use vitrine_import::{ImportOptions, DEFAULT_DRACO_DECODER_URL};

/// `[import]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub draco_decoder_url: String,
    /// Descriptor file loaded at startup
    pub animations: Option<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            draco_decoder_url: DEFAULT_DRACO_DECODER_URL.to_string(),
            animations: None,
        }
    }
}

impl ImportConfig {
    pub fn options(&self) -> ImportOptions {
        ImportOptions {
            draco_decoder_url: self.draco_decoder_url.clone(),
        }
    }
}

/// `[export]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    #[serde(flatten)]
    pub options: ExportOptions,
    pub output_dir: PathBuf,
    /// Overrides `Exported.<ext>`
    pub file_name: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            options: ExportOptions::default(),
            output_dir: PathBuf::from("."),
            file_name: None,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitrineConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// One config file, every key optional so layers only override what they set
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    storage: StorageLayer,
    #[serde(default)]
    import: ImportLayer,
    #[serde(default)]
    export: ExportLayer,
}

#[derive(Debug, Default, Deserialize)]
struct StorageLayer {
    base_url: Option<String>,
    bucket: Option<String>,
    prefix: Option<String>,
    poll_interval_secs: Option<u64>,
    timeout_secs: Option<u64>,
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ImportLayer {
    draco_decoder_url: Option<String>,
    animations: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportLayer {
    binary: Option<bool>,
    embed_images: Option<bool>,
    only_visible: Option<bool>,
    max_texture_size: Option<u32>,
    output_dir: Option<PathBuf>,
    file_name: Option<String>,
}

impl VitrineConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Layer 1: Global config (~/.vitrine/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::load_file(&global_path)?);
            }
        }

        // Layer 2: Project-local config (.vitrine/config.toml)
        let local_path = PathBuf::from(".vitrine/config.toml");
        if local_path.exists() {
            config.merge(Self::load_file(&local_path)?);
        }

        // Layer 3: Environment variable overrides
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Defaults overlaid with a single file, then the environment
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(Self::load_file(path)?);
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".vitrine").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            VitrineError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge(&mut self, layer: ConfigFile) {
        let storage = &mut self.storage;
        if let Some(v) = layer.storage.base_url {
            storage.base_url = v;
        }
        if layer.storage.bucket.is_some() {
            storage.bucket = layer.storage.bucket;
        }
        if let Some(v) = layer.storage.prefix {
            storage.prefix = v;
        }
        if let Some(v) = layer.storage.poll_interval_secs {
            storage.poll_interval_secs = v;
        }
        if let Some(v) = layer.storage.timeout_secs {
            storage.timeout_secs = v;
        }
        if layer.storage.token.is_some() {
            storage.token = layer.storage.token;
        }

        if let Some(v) = layer.import.draco_decoder_url {
            self.import.draco_decoder_url = v;
        }
        if layer.import.animations.is_some() {
            self.import.animations = layer.import.animations;
        }

        let export = &mut self.export;
        if let Some(v) = layer.export.binary {
            export.options.binary = v;
        }
        if let Some(v) = layer.export.embed_images {
            export.options.embed_images = v;
        }
        if let Some(v) = layer.export.only_visible {
            export.options.only_visible = v;
        }
        if let Some(v) = layer.export.max_texture_size {
            export.options.max_texture_size = v;
        }
        if let Some(v) = layer.export.output_dir {
            export.output_dir = v;
        }
        if layer.export.file_name.is_some() {
            export.file_name = layer.export.file_name;
        }
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("VITRINE_STORAGE_URL") {
            self.storage.base_url = url;
        }
        if let Some(bucket) = lookup("VITRINE_STORAGE_BUCKET") {
            self.storage.bucket = Some(bucket);
        }
        if let Some(token) = lookup("VITRINE_STORAGE_TOKEN") {
            self.storage.token = Some(token);
        }
    }

    /// Serialize the resolved config (for `vitrine config`)
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vitrine_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let config = VitrineConfig::default();
        assert_eq!(config.storage.folder(), "models/glb");
        assert_eq!(config.import.draco_decoder_url, DEFAULT_DRACO_DECODER_URL);
        assert!(config.export.options.binary);
        assert_eq!(config.export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn file_layer_overrides_only_what_it_sets() {
        let mut config = VitrineConfig::default();
        config.merge(
            toml::from_str(
                r#"
[storage]
bucket = "demo.appspot.com"
poll_interval_secs = 10

[export]
binary = false
max_texture_size = 1024
"#,
            )
            .unwrap(),
        );
        assert_eq!(config.storage.bucket.as_deref(), Some("demo.appspot.com"));
        assert_eq!(config.storage.poll_interval_secs, 10);
        assert_eq!(config.storage.prefix, "models/glb");
        assert!(!config.export.options.binary);
        assert!(config.export.options.embed_images);
        assert_eq!(config.export.options.max_texture_size, 1024);
    }

    #[test]
    fn later_layers_win() {
        let mut config = VitrineConfig::default();
        config.merge(toml::from_str("[storage]\nbucket = \"global\"\ntoken = \"g\"\n").unwrap());
        config.merge(toml::from_str("[storage]\nbucket = \"local\"\n").unwrap());
        assert_eq!(config.storage.bucket.as_deref(), Some("local"));
        assert_eq!(config.storage.token.as_deref(), Some("g"));
    }

    #[test]
    fn env_overrides_storage() {
        let env: HashMap<&str, &str> = [
            ("VITRINE_STORAGE_BUCKET", "env-bucket"),
            ("VITRINE_STORAGE_TOKEN", "secret"),
        ]
        .into_iter()
        .collect();
        let mut config = VitrineConfig::default();
        config.merge(toml::from_str("[storage]\nbucket = \"file-bucket\"\n").unwrap());
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.storage.bucket.as_deref(), Some("env-bucket"));
        assert_eq!(config.storage.token.as_deref(), Some("secret"));
        assert_eq!(config.storage.base_url, vitrine_cloud::config::DEFAULT_STORAGE_URL);
    }

    #[test]
    fn load_from_file_and_report_bad_toml() {
        let path = temp_config("[import]\ndraco_decoder_url = \"https://example.com/draco/\"\n");
        let config = VitrineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.import.options().draco_decoder_url, "https://example.com/draco/");

        let bad = temp_config("[import\n");
        assert!(matches!(
            VitrineConfig::load_from_file(&bad),
            Err(VitrineError::Config(_))
        ));
    }

    #[test]
    fn resolved_config_serializes() {
        let text = VitrineConfig::default().to_toml_string().unwrap();
        assert!(text.contains("[storage]"));
        assert!(text.contains("max_texture_size = 4096"));
    }
}
