//! Where an asset comes from

use std::fmt;
use std::path::{Path, PathBuf};
use vitrine_core::{Result, VitrineError};

/// An asset to import
#[derive(Clone)]
pub enum ImportSource {
    /// A `.glb`/`.gltf` file on disk
    File(PathBuf),
    /// An HTTP(S) URL
    Url(String),
    /// An in-memory buffer, e.g. an upload
    Bytes { name: String, data: Vec<u8> },
}

impl ImportSource {
    /// Classify a user-supplied location.
    ///
    /// `http://` and `https://` prefixes are URLs, existing paths are files,
    /// anything else is rejected with `UnsupportedInput`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return Ok(ImportSource::Url(trimmed.to_string()));
        }
        let path = Path::new(trimmed);
        if !trimmed.is_empty() && path.is_file() {
            return Ok(ImportSource::File(path.to_path_buf()));
        }
        Err(VitrineError::UnsupportedInput(format!(
            "'{}' is neither an existing file nor an http(s) URL",
            input
        )))
    }

    /// Short name used for the scene root and the import metadata
    pub fn display_name(&self) -> String {
        match self {
            ImportSource::File(path) => path
                .file_stem()
                .and_then(|n| n.to_str())
                .unwrap_or("unnamed")
                .to_string(),
            ImportSource::Url(url) => {
                let path = url.split(&['?', '#'][..]).next().unwrap_or(url);
                let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
                let stem = last.rsplit_once('.').map(|(s, _)| s).unwrap_or(last);
                if stem.is_empty() {
                    "remote".to_string()
                } else {
                    stem.to_string()
                }
            }
            ImportSource::Bytes { name, .. } => name.clone(),
        }
    }
}

impl fmt::Debug for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSource::File(path) => write!(f, "File({})", path.display()),
            ImportSource::Url(url) => write!(f, "Url({})", url),
            ImportSource::Bytes { name, data } => write!(f, "Bytes({}, {} bytes)", name, data.len()),
        }
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSource::File(path) => write!(f, "{}", path.display()),
            ImportSource::Url(url) => f.write_str(url),
            ImportSource::Bytes { name, .. } => write!(f, "<{}>", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_urls() {
        let source = ImportSource::parse("https://example.com/models/robot.glb?alt=media").unwrap();
        assert!(matches!(source, ImportSource::Url(_)));
        assert_eq!(source.display_name(), "robot");
        assert!(matches!(
            ImportSource::parse("HTTP://example.com/a.gltf").unwrap(),
            ImportSource::Url(_)
        ));
    }

    #[test]
    fn parse_existing_file() {
        let path = std::env::temp_dir().join(format!("vitrine-src-{}.glb", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"glTF").unwrap();
        let source = ImportSource::parse(path.to_str().unwrap()).unwrap();
        assert!(matches!(source, ImportSource::File(_)));
        assert!(source.display_name().starts_with("vitrine-src-"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn parse_rejects_everything_else() {
        for input in ["", "ftp://example.com/a.glb", "/definitely/not/here.glb"] {
            assert!(matches!(
                ImportSource::parse(input),
                Err(VitrineError::UnsupportedInput(_))
            ));
        }
    }
}
