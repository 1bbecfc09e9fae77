//! Error types for Vitrine

use thiserror::Error;

/// The main error type for Vitrine operations
#[derive(Debug, Error)]
pub enum VitrineError {
    /// The payload is not a well-formed glTF/GLB container
    #[error("Decode error: {0}")]
    Decode(String),

    /// The importer was handed something that is neither a file nor a URL
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The export codec failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cloud list/upload/download or URL fetch failure
    #[error("Network error: {0}")]
    Network(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Invalid enum value: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        value: String,
        allowed: Vec<String>,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(String),
}

/// Result type alias for Vitrine operations
pub type Result<T> = std::result::Result<T, VitrineError>;

impl VitrineError {
    /// Check a scalar against an inclusive range, producing `ValueOutOfRange`.
    pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
        if value.is_nan() || value < min || value > max {
            return Err(VitrineError::ValueOutOfRange {
                field: field.to_string(),
                min,
                max,
                value,
            });
        }
        Ok(())
    }
}

impl From<toml::de::Error> for VitrineError {
    fn from(err: toml::de::Error) -> Self {
        VitrineError::TomlParse(err.to_string())
    }
}

impl From<toml::ser::Error> for VitrineError {
    fn from(err: toml::ser::Error) -> Self {
        VitrineError::TomlSer(err.to_string())
    }
}
