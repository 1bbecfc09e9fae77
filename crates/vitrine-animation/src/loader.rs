//! TOML-based animation descriptor loading

use crate::library::AnimationLibrary;
use crate::synth::AnimationDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use vitrine_core::{Result, VitrineError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct DescriptorFile {
    #[serde(default)]
    animations: BTreeMap<String, AnimationDescriptor>,
}

/// Load descriptors from a `.anim.toml` file.
///
/// ```toml
/// [animations.hop]
/// duration = 1.5
/// position = [0.0, 1.0, 0.0]
/// scale = [1.2, 1.2, 1.2]
/// rotation = [0.0, 180.0, 0.0]
/// ```
pub fn load_descriptors(path: &Path) -> Result<BTreeMap<String, AnimationDescriptor>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        VitrineError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    load_descriptors_from_str(&content)
}

/// Parse and validate descriptors from a TOML string
pub fn load_descriptors_from_str(content: &str) -> Result<BTreeMap<String, AnimationDescriptor>> {
    let file: DescriptorFile = toml::from_str(content)?;
    for (name, descriptor) in &file.animations {
        descriptor.validate().map_err(|e| {
            VitrineError::Validation(format!("animation '{}': {}", name, e))
        })?;
    }
    Ok(file.animations)
}

/// Write the library's descriptors back out in the same format
pub fn descriptors_to_toml(library: &AnimationLibrary) -> Result<String> {
    let file = DescriptorFile {
        animations: library.descriptors().clone(),
    };
    Ok(toml::to_string_pretty(&file)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_descriptor_tables() {
        let toml_str = r#"
[animations.hop]
duration = 1.5
position = [0.0, 1.0, 0.0]

[animations.spin]
duration = 2.0
rotation = [0.0, 360.0, 0.0]
"#;
        let descriptors = load_descriptors_from_str(toml_str).unwrap();
        assert_eq!(descriptors.len(), 2);
        let hop = &descriptors["hop"];
        assert_eq!(hop.duration, 1.5);
        assert_eq!(hop.scale, [1.0, 1.0, 1.0]);
        assert_eq!(descriptors["spin"].rotation, [0.0, 360.0, 0.0]);
    }

    #[test]
    fn reject_zero_duration() {
        let toml_str = r#"
[animations.bad]
duration = 0.0
"#;
        let err = load_descriptors_from_str(toml_str).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn reject_missing_duration() {
        assert!(load_descriptors_from_str("[animations.bad]\nposition = [1.0, 0.0, 0.0]\n").is_err());
    }

    #[test]
    fn library_round_trips_through_toml() {
        let mut library = AnimationLibrary::new();
        library
            .add("hop", AnimationDescriptor::new(1.0).with_position([0.0, 2.0, 0.0]))
            .unwrap();
        let text = descriptors_to_toml(&library).unwrap();
        let loaded = load_descriptors_from_str(&text).unwrap();
        assert_eq!(&loaded, library.descriptors());
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("vitrine-{}.anim.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[animations.hop]\nduration = 1.0\n").unwrap();
        assert!(load_descriptors(&path).unwrap().contains_key("hop"));
        let _ = std::fs::remove_file(&path);
        assert!(load_descriptors(&path).is_err());
    }
}
