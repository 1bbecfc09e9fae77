//! Export destinations

use crate::exporter::ExportOutput;
use std::path::PathBuf;
use vitrine_core::Result;

/// Somewhere an export can be delivered to
pub trait ExportSink {
    /// Store the output and return where it went (a path or an object name)
    fn deliver(&self, output: &ExportOutput) -> Result<String>;
}

/// Writes exports into a local directory
#[derive(Debug, Clone)]
pub struct LocalFileSink {
    dir: PathBuf,
    file_name: Option<String>,
}

impl LocalFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_name: None,
        }
    }

    /// Use `name` instead of `Exported.<ext>`. A missing extension is added.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    fn target(&self, output: &ExportOutput) -> PathBuf {
        let name = match &self.file_name {
            Some(name) if name.ends_with(&format!(".{}", output.extension())) => name.clone(),
            Some(name) => format!("{}.{}", name, output.extension()),
            None => output.default_file_name(),
        };
        self.dir.join(name)
    }
}

impl ExportSink for LocalFileSink {
    fn deliver(&self, output: &ExportOutput) -> Result<String> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.target(output);
        std::fs::write(&path, &output.bytes)?;
        log::info!("Wrote {} ({} bytes)", path.display(), output.bytes.len());
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::{export, ExportOptions};
    use vitrine_scene::SceneNode;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("vitrine-export-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn writes_default_file_names() {
        let dir = temp_dir();
        let sink = LocalFileSink::new(&dir);
        let scene = SceneNode::new("empty");

        let glb = export(&scene, &[], &ExportOptions::default()).unwrap();
        let path = sink.deliver(&glb).unwrap();
        assert!(path.ends_with("Exported.glb"));
        assert_eq!(std::fs::read(&path).unwrap(), glb.bytes);

        let json = export(
            &scene,
            &[],
            &ExportOptions {
                binary: false,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(sink.deliver(&json).unwrap().ends_with("Exported.gltf"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn custom_name_gets_extension() {
        let dir = temp_dir();
        let output = export(&SceneNode::new("empty"), &[], &ExportOptions::default()).unwrap();

        let named = LocalFileSink::new(&dir).with_file_name("robot");
        assert!(named.deliver(&output).unwrap().ends_with("robot.glb"));
        let explicit = LocalFileSink::new(&dir).with_file_name("robot.glb");
        assert!(explicit.deliver(&output).unwrap().ends_with("robot.glb"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
