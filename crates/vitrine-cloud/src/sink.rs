//! Export straight into cloud storage

use crate::naming::{object_name, unix_millis};
use crate::store::ObjectStore;
use std::sync::Arc;
use vitrine_core::Result;
use vitrine_export::{ExportOptions, ExportOutput, ExportSink};

/// Settings used for cloud saves: visible nodes only, GLB, textures capped
/// at 1024 px.
pub fn cloud_export_options() -> ExportOptions {
    ExportOptions {
        binary: true,
        embed_images: true,
        only_visible: true,
        max_texture_size: 1024,
    }
}

/// Uploads exports under the storage folder
pub struct CloudSink {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    name: Option<String>,
}

impl CloudSink {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            name: None,
        }
    }

    /// Upload as `<prefix>/<name>.<ext>` instead of a timestamped name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl ExportSink for CloudSink {
    fn deliver(&self, output: &ExportOutput) -> Result<String> {
        let object = object_name(
            &self.prefix,
            self.name.as_deref(),
            output.extension(),
            unix_millis(),
        );
        let remote = self
            .store
            .upload(&object, &output.bytes, output.mime_type())?;
        Ok(remote.object_name)
    }
}
