//! Scene export for Vitrine
//!
//! Serializes a scene subtree and its animation clips to glTF 2.0, either as
//! pretty-printed JSON with embedded data URIs or as a GLB container, and
//! hands the result to an [`ExportSink`].

pub mod document;
pub mod exporter;
pub mod glb;
pub mod sink;

pub use exporter::{export, DroppedTrack, ExportOptions, ExportOutput, ExportReport};
pub use glb::write_glb;
pub use sink::{ExportSink, LocalFileSink};
