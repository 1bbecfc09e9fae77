//! Vitrine Import - glTF/GLB asset importer
//!
//! Turns a file, URL or byte buffer into a single-rooted `SceneNode` tree
//! plus the raw node animations embedded in the asset.

mod fetch;
mod gltf_import;
mod source;
mod types;

pub use fetch::{Fetch, HttpFetcher};
pub use gltf_import::{
    import, import_slice, import_with, ImportOptions, DEFAULT_DRACO_DECODER_URL,
};
pub use source::ImportSource;
pub use types::{
    ChannelInterpolation, ChannelProperty, ImportMeta, ImportResult, ImportedKeyframe,
    ImportedNodeChannel, ImportedNodeClip,
};
