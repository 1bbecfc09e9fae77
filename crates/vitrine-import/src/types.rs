//! Import result types

use vitrine_scene::SceneNode;

/// Result of importing an asset
#[derive(Debug)]
pub struct ImportResult {
    /// The single root of the imported scene
    pub root: SceneNode,
    /// Node-level transform animations embedded in the asset
    pub clips: Vec<ImportedNodeClip>,
    pub meta: ImportMeta,
}

impl ImportResult {
    pub fn has_node_animations(&self) -> bool {
        !self.clips.is_empty()
    }

    pub fn clip_names(&self) -> Vec<&str> {
        self.clips.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Facts about the imported asset
#[derive(Debug, Clone, PartialEq)]
pub struct ImportMeta {
    pub name: String,
    /// `glb` or `gltf`
    pub format: String,
    /// `sha256:`-prefixed hash of the raw bytes
    pub hash: String,
    pub byte_len: usize,
    pub node_count: usize,
    pub mesh_count: usize,
    pub vertex_count: usize,
    pub material_count: usize,
    pub texture_count: usize,
}

/// Which transform property a channel animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelProperty {
    Translation,
    Rotation,
    Scale,
}

/// Keyframe interpolation as declared by the asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelInterpolation {
    Step,
    Linear,
    CubicSpline,
}

/// A single keyframe
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedKeyframe {
    pub time: f32,
    /// 3 floats for translation/scale, 4 for rotation (quaternion xyzw)
    pub value: Vec<f32>,
    /// Cubic spline tangents, same width as `value`
    pub in_tangent: Option<Vec<f32>>,
    pub out_tangent: Option<Vec<f32>>,
}

/// An animation channel targeting one node's transform property
#[derive(Debug, Clone)]
pub struct ImportedNodeChannel {
    pub node_name: String,
    pub property: ChannelProperty,
    pub interpolation: ChannelInterpolation,
    pub keyframes: Vec<ImportedKeyframe>,
}

/// A complete node-level animation clip
#[derive(Debug, Clone)]
pub struct ImportedNodeClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<ImportedNodeChannel>,
}
