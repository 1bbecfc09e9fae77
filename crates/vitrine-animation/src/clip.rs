//! Core animation data types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use vitrine_import::{ChannelInterpolation, ChannelProperty, ImportedNodeClip};

/// A named set of node tracks with a duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    /// Total duration in seconds
    pub duration: f64,
    pub tracks: Vec<AnimationTrack>,
    #[serde(default)]
    pub origin: ClipOrigin,
}

/// Where a clip came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClipOrigin {
    /// Shipped inside the imported asset
    #[default]
    Embedded,
    /// Generated from an animation descriptor
    Synthesized,
}

/// One property of one node over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationTrack {
    /// Target node, by name
    pub node_name: String,
    pub property: TrackProperty,
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Sorted by time
    pub keyframes: Vec<Keyframe>,
}

/// A value at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Seconds from clip start
    pub time: f64,
    /// 3 floats for translation/scale, 4 for rotation (quaternion xyzw)
    pub value: Vec<f32>,
    #[serde(default)]
    pub in_tangent: Option<Vec<f32>>,
    #[serde(default)]
    pub out_tangent: Option<Vec<f32>>,
}

impl Keyframe {
    pub fn new(time: f64, value: Vec<f32>) -> Self {
        Self {
            time,
            value,
            in_tangent: None,
            out_tangent: None,
        }
    }
}

/// Which transform property a track drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrackProperty {
    Translation,
    /// Quaternion, interpolated spherically
    Rotation,
    Scale,
}

impl TrackProperty {
    /// Number of floats per keyframe value
    pub fn width(self) -> usize {
        match self {
            TrackProperty::Rotation => 4,
            _ => 3,
        }
    }

    /// glTF channel path
    pub fn path(self) -> &'static str {
        match self {
            TrackProperty::Translation => "translation",
            TrackProperty::Rotation => "rotation",
            TrackProperty::Scale => "scale",
        }
    }
}

/// How to interpolate between keyframes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Hold the previous value
    Step,
    #[default]
    Linear,
    /// Cubic Hermite spline (requires tangents)
    CubicSpline,
}

impl Interpolation {
    /// glTF sampler interpolation name
    pub fn gltf_name(self) -> &'static str {
        match self {
            Interpolation::Step => "STEP",
            Interpolation::Linear => "LINEAR",
            Interpolation::CubicSpline => "CUBICSPLINE",
        }
    }
}

impl AnimationClip {
    /// Convert a node animation read from an asset
    pub fn from_imported(imported: &ImportedNodeClip) -> Self {
        let tracks = imported
            .channels
            .iter()
            .map(|ch| {
                let property = match ch.property {
                    ChannelProperty::Translation => TrackProperty::Translation,
                    ChannelProperty::Rotation => TrackProperty::Rotation,
                    ChannelProperty::Scale => TrackProperty::Scale,
                };
                let interpolation = match ch.interpolation {
                    ChannelInterpolation::Step => Interpolation::Step,
                    ChannelInterpolation::Linear => Interpolation::Linear,
                    ChannelInterpolation::CubicSpline => Interpolation::CubicSpline,
                };
                let keyframes = ch
                    .keyframes
                    .iter()
                    .map(|kf| Keyframe {
                        time: kf.time as f64,
                        value: kf.value.clone(),
                        in_tangent: kf.in_tangent.clone(),
                        out_tangent: kf.out_tangent.clone(),
                    })
                    .collect();
                AnimationTrack {
                    node_name: ch.node_name.clone(),
                    property,
                    interpolation,
                    keyframes,
                }
            })
            .collect();

        Self {
            name: imported.name.clone(),
            duration: imported.duration as f64,
            tracks,
            origin: ClipOrigin::Embedded,
        }
    }

    /// Names of all nodes this clip drives
    pub fn target_nodes(&self) -> BTreeSet<&str> {
        self.tracks.iter().map(|t| t.node_name.as_str()).collect()
    }
}
