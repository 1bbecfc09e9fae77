//! Track synthesis from editor animation descriptors

use crate::clip::{
    AnimationClip, AnimationTrack, ClipOrigin, Interpolation, Keyframe, TrackProperty,
};
use serde::{Deserialize, Serialize};
use vitrine_core::{quat_from_euler_degrees, Result, VitrineError};

/// A user-authored animation: where the target ends up after `duration`.
///
/// Position is a delta from the origin, scale an absolute target and
/// rotation per-axis degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    /// Seconds, must be positive and finite
    pub duration: f64,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
}

fn unit_scale() -> [f32; 3] {
    [1.0; 3]
}

impl AnimationDescriptor {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            position: [0.0; 3],
            scale: unit_scale(),
            rotation: [0.0; 3],
        }
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, degrees: [f32; 3]) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(VitrineError::Validation(format!(
                "animation duration must be a positive number of seconds, got {}",
                self.duration
            )));
        }
        let mut values = self
            .position
            .iter()
            .chain(&self.scale)
            .chain(&self.rotation);
        if !values.all(|v| v.is_finite()) {
            return Err(VitrineError::Validation(
                "animation position, scale and rotation must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build the three-track clip for `descriptor` targeting `target_node`.
///
/// Every track has exactly two keyframes at `0` and `duration`.
pub fn synthesize(
    name: &str,
    descriptor: &AnimationDescriptor,
    target_node: &str,
) -> Result<AnimationClip> {
    descriptor.validate()?;
    let d = descriptor.duration;
    let rotation = quat_from_euler_degrees(descriptor.rotation);

    let track = |property, from: Vec<f32>, to: Vec<f32>| AnimationTrack {
        node_name: target_node.to_string(),
        property,
        interpolation: Interpolation::Linear,
        keyframes: vec![Keyframe::new(0.0, from), Keyframe::new(d, to)],
    };

    Ok(AnimationClip {
        name: name.to_string(),
        duration: d,
        tracks: vec![
            track(
                TrackProperty::Translation,
                vec![0.0; 3],
                descriptor.position.to_vec(),
            ),
            track(TrackProperty::Scale, vec![1.0; 3], descriptor.scale.to_vec()),
            track(
                TrackProperty::Rotation,
                vec![0.0, 0.0, 0.0, 1.0],
                rotation.to_array().to_vec(),
            ),
        ],
        origin: ClipOrigin::Synthesized,
    })
}
