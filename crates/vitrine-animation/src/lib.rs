//! Animation for Vitrine
//!
//! - **Clips**: node transform tracks, either embedded in the imported asset
//!   or synthesized from a user descriptor (move/scale/rotate over a duration)
//! - **Library**: the active descriptor set, loadable from TOML
//! - **Mixer**: queued play/pause/loop/select commands, per-clip local time
//!   and a blended pose per node property

pub mod clip;
pub mod library;
pub mod loader;
pub mod mixer;
pub mod sampler;
pub mod synth;

pub use clip::{AnimationClip, AnimationTrack, ClipOrigin, Interpolation, Keyframe, TrackProperty};
pub use library::AnimationLibrary;
pub use loader::{descriptors_to_toml, load_descriptors, load_descriptors_from_str};
pub use mixer::{CommandQueue, Mixer, MixerCommand, PlaybackMode, PoseSample};
pub use synth::{synthesize, AnimationDescriptor};
