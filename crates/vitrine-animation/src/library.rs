//! The active animation set: embedded clips plus user descriptors

use crate::clip::AnimationClip;
use crate::synth::{synthesize, AnimationDescriptor};
use std::collections::BTreeMap;
use vitrine_core::{Result, VitrineError};

/// Clips the mixer plays.
///
/// Embedded clips come from the imported asset; synthesized ones are
/// regenerated from their descriptors whenever clips are requested.
#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    embedded: Vec<AnimationClip>,
    descriptors: BTreeMap<String, AnimationDescriptor>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a descriptor. Nothing changes when validation fails.
    pub fn add(&mut self, name: &str, descriptor: AnimationDescriptor) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VitrineError::Validation(
                "animation name cannot be empty".to_string(),
            ));
        }
        descriptor.validate()?;
        if self.embedded.iter().any(|c| c.name == name) {
            return Err(VitrineError::Validation(format!(
                "'{}' is already an animation of the imported model",
                name
            )));
        }
        if self
            .descriptors
            .insert(name.to_string(), descriptor)
            .is_some()
        {
            log::debug!("Replaced animation '{}'", name);
        } else {
            log::debug!("Added animation '{}'", name);
        }
        Ok(())
    }

    /// Add several descriptors at once; all or none
    pub fn extend(&mut self, descriptors: BTreeMap<String, AnimationDescriptor>) -> Result<()> {
        let mut staged = self.clone();
        for (name, descriptor) in descriptors {
            staged.add(&name, descriptor)?;
        }
        *self = staged;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<AnimationDescriptor> {
        self.descriptors.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&AnimationDescriptor> {
        self.descriptors.get(name)
    }

    pub fn descriptors(&self) -> &BTreeMap<String, AnimationDescriptor> {
        &self.descriptors
    }

    /// Replace the embedded clips (on import). Descriptors whose names now
    /// collide with an embedded clip are dropped.
    pub fn set_embedded(&mut self, clips: Vec<AnimationClip>) {
        for clip in &clips {
            if self.descriptors.remove(&clip.name).is_some() {
                log::warn!(
                    "Dropping animation '{}': the imported model has a clip with that name",
                    clip.name
                );
            }
        }
        self.embedded = clips;
    }

    pub fn embedded(&self) -> &[AnimationClip] {
        &self.embedded
    }

    /// Every clip name: embedded first, then descriptors in name order
    pub fn names(&self) -> Vec<String> {
        self.embedded
            .iter()
            .map(|c| c.name.clone())
            .chain(self.descriptors.keys().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.embedded.len() + self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedded clips followed by freshly synthesized ones targeting `target`
    pub fn clips(&self, target: &str) -> Result<Vec<AnimationClip>> {
        let mut clips = self.embedded.clone();
        for (name, descriptor) in &self.descriptors {
            clips.push(synthesize(name, descriptor, target)?);
        }
        Ok(clips)
    }
}
