//! Playback mixer: command queue, per-clip actions and pose blending

use crate::clip::{AnimationClip, TrackProperty};
use crate::sampler::{quat_slerp, sample_track};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Overall playback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// A UI action, applied at the start of the next `Mixer::advance`
#[derive(Debug, Clone, PartialEq)]
pub enum MixerCommand {
    Play,
    Pause,
    SetLoop(bool),
    SelectTracks(BTreeSet<String>),
}

/// Commands waiting for the next frame
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<MixerCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: MixerCommand) {
        self.commands.push(command);
    }

    /// Drain all commands, in the order they were pushed
    pub fn drain(&mut self) -> Vec<MixerCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

/// Playback state of one clip
#[derive(Debug, Clone)]
struct Action {
    clip: AnimationClip,
    /// Local time in seconds
    time: f64,
    active: bool,
    paused: bool,
    finished: bool,
}

impl Action {
    fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            active: false,
            paused: false,
            finished: false,
        }
    }

    fn start(&mut self) {
        self.active = true;
        self.paused = false;
        if self.finished {
            self.time = 0.0;
            self.finished = false;
        }
    }

    fn stop(&mut self) {
        self.active = false;
        self.paused = false;
        self.finished = false;
        self.time = 0.0;
    }

    /// Advance local time; looping wraps, otherwise clamp and finish
    fn advance(&mut self, dt: f64, looping: bool) {
        if !self.active || self.paused || self.finished {
            return;
        }
        let duration = self.clip.duration;
        self.time += dt;
        if looping {
            if duration <= 0.0 {
                self.time = 0.0;
            } else if self.time >= duration {
                self.time %= duration;
            }
        } else if self.time >= duration {
            self.time = duration;
            self.finished = true;
        }
    }
}

/// One blended output value for a node property
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSample {
    pub node_name: String,
    pub property: TrackProperty,
    /// 3 floats for translation/scale, 4 for rotation
    pub value: Vec<f32>,
}

/// Mixes the active clips into one pose per node property.
#[derive(Debug)]
pub struct Mixer {
    actions: Vec<Action>,
    mode: PlaybackMode,
    loop_enabled: bool,
    selected: BTreeSet<String>,
    elapsed: f64,
    time_scale: f64,
    paused_at: Option<f64>,
    queue: CommandQueue,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            mode: PlaybackMode::Stopped,
            loop_enabled: true,
            selected: BTreeSet::new(),
            elapsed: 0.0,
            time_scale: 1.0,
            paused_at: None,
            queue: CommandQueue::new(),
        }
    }

    /// Queue a command for the next `advance`
    pub fn enqueue(&mut self, command: MixerCommand) {
        self.queue.push(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// Replace the action set, keeping mode, loop flag and selection.
    ///
    /// When playing or paused, selected clips start from the beginning.
    pub fn rebuild(&mut self, clips: Vec<AnimationClip>) {
        self.actions = clips.into_iter().map(Action::new).collect();
        for action in &mut self.actions {
            if !self.selected.contains(&action.clip.name) {
                continue;
            }
            match self.mode {
                PlaybackMode::Playing => action.start(),
                PlaybackMode::Paused => {
                    action.start();
                    action.paused = true;
                }
                PlaybackMode::Stopped => {}
            }
        }
        log::debug!(
            "Mixer rebuilt with {} clips ({:?})",
            self.actions.len(),
            self.mode
        );
    }

    /// Apply queued commands, advance time and return the blended pose.
    ///
    /// Stopped mixers return an empty pose.
    pub fn advance(&mut self, dt: f64) -> Vec<PoseSample> {
        for command in self.queue.drain() {
            self.apply(command);
        }

        if self.mode == PlaybackMode::Playing {
            let step = dt * self.time_scale;
            self.elapsed += step;
            for action in &mut self.actions {
                action.advance(step, self.loop_enabled);
            }
        }

        if self.mode == PlaybackMode::Stopped {
            return Vec::new();
        }
        self.blend()
    }

    /// Stop everything and rewind
    pub fn stop(&mut self) {
        self.mode = PlaybackMode::Stopped;
        self.elapsed = 0.0;
        self.paused_at = None;
        self.time_scale = 1.0;
        for action in &mut self.actions {
            action.stop();
        }
    }

    fn apply(&mut self, command: MixerCommand) {
        log::debug!("Mixer command {:?}", command);
        match command {
            MixerCommand::Play => {
                self.mode = PlaybackMode::Playing;
                self.time_scale = 1.0;
                self.paused_at = None;
                for action in &mut self.actions {
                    if self.selected.contains(&action.clip.name) {
                        action.start();
                    }
                }
            }
            MixerCommand::Pause => {
                if self.mode == PlaybackMode::Stopped {
                    return;
                }
                self.mode = PlaybackMode::Paused;
                self.paused_at = Some(self.elapsed);
                self.time_scale = 0.0;
                // Every running action freezes in place, selected or not
                for action in self.actions.iter_mut().filter(|a| a.active) {
                    action.paused = true;
                }
            }
            MixerCommand::SetLoop(enabled) => self.loop_enabled = enabled,
            MixerCommand::SelectTracks(selected) => {
                if self.mode == PlaybackMode::Playing {
                    for action in &mut self.actions {
                        let name = &action.clip.name;
                        if selected.contains(name) && !self.selected.contains(name) {
                            action.start();
                        }
                    }
                }
                self.selected = selected;
            }
        }
    }

    /// Average vectors and incrementally slerp rotations per target
    fn blend(&self) -> Vec<PoseSample> {
        let mut acc: BTreeMap<(&str, TrackProperty), (Vec<f32>, usize)> = BTreeMap::new();
        for action in self.actions.iter().filter(|a| a.active) {
            for track in &action.clip.tracks {
                let value = sample_track(track, action.time);
                let key = (track.node_name.as_str(), track.property);
                match acc.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert((value, 1));
                    }
                    Entry::Occupied(mut slot) => {
                        let (blended, count) = slot.get_mut();
                        *count += 1;
                        let w = 1.0 / *count as f32;
                        *blended = if track.property == TrackProperty::Rotation {
                            quat_slerp(blended, &value, w)
                        } else {
                            blended
                                .iter()
                                .zip(&value)
                                .map(|(b, v)| b + (v - b) * w)
                                .collect()
                        };
                    }
                }
            }
        }

        acc.into_iter()
            .map(|((node_name, property), (value, _))| PoseSample {
                node_name: node_name.to_string(),
                property,
                value,
            })
            .collect()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn is_looping(&self) -> bool {
        self.loop_enabled
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Global time advanced while playing
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// `elapsed` at the moment of the last pause
    pub fn paused_at(&self) -> Option<f64> {
        self.paused_at
    }

    pub fn clip_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.clip.name.as_str()).collect()
    }

    fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.clip.name == name)
    }

    /// Local time of a clip's action
    pub fn action_time(&self, name: &str) -> Option<f64> {
        self.action(name).map(|a| a.time)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.action(name).is_some_and(|a| a.active)
    }

    pub fn is_finished(&self, name: &str) -> bool {
        self.action(name).is_some_and(|a| a.finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{synthesize, AnimationDescriptor};

    fn clip(name: &str, duration: f64, dy: f32) -> AnimationClip {
        synthesize(
            name,
            &AnimationDescriptor::new(duration).with_position([0.0, dy, 0.0]),
            "Body",
        )
        .unwrap()
    }

    fn select(names: &[&str]) -> MixerCommand {
        MixerCommand::SelectTracks(names.iter().map(|n| n.to_string()).collect())
    }

    fn translation(pose: &[PoseSample]) -> Vec<f32> {
        pose.iter()
            .find(|p| p.property == TrackProperty::Translation)
            .unwrap()
            .value
            .clone()
    }

    fn playing(clips: Vec<AnimationClip>, selected: &[&str]) -> Mixer {
        let mut mixer = Mixer::new();
        mixer.rebuild(clips);
        mixer.enqueue(select(selected));
        mixer.enqueue(MixerCommand::Play);
        mixer
    }

    #[test]
    fn commands_apply_on_next_advance() {
        let mut mixer = Mixer::new();
        mixer.rebuild(vec![clip("hop", 2.0, 1.0)]);
        mixer.enqueue(select(&["hop"]));
        mixer.enqueue(MixerCommand::Play);
        assert_eq!(mixer.mode(), PlaybackMode::Stopped);
        assert_eq!(mixer.pending_commands(), 2);

        mixer.advance(0.0);
        assert_eq!(mixer.mode(), PlaybackMode::Playing);
        assert_eq!(mixer.pending_commands(), 0);
        assert!(mixer.is_active("hop"));
    }

    #[test]
    fn looping_wraps_local_time() {
        let mut mixer = playing(vec![clip("hop", 2.0, 1.0)], &["hop"]);
        mixer.enqueue(MixerCommand::SetLoop(true));
        mixer.advance(1.0);
        mixer.advance(1.0);
        mixer.advance(0.5);
        let t = mixer.action_time("hop").unwrap();
        assert!((t - 0.5).abs() < 1e-9);
        assert!((mixer.elapsed() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn non_looping_clamps_and_finishes() {
        let mut mixer = playing(vec![clip("hop", 2.0, 4.0)], &["hop"]);
        mixer.enqueue(MixerCommand::SetLoop(false));
        let pose = mixer.advance(3.0);
        assert_eq!(mixer.action_time("hop"), Some(2.0));
        assert!(mixer.is_finished("hop"));
        assert_eq!(translation(&pose), vec![0.0, 4.0, 0.0]);

        // Play restarts a finished clip
        mixer.enqueue(MixerCommand::Play);
        mixer.advance(0.5);
        assert!(!mixer.is_finished("hop"));
        assert_eq!(mixer.action_time("hop"), Some(0.5));
    }

    #[test]
    fn pause_freezes_time_and_keeps_pose() {
        let mut mixer = playing(vec![clip("hop", 2.0, 4.0)], &["hop"]);
        mixer.advance(1.0);
        mixer.enqueue(MixerCommand::Pause);
        let pose = mixer.advance(5.0);
        assert_eq!(mixer.mode(), PlaybackMode::Paused);
        assert_eq!(mixer.paused_at(), Some(1.0));
        assert_eq!(mixer.time_scale(), 0.0);
        assert_eq!(mixer.action_time("hop"), Some(1.0));
        assert!((translation(&pose)[1] - 2.0).abs() < 1e-5);

        mixer.enqueue(MixerCommand::Play);
        mixer.advance(0.5);
        assert_eq!(mixer.action_time("hop"), Some(1.5));
        assert_eq!(mixer.time_scale(), 1.0);
    }

    #[test]
    fn selecting_while_playing_starts_new_clip_and_keeps_old() {
        let mut mixer = playing(vec![clip("a", 4.0, 1.0), clip("b", 4.0, 1.0)], &["a"]);
        mixer.advance(1.0);
        mixer.enqueue(select(&["b"]));
        mixer.advance(1.0);
        assert_eq!(mixer.action_time("a"), Some(2.0));
        assert_eq!(mixer.action_time("b"), Some(1.0));
        assert!(mixer.is_active("a"));
        assert!(mixer.is_active("b"));
    }

    #[test]
    fn pause_freezes_deselected_clips_too() {
        let mut mixer = playing(vec![clip("a", 4.0, 4.0), clip("b", 4.0, 4.0)], &["a"]);
        mixer.advance(2.0);
        mixer.enqueue(MixerCommand::Pause);
        mixer.enqueue(select(&["b"]));
        let pose = mixer.advance(1.0);

        assert_eq!(mixer.mode(), PlaybackMode::Paused);
        assert!(mixer.is_active("a"));
        assert_eq!(mixer.action_time("a"), Some(2.0));
        assert!(!mixer.is_active("b"));
        assert!((translation(&pose)[1] - 2.0).abs() < 1e-5);

        // Play starts the new selection; the frozen clip keeps its time
        mixer.enqueue(MixerCommand::Play);
        mixer.advance(1.0);
        assert_eq!(mixer.action_time("a"), Some(2.0));
        assert!(mixer.is_active("a"));
        assert_eq!(mixer.action_time("b"), Some(1.0));
    }

    #[test]
    fn zero_length_looping_clip_stays_at_zero() {
        let mut still = clip("still", 1.0, 1.0);
        still.duration = 0.0;
        let mut mixer = playing(vec![still], &["still"]);
        mixer.advance(0.5);
        mixer.advance(3.0);
        assert_eq!(mixer.action_time("still"), Some(0.0));
    }

    #[test]
    fn overlapping_clips_are_averaged() {
        let mut mixer = playing(vec![clip("a", 1.0, 2.0), clip("b", 1.0, 4.0)], &["a", "b"]);
        mixer.enqueue(MixerCommand::SetLoop(false));
        let pose = mixer.advance(1.0);
        assert_eq!(translation(&pose), vec![0.0, 3.0, 0.0]);
        assert_eq!(pose.len(), 3);
    }

    #[test]
    fn rebuild_preserves_mode_loop_and_selection() {
        let mut mixer = playing(vec![clip("hop", 2.0, 1.0)], &["hop"]);
        mixer.enqueue(MixerCommand::SetLoop(false));
        mixer.advance(1.0);

        mixer.rebuild(vec![clip("hop", 3.0, 1.0), clip("spin", 1.0, 0.0)]);
        assert_eq!(mixer.mode(), PlaybackMode::Playing);
        assert!(!mixer.is_looping());
        assert!(mixer.selected().contains("hop"));
        assert!(mixer.is_active("hop"));
        assert!(!mixer.is_active("spin"));
        assert_eq!(mixer.action_time("hop"), Some(0.0));
    }

    #[test]
    fn stopped_mixer_outputs_nothing() {
        let mut mixer = Mixer::new();
        mixer.rebuild(vec![clip("hop", 2.0, 1.0)]);
        assert!(mixer.advance(1.0).is_empty());
        mixer.enqueue(MixerCommand::Pause);
        mixer.advance(1.0);
        assert_eq!(mixer.mode(), PlaybackMode::Stopped);
    }
}
