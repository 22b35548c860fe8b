//! Clip playback
//!
//! A [`ClipMixer`] holds one [`ClipAction`] per clip of an asset. Actions only
//! track time, weight and loop state; poses are sampled from the clips on
//! demand. Active actions are layered in clip order, each blended over the
//! result so far by its weight.

use cgmath::{InnerSpace, VectorSpace};

use super::clip::AnimationClip;
use crate::assets::{AssetData, NodeTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Repeat,
}

/// Playback summary of one clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    pub clip_index: usize,
    pub loop_mode: LoopMode,
    pub playing: bool,
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    elapsed: f32,
    duration: f32,
}

#[derive(Debug, Clone)]
pub struct ClipAction {
    clip_index: usize,
    name: String,
    duration: f32,
    time: f32,
    weight: f32,
    fade: Option<Fade>,
    loop_mode: LoopMode,
    /// `None` repeats without bound
    repetitions: Option<u32>,
    completed_loops: u32,
    playing: bool,
    /// Contributes to the pose; cleared by `stop`
    enabled: bool,
}

impl ClipAction {
    fn new(clip_index: usize, clip: &AnimationClip) -> Self {
        Self {
            clip_index,
            name: clip.name.clone(),
            duration: clip.duration,
            time: 0.0,
            weight: 1.0,
            fade: None,
            loop_mode: LoopMode::Repeat,
            repetitions: None,
            completed_loops: 0,
            playing: false,
            enabled: false,
        }
    }

    /// Rewinds to the start and clears any fade and loop count
    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        self.completed_loops = 0;
        self.fade = None;
        self.weight = 1.0;
        self
    }

    pub fn play(&mut self) -> &mut Self {
        self.playing = true;
        self.enabled = true;
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.playing = false;
        self.enabled = false;
        self.time = 0.0;
        self
    }

    /// Ramps the weight from 0 to 1 over `seconds`
    pub fn fade_in(&mut self, seconds: f32) -> &mut Self {
        if seconds > 0.0 {
            self.weight = 0.0;
            self.fade = Some(Fade {
                elapsed: 0.0,
                duration: seconds,
            });
        } else {
            self.weight = 1.0;
            self.fade = None;
        }
        self
    }

    pub fn set_loop(&mut self, mode: LoopMode, repetitions: Option<u32>) -> &mut Self {
        self.loop_mode = mode;
        self.repetitions = repetitions;
        self
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.playing || dt <= 0.0 {
            return;
        }

        if let Some(fade) = &mut self.fade {
            fade.elapsed += dt;
            self.weight = (fade.elapsed / fade.duration).min(1.0);
            if fade.elapsed >= fade.duration {
                self.fade = None;
            }
        }

        if self.duration <= 0.0 {
            return;
        }
        self.time += dt;
        if self.time < self.duration {
            return;
        }

        match self.loop_mode {
            LoopMode::Once => self.finish(),
            LoopMode::Repeat => {
                let wraps = (self.time / self.duration).floor() as u32;
                let completed = self.completed_loops.saturating_add(wraps);
                match self.repetitions {
                    Some(limit) if completed >= limit => {
                        self.completed_loops = limit;
                        self.finish();
                    }
                    _ => {
                        self.completed_loops = completed;
                        self.time = self.time.rem_euclid(self.duration);
                    }
                }
            }
        }
    }

    /// Holds the last frame
    fn finish(&mut self) {
        self.time = self.duration;
        self.playing = false;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn completed_loops(&self) -> u32 {
        self.completed_loops
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn state(&self) -> AnimationState {
        AnimationState {
            clip_index: self.clip_index,
            loop_mode: self.loop_mode,
            playing: self.playing,
        }
    }
}

/// Playback state for every clip of one asset
#[derive(Debug, Clone, Default)]
pub struct ClipMixer {
    actions: Vec<ClipAction>,
}

impl ClipMixer {
    /// One idle action per clip, in clip order
    pub fn bind(clips: &[AnimationClip]) -> Self {
        Self {
            actions: clips
                .iter()
                .enumerate()
                .map(|(i, clip)| ClipAction::new(i, clip))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[ClipAction] {
        &self.actions
    }

    pub fn action(&mut self, name: &str) -> Option<&mut ClipAction> {
        self.actions.iter_mut().find(|a| a.name == name)
    }

    pub fn first(&self) -> Option<&ClipAction> {
        self.actions.first()
    }

    pub fn first_mut(&mut self) -> Option<&mut ClipAction> {
        self.actions.first_mut()
    }

    pub fn update(&mut self, dt: f32) {
        for action in &mut self.actions {
            action.advance(dt);
        }
    }

    /// Local node transforms of `asset` with all enabled actions applied.
    /// Nodes no clip touches keep their authored transform.
    pub fn sample_pose(&self, asset: &AssetData) -> Vec<NodeTransform> {
        let mut pose = asset.rest_pose();

        for action in self.actions.iter().filter(|a| a.enabled) {
            let Some(clip) = asset.clips.get(action.clip_index) else {
                continue;
            };
            if action.weight >= 1.0 {
                clip.apply(action.time, &mut pose);
                continue;
            }

            let mut layer = pose.clone();
            clip.apply(action.time, &mut layer);
            for (out, sampled) in pose.iter_mut().zip(&layer) {
                *out = blend(out, sampled, action.weight);
            }
        }

        pose
    }
}

fn blend(from: &NodeTransform, to: &NodeTransform, weight: f32) -> NodeTransform {
    if weight <= 0.0 {
        return *from;
    }
    NodeTransform {
        translation: from.translation.lerp(to.translation, weight),
        rotation: from.rotation.slerp(to.rotation, weight).normalize(),
        scale: from.scale.lerp(to.scale, weight),
    }
}
