//! The animated placement: one asset playing its first clip on loop

use crate::assets::{AssetCache, AssetHandle, NodeTransform};
use crate::placement::{ModelInstance, Placement, Transform};

use super::mixer::{AnimationState, ClipMixer, LoopMode};

/// When playback begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    /// As soon as the clips are available
    #[default]
    Auto,
    /// On the first call to [`AnimatedPlacement::trigger`]
    OnTrigger,
}

/// State bound to one loaded handle; replaced when the asset reloads
#[derive(Debug)]
struct Bound {
    instance: ModelInstance,
    mixer: ClipMixer,
    pose: Vec<NodeTransform>,
    started: bool,
}

#[derive(Debug)]
pub struct AnimatedPlacement {
    pub path: String,
    transform: Transform,
    start_mode: StartMode,
    bound: Option<Bound>,
    /// Single-shot trigger latch; never cleared
    triggered: bool,
    starts: u32,
}

impl AnimatedPlacement {
    pub fn new(path: impl Into<String>, transform: Transform, start_mode: StartMode) -> Self {
        Self {
            path: path.into(),
            transform,
            start_mode,
            bound: None,
            triggered: false,
            starts: 0,
        }
    }

    /// Requests the asset and binds it when a new handle becomes available
    pub fn resolve(&mut self, cache: &mut AssetCache) {
        if let Some(handle) = cache.request(&self.path) {
            self.on_asset_available(handle);
        }
    }

    /// Binds a freshly loaded handle. Repeated notifications for the handle
    /// already bound do nothing.
    pub fn on_asset_available(&mut self, handle: AssetHandle) {
        if self
            .bound
            .as_ref()
            .is_some_and(|b| b.instance.is_built_from(&handle))
        {
            return;
        }

        let mixer = ClipMixer::bind(&handle.clips);
        let pose = handle.rest_pose();
        log::debug!(
            "{}: bound {} clip(s) {:?}",
            self.path,
            handle.clips.len(),
            handle.clip_names()
        );
        let placement = Placement {
            transform: self.transform,
            material_override: None,
        };
        self.bound = Some(Bound {
            instance: ModelInstance::new(&self.path, handle, placement),
            mixer,
            pose,
            started: false,
        });

        if self.start_mode == StartMode::Auto || self.triggered {
            self.start();
        }
    }

    /// Latches the manual start. Returns true only for the first trigger.
    pub fn trigger(&mut self) -> bool {
        if self.start_mode != StartMode::OnTrigger || self.triggered {
            return false;
        }
        self.triggered = true;
        log::info!("{}: animation triggered", self.path);
        self.start();
        true
    }

    /// Starts clip 0 looping forever, once per bound handle
    fn start(&mut self) {
        let Some(bound) = &mut self.bound else {
            return;
        };
        if bound.started {
            return;
        }
        let Some(action) = bound.mixer.first_mut() else {
            return;
        };

        action.reset().set_loop(LoopMode::Repeat, None).play();
        bound.started = true;
        self.starts += 1;
        log::debug!("{}: playing clip '{}'", self.path, action.name());
    }

    /// Applies this frame's transform; playback is unaffected
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        if let Some(bound) = &mut self.bound {
            bound.instance.placement.transform = transform;
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn start_mode(&self) -> StartMode {
        self.start_mode
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(bound) = &mut self.bound {
            bound.mixer.update(dt);
            bound.pose = bound.mixer.sample_pose(bound.instance.handle());
        }
    }

    /// State of the selected clip; `None` until clips are bound
    pub fn state(&self) -> Option<AnimationState> {
        self.bound
            .as_ref()
            .and_then(|b| b.mixer.first())
            .map(|action| action.state())
    }

    pub fn is_playing(&self) -> bool {
        self.state().is_some_and(|s| s.playing)
    }

    /// Seconds into the selected clip
    pub fn clip_time(&self) -> Option<f32> {
        self.bound
            .as_ref()
            .and_then(|b| b.mixer.first())
            .map(|action| action.time())
    }

    /// How many times playback has been started, across reloads
    pub fn start_count(&self) -> u32 {
        self.starts
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn instance(&self) -> Option<&ModelInstance> {
        self.bound.as_ref().map(|b| &b.instance)
    }

    pub fn pose(&self) -> Option<&[NodeTransform]> {
        self.bound.as_ref().map(|b| b.pose.as_slice())
    }

    /// Drops the handle; the next available handle binds afresh
    pub fn release(&mut self) {
        self.bound = None;
    }
}
