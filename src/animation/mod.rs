//! Keyframe clips, their playback, and the animated placement

pub mod animated;
pub mod clip;
pub mod mixer;

pub use animated::{AnimatedPlacement, StartMode};
pub use clip::{AnimationClip, Channel, ChannelOutput, Interpolation};
pub use mixer::{AnimationState, ClipAction, ClipMixer, LoopMode};
