//! # Scene
//!
//! The declarative scene: a [`SceneAssembly`] turns the current placements and
//! parameters into a [`SceneTree`] each frame, and the [`Stage`] drives it.

pub mod assembly;
pub mod nodes;
pub mod stage;

pub use assembly::{SceneAssembly, ANIMATED_MODEL, STATIC_MODELS};
pub use nodes::{
    AmbientLight, CameraRig, DepthOfField, DirectionalLight, GroundPlane, ModelNode, PostStage,
    SceneNode, SceneTree, SelectiveBloom,
};
pub use stage::Stage;
