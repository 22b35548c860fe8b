pub mod controls;
pub mod orbit_camera;

// Re-export main types
pub use controls::{ControlAction, OrbitControls};
pub use orbit_camera::OrbitCamera;
