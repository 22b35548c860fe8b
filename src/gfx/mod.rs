pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod vertex;

pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
