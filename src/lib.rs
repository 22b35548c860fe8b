//! Sanctum
//!
//! A declarative glowing-garden scene: GLTF models placed by rule, one
//! animated model, live-tunable lighting and post-processing, rendered with
//! wgpu and winit.
//!
//! The scene itself ([`scene`], [`placement`], [`animation`], [`assets`],
//! [`params`]) runs without a GPU; [`gfx`], [`ui`] and [`app`] host it in a
//! window.

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod gfx;
pub mod params;
pub mod placement;
pub mod scene;
pub mod ui;

// Re-export main types for convenience
pub use app::SanctumApp;
pub use config::AppConfig;
pub use scene::{SceneAssembly, SceneTree, Stage};

/// Creates the application configured from the environment
pub fn default() -> anyhow::Result<SanctumApp> {
    SanctumApp::new(AppConfig::from_env())
}
