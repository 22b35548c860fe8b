//! Core rendering functionality
//!
//! Handles render pipelines, GPU resource management, and frame rendering.

pub mod gpu_mesh;
pub mod pipeline_manager;
pub mod render_engine;
pub mod uniforms;

// Re-export main types
pub use gpu_mesh::{GpuMesh, GpuMeshCache};
pub use pipeline_manager::{PipelineConfig, PipelineError, PipelineManager};
pub use render_engine::RenderEngine;
