//! # User Interface
//!
//! Dear ImGui overlay drawn after the composite pass. The [`UiManager`]
//! owns the ImGui context and its wgpu renderer; the [`ParameterPanel`]
//! edits the live scene parameters.

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::ParameterPanel;
