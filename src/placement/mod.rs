//! Model placement: transforms, rules keyed by asset name, placed instances

pub mod catalog;
pub mod instance;
pub mod transform;

pub use catalog::{
    CatalogError, CatalogReport, MaterialOverride, Placement, PlacementCatalog, PlacementRule,
    GLOW_GREEN,
};
pub use instance::{AssetRef, MeshNodeState, ModelInstance, StaticPlacement};
pub use transform::{RenderLayers, Transform, GLOW_LAYER};
