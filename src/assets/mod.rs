//! Loaded GLTF assets and the path-keyed cache that shares them

pub mod cache;
pub mod data;
pub mod loader;
pub mod memory;

pub use cache::{AssetCache, AssetStatus, Dispatch};
pub use data::{
    AssetData, AssetHandle, MaterialData, MeshData, NodeData, NodeTransform, Primitive,
};
pub use loader::{AssetError, AssetLoader, GltfLoader};
pub use memory::{AssetBuilder, MemoryLoader};
