//! In-memory assets
//!
//! [`MemoryLoader`] serves prebuilt [`AssetData`] by path and [`AssetBuilder`]
//! assembles small node hierarchies out of unit cubes. Both are used by the
//! tests, which never touch the filesystem or a GPU.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::data::{AssetData, MaterialData, MeshData, NodeData, NodeTransform, Primitive};
use super::loader::{AssetError, AssetLoader};
use crate::animation::AnimationClip;
use crate::gfx::{geometry::calculate_smooth_normals, vertex::Vertex3D};

#[derive(Debug, Default)]
pub struct MemoryLoader {
    assets: HashMap<String, AssetData>,
    loads: AtomicUsize,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an asset under its own path
    pub fn insert(&mut self, asset: AssetData) {
        self.assets.insert(asset.path.clone(), asset);
    }

    pub fn with(mut self, asset: AssetData) -> Self {
        self.insert(asset);
        self
    }

    /// Number of `load` calls so far, successful or not
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl AssetLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<AssetData, AssetError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.assets
            .get(path.to_string_lossy().as_ref())
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_path_buf()))
    }
}

/// Builds an [`AssetData`] node by node
pub struct AssetBuilder {
    asset: AssetData,
}

impl AssetBuilder {
    pub fn new(path: &str) -> Self {
        Self {
            asset: AssetData {
                path: path.to_string(),
                ..AssetData::default()
            },
        }
    }

    /// Adds an empty node; `None` makes it a scene root
    pub fn group(&mut self, parent: Option<usize>, name: &str) -> usize {
        self.push_node(parent, name, None, true)
    }

    /// Adds an empty node that is neither a root nor anyone's child
    pub fn detached_group(&mut self, name: &str) -> usize {
        self.push_node(None, name, None, false)
    }

    /// Adds a node carrying a unit cube with its own material
    pub fn mesh_node(&mut self, parent: Option<usize>, name: &str) -> usize {
        let material = self.asset.materials.len();
        self.asset.materials.push(MaterialData {
            name: format!("{}_material", name),
            ..MaterialData::default()
        });

        let mesh = self.asset.meshes.len();
        self.asset.meshes.push(MeshData {
            name: name.to_string(),
            primitives: vec![unit_cube(Some(material))],
        });

        self.push_node(parent, name, Some(mesh), true)
    }

    pub fn set_local(&mut self, node: usize, local: NodeTransform) {
        if let Some(n) = self.asset.nodes.get_mut(node) {
            n.local = local;
        }
    }

    pub fn clip(&mut self, clip: AnimationClip) {
        self.asset.clips.push(clip);
    }

    pub fn build(self) -> AssetData {
        self.asset
    }

    fn push_node(
        &mut self,
        parent: Option<usize>,
        name: &str,
        mesh: Option<usize>,
        attach: bool,
    ) -> usize {
        let index = self.asset.nodes.len();
        self.asset.nodes.push(NodeData {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            local: NodeTransform::default(),
            mesh,
        });

        match parent {
            Some(p) => {
                if let Some(parent_node) = self.asset.nodes.get_mut(p) {
                    parent_node.children.push(index);
                }
            }
            None if attach => self.asset.roots.push(index),
            None => {}
        }
        index
    }
}

/// Cube spanning -0.5..0.5 on every axis
fn unit_cube(material: Option<usize>) -> Primitive {
    #[rustfmt::skip]
    let positions: [[f32; 3]; 8] = [
        [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5],
        [-0.5, -0.5,  0.5], [0.5, -0.5,  0.5], [0.5, 0.5,  0.5], [-0.5, 0.5,  0.5],
    ];
    #[rustfmt::skip]
    let indices: Vec<u32> = vec![
        4, 5, 6, 4, 6, 7, // +Z
        1, 0, 3, 1, 3, 2, // -Z
        5, 1, 2, 5, 2, 6, // +X
        0, 4, 7, 0, 7, 3, // -X
        7, 6, 2, 7, 2, 3, // +Y
        0, 1, 5, 0, 5, 4, // -Y
    ];

    let normals = calculate_smooth_normals(&positions, &indices);
    let vertices = positions
        .iter()
        .zip(normals)
        .map(|(p, n)| Vertex3D {
            position: *p,
            normal: n,
        })
        .collect();

    Primitive::new(vertices, indices, material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_serves_registered_paths_and_counts_calls() {
        let loader = MemoryLoader::new().with(AssetBuilder::new("models/statue.glb").build());

        assert!(loader.load(Path::new("models/statue.glb")).is_ok());
        let err = loader.load(Path::new("models/foo.glb")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
        assert_eq!(loader.load_count(), 2);
    }

    #[test]
    fn builder_wires_parents_children_and_roots() {
        let mut builder = AssetBuilder::new("tree.glb");
        let root = builder.group(None, "root");
        let leaf = builder.mesh_node(Some(root), "leaf");
        let loose = builder.detached_group("loose");
        let asset = builder.build();

        assert_eq!(asset.roots, vec![root]);
        assert_eq!(asset.nodes[root].children, vec![leaf]);
        assert_eq!(asset.nodes[leaf].parent, Some(root));
        assert_eq!(asset.nodes[loose].parent, None);
        assert_eq!(asset.meshes[0].primitives[0].indices.len(), 36);
        assert_eq!(asset.materials.len(), 1);
    }
}
