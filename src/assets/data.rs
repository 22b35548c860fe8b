//! CPU-side contents of a loaded GLTF asset
//!
//! These types are independent of the renderer. A loaded asset is shared
//! through [`AssetHandle`] and never mutated after loading.

use std::rc::Rc;

use cgmath::{Matrix4, Quaternion, SquareMatrix, Vector3};

use crate::animation::AnimationClip;
use crate::gfx::{picking::Aabb, vertex::Vertex3D};

/// Shared, reference-counted handle to a loaded asset
pub type AssetHandle = Rc<AssetData>;

/// Local translation / rotation / scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl NodeTransform {
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeData {
    pub name: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub local: NodeTransform,
    /// Index into [`AssetData::meshes`]
    pub mesh: Option<usize>,
}

/// Material factors read from the asset
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    /// Index into [`AssetData::materials`]; `None` uses the default material
    pub material: Option<usize>,
    pub bounds: Aabb,
}

impl Primitive {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>, material: Option<usize>) -> Self {
        let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.position).collect();
        let bounds = Aabb::from_vertices(&positions);
        Self {
            vertices,
            indices,
            material,
            bounds,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

/// Everything one GLTF file contributes to the scene
#[derive(Debug, Clone, Default)]
pub struct AssetData {
    pub path: String,
    pub nodes: Vec<NodeData>,
    /// Nodes of the displayed scene, in document order
    pub roots: Vec<usize>,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
    pub clips: Vec<AnimationClip>,
}

impl AssetData {
    /// Node-indexed local transforms as authored
    pub fn rest_pose(&self) -> Vec<NodeTransform> {
        self.nodes.iter().map(|n| n.local).collect()
    }

    /// Mesh-carrying nodes reachable from the roots, depth first.
    ///
    /// Each node is visited at most once even if the hierarchy is malformed.
    pub fn mesh_nodes(&self) -> Vec<usize> {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        let mut out = Vec::new();

        while let Some(index) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            if visited[index] {
                continue;
            }
            visited[index] = true;

            if node.mesh.is_some_and(|m| m < self.meshes.len()) {
                out.push(index);
            }
            stack.extend(node.children.iter().rev().copied());
        }

        out
    }

    /// Asset-space matrix of every node for the given local pose
    pub fn world_matrices(&self, pose: &[NodeTransform]) -> Vec<Matrix4<f32>> {
        let mut world: Vec<Option<Matrix4<f32>>> = vec![None; self.nodes.len()];
        for index in 0..self.nodes.len() {
            resolve_world(index, &self.nodes, pose, &mut world, 0);
        }
        world
            .into_iter()
            .map(|m| m.unwrap_or_else(Matrix4::identity))
            .collect()
    }

    /// Asset-space bounds of all mesh nodes for the given pose
    pub fn bounds(&self, pose: &[NodeTransform]) -> Option<Aabb> {
        let world = self.world_matrices(pose);
        let mut bounds: Option<Aabb> = None;

        for node_index in self.mesh_nodes() {
            let Some(mesh) = self.nodes[node_index].mesh.and_then(|m| self.meshes.get(m)) else {
                continue;
            };
            for primitive in &mesh.primitives {
                if primitive.vertices.is_empty() {
                    continue;
                }
                let b = primitive.bounds.transformed(&world[node_index]);
                bounds = Some(match bounds {
                    Some(acc) => acc.union(&b),
                    None => b,
                });
            }
        }

        bounds
    }

    pub fn material(&self, index: Option<usize>) -> MaterialData {
        index
            .and_then(|i| self.materials.get(i))
            .cloned()
            .unwrap_or_default()
    }

    pub fn clip_names(&self) -> Vec<&str> {
        self.clips.iter().map(|c| c.name.as_str()).collect()
    }
}

fn resolve_world(
    index: usize,
    nodes: &[NodeData],
    pose: &[NodeTransform],
    world: &mut [Option<Matrix4<f32>>],
    depth: usize,
) -> Matrix4<f32> {
    if let Some(m) = world[index] {
        return m;
    }
    let local = pose
        .get(index)
        .copied()
        .unwrap_or(nodes[index].local)
        .to_matrix();

    // Depth guard keeps a cyclic parent chain from recursing forever
    let m = match nodes[index].parent {
        Some(parent) if parent < nodes.len() && depth < nodes.len() => {
            resolve_world(parent, nodes, pose, world, depth + 1) * local
        }
        _ => local,
    };
    world[index] = Some(m);
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetBuilder;
    use cgmath::Vector4;

    #[test]
    fn mesh_nodes_follow_hierarchy_from_roots() {
        let mut builder = AssetBuilder::new("garden.glb");
        let root = builder.group(None, "root");
        let a = builder.mesh_node(Some(root), "a");
        let group = builder.group(Some(root), "group");
        let b = builder.mesh_node(Some(group), "b");
        // Detached from the scene roots
        let orphan_parent = builder.detached_group("orphan");
        builder.mesh_node(Some(orphan_parent), "hidden");
        let asset = builder.build();

        assert_eq!(asset.mesh_nodes(), vec![a, b]);
    }

    #[test]
    fn world_matrices_compose_parent_chain() {
        let mut builder = AssetBuilder::new("stack.glb");
        let root = builder.group(None, "root");
        let child = builder.mesh_node(Some(root), "child");
        builder.set_local(
            root,
            NodeTransform {
                translation: Vector3::new(0.0, 2.0, 0.0),
                ..NodeTransform::default()
            },
        );
        builder.set_local(
            child,
            NodeTransform {
                translation: Vector3::new(1.0, 0.0, 0.0),
                scale: Vector3::new(2.0, 2.0, 2.0),
                ..NodeTransform::default()
            },
        );
        let asset = builder.build();

        let world = asset.world_matrices(&asset.rest_pose());
        let p = world[child] * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vector4::new(3.0, 2.0, 0.0, 1.0));
    }

    #[test]
    fn bounds_cover_all_mesh_nodes() {
        let mut builder = AssetBuilder::new("pair.glb");
        let a = builder.mesh_node(None, "a");
        let b = builder.mesh_node(None, "b");
        builder.set_local(
            b,
            NodeTransform {
                translation: Vector3::new(10.0, 0.0, 0.0),
                ..NodeTransform::default()
            },
        );
        let asset = builder.build();
        let _ = a;

        let bounds = asset.bounds(&asset.rest_pose()).expect("bounds");
        assert_eq!(bounds.min.x, -0.5);
        assert_eq!(bounds.max.x, 10.5);
    }

    #[test]
    fn missing_material_falls_back_to_default() {
        let asset = AssetData::default();
        assert_eq!(asset.material(Some(3)), MaterialData::default());
        assert_eq!(asset.material(None), MaterialData::default());
    }
}
