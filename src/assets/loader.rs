//! Asset loading collaborators
//!
//! [`AssetLoader`] turns a path into [`AssetData`]. [`GltfLoader`] is the
//! production implementation; parsing itself is delegated to the `gltf` crate.

use std::path::{Path, PathBuf};

use cgmath::{InnerSpace, Quaternion, Vector3};
use gltf::animation::util::ReadOutputs;
use thiserror::Error;

use super::data::{AssetData, MaterialData, MeshData, NodeData, NodeTransform, Primitive};
use crate::animation::{AnimationClip, Channel, ChannelOutput, Interpolation};
use crate::gfx::{geometry::calculate_smooth_normals, vertex::Vertex3D};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to import glTF {path}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("no asset registered for {0}")]
    NotFound(PathBuf),
    #[error("asset load for {0} was abandoned before completing")]
    Abandoned(PathBuf),
}

/// Loads one asset file. Implementations may be called from a worker thread.
pub trait AssetLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<AssetData, AssetError>;
}

/// Loads `.glb` / `.gltf` files from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfLoader;

impl AssetLoader for GltfLoader {
    fn load(&self, path: &Path) -> Result<AssetData, AssetError> {
        if !path.exists() {
            return Err(AssetError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let (document, buffers, _images) =
            gltf::import(path).map_err(|source| AssetError::Gltf {
                path: path.to_path_buf(),
                source,
            })?;
        let buffer_data = |b: gltf::Buffer<'_>| buffers.get(b.index()).map(|d| d.0.as_slice());

        let materials = document.materials().map(read_material).collect();

        let mut meshes = Vec::new();
        for mesh in document.meshes() {
            let mut primitives = Vec::new();
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::debug!(
                        "{}: skipping non-triangle primitive in mesh {}",
                        path.display(),
                        mesh.index()
                    );
                    continue;
                }

                let reader = primitive.reader(buffer_data);
                let Some(positions) = reader.read_positions() else {
                    continue;
                };
                let positions: Vec<[f32; 3]> = positions.collect();
                let indices: Vec<u32> = match reader.read_indices() {
                    Some(read) => read.into_u32().collect(),
                    None => (0..positions.len() as u32).collect(),
                };
                let normals: Vec<[f32; 3]> = match reader.read_normals() {
                    Some(it) => it.collect(),
                    None => calculate_smooth_normals(&positions, &indices),
                };

                let vertices = positions
                    .iter()
                    .zip(normals.iter().chain(std::iter::repeat(&[0.0, 1.0, 0.0])))
                    .map(|(p, n)| Vertex3D {
                        position: *p,
                        normal: *n,
                    })
                    .collect();

                primitives.push(Primitive::new(
                    vertices,
                    indices,
                    primitive.material().index(),
                ));
            }

            meshes.push(MeshData {
                name: mesh.name().unwrap_or_default().to_string(),
                primitives,
            });
        }

        let mut nodes: Vec<NodeData> = document
            .nodes()
            .map(|node| {
                let (translation, rotation, scale) = node.transform().decomposed();
                NodeData {
                    name: node.name().unwrap_or_default().to_string(),
                    parent: None,
                    children: node.children().map(|c| c.index()).collect(),
                    local: NodeTransform {
                        translation: Vector3::from(translation),
                        rotation: quaternion(rotation),
                        scale: Vector3::from(scale),
                    },
                    mesh: node.mesh().map(|m| m.index()),
                }
            })
            .collect();

        for index in 0..nodes.len() {
            for child in nodes[index].children.clone() {
                if let Some(node) = nodes.get_mut(child) {
                    node.parent = Some(index);
                }
            }
        }

        let roots = match document.default_scene().or_else(|| document.scenes().next()) {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => (0..nodes.len())
                .filter(|&i| nodes[i].parent.is_none())
                .collect(),
        };

        let clips = document
            .animations()
            .enumerate()
            .map(|(i, animation)| {
                let channels = animation
                    .channels()
                    .filter_map(|channel| read_channel(&channel, &buffer_data))
                    .collect();
                let name = animation
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("clip_{}", i));
                AnimationClip::new(name, channels)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "{}: {} nodes, {} meshes, {} clips",
            path.display(),
            nodes.len(),
            meshes.len(),
            clips.len()
        );

        Ok(AssetData {
            path: path.to_string_lossy().into_owned(),
            nodes,
            roots,
            meshes,
            materials,
            clips,
        })
    }
}

fn read_material(material: gltf::Material<'_>) -> MaterialData {
    let name = match (material.name(), material.index()) {
        (Some(name), _) => name.to_string(),
        (None, Some(i)) => format!("material_{}", i),
        (None, None) => "default".to_string(),
    };

    MaterialData {
        name,
        base_color: material.pbr_metallic_roughness().base_color_factor(),
        emissive: material.emissive_factor(),
        emissive_intensity: 1.0,
    }
}

fn quaternion(xyzw: [f32; 4]) -> Quaternion<f32> {
    let [x, y, z, w] = xyzw;
    Quaternion::new(w, x, y, z).normalize()
}

fn read_channel<'a, 's, F>(
    channel: &gltf::animation::Channel<'a>,
    buffer_data: &F,
) -> Option<Channel>
where
    F: Clone + Fn(gltf::Buffer<'a>) -> Option<&'s [u8]>,
{
    let reader = channel.reader(buffer_data.clone());
    let times: Vec<f32> = reader.read_inputs()?.collect();

    let (interpolation, stride) = match channel.sampler().interpolation() {
        gltf::animation::Interpolation::Step => (Interpolation::Step, 1),
        gltf::animation::Interpolation::Linear => (Interpolation::Linear, 1),
        // In-tangent, value, out-tangent per key; sampled linearly on the values
        gltf::animation::Interpolation::CubicSpline => (Interpolation::Linear, 3),
    };
    let keep = |i: usize| stride == 1 || i % 3 == 1;

    let output = match reader.read_outputs()? {
        ReadOutputs::Translations(it) => ChannelOutput::Translation(
            it.enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, v)| Vector3::from(v))
                .collect(),
        ),
        ReadOutputs::Rotations(it) => ChannelOutput::Rotation(
            it.into_f32()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, v)| quaternion(v))
                .collect(),
        ),
        ReadOutputs::Scales(it) => ChannelOutput::Scale(
            it.enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, v)| Vector3::from(v))
                .collect(),
        ),
        ReadOutputs::MorphTargetWeights(_) => return None,
    };

    Some(Channel {
        node: channel.target().node().index(),
        times,
        output,
        interpolation,
    })
}
