//! GPU buffers for loaded asset geometry
//!
//! Buffers are uploaded once per asset handle and dropped when the asset is
//! no longer held by any placement.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wgpu::util::DeviceExt;

use crate::assets::{AssetData, AssetHandle};
use crate::gfx::geometry::GeometryData;
use crate::gfx::vertex::Vertex3D;

/// Vertex and index buffers of one primitive
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    /// Uploads `vertices` and `indices`; `None` when there is nothing to draw
    pub fn new(device: &wgpu::Device, label: &str, vertices: &[Vertex3D], indices: &[u32]) -> Option<Self> {
        if vertices.is_empty() || indices.is_empty() {
            return None;
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", label)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Some(Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        })
    }

    pub fn from_geometry(device: &wgpu::Device, label: &str, geometry: &GeometryData) -> Option<Self> {
        Self::new(device, label, &geometry.vertices, &geometry.indices)
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

struct GpuAsset {
    source: Weak<AssetData>,
    /// Indexed by mesh, then primitive
    meshes: Vec<Vec<Option<GpuMesh>>>,
}

/// Uploaded geometry per asset path
#[derive(Default)]
pub struct GpuMeshCache {
    assets: HashMap<String, GpuAsset>,
}

impl GpuMeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads the asset's meshes unless this exact handle is already resident
    pub fn prepare(&mut self, device: &wgpu::Device, handle: &AssetHandle) {
        let current = self
            .assets
            .get(&handle.path)
            .and_then(|asset| asset.source.upgrade())
            .is_some_and(|source| Rc::ptr_eq(&source, handle));
        if current {
            return;
        }

        let meshes = handle
            .meshes
            .iter()
            .map(|mesh| {
                mesh.primitives
                    .iter()
                    .map(|p| GpuMesh::new(device, &mesh.name, &p.vertices, &p.indices))
                    .collect()
            })
            .collect();
        log::debug!("uploaded {} meshes of {}", handle.meshes.len(), handle.path);

        self.assets.insert(
            handle.path.clone(),
            GpuAsset {
                source: Rc::downgrade(handle),
                meshes,
            },
        );
    }

    pub fn get(&self, path: &str, mesh: usize, primitive: usize) -> Option<&GpuMesh> {
        self.assets
            .get(path)?
            .meshes
            .get(mesh)?
            .get(primitive)?
            .as_ref()
    }

    /// Drops buffers of assets no longer held anywhere
    pub fn retain_live(&mut self) {
        self.assets.retain(|path, asset| {
            let live = asset.source.strong_count() > 0;
            if !live {
                log::debug!("releasing GPU buffers of {}", path);
            }
            live
        });
    }
}
