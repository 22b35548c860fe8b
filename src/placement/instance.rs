//! Placed instances of shared assets

use std::rc::Rc;

use crate::assets::{AssetCache, AssetHandle, MaterialData, NodeTransform};
use crate::gfx::picking::Aabb;

use super::catalog::{MaterialOverride, Placement, PlacementCatalog};
use super::transform::{RenderLayers, Transform, GLOW_LAYER};

/// A placement's reference to a resolved asset
#[derive(Debug, Clone)]
pub struct AssetRef {
    pub path: String,
    pub handle: AssetHandle,
}

/// Per-instance render state of one mesh node
#[derive(Debug, Clone, PartialEq)]
pub struct MeshNodeState {
    /// Index into the asset's nodes
    pub node: usize,
    pub layers: RenderLayers,
    /// One material per primitive of the node's mesh
    pub materials: Vec<MaterialData>,
}

/// One asset placed in the scene.
///
/// Material overrides are written to the instance's own material copies; the
/// shared asset data is never modified.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    pub asset: AssetRef,
    pub placement: Placement,
    pub meshes: Vec<MeshNodeState>,
}

impl ModelInstance {
    pub fn new(path: &str, handle: AssetHandle, placement: Placement) -> Self {
        let meshes = handle
            .mesh_nodes()
            .into_iter()
            .map(|node| {
                let materials = handle.nodes[node]
                    .mesh
                    .and_then(|m| handle.meshes.get(m))
                    .map(|mesh| {
                        mesh.primitives
                            .iter()
                            .map(|p| handle.material(p.material))
                            .collect()
                    })
                    .unwrap_or_default();

                let mut state = MeshNodeState {
                    node,
                    layers: RenderLayers::default(),
                    materials,
                };
                if let Some(material_override) = &placement.material_override {
                    apply_override(&mut state, material_override);
                }
                state
            })
            .collect();

        Self {
            asset: AssetRef {
                path: path.to_string(),
                handle,
            },
            placement,
            meshes,
        }
    }

    pub fn handle(&self) -> &AssetHandle {
        &self.asset.handle
    }

    /// Whether this instance was built from `handle`
    pub fn is_built_from(&self, handle: &AssetHandle) -> bool {
        Rc::ptr_eq(&self.asset.handle, handle)
    }

    /// World-space bounds of the instance under `transform` and `pose`
    pub fn world_bounds(&self, transform: &Transform, pose: &[NodeTransform]) -> Option<Aabb> {
        self.asset
            .handle
            .bounds(pose)
            .map(|b| b.transformed(&transform.to_matrix()))
    }
}

fn apply_override(state: &mut MeshNodeState, material_override: &MaterialOverride) {
    if material_override.glow_layer {
        state.layers.enable(GLOW_LAYER);
    }
    for material in &mut state.materials {
        material.emissive = material_override.emissive_color;
        material.emissive_intensity = material_override.emissive_intensity;
    }
}

/// A statically placed asset: renders nothing until the asset resolves
#[derive(Debug, Clone)]
pub struct StaticPlacement {
    pub path: String,
    instance: Option<ModelInstance>,
}

impl StaticPlacement {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            instance: None,
        }
    }

    /// Builds the instance on first availability of the asset
    pub fn resolve(&mut self, cache: &mut AssetCache, catalog: &PlacementCatalog) {
        let Some(handle) = cache.request(&self.path) else {
            return;
        };
        if self
            .instance
            .as_ref()
            .is_some_and(|instance| instance.is_built_from(&handle))
        {
            return;
        }

        let placement = catalog.place(&self.path);
        log::debug!("placing {} at {:?}", self.path, placement.transform);
        self.instance = Some(ModelInstance::new(&self.path, handle, placement));
    }

    pub fn instance(&self) -> Option<&ModelInstance> {
        self.instance.as_ref()
    }

    pub fn transform(&self) -> Transform {
        self.instance
            .as_ref()
            .map(|i| i.placement.transform)
            .unwrap_or_default()
    }

    /// Drops this placement's hold on the asset
    pub fn release(&mut self) {
        self.instance = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetBuilder, Dispatch, MemoryLoader};
    use crate::placement::GLOW_GREEN;
    use std::sync::Arc;

    fn stag_asset() -> crate::assets::AssetData {
        let mut builder = AssetBuilder::new("stag_and_friends_original.glb");
        let herd = builder.group(None, "herd");
        builder.mesh_node(Some(herd), "stag");
        builder.mesh_node(Some(herd), "doe");
        builder.mesh_node(None, "fawn");
        builder.build()
    }

    #[test]
    fn glow_override_reaches_every_mesh_node() {
        let handle = Rc::new(stag_asset());
        let placement = PlacementCatalog::standard().place(&handle.path);
        let instance = ModelInstance::new("stag_and_friends_original.glb", handle.clone(), placement);

        assert_eq!(instance.meshes.len(), 3);
        for mesh in &instance.meshes {
            assert!(mesh.layers.contains(0));
            assert!(mesh.layers.contains(GLOW_LAYER));
            for material in &mesh.materials {
                assert_eq!(material.emissive, GLOW_GREEN);
                assert_eq!(material.emissive_intensity, 2.0);
            }
        }

        // Shared data is untouched
        assert!(handle.materials.iter().all(|m| m.emissive == [0.0; 3]));
    }

    #[test]
    fn instances_without_override_keep_asset_materials() {
        let handle = Rc::new(stag_asset());
        let instance = ModelInstance::new("foo.glb", handle.clone(), Placement::default());

        for mesh in &instance.meshes {
            assert_eq!(mesh.layers, RenderLayers::default());
            let node = &handle.nodes[mesh.node];
            let primitive = &handle.meshes[node.mesh.unwrap()].primitives[0];
            assert_eq!(mesh.materials, vec![handle.material(primitive.material)]);
        }
    }

    #[test]
    fn static_placement_is_empty_until_the_asset_lands() {
        let loader = MemoryLoader::new().with(stag_asset());
        let mut cache = AssetCache::new(Arc::new(loader), Dispatch::Inline);
        let catalog = PlacementCatalog::standard();
        let mut placement = StaticPlacement::new("stag_and_friends_original.glb");

        placement.resolve(&mut cache, &catalog);
        assert!(placement.instance().is_none());
        assert_eq!(placement.transform(), Transform::IDENTITY);

        cache.poll();
        placement.resolve(&mut cache, &catalog);
        let instance = placement.instance().expect("resolved");
        assert_eq!(instance.placement.transform, Transform::at([10.0, 8.0, 30.0], 5.0));

        let first = Rc::as_ptr(instance.handle());
        placement.resolve(&mut cache, &catalog);
        assert_eq!(Rc::as_ptr(placement.instance().unwrap().handle()), first);
    }

    #[test]
    fn world_bounds_follow_the_placement_transform() {
        let mut builder = AssetBuilder::new("statue.glb");
        builder.mesh_node(None, "body");
        let handle = Rc::new(builder.build());
        let instance = ModelInstance::new("statue.glb", handle.clone(), Placement::default());

        let transform = Transform::at([0.0, 6.0, 0.0], 2.0);
        let bounds = instance
            .world_bounds(&transform, &handle.rest_pose())
            .unwrap();
        assert_eq!(bounds.min.y, 5.0);
        assert_eq!(bounds.max.y, 7.0);
    }
}
