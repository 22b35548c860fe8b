//! Per-frame driver of the scene

use crate::assets::AssetCache;
use crate::gfx::picking::Ray;
use crate::params::{ParameterSource, SceneParams};

use super::assembly::SceneAssembly;
use super::nodes::SceneTree;

/// Owns the asset cache and the assembly; parameters are supplied per frame
pub struct Stage {
    cache: AssetCache,
    assembly: SceneAssembly,
}

impl Stage {
    pub fn new(cache: AssetCache, assembly: SceneAssembly) -> Self {
        Self { cache, assembly }
    }

    /// Advances one frame and returns the tree to render.
    ///
    /// Order: collect finished loads, resolve placements, apply parameters,
    /// advance animation, assemble.
    pub fn frame(&mut self, dt: f32, params: &dyn ParameterSource) -> SceneTree<'_> {
        self.cache.poll();
        self.assembly.resolve(&mut self.cache);

        let params = SceneParams::from_source(params);
        self.assembly.apply_params(&params);
        self.assembly.update(dt);
        self.assembly.assemble(&params)
    }

    /// Starts the animation if the ray hits the animated model.
    /// Returns true when this click latched the trigger.
    pub fn click(&mut self, ray: &Ray) -> bool {
        let Some(bounds) = self.assembly.animated_bounds() else {
            return false;
        };
        if bounds.intersect_ray(ray).is_none() {
            return false;
        }
        self.assembly.animated_mut().trigger()
    }

    pub fn assembly(&self) -> &SceneAssembly {
        &self.assembly
    }

    pub fn assembly_mut(&mut self) -> &mut SceneAssembly {
        &mut self.assembly
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }
}
