//! Composition of the full scene from placements and parameters

use crate::animation::{AnimatedPlacement, StartMode};
use crate::assets::AssetCache;
use crate::gfx::picking::Aabb;
use crate::params::SceneParams;
use crate::placement::{CatalogError, CatalogReport, PlacementCatalog, StaticPlacement};

use super::nodes::{
    AmbientLight, CameraRig, DepthOfField, DirectionalLight, GroundPlane, ModelNode, PostStage,
    SceneNode, SceneTree, SelectiveBloom,
};

/// Statically placed models, in draw order
pub const STATIC_MODELS: [&str; 3] = [
    "stylized_spawn_point.glb",
    "statue.glb",
    "stag_and_friends_original.glb",
];

pub const ANIMATED_MODEL: &str = "seraphim.glb";

pub struct SceneAssembly {
    statics: Vec<StaticPlacement>,
    animated: AnimatedPlacement,
    catalog: PlacementCatalog,
}

impl SceneAssembly {
    pub fn new(
        static_paths: &[String],
        animated_path: String,
        catalog: PlacementCatalog,
        start_mode: StartMode,
    ) -> Self {
        Self {
            statics: static_paths.iter().map(StaticPlacement::new).collect(),
            animated: AnimatedPlacement::new(
                animated_path,
                SceneParams::default().seraphim,
                start_mode,
            ),
            catalog,
        }
    }

    /// The garden scene with its models under `models_dir`
    pub fn standard(models_dir: &str, start_mode: StartMode) -> Self {
        let statics: Vec<String> = STATIC_MODELS
            .iter()
            .map(|name| model_path(models_dir, name))
            .collect();
        Self::new(
            &statics,
            model_path(models_dir, ANIMATED_MODEL),
            PlacementCatalog::standard(),
            start_mode,
        )
    }

    /// Checks the placement rules against the declared static models
    pub fn validate(&self) -> Result<CatalogReport, CatalogError> {
        let paths: Vec<&str> = self.statics.iter().map(|s| s.path.as_str()).collect();
        self.catalog.validate(&paths)
    }

    pub fn resolve(&mut self, cache: &mut AssetCache) {
        for placement in &mut self.statics {
            placement.resolve(cache, &self.catalog);
        }
        self.animated.resolve(cache);
    }

    pub fn apply_params(&mut self, params: &SceneParams) {
        self.animated.set_transform(params.seraphim);
    }

    pub fn update(&mut self, dt: f32) {
        self.animated.update(dt);
    }

    /// The scene for this frame from `params` and the current placements
    pub fn assemble(&self, params: &SceneParams) -> SceneTree<'_> {
        let dof = params.depth_of_field;
        let mut nodes = vec![
            SceneNode::AmbientLight(AmbientLight {
                intensity: params.ambient_intensity,
                color: [1.0, 1.0, 1.0],
            }),
            SceneNode::DirectionalLight(DirectionalLight::new(params.directional_intensity)),
            SceneNode::Ground(GroundPlane::default()),
        ];

        for placement in &self.statics {
            nodes.push(SceneNode::Model(ModelNode {
                path: &placement.path,
                transform: placement.transform(),
                instance: placement.instance(),
                pose: None,
                animated: false,
                cast_shadow: true,
            }));
        }

        nodes.push(SceneNode::Model(ModelNode {
            path: &self.animated.path,
            transform: params.seraphim,
            instance: self.animated.instance(),
            pose: self.animated.pose(),
            animated: true,
            cast_shadow: true,
        }));

        nodes.push(SceneNode::PostProcessing(PostStage {
            depth_of_field: DepthOfField {
                focus_distance: dof.focus_distance,
                focal_length: dof.focal_length,
                bokeh_scale: dof.bokeh_scale,
            },
            bloom: SelectiveBloom::default(),
        }));
        nodes.push(SceneNode::OrbitControls(CameraRig::default()));

        SceneTree { nodes }
    }

    pub fn statics(&self) -> &[StaticPlacement] {
        &self.statics
    }

    pub fn animated(&self) -> &AnimatedPlacement {
        &self.animated
    }

    pub fn animated_mut(&mut self) -> &mut AnimatedPlacement {
        &mut self.animated
    }

    /// World bounds of the animated model as currently posed
    pub fn animated_bounds(&self) -> Option<Aabb> {
        let instance = self.animated.instance()?;
        let rest;
        let pose = match self.animated.pose() {
            Some(pose) => pose,
            None => {
                rest = instance.handle().rest_pose();
                &rest
            }
        };
        instance.world_bounds(&self.animated.transform(), pose)
    }

    pub fn catalog(&self) -> &PlacementCatalog {
        &self.catalog
    }
}

fn model_path(models_dir: &str, name: &str) -> String {
    let dir = models_dir.trim_end_matches(['/', '\\']);
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_paths_join_directory() {
        assert_eq!(model_path("assets/models/", "statue.glb"), "assets/models/statue.glb");
        assert_eq!(model_path("", "statue.glb"), "statue.glb");
    }

    #[test]
    fn standard_assembly_validates() {
        let assembly = SceneAssembly::standard("assets/models", StartMode::Auto);
        let report = assembly.validate().unwrap();
        assert!(report.ambiguous.is_empty());
        assert_eq!(assembly.statics().len(), 3);
        assert_eq!(assembly.animated().path, "assets/models/seraphim.glb");
        assert_eq!(assembly.animated().transform(), SceneParams::default().seraphim);
    }

    #[test]
    fn unresolved_scene_still_declares_every_node() {
        let assembly = SceneAssembly::standard("assets/models", StartMode::Auto);
        let tree = assembly.assemble(&SceneParams::default());

        assert_eq!(tree.models().count(), 4);
        assert!(tree.models().all(|m| m.is_empty()));
        assert!(tree.ground().is_some());
        assert_eq!(tree.ambient().unwrap().intensity, 0.5);
        assert_eq!(tree.directional().unwrap().intensity, 1.0);
        assert_eq!(tree.post().unwrap().depth_of_field.focus_distance, 0.02);
        assert_eq!(tree.camera().unwrap().position, [0.0, 2.0, 8.0]);
    }
}
