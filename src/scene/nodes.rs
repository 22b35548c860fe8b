//! Nodes of the declarative scene tree
//!
//! A [`SceneTree`] is rebuilt every frame and handed to the renderer. Nodes
//! borrow placement state from the assembly that produced them.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use crate::assets::NodeTransform;
use crate::placement::{ModelInstance, RenderLayers, Transform, GLOW_LAYER};

/// Large flat dark surface that catches the model shadows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub size: [f32; 2],
    pub transform: Transform,
    pub color: [f32; 4],
    pub receive_shadow: bool,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self {
            size: [200.0, 200.0],
            transform: Transform::IDENTITY.with_rotation([-PI / 2.0, 0.0, 0.0]),
            color: [0.0, 0.0, 0.0, 1.0],
            receive_shadow: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub intensity: f32,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Light shines from here towards the origin
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub cast_shadow: bool,
}

impl DirectionalLight {
    pub fn new(intensity: f32) -> Self {
        Self {
            position: [5.0, 10.0, 5.0],
            intensity,
            color: [1.0, 1.0, 1.0],
            cast_shadow: true,
        }
    }

    /// Unit vector pointing from the scene towards the light
    pub fn to_light(&self) -> Vector3<f32> {
        Vector3::from(self.position).normalize()
    }
}

/// One placed model. Without an instance it renders nothing.
#[derive(Debug, Clone, Copy)]
pub struct ModelNode<'a> {
    pub path: &'a str,
    pub transform: Transform,
    pub instance: Option<&'a ModelInstance>,
    /// Animated local node transforms; `None` renders the rest pose
    pub pose: Option<&'a [NodeTransform]>,
    pub animated: bool,
    pub cast_shadow: bool,
}

impl ModelNode<'_> {
    pub fn is_empty(&self) -> bool {
        self.instance.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthOfField {
    pub focus_distance: f32,
    pub focal_length: f32,
    pub bokeh_scale: f32,
}

/// Bloom restricted to meshes on `selection_layer`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectiveBloom {
    pub selection_layer: u8,
    pub intensity: f32,
    pub luminance_threshold: f32,
    pub luminance_smoothing: f32,
}

impl Default for SelectiveBloom {
    fn default() -> Self {
        Self {
            selection_layer: GLOW_LAYER,
            intensity: 2.5,
            luminance_threshold: 0.0,
            luminance_smoothing: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostStage {
    pub depth_of_field: DepthOfField,
    pub bloom: SelectiveBloom,
}

/// Initial camera and the orbit controls around it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    /// Layers the camera draws
    pub layers: RenderLayers,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: [0.0, 2.0, 8.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 50.0,
            layers: RenderLayers::default().with(GLOW_LAYER),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SceneNode<'a> {
    Ground(GroundPlane),
    AmbientLight(AmbientLight),
    DirectionalLight(DirectionalLight),
    Model(ModelNode<'a>),
    PostProcessing(PostStage),
    OrbitControls(CameraRig),
}

#[derive(Debug, Clone, Default)]
pub struct SceneTree<'a> {
    pub nodes: Vec<SceneNode<'a>>,
}

impl<'a> SceneTree<'a> {
    pub fn ground(&self) -> Option<&GroundPlane> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::Ground(g) => Some(g),
            _ => None,
        })
    }

    pub fn ambient(&self) -> Option<&AmbientLight> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::AmbientLight(l) => Some(l),
            _ => None,
        })
    }

    pub fn directional(&self) -> Option<&DirectionalLight> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::DirectionalLight(l) => Some(l),
            _ => None,
        })
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelNode<'a>> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Model(m) => Some(m),
            _ => None,
        })
    }

    /// First model whose path contains `fragment`
    pub fn model(&self, fragment: &str) -> Option<&ModelNode<'a>> {
        self.models().find(|m| m.path.contains(fragment))
    }

    pub fn animated_model(&self) -> Option<&ModelNode<'a>> {
        self.models().find(|m| m.animated)
    }

    pub fn post(&self) -> Option<&PostStage> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::PostProcessing(p) => Some(p),
            _ => None,
        })
    }

    pub fn camera(&self) -> Option<&CameraRig> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::OrbitControls(c) => Some(c),
            _ => None,
        })
    }
}
