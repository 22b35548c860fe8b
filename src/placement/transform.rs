//! Placement transforms and render layers

use cgmath::{Matrix4, Rad, Vector3};

/// Position, scale and Euler rotation (XYZ order, radians) of a placed model.
///
/// Transforms are cheap values: they are recomputed from the current
/// parameters every frame and never cached between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub rotation: [f32; 3],
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: [0.0, 0.0, 0.0],
        scale: [1.0, 1.0, 1.0],
        rotation: [0.0, 0.0, 0.0],
    };

    pub const fn new(position: [f32; 3], scale: [f32; 3], rotation: [f32; 3]) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }

    /// Translation plus uniform scale, no rotation
    pub const fn at(position: [f32; 3], scale: f32) -> Self {
        Self {
            position,
            scale: [scale, scale, scale],
            rotation: [0.0, 0.0, 0.0],
        }
    }

    /// Builder pattern: Set rotation
    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    /// True when any scale component is not strictly positive
    pub fn is_degenerate(&self) -> bool {
        self.scale.iter().any(|s| !(*s > 0.0))
    }

    /// Model matrix: T * Rx * Ry * Rz * S
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let [px, py, pz] = self.position;
        let [sx, sy, sz] = self.scale;
        let [rx, ry, rz] = self.rotation;

        let t = Matrix4::from_translation(Vector3::new(px, py, pz));
        let r = Matrix4::from_angle_x(Rad(rx))
            * Matrix4::from_angle_y(Rad(ry))
            * Matrix4::from_angle_z(Rad(rz));
        let s = Matrix4::from_nonuniform_scale(sx, sy, sz);
        t * r * s // Order matters: T * R * S
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Layer used by the selective bloom pass
pub const GLOW_LAYER: u8 = 1;

/// Bitmask of render layers a mesh belongs to (or a camera can see).
///
/// New meshes live on layer 0 only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderLayers(u32);

impl RenderLayers {
    pub const fn none() -> Self {
        Self(0)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Layers above 31 are a programming error
    pub fn enable(&mut self, layer: u8) {
        debug_assert!(layer < 32, "render layer {} out of range", layer);
        self.0 |= 1 << (layer as u32 & 31);
    }

    pub fn with(mut self, layer: u8) -> Self {
        self.enable(layer);
        self
    }

    pub fn contains(&self, layer: u8) -> bool {
        debug_assert!(layer < 32, "render layer {} out of range", layer);
        self.0 & (1 << (layer as u32 & 31)) != 0
    }

    pub fn intersects(&self, other: RenderLayers) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for RenderLayers {
    fn default() -> Self {
        Self(1)
    }
}
