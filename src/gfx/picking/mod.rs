//! # Model Picking
//!
//! Mouse ray-casting against world-space bounding boxes. The app uses it to
//! detect a click on the animated model, which starts its animation when the
//! scene runs in trigger mode.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: Convert mouse coordinates to a 3D ray in world space
//! 2. **Ray-Box Intersection**: Test the ray against the model's bounds
//! 3. **Selection**: The nearest hit wins

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

use crate::gfx::camera::OrbitCamera;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Bounds of a point set; empty input yields a zero-size box at the origin
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        let mut min = Vector3::from(*first);
        let mut max = min;
        for vertex in &vertices[1..] {
            min.x = min.x.min(vertex[0]);
            min.y = min.y.min(vertex[1]);
            min.z = min.z.min(vertex[2]);
            max.x = max.x.max(vertex[0]);
            max.y = max.y.max(vertex[1]);
            max.z = max.z.max(vertex[2]);
        }

        Self::new(min, max)
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Test ray-AABB intersection (slab method).
    /// Returns the distance to the entry point, or the exit point when the
    /// ray starts inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Bounds of the box after transforming all 8 corners
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        let corners = [
            [self.min.x, self.min.y, self.min.z],
            [self.max.x, self.min.y, self.min.z],
            [self.min.x, self.max.y, self.min.z],
            [self.min.x, self.min.y, self.max.z],
            [self.max.x, self.max.y, self.min.z],
            [self.max.x, self.min.y, self.max.z],
            [self.min.x, self.max.y, self.max.z],
            [self.max.x, self.max.y, self.max.z],
        ];

        let transformed_corners = corners.map(|[x, y, z]| {
            let p = *matrix * Vector4::new(x, y, z, 1.0);
            [p.x / p.w, p.y / p.w, p.z / p.w]
        });

        Self::from_vertices(&transformed_corners)
    }
}

/// Convert screen coordinates (physical pixels, origin top-left) to a
/// world-space ray through the camera
pub fn screen_to_ray(
    screen_pos: (f32, f32),
    screen_size: (f32, f32),
    camera: &OrbitCamera,
) -> Ray {
    let (mouse_x, mouse_y) = screen_pos;
    let (screen_width, screen_height) = screen_size;

    // Normalized device coordinates (-1 to 1), Y flipped
    let ndc_x = (2.0 * mouse_x) / screen_width.max(1.0) - 1.0;
    let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height.max(1.0);

    // wgpu clip space has depth in 0..1
    let inv_view_proj = camera
        .view_projection()
        .invert()
        .unwrap_or(Matrix4::identity());

    let unproject = |z: f32| {
        let p = inv_view_proj * Vector4::new(ndc_x, ndc_y, z, 1.0);
        Vector3::new(p.x / p.w, p.y / p.w, p.z / p.w)
    };
    let near_3d = unproject(0.0);
    let far_3d = unproject(1.0);

    Ray::new(near_3d, far_3d - near_3d)
}
