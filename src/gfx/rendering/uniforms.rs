//! Uniform blocks shared with the WGSL shaders
//!
//! Layouts MUST match the structs declared in `scene.wgsl`, `shadow.wgsl`
//! and `composite.wgsl`.

use cgmath::{EuclideanSpace, Matrix, Matrix4, Point3, SquareMatrix, Vector3};

use crate::assets::MaterialData;
use crate::gfx::camera::{orbit_camera::OPENGL_TO_WGPU_MATRIX, OrbitCamera};
use crate::scene::{AmbientLight, DirectionalLight, PostStage};

/// Dynamic offsets into the draw buffer must be multiples of this
pub const DRAW_UNIFORM_STRIDE: u64 = 256;

/// Half extent of the square the shadow map covers
const SHADOW_EXTENT: f32 = 60.0;
const SHADOW_DISTANCE: f32 = 60.0;
const SHADOW_NEAR: f32 = 1.0;
const SHADOW_FAR: f32 = 150.0;

/// Per-frame camera and lighting state
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// rgb premultiplied by intensity
    pub ambient: [f32; 4],
    /// xyz towards the light, w intensity
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
}

impl GlobalUniform {
    pub fn new(camera: &OrbitCamera, ambient: &AmbientLight, light: &DirectionalLight) -> Self {
        let to_light = light.to_light();
        let eye = camera.eye();
        Self {
            view_proj: camera.view_projection().into(),
            light_view_proj: light_view_projection(light).into(),
            camera_position: [eye.x, eye.y, eye.z, 1.0],
            ambient: [
                ambient.color[0] * ambient.intensity,
                ambient.color[1] * ambient.intensity,
                ambient.color[2] * ambient.intensity,
                1.0,
            ],
            light_direction: [to_light.x, to_light.y, to_light.z, light.intensity],
            light_color: [light.color[0], light.color[1], light.color[2], 1.0],
        }
    }
}

/// Orthographic projection from the directional light towards the origin
pub fn light_view_projection(light: &DirectionalLight) -> Matrix4<f32> {
    let eye = Point3::from_vec(light.to_light() * SHADOW_DISTANCE);
    let view = Matrix4::look_at_rh(eye, Point3::origin(), Vector3::unit_y());
    let projection = cgmath::ortho(
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        SHADOW_NEAR,
        SHADOW_FAR,
    );
    OPENGL_TO_WGPU_MATRIX * projection * view
}

/// Per-draw model matrix and material
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// rgb premultiplied by intensity, w is 1 for meshes on the bloom layer
    pub emissive: [f32; 4],
    /// x is 1 when the mesh receives shadows
    pub flags: [f32; 4],
}

impl DrawUniform {
    pub fn new(model: Matrix4<f32>, material: &MaterialData, glow: bool, receive_shadow: bool) -> Self {
        let normal_matrix = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        let e = material.emissive_intensity;

        Self {
            model: model.into(),
            normal_matrix: normal_matrix.into(),
            base_color: material.base_color,
            emissive: [
                material.emissive[0] * e,
                material.emissive[1] * e,
                material.emissive[2] * e,
                if glow { 1.0 } else { 0.0 },
            ],
            flags: [if receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// Depth of field and bloom settings for the composite pass
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PostUniform {
    /// focus distance, focal length, bokeh scale
    pub depth_of_field: [f32; 4],
    /// intensity, luminance threshold, luminance smoothing
    pub bloom: [f32; 4],
    /// znear, zfar, texel width, texel height
    pub camera: [f32; 4],
}

impl PostUniform {
    pub fn new(post: &PostStage, camera: &OrbitCamera, width: u32, height: u32) -> Self {
        let dof = post.depth_of_field;
        let bloom = post.bloom;
        Self {
            depth_of_field: [dof.focus_distance, dof.focal_length, dof.bokeh_scale, 0.0],
            bloom: [
                bloom.intensity,
                bloom.luminance_threshold,
                bloom.luminance_smoothing,
                0.0,
            ],
            camera: [
                camera.znear,
                camera.zfar,
                1.0 / width.max(1) as f32,
                1.0 / height.max(1) as f32,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn uniform_sizes_fit_the_draw_stride() {
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<DrawUniform>() % 16, 0);
        assert!(std::mem::size_of::<DrawUniform>() as u64 <= DRAW_UNIFORM_STRIDE);
        assert_eq!(std::mem::size_of::<PostUniform>(), 48);
    }

    #[test]
    fn origin_lands_inside_the_shadow_map() {
        let light = DirectionalLight::new(1.0);
        let clip = light_view_projection(&light) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn ground_corners_stay_in_front_of_the_light() {
        let light = DirectionalLight::new(1.0);
        let matrix = light_view_projection(&light);
        for (x, z) in [(-30.0, -30.0), (30.0, 30.0), (-30.0, 30.0)] {
            let clip = matrix * Vector4::new(x, 0.0, z, 1.0);
            let depth = clip.z / clip.w;
            assert!((0.0..=1.0).contains(&depth), "depth {} at ({}, {})", depth, x, z);
        }
    }

    #[test]
    fn draw_uniform_flags_glow_and_shadow() {
        let material = MaterialData {
            emissive: [0.0, 1.0, 0.0],
            emissive_intensity: 2.0,
            ..MaterialData::default()
        };
        let draw = DrawUniform::new(Matrix4::identity(), &material, true, false);

        assert_eq!(draw.emissive, [0.0, 2.0, 0.0, 1.0]);
        assert_eq!(draw.flags[0], 0.0);
    }

    #[test]
    fn degenerate_model_falls_back_to_identity_normals() {
        let model = Matrix4::from_scale(0.0);
        let draw = DrawUniform::new(model, &MaterialData::default(), false, true);
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        assert_eq!(draw.normal_matrix, identity);
    }
}
