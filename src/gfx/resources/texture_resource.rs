//! Render targets used by the frame passes
//!
//! Every target is both rendered into and sampled by a later pass.

/// GPU texture with its default view
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl TextureResource {
    /// Depth format shared by the scene depth buffer and the shadow map
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Scene colour and glow targets hold unclamped HDR values
    pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    /// Creates a depth buffer of the surface size, sampled later for depth of field
    pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        Self::create(device, width, height, Self::DEPTH_FORMAT, label)
    }

    /// Square depth map rendered from the directional light
    pub fn create_shadow_map(device: &wgpu::Device, size: u32) -> Self {
        Self::create(device, size, size, Self::DEPTH_FORMAT, "Shadow Map")
    }

    /// HDR colour target of the surface size
    pub fn create_hdr_target(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        Self::create(device, width, height, Self::HDR_FORMAT, label)
    }

    fn create(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }
}
