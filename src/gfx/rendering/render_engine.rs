//! WGPU renderer for the declarative scene tree
//!
//! Each frame runs three passes followed by the optional UI overlay:
//! a depth-only shadow pass from the directional light, a forward pass into
//! an HDR colour target and a glow target, and a fullscreen composite that
//! applies depth of field, selective bloom and tone mapping.

use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::Context;
use wgpu::{Device, TextureFormat};

use crate::gfx::{
    camera::OrbitCamera,
    geometry::generate_plane,
    resources::TextureResource,
};
use crate::scene::{
    AmbientLight, DepthOfField, DirectionalLight, GroundPlane, ModelNode, PostStage, SceneTree,
    SelectiveBloom,
};
use crate::placement::RenderLayers;

use super::gpu_mesh::{GpuMesh, GpuMeshCache};
use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::uniforms::{DrawUniform, GlobalUniform, PostUniform, DRAW_UNIFORM_STRIDE};

const SHADOW_MAP_SIZE: u32 = 2048;
const INITIAL_DRAW_CAPACITY: u64 = 64;

const SHADOW_PIPELINE: &str = "Shadow";
const SCENE_PIPELINE: &str = "Scene";
const COMPOSITE_PIPELINE: &str = "Composite";

/// Which buffers a draw reads its geometry from
#[derive(Debug, Clone, Copy)]
enum DrawMesh<'a> {
    Ground,
    Asset {
        path: &'a str,
        mesh: usize,
        primitive: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct DrawItem<'a> {
    mesh: DrawMesh<'a>,
    uniform: DrawUniform,
    cast_shadow: bool,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    pipeline_manager: PipelineManager,

    depth_texture: TextureResource,
    hdr_target: TextureResource,
    glow_target: TextureResource,
    shadow_map: TextureResource,

    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,

    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: u64,

    shadow_bind_group: wgpu::BindGroup,

    composite_layout: wgpu::BindGroupLayout,
    composite_bind_group: wgpu::BindGroup,
    post_buffer: wgpu::Buffer,
    linear_sampler: wgpu::Sampler,

    ground: Option<GpuMesh>,
    ground_size: [f32; 2],
    meshes: GpuMeshCache,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Picks a non-sRGB surface format; the composite pass applies gamma itself.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("creating window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("requesting a graphics adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("requesting a graphics device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("surface reports no formats")?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "surface {}x{} {:?} on {}",
            config.width,
            config.height,
            format,
            adapter.get_info().name
        );

        let depth_texture =
            TextureResource::create_depth_texture(&device, config.width, config.height, "Depth");
        let hdr_target =
            TextureResource::create_hdr_target(&device, config.width, config.height, "HDR Colour");
        let glow_target =
            TextureResource::create_hdr_target(&device, config.width, config.height, "Glow");
        let shadow_map = TextureResource::create_shadow_map(&device, SHADOW_MAP_SIZE);

        // Group 0: per-frame globals
        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global Layout"),
            entries: &[uniform_entry(0, false, None)],
        });
        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Global Uniform"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        // Group 1: per-draw uniforms addressed by dynamic offset
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Layout"),
            entries: &[uniform_entry(
                0,
                true,
                NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
            )],
        });
        let (draw_buffer, draw_bind_group) =
            create_draw_buffer(&device, &draw_layout, INITIAL_DRAW_CAPACITY);

        // Group 2: shadow map with hardware comparison
        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Depth,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Bind Group"),
            layout: &shadow_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });

        // Composite inputs
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Layout"),
            entries: &[
                texture_entry(0, wgpu::TextureSampleType::Float { filterable: true }),
                texture_entry(1, wgpu::TextureSampleType::Float { filterable: true }),
                texture_entry(2, wgpu::TextureSampleType::Depth),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let post_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Post Uniform"),
            size: std::mem::size_of::<PostUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let composite_bind_group = create_composite_bind_group(
            &device,
            &composite_layout,
            &hdr_target,
            &glow_target,
            &depth_texture,
            &linear_sampler,
            &post_buffer,
        );

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("shadow", include_str!("shadow.wgsl"));
        pipeline_manager.load_shader("scene", include_str!("scene.wgsl"));
        pipeline_manager.load_shader("composite", include_str!("composite.wgsl"));

        // Both faces cast, so thin geometry still shadows the ground
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::new("SHADOW", "shadow")
                .with_depth(
                    TextureResource::DEPTH_FORMAT,
                    wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                )
                .with_bind_group_layouts(vec![global_layout.clone(), draw_layout.clone()]),
        );

        let hdr_target_state = Some(wgpu::ColorTargetState::from(TextureResource::HDR_FORMAT));
        pipeline_manager.register_pipeline(
            SCENE_PIPELINE,
            PipelineConfig::new("SCENE", "scene")
                .with_depth(TextureResource::DEPTH_FORMAT, wgpu::DepthBiasState::default())
                .with_bind_group_layouts(vec![global_layout, draw_layout.clone(), shadow_layout])
                .with_color_targets(vec![hdr_target_state.clone(), hdr_target_state]),
        );

        pipeline_manager.register_pipeline(
            COMPOSITE_PIPELINE,
            PipelineConfig::new("COMPOSITE", "composite")
                .with_bind_group_layouts(vec![composite_layout.clone()])
                .with_color_targets(vec![Some(format.into())])
                .with_generated_vertices(),
        );

        if let Err(errors) = pipeline_manager.build_pending() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            anyhow::bail!("failed to create pipelines: {}", messages.join("; "));
        }

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            format,
            pipeline_manager,
            depth_texture,
            hdr_target,
            glow_target,
            shadow_map,
            global_buffer,
            global_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            shadow_bind_group,
            composite_layout,
            composite_bind_group,
            post_buffer,
            linear_sampler,
            ground: None,
            ground_size: [0.0, 0.0],
            meshes: GpuMeshCache::new(),
        })
    }

    /// Renders `tree` from `camera`, then the optional UI overlay
    ///
    /// Models without a resolved instance draw nothing. Surface errors are
    /// returned so the caller can reconfigure on `Lost`/`Outdated`.
    pub fn render_frame<F>(
        &mut self,
        tree: &SceneTree<'_>,
        camera: &OrbitCamera,
        ui_callback: Option<F>,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let ambient = tree.ambient().copied().unwrap_or(AmbientLight {
            intensity: 0.0,
            color: [1.0, 1.0, 1.0],
        });
        let light = tree
            .directional()
            .copied()
            .unwrap_or_else(|| DirectionalLight::new(0.0));
        let post = tree.post().copied().unwrap_or_else(passthrough_post);
        let camera_layers = tree.camera().map(|rig| rig.layers).unwrap_or_default();

        let draws = self.collect_draws(tree, camera_layers, post.bloom.selection_layer);
        self.upload_draws(&draws);

        self.queue.write_buffer(
            &self.global_buffer,
            0,
            bytemuck::bytes_of(&GlobalUniform::new(camera, &ambient, &light)),
        );
        self.queue.write_buffer(
            &self.post_buffer,
            0,
            bytemuck::bytes_of(&PostUniform::new(
                &post,
                camera,
                self.config.width,
                self.config.height,
            )),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1: shadow depth from the directional light
        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if light.cast_shadow {
                if let Some(pipeline) = self.pipeline_manager.pipeline(SHADOW_PIPELINE) {
                    shadow_pass.set_pipeline(pipeline);
                    shadow_pass.set_bind_group(0, &self.global_bind_group, &[]);
                    for (index, draw) in draws.iter().enumerate() {
                        if draw.cast_shadow {
                            self.draw_item(&mut shadow_pass, index, draw);
                        }
                    }
                }
            }
        }

        // PASS 2: lit scene into the HDR and glow targets
        {
            let clear = wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            };
            let mut scene_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[
                    Some(wgpu::RenderPassColorAttachment {
                        view: &self.hdr_target.view,
                        resolve_target: None,
                        ops: clear,
                    }),
                    Some(wgpu::RenderPassColorAttachment {
                        view: &self.glow_target.view,
                        resolve_target: None,
                        ops: clear,
                    }),
                ],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.pipeline(SCENE_PIPELINE) {
                scene_pass.set_pipeline(pipeline);
                scene_pass.set_bind_group(0, &self.global_bind_group, &[]);
                scene_pass.set_bind_group(2, &self.shadow_bind_group, &[]);
                for (index, draw) in draws.iter().enumerate() {
                    self.draw_item(&mut scene_pass, index, draw);
                }
            }
        }

        // PASS 3: depth of field, bloom and tone mapping onto the surface
        {
            let mut composite_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Composite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.pipeline(COMPOSITE_PIPELINE) {
                composite_pass.set_pipeline(pipeline);
                composite_pass.set_bind_group(0, &self.composite_bind_group, &[]);
                composite_pass.draw(0..3, 0..1);
            }
        }

        // PASS 4: UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Flattens the tree into draws, uploading any geometry not yet on the GPU
    fn collect_draws<'t>(
        &mut self,
        tree: &'t SceneTree<'_>,
        camera_layers: RenderLayers,
        bloom_layer: u8,
    ) -> Vec<DrawItem<'t>> {
        let mut draws = Vec::new();

        if let Some(ground) = tree.ground() {
            if camera_layers.contains(0) {
                self.prepare_ground(ground);
                let material = crate::assets::MaterialData {
                    base_color: ground.color,
                    ..Default::default()
                };
                draws.push(DrawItem {
                    mesh: DrawMesh::Ground,
                    uniform: DrawUniform::new(
                        ground.transform.to_matrix(),
                        &material,
                        false,
                        ground.receive_shadow,
                    ),
                    cast_shadow: false,
                });
            }
        }

        for model in tree.models() {
            self.collect_model(model, camera_layers, bloom_layer, &mut draws);
        }

        self.meshes.retain_live();
        draws
    }

    fn collect_model<'t>(
        &mut self,
        model: &ModelNode<'t>,
        camera_layers: RenderLayers,
        bloom_layer: u8,
        draws: &mut Vec<DrawItem<'t>>,
    ) {
        let Some(instance) = model.instance else {
            return;
        };
        let handle = instance.handle();
        self.meshes.prepare(&self.device, handle);

        let rest;
        let pose = match model.pose {
            Some(pose) => pose,
            None => {
                rest = handle.rest_pose();
                &rest
            }
        };
        let world = handle.world_matrices(pose);
        let placement = model.transform.to_matrix();

        for state in &instance.meshes {
            if !state.layers.intersects(camera_layers) {
                continue;
            }
            let Some(mesh) = handle.nodes.get(state.node).and_then(|n| n.mesh) else {
                continue;
            };
            let Some(node_matrix) = world.get(state.node) else {
                continue;
            };
            let glow = state.layers.contains(bloom_layer);

            for (primitive, material) in state.materials.iter().enumerate() {
                draws.push(DrawItem {
                    mesh: DrawMesh::Asset {
                        path: instance.asset.path.as_str(),
                        mesh,
                        primitive,
                    },
                    uniform: DrawUniform::new(placement * node_matrix, material, glow, false),
                    cast_shadow: model.cast_shadow,
                });
            }
        }
    }

    fn prepare_ground(&mut self, ground: &GroundPlane) {
        if self.ground.is_some() && self.ground_size == ground.size {
            return;
        }
        let geometry = generate_plane(ground.size[0], ground.size[1], 1, 1);
        self.ground = GpuMesh::from_geometry(&self.device, "Ground", &geometry);
        self.ground_size = ground.size;
    }

    /// Writes every draw's uniform at its dynamic offset, growing the buffer as needed
    fn upload_draws(&mut self, draws: &[DrawItem<'_>]) {
        let needed = draws.len() as u64;
        if needed > self.draw_capacity {
            let capacity = needed.next_power_of_two();
            let (buffer, bind_group) = create_draw_buffer(&self.device, &self.draw_layout, capacity);
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
            self.draw_capacity = capacity;
            log::debug!("draw buffer grown to {} entries", capacity);
        }

        let stride = DRAW_UNIFORM_STRIDE as usize;
        let mut bytes = vec![0u8; draws.len() * stride];
        for (index, draw) in draws.iter().enumerate() {
            let uniform = bytemuck::bytes_of(&draw.uniform);
            bytes[index * stride..index * stride + uniform.len()].copy_from_slice(uniform);
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.draw_buffer, 0, &bytes);
        }
    }

    fn draw_item(&self, pass: &mut wgpu::RenderPass<'_>, index: usize, draw: &DrawItem<'_>) {
        let mesh = match draw.mesh {
            DrawMesh::Ground => self.ground.as_ref(),
            DrawMesh::Asset {
                path,
                mesh,
                primitive,
            } => self.meshes.get(path, mesh, primitive),
        };
        let Some(mesh) = mesh else {
            return;
        };

        let offset = (index as u64 * DRAW_UNIFORM_STRIDE) as wgpu::DynamicOffset;
        pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
        mesh.draw(pass);
    }

    /// Resizes the surface and every screen-sized target
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture = TextureResource::create_depth_texture(&self.device, width, height, "Depth");
        self.hdr_target = TextureResource::create_hdr_target(&self.device, width, height, "HDR Colour");
        self.glow_target = TextureResource::create_hdr_target(&self.device, width, height, "Glow");
        self.composite_bind_group = create_composite_bind_group(
            &self.device,
            &self.composite_layout,
            &self.hdr_target,
            &self.glow_target,
            &self.depth_texture,
            &self.linear_sampler,
            &self.post_buffer,
        );
    }

    /// Reconfigures the surface at its current size, after `Lost` or `Outdated`
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

/// Post settings with depth of field and bloom disabled
fn passthrough_post() -> PostStage {
    PostStage {
        depth_of_field: DepthOfField {
            focus_distance: 0.0,
            focal_length: 1.0,
            bokeh_scale: 0.0,
        },
        bloom: SelectiveBloom {
            intensity: 0.0,
            ..SelectiveBloom::default()
        },
    }
}

fn uniform_entry(
    binding: u32,
    has_dynamic_offset: bool,
    min_binding_size: Option<NonZeroU64>,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, sample_type: wgpu::TextureSampleType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type,
        },
        count: None,
    }
}

fn create_draw_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw Uniforms"),
        size: capacity * DRAW_UNIFORM_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_composite_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    hdr: &TextureResource,
    glow: &TextureResource,
    depth: &TextureResource,
    sampler: &wgpu::Sampler,
    post: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Composite Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&hdr.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&glow.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&depth.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: post.as_entire_binding(),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_post_disables_effects() {
        let post = passthrough_post();
        assert_eq!(post.depth_of_field.bokeh_scale, 0.0);
        assert_eq!(post.bloom.intensity, 0.0);
    }

    #[test]
    fn draw_stride_is_offset_aligned() {
        let limits = wgpu::Limits::downlevel_defaults();
        assert_eq!(DRAW_UNIFORM_STRIDE % limits.min_uniform_buffer_offset_alignment as u64, 0);
    }
}
