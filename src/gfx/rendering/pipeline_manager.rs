//! Render pipeline registry
//!
//! Pipelines are declared as [`PipelineConfig`]s against named shader modules
//! and built together once every shader is loaded. Every shader uses the
//! `vs_main` / `fs_main` entry points.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use crate::gfx::vertex::Vertex3D;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("pipeline '{pipeline}' uses unknown shader '{shader}'")]
    MissingShader { pipeline: String, shader: String },
}

/// Where the vertex stage gets its vertices from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInput {
    /// One [`Vertex3D`] buffer in slot 0
    Mesh,
    /// Generated from the vertex index, no buffers bound
    Generated,
}

#[derive(Debug, Clone, Copy)]
pub struct DepthConfig {
    pub format: TextureFormat,
    pub bias: DepthBiasState,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub vertex_input: VertexInput,
    pub depth: Option<DepthConfig>,
    /// Empty for depth-only pipelines, which get no fragment stage
    pub color_targets: Vec<Option<ColorTargetState>>,
}

impl PipelineConfig {
    /// Mesh pipeline without depth or color targets
    pub fn new(label: &str, shader: &str) -> Self {
        Self {
            label: label.to_string(),
            shader: shader.to_string(),
            bind_group_layouts: Vec::new(),
            vertex_input: VertexInput::Mesh,
            depth: None,
            color_targets: Vec::new(),
        }
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn with_depth(mut self, format: TextureFormat, bias: DepthBiasState) -> Self {
        self.depth = Some(DepthConfig { format, bias });
        self
    }

    pub fn with_color_targets(mut self, targets: Vec<Option<ColorTargetState>>) -> Self {
        self.color_targets = targets;
        self
    }

    pub fn with_generated_vertices(mut self) -> Self {
        self.vertex_input = VertexInput::Generated;
        self
    }

    pub fn is_depth_only(&self) -> bool {
        self.color_targets.is_empty()
    }
}

/// Owns shader modules and the pipelines built from them
pub struct PipelineManager {
    device: Arc<Device>,
    shaders: HashMap<String, ShaderModule>,
    configs: HashMap<String, PipelineConfig>,
    pipelines: HashMap<String, RenderPipeline>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            configs: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles a WGSL module under `name`
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shaders.insert(name.to_string(), module);
    }

    /// Declares a pipeline; it is built by [`Self::build_pending`]
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.configs.insert(name.to_string(), config);
    }

    /// Builds every declared pipeline not built yet, collecting all failures
    pub fn build_pending(&mut self) -> Result<(), Vec<PipelineError>> {
        let pending: Vec<String> = self
            .configs
            .keys()
            .filter(|name| !self.pipelines.contains_key(*name))
            .cloned()
            .collect();

        let mut errors = Vec::new();
        for name in pending {
            match self.build(&name) {
                Ok(pipeline) => {
                    log::debug!("built pipeline {}", name);
                    self.pipelines.insert(name, pipeline);
                }
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    fn build(&self, name: &str) -> Result<RenderPipeline, PipelineError> {
        let missing = |shader: &str| PipelineError::MissingShader {
            pipeline: name.to_string(),
            shader: shader.to_string(),
        };
        let config = self.configs.get(name).ok_or_else(|| missing(""))?;
        let module = self
            .shaders
            .get(&config.shader)
            .ok_or_else(|| missing(&config.shader))?;

        let layouts: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{} layout", config.label)),
                bind_group_layouts: &layouts,
                push_constant_ranges: &[],
            });

        let mesh_layout = [Vertex3D::desc()];
        let buffers: &[VertexBufferLayout] = match config.vertex_input {
            VertexInput::Mesh => &mesh_layout,
            VertexInput::Generated => &[],
        };

        let fragment = (!config.is_depth_only()).then(|| FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &config.color_targets,
            compilation_options: PipelineCompilationOptions::default(),
        });

        Ok(self
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&layout),
                vertex: VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    buffers,
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment,
                primitive: PrimitiveState::default(),
                depth_stencil: config.depth.map(|depth| DepthStencilState {
                    format: depth.format,
                    depth_write_enabled: true,
                    depth_compare: CompareFunction::Less,
                    stencil: StencilState::default(),
                    bias: depth.bias,
                }),
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipelines_without_targets_are_depth_only() {
        let shadow = PipelineConfig::new("SHADOW", "shadow")
            .with_depth(TextureFormat::Depth32Float, DepthBiasState::default());
        assert!(shadow.is_depth_only());
        assert_eq!(shadow.vertex_input, VertexInput::Mesh);

        let composite = PipelineConfig::new("COMPOSITE", "composite")
            .with_color_targets(vec![Some(TextureFormat::Bgra8Unorm.into())])
            .with_generated_vertices();
        assert!(!composite.is_depth_only());
        assert!(composite.depth.is_none());
        assert_eq!(composite.vertex_input, VertexInput::Generated);
    }
}
