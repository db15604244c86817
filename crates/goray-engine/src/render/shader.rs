//! WGSL sources for the textured quad and the compile/link helpers.
//!
//! "Compile" creates a shader module and "link" creates the render pipeline
//! that joins both stages. Both run inside a validation error scope so that
//! diagnostics come back as values instead of reaching the uncaptured-error
//! handler.

use std::borrow::Cow;
use std::fmt;

/// Passes the position through and forwards the UV.
pub const VERTEX_SRC: &str = r"
struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VertexOut {
    var out: VertexOut;
    out.position = vec4<f32>(position, 1.0);
    out.uv = uv;
    return out;
}
";

/// Samples the bound texture at the UV and writes its RGB.
pub const FRAGMENT_SRC: &str = r"
@group(0) @binding(0) var quad_texture: texture_2d<f32>;
@group(0) @binding(1) var quad_sampler: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(quad_texture, quad_sampler, uv).rgb, 1.0);
}
";

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Vertex + fragment source pair.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            vertex: Cow::Borrowed(VERTEX_SRC),
            fragment: Cow::Borrowed(FRAGMENT_SRC),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Link,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex shader",
            Self::Fragment => "fragment shader",
            Self::Link => "program link",
        })
    }
}

/// A compile or link failure with the driver's diagnostic text.
#[derive(Debug, Clone)]
pub struct ShaderError {
    pub stage: ShaderStage,
    pub log: String,
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.log)
    }
}

impl std::error::Error for ShaderError {}

/// Everything the pipeline needs besides the two shader modules.
pub struct LinkDesc<'a> {
    pub label: &'a str,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
}

/// Compiles one WGSL stage.
pub fn compile_shader(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let label = format!("goray {stage}");
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.to_owned())),
    });

    match pollster::block_on(scope.pop()) {
        None => Ok(module),
        Some(err) => Err(diagnostic(stage, err)),
    }
}

/// Joins a vertex and a fragment module into a render pipeline.
pub fn link_program(
    device: &wgpu::Device,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
    desc: &LinkDesc<'_>,
) -> Result<wgpu::RenderPipeline, ShaderError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: desc.bind_group_layouts,
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),

        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some(VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: desc.vertex_buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some(FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: desc.depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    match pollster::block_on(scope.pop()) {
        None => Ok(pipeline),
        Some(err) => Err(diagnostic(ShaderStage::Link, err)),
    }
}

fn diagnostic(stage: ShaderStage, err: wgpu::Error) -> ShaderError {
    let mut text = err.to_string();
    if text.trim().is_empty() {
        text = format!("{err:?}");
    }
    log::error!("{stage} failed:\n{text}");
    ShaderError { stage, log: text }
}
