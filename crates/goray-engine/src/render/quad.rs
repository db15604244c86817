use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use super::shader::{self, LinkDesc, ShaderSources, ShaderStage};
use super::texture::{GpuTexture, TextureImage};
use super::{RenderCtx, RenderTarget};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Interleaved vertex: position (3 floats) then UV (2 floats), stride 5 floats.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position, offset 0
        1 => Float32x2  // uv, offset 3 floats
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const fn v(x: f32, y: f32, u: f32, w: f32) -> QuadVertex {
    QuadVertex {
        position: [x, y, 0.0],
        uv: [u, w],
    }
}

/// Two triangles covering the whole `[-1, 1]²` viewport.
///
/// Every vertex sits at depth 0 so the quad passes the `Less` test against a
/// depth buffer cleared to 1.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    v(-1.0, -1.0, 1.0, 0.0),
    v(1.0, -1.0, 0.0, 0.0),
    v(-1.0, 1.0, 1.0, 1.0),
    v(1.0, -1.0, 0.0, 0.0),
    v(1.0, 1.0, 0.0, 1.0),
    v(-1.0, 1.0, 1.0, 1.0),
];

/// GPU objects for the textured quad, created once by scene setup.
///
/// Every frame only reads them; all access happens on the owner thread.
pub struct QuadScene {
    vertex_buffer: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,
    texture: GpuTexture,
    bind_group: wgpu::BindGroup,
    depth: DepthTarget,
}

impl QuadScene {
    /// Allocates the vertex buffer, builds the program and uploads `image`.
    ///
    /// Fails on any compile or link error; the error carries the diagnostic.
    pub fn setup(ctx: &RenderCtx<'_>, image: &TextureImage, sources: &ShaderSources) -> Result<Self> {
        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("goray quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let vs = shader::compile_shader(ctx.device, ShaderStage::Vertex, &sources.vertex)?;
        let fs = shader::compile_shader(ctx.device, ShaderStage::Fragment, &sources.fragment)?;

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("goray quad bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline = shader::link_program(
            ctx.device,
            &vs,
            &fs,
            &LinkDesc {
                label: "goray quad pipeline",
                vertex_buffers: &[QuadVertex::layout()],
                bind_group_layouts: &[&bind_group_layout],
                color_format: ctx.surface_format,
                depth_format: Some(DEPTH_FORMAT),
            },
        )?;

        let texture = image.upload(ctx).context("failed to upload quad texture")?;

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("goray quad bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        let depth = DepthTarget::new(ctx.device, ctx.size);

        log::info!("scene ready: {} vertices, {}x{} texture", QUAD_VERTICES.len(), image.width(), image.height());

        Ok(Self {
            vertex_buffer,
            pipeline,
            texture,
            bind_group,
            depth,
        })
    }

    pub fn texture(&self) -> &GpuTexture {
        &self.texture
    }

    /// Records one pass: clear color + depth, then draw the 6 quad vertices.
    pub fn encode(&mut self, device: &wgpu::Device, target: &mut RenderTarget<'_>, clear: wgpu::Color) {
        self.depth.ensure_size(device, target.size);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("goray quad pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
    }
}

/// Depth attachment matching the color target's size.
struct DepthTarget {
    size: PhysicalSize<u32>,
    view: wgpu::TextureView,
}

impl DepthTarget {
    fn new(device: &wgpu::Device, size: PhysicalSize<u32>) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("goray depth"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            size,
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        }
    }

    fn ensure_size(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        if self.size != size {
            log::debug!("depth target resized to {}x{}", size.width, size.height);
            *self = Self::new(device, size);
        }
    }
}
