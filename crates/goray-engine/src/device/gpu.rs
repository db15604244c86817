use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use crossbeam_channel::{unbounded, Receiver};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface::SurfaceState;
use super::GpuInit;
use crate::render::RenderCtx;

/// Device, queue and window surface for one window.
///
/// `'w` is the window's lifetime; the surface borrows it.
pub struct Gpu<'w> {
    surface: SurfaceState<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Errors wgpu raised outside of any error scope, in arrival order.
    uncaptured: Receiver<String>,
}

/// One acquired swapchain image and the encoder recording into it.
///
/// Hand it back through [`Gpu::present`] promptly; the next image cannot be
/// acquired while this one is held.
pub struct GpuFrame {
    pub target: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
    pub size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });
        let raw_surface = instance
            .create_surface(window)
            .context("failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&raw_surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;

        let info = adapter.get_info();
        log::info!("adapter: {} ({:?}, {:?})", info.name, info.backend, info.device_type);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("goray device"),
                required_features: init.features,
                required_limits: init.limits.using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("adapter refused to create a device")?;

        let (report, uncaptured) = unbounded();
        device.on_uncaptured_error(Arc::new(move |error| {
            log::error!("uncaptured GPU error: {error}");
            let _ = report.send(error.to_string());
        }));

        let surface = SurfaceState::configure(raw_surface, &adapter, &device, size, &init.surface)?;

        Ok(Self {
            surface,
            device,
            queue,
            uncaptured,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface.format()
    }

    /// Window size in physical pixels, zero while minimized.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.surface.size()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, self.surface.format(), self.surface.size())
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.surface.resize(&self.device, size);
    }

    /// Acquires the next image to draw into. `Ok(None)` skips this frame.
    pub fn acquire_frame(&mut self) -> Result<Option<GpuFrame>> {
        let Some(target) = self.surface.acquire(&self.device)? else {
            return Ok(None);
        };

        let extent = target.texture.size();
        let view = target.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("goray frame"),
            });

        Ok(Some(GpuFrame {
            target,
            view,
            encoder,
            size: PhysicalSize::new(extent.width, extent.height),
        }))
    }

    /// Submits the frame's commands and swaps it onto the screen.
    pub fn present(&self, frame: GpuFrame) {
        let GpuFrame {
            target, encoder, ..
        } = frame;
        self.queue.submit([encoder.finish()]);
        target.present();
    }

    /// Oldest unreported runtime GPU error, if any.
    pub fn take_runtime_error(&self) -> Option<String> {
        self.uncaptured.try_recv().ok()
    }
}
