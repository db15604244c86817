use anyhow::{bail, Result};

use super::{QuadScene, RenderTarget};
use crate::device::Gpu;

/// Outcome of [`render_frame`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    Presented,
    /// No swapchain image this frame (minimized, timed out, surface lost).
    Skipped,
}

/// Clears, draws `scene` if there is one, and presents.
///
/// Without a scene the frame is cleared and presented only. Any GPU error
/// reported during the frame is returned as an error.
pub fn render_frame(
    gpu: &mut Gpu<'_>,
    scene: Option<&mut QuadScene>,
    clear: wgpu::Color,
) -> Result<FrameStatus> {
    let Some(mut frame) = gpu.acquire_frame()? else {
        return Ok(FrameStatus::Skipped);
    };

    let clear = clear_for_surface(clear, gpu.surface_format());
    {
        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, frame.size);
        encode_frame(gpu.device(), &mut target, scene, clear);
    }

    gpu.present(frame);

    if let Some(err) = gpu.take_runtime_error() {
        bail!("GPU error during frame: {err}");
    }
    Ok(FrameStatus::Presented)
}

/// Records one frame into `target`: the scene when it exists, otherwise a
/// clear-only pass.
pub fn encode_frame(
    device: &wgpu::Device,
    target: &mut RenderTarget<'_>,
    scene: Option<&mut QuadScene>,
    clear: wgpu::Color,
) {
    match scene {
        Some(scene) => scene.encode(device, target, clear),
        None => clear_pass(target, clear),
    }
}

/// Converts a clear color given in display values into what `format` stores.
///
/// An sRGB surface encodes the clear value on write, so it is decoded first to
/// show the requested value on screen. Alpha is linear in every format.
pub fn clear_for_surface(color: wgpu::Color, format: wgpu::TextureFormat) -> wgpu::Color {
    if !format.is_srgb() {
        return color;
    }
    wgpu::Color {
        r: srgb_to_linear(color.r),
        g: srgb_to_linear(color.g),
        b: srgb_to_linear(color.b),
        a: color.a,
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn clear_pass(target: &mut RenderTarget<'_>, clear: wgpu::Color) {
    let _rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("goray clear"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}
