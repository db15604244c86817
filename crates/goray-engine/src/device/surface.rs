use anyhow::{bail, Result};
use winit::dpi::PhysicalSize;

use super::SurfacePrefs;

/// A window surface together with the configuration last applied to it.
pub(super) struct SurfaceState<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,

    /// Latest window size. May be zero while minimized, in which case `config`
    /// still holds the last non-zero extent.
    size: PhysicalSize<u32>,
}

impl<'w> SurfaceState<'w> {
    pub(super) fn configure(
        surface: wgpu::Surface<'w>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        prefs: &SurfacePrefs,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let Some(format) = pick_format(&caps.formats, prefs.srgb) else {
            bail!("surface reports no supported formats for this adapter");
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: prefs.present_mode,
            alpha_mode: pick_alpha_mode(&caps.alpha_modes),
            view_formats: Vec::new(),
            desired_maximum_frame_latency: prefs.max_frame_latency,
        };
        surface.configure(device, &config);
        log::debug!(
            "surface configured: {format:?}, {:?}, {}x{}",
            config.present_mode,
            size.width,
            size.height
        );

        Ok(Self {
            surface,
            config,
            size,
        })
    }

    pub(super) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(super) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn is_drawable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    pub(super) fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        if size == self.size {
            return;
        }
        self.size = size;

        if self.is_drawable() {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(device, &self.config);
        }
    }

    /// Acquires the next swapchain texture.
    ///
    /// `Ok(None)` means this frame cannot be drawn (minimized window, timeout,
    /// or a lost surface that has just been reconfigured). Only out-of-memory
    /// is reported as an error.
    pub(super) fn acquire(
        &mut self,
        device: &wgpu::Device,
    ) -> Result<Option<wgpu::SurfaceTexture>> {
        if !self.is_drawable() {
            return Ok(None);
        }

        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                bail!("out of memory while acquiring the surface texture")
            }
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::debug!("{err}; reconfiguring surface");
                self.surface.configure(device, &self.config);
                Ok(None)
            }
            Err(err) => {
                log::debug!("frame skipped: {err}");
                Ok(None)
            }
        }
    }
}

fn pick_format(formats: &[wgpu::TextureFormat], srgb: bool) -> Option<wgpu::TextureFormat> {
    let first = formats.first().copied()?;
    if !srgb {
        return Some(first);
    }
    Some(formats.iter().copied().find(|f| f.is_srgb()).unwrap_or(first))
}

fn pick_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    // The clear color has alpha 0; only an opaque surface keeps it visible.
    if modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
        return wgpu::CompositeAlphaMode::Opaque;
    }
    modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode as Alpha, TextureFormat as Format};

    #[test]
    fn srgb_preferred_when_offered() {
        let formats = [Format::Bgra8Unorm, Format::Bgra8UnormSrgb];
        assert_eq!(pick_format(&formats, true), Some(Format::Bgra8UnormSrgb));
        assert_eq!(pick_format(&formats, false), Some(Format::Bgra8Unorm));
    }

    #[test]
    fn first_format_when_no_srgb_exists() {
        let formats = [Format::Rgba16Float, Format::Bgra8Unorm];
        assert_eq!(pick_format(&formats, true), Some(Format::Rgba16Float));
        assert_eq!(pick_format(&[], true), None);
    }

    #[test]
    fn opaque_alpha_wins() {
        assert_eq!(pick_alpha_mode(&[Alpha::PreMultiplied, Alpha::Opaque]), Alpha::Opaque);
        assert_eq!(pick_alpha_mode(&[Alpha::PostMultiplied]), Alpha::PostMultiplied);
        assert_eq!(pick_alpha_mode(&[]), Alpha::Auto);
    }
}
