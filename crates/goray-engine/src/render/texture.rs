//! Procedural texture generation and upload.

use anyhow::{ensure, Result};
use image::{DynamicImage, Rgb, RgbImage};

use super::RenderCtx;

/// Scale applied to `[0, 1)` channel values so that they truncate into `0..=255`.
const CHANNEL_SCALE: f32 = 255.99;

/// Fixed blue component of the gradient, before scaling.
const GRADIENT_BLUE: f32 = 0.2;

/// CPU-side RGB8 image, row-major, `width * height * 3` bytes.
#[derive(Debug, Clone)]
pub struct TextureImage {
    image: RgbImage,
}

impl TextureImage {
    /// Builds the placeholder gradient: red follows x, green follows y, blue is constant.
    pub fn gradient(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                scale_channel(x as f32 / w),
                scale_channel(y as f32 / h),
                scale_channel(GRADIENT_BLUE),
            ])
        });
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Packed RGB bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Uploads the image as a sampled 2D texture.
    ///
    /// wgpu has no 3-channel texture format, so the bytes are expanded to RGBA
    /// with opaque alpha. Sampling uses nearest filtering and clamps at the edges.
    pub fn upload(&self, ctx: &RenderCtx<'_>) -> Result<GpuTexture> {
        ensure!(
            self.width() > 0 && self.height() > 0,
            "texture image is empty ({}x{})",
            self.width(),
            self.height()
        );

        let rgba = DynamicImage::ImageRgb8(self.image.clone()).into_rgba8();
        let size = wgpu::Extent3d {
            width: self.width(),
            height: self.height(),
            depth_or_array_layers: 1,
        };

        // Match the surface's encoding so texel bytes reach the screen unchanged.
        let format = if ctx.surface_format.is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("goray gradient texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width()),
                rows_per_image: Some(self.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("goray gradient sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        log::debug!(
            "uploaded {}x{} gradient texture ({format:?})",
            self.width(),
            self.height()
        );

        Ok(GpuTexture {
            texture,
            view,
            sampler,
        })
    }
}

/// A sampled texture on the GPU.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

#[inline]
fn scale_channel(v: f32) -> u8 {
    (CHANNEL_SCALE * v) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_is_packed_rgb() {
        let img = TextureImage::gradient(20, 20);
        assert_eq!(img.as_bytes().len(), 1200);
        assert_eq!((img.width(), img.height()), (20, 20));
    }

    #[test]
    fn gradient_corners() {
        let img = TextureImage::gradient(20, 20);
        assert_eq!(img.pixel(0, 0), Some([0, 0, 51]));
        // 255.99 * 19 / 20 truncates to 243.
        assert_eq!(img.pixel(19, 19), Some([243, 243, 51]));
        assert_eq!(img.pixel(19, 0), Some([243, 0, 51]));
        assert_eq!(img.pixel(20, 0), None);
    }

    #[test]
    fn gradient_is_row_major() {
        let img = TextureImage::gradient(4, 2);
        let bytes = img.as_bytes();
        // Pixel (x = 1, y = 0) is the second triple; (x = 0, y = 1) starts row two.
        assert_eq!(&bytes[3..6], &[63, 0, 51]);
        assert_eq!(&bytes[12..15], &[0, 127, 51]);
    }

    #[test]
    fn non_square_gradient_scales_each_axis() {
        let img = TextureImage::gradient(10, 5);
        assert_eq!(img.pixel(5, 0), Some([127, 0, 51]));
        assert_eq!(img.pixel(0, 4), Some([0, 204, 51]));
    }

    #[test]
    fn empty_image_is_refused_on_upload() {
        let Some((device, queue)) = crate::render::test_gpu::headless_device() else {
            return;
        };
        let ctx = RenderCtx::new(
            &device,
            &queue,
            wgpu::TextureFormat::Rgba8Unorm,
            winit::dpi::PhysicalSize::new(1, 1),
        );
        assert!(TextureImage::gradient(0, 3).upload(&ctx).is_err());
    }
}
