/// How the GPU context is requested from the platform.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// Device requirements. The quad needs nothing past GL 3.3-class hardware,
    /// so the defaults stay at the downlevel baseline.
    pub features: wgpu::Features,
    pub limits: wgpu::Limits,

    pub surface: SurfacePrefs,
}

/// Swapchain preferences. Each is a wish; the surface capabilities decide.
#[derive(Debug, Clone)]
pub struct SurfacePrefs {
    /// Pick an sRGB format when the surface offers one.
    pub srgb: bool,

    /// `Fifo` waits for vblank, the equivalent of a swap interval of 1.
    pub present_mode: wgpu::PresentMode,

    pub max_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            features: wgpu::Features::empty(),
            limits: wgpu::Limits::downlevel_defaults(),
            surface: SurfacePrefs::default(),
        }
    }
}

impl Default for SurfacePrefs {
    fn default() -> Self {
        Self {
            srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            max_frame_latency: 2,
        }
    }
}
