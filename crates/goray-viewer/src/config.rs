use goray_engine::device::GpuInit;
use goray_engine::dispatch::DEFAULT_QUEUE_CAPACITY;
use goray_engine::logging::LoggingConfig;
use goray_engine::render::ShaderSources;
use goray_engine::window::WindowConfig;

/// Everything the viewer needs to start. `Default` gives the stock setup.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub gpu: GpuInit,
    pub logging: LoggingConfig,

    /// Capacity of the owner-thread task queue.
    pub queue_capacity: usize,

    /// Width and height of the generated gradient texture.
    pub texture_size: (u32, u32),

    pub clear_color: wgpu::Color,
    pub shaders: ShaderSources,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            gpu: GpuInit::default(),
            logging: LoggingConfig::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            texture_size: (20, 20),
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.4,
                a: 0.0,
            },
            shaders: ShaderSources::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_viewer() {
        let config = ViewerConfig::default();
        assert_eq!(config.window.title, "goray");
        assert_eq!((config.window.size.width, config.window.size.height), (640.0, 480.0));
        assert!(!config.window.resizable);
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.texture_size, (20, 20));
        assert_eq!(config.clear_color.b, 0.4);
    }
}
