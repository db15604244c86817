use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit};

/// How long a single startup pump may wait for the platform to resume us.
const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(16);

/// Upper bound on startup pumps before giving up on window creation.
const STARTUP_PUMP_ATTEMPTS: u32 = 500;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "goray".to_string(),
            size: LogicalSize::new(640.0, 480.0),
            resizable: false,
        }
    }
}

#[self_referencing]
struct WindowSurface {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// winit callback target. Only records what happened; the frame decides what
/// to do about it.
struct Handler {
    config: WindowConfig,
    gpu_init: GpuInit,
    surface: Option<WindowSurface>,
    init_error: Option<anyhow::Error>,
    close_requested: bool,
    resized: Option<PhysicalSize<u32>>,
}

impl Handler {
    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowSurface> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        WindowSurfaceTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() || self.init_error.is_some() {
            return;
        }

        match self.create_surface(event_loop) {
            Ok(surface) => {
                log::info!("window \"{}\" created", self.config.title);
                self.surface = Some(surface);
            }
            Err(e) => self.init_error = Some(e),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested");
                self.close_requested = true;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log::debug!("escape pressed; treating as close request");
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => self.resized = Some(size),
            _ => {}
        }
    }
}

/// The window, its event loop and the GPU context bound to it.
///
/// Not `Send`: must stay on the thread that opened it.
pub struct PlatformWindow {
    event_loop: EventLoop<()>,
    handler: Handler,
    exited: bool,
}

impl PlatformWindow {
    /// Creates the event loop, the window and the GPU context on the calling thread.
    ///
    /// Any failure here is an initialization failure; nothing has been rendered yet.
    pub fn open(config: WindowConfig, gpu_init: GpuInit) -> Result<Self> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut window = Self {
            event_loop,
            handler: Handler {
                config,
                gpu_init,
                surface: None,
                init_error: None,
                close_requested: false,
                resized: None,
            },
            exited: false,
        };

        for _ in 0..STARTUP_PUMP_ATTEMPTS {
            let status = window
                .event_loop
                .pump_app_events(Some(STARTUP_PUMP_TIMEOUT), &mut window.handler);

            if let Some(err) = window.handler.init_error.take() {
                return Err(err);
            }
            if window.handler.surface.is_some() {
                return Ok(window);
            }
            if let PumpStatus::Exit(code) = status {
                bail!("event loop exited with code {code} before the window was created");
            }
        }

        Err(anyhow!("platform never resumed the application; no window was created"))
    }

    /// Processes pending platform events without blocking.
    ///
    /// Applies resizes to the surface. Returns `false` once the platform has
    /// shut the event loop down.
    pub fn poll_events(&mut self) -> bool {
        if self.exited {
            return false;
        }

        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);

        if let Some(new_size) = self.handler.resized.take() {
            if let Some(surface) = self.handler.surface.as_mut() {
                surface.with_gpu_mut(|gpu| gpu.resize(new_size));
            }
        }

        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with code {code}");
            self.exited = true;
            self.handler.close_requested = true;
        }
        !self.exited
    }

    /// `true` once the user (or platform) has asked for the window to close.
    pub fn close_requested(&self) -> bool {
        self.handler.close_requested
    }

    pub fn gpu(&self) -> Option<&Gpu<'_>> {
        self.handler.surface.as_ref().map(|s| s.borrow_gpu())
    }

    /// Runs `f` with mutable access to the GPU context.
    pub fn with_gpu<R>(&mut self, f: impl FnOnce(&mut Gpu<'_>) -> R) -> Result<R> {
        let surface = self
            .handler
            .surface
            .as_mut()
            .context("window has no GPU surface")?;
        Ok(surface.with_gpu_mut(|gpu| f(gpu)))
    }

    /// Tells the platform a frame is about to be presented.
    pub fn pre_present_notify(&self) {
        if let Some(surface) = self.handler.surface.as_ref() {
            surface.borrow_window().pre_present_notify();
        }
    }
}
