//! Viewer lifecycle: window creation, the startup thread and the owner loop.

use std::io;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use goray_engine::dispatch::{self, DispatchError, Dispatcher, FrameLoop, QuitSignal};
use goray_engine::render::{QuadScene, TextureImage};
use goray_engine::time::FrameClock;
use goray_engine::window::PlatformWindow;

use crate::config::ViewerConfig;
use crate::{frame, scene};

/// State owned by the main thread. Only tasks running on the owner loop see it.
pub struct Viewer {
    pub scene: Option<QuadScene>,
    pub window: PlatformWindow,
    pub clock: FrameClock,
    pub quit: QuitSignal,
    pub clear_color: wgpu::Color,
    pub warned_missing_scene: bool,
}

impl Viewer {
    pub fn new(window: PlatformWindow, quit: QuitSignal, clear_color: wgpu::Color) -> Self {
        Self {
            scene: None,
            window,
            clock: FrameClock::new(),
            quit,
            clear_color,
            warned_missing_scene: false,
        }
    }
}

/// Opens the window, starts the frame driver and runs the owner loop on the
/// calling thread until the window closes or a task fails.
pub fn run(config: ViewerConfig) -> Result<()> {
    let window = PlatformWindow::open(config.window.clone(), config.gpu.clone())
        .context("failed to open window")?;

    let (dispatcher, owner) = dispatch::channel::<Viewer>(config.queue_capacity);
    let quit = owner.quit_signal();
    let mut viewer = Viewer::new(window, quit.clone(), config.clear_color);

    let (width, height) = config.texture_size;
    let image = TextureImage::gradient(width, height);
    let shaders = config.shaders;

    let startup = spawn_startup(
        dispatcher,
        quit,
        move |viewer: &mut Viewer| scene::setup_scene(viewer, &image, &shaders),
        frame::render_step,
    )
    .context("failed to spawn startup thread")?;

    let exit = owner.run(&mut viewer)?;
    log::info!("owner loop exited: {exit:?}");

    match startup.join() {
        Ok(Ok(frames)) => log::info!("rendered {frames} frames"),
        Ok(Err(err)) => log::debug!("frame driver stopped: {err}"),
        Err(_) => return Err(anyhow!("startup thread panicked")),
    }

    Ok(())
}

/// Spawns the thread that performs scene setup and then drives frames.
///
/// `setup` runs to completion on the owner thread before the first frame is
/// queued, so frames never observe a half-built scene.
pub fn spawn_startup<S, Setup, Step>(
    dispatcher: Dispatcher<S>,
    quit: QuitSignal,
    setup: Setup,
    step: Step,
) -> io::Result<JoinHandle<Result<u64, DispatchError>>>
where
    S: 'static,
    Setup: FnOnce(&mut S) -> Result<()> + Send + 'static,
    Step: Fn(&mut S) -> Result<()> + Send + Sync + 'static,
{
    thread::Builder::new()
        .name("goray-startup".into())
        .spawn(move || {
            dispatcher.submit_and_wait(setup)?;
            log::debug!("scene ready; starting frame loop");
            FrameLoop::new(dispatcher, quit, step).run()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use goray_engine::dispatch::LoopExit;

    #[derive(Default)]
    struct Recorder {
        events: Vec<&'static str>,
        quit: Option<QuitSignal>,
    }

    #[test]
    fn setup_completes_before_the_first_frame() {
        let (dispatcher, owner) = dispatch::channel::<Recorder>(4);
        let quit = owner.quit_signal();

        let handle = spawn_startup(
            dispatcher,
            quit.clone(),
            |r: &mut Recorder| {
                r.events.push("setup");
                Ok(())
            },
            |r: &mut Recorder| {
                r.events.push("frame");
                if r.events.len() == 4 {
                    if let Some(quit) = &r.quit {
                        quit.raise();
                    }
                }
                Ok(())
            },
        )
        .expect("spawn startup");

        let mut recorder = Recorder {
            quit: Some(quit),
            ..Recorder::default()
        };
        let exit = owner.run(&mut recorder).expect("owner loop");

        assert_eq!(exit, LoopExit::Quit);
        assert_eq!(recorder.events, ["setup", "frame", "frame", "frame"]);
        assert_eq!(handle.join().expect("startup thread panicked"), Ok(3));
    }

    #[test]
    fn failed_setup_schedules_no_frames() {
        let (dispatcher, owner) = dispatch::channel::<Recorder>(4);
        let quit = owner.quit_signal();

        let handle = spawn_startup(
            dispatcher,
            quit,
            |_: &mut Recorder| bail!("shader rejected"),
            |r: &mut Recorder| {
                r.events.push("frame");
                Ok(())
            },
        )
        .expect("spawn startup");

        let mut recorder = Recorder::default();
        let err = owner.run(&mut recorder).unwrap_err();

        assert!(format!("{err:#}").contains("shader rejected"));
        assert!(recorder.events.is_empty());
        assert_eq!(handle.join().expect("startup thread panicked"), Err(DispatchError::Aborted));
    }
}
