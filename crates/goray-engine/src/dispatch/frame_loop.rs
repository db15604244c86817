use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::{DispatchError, Dispatcher, QuitSignal};

type FrameStep<S> = dyn Fn(&mut S) -> anyhow::Result<()> + Send + Sync + 'static;

/// Re-submits a frame task after each completed frame.
///
/// Every iteration hands one frame to the owner thread through
/// [`Dispatcher::submit_and_wait`] and only queues the next one after it has
/// finished, so at most one frame is ever in flight and rendering is paced by
/// the owner loop. The loop ends when the quit signal is raised; the frame that
/// raised it is the last one queued.
pub struct FrameLoop<S> {
    dispatcher: Dispatcher<S>,
    quit: QuitSignal,
    step: Arc<FrameStep<S>>,
}

impl<S: 'static> FrameLoop<S> {
    pub fn new<F>(dispatcher: Dispatcher<S>, quit: QuitSignal, step: F) -> Self
    where
        F: Fn(&mut S) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            dispatcher,
            quit,
            step: Arc::new(step),
        }
    }

    /// Drives frames on the calling thread. Returns the number of frames run.
    pub fn run(self) -> Result<u64, DispatchError> {
        let mut frames: u64 = 0;

        while !self.quit.is_raised() {
            let step = Arc::clone(&self.step);
            self.dispatcher.submit_and_wait(move |state| step(state))?;
            frames += 1;
        }

        log::debug!("frame loop finished after {frames} frames");
        Ok(frames)
    }

    /// Drives frames on a dedicated background thread.
    pub fn spawn(self) -> io::Result<JoinHandle<Result<u64, DispatchError>>> {
        thread::Builder::new()
            .name("goray-frames".into())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{channel, LoopExit};

    struct FakeWindow {
        frames: u32,
        close_after: u32,
        quit: QuitSignal,
    }

    fn fake_frame(w: &mut FakeWindow) -> anyhow::Result<()> {
        w.frames += 1;
        if w.frames == w.close_after {
            w.quit.raise();
        }
        Ok(())
    }

    #[test]
    fn close_request_ends_resubmission() {
        let (dispatcher, owner) = channel::<FakeWindow>(4);
        let quit = owner.quit_signal();
        let observer = dispatcher.clone();

        let frames = FrameLoop::new(dispatcher, quit.clone(), fake_frame)
            .spawn()
            .expect("spawn frame loop");

        let mut window = FakeWindow { frames: 0, close_after: 5, quit };
        let exit = owner.run(&mut window).expect("owner loop");

        assert_eq!(exit, LoopExit::Quit);
        assert_eq!(frames.join().expect("frame thread panicked"), Ok(5));
        assert_eq!(window.frames, 5);
        assert_eq!(observer.queued(), 0);
    }

    #[test]
    fn raised_quit_schedules_nothing() {
        let (dispatcher, owner) = channel::<FakeWindow>(4);
        let quit = owner.quit_signal();
        quit.raise();

        let frames = FrameLoop::new(dispatcher, quit.clone(), fake_frame)
            .spawn()
            .expect("spawn frame loop");
        assert_eq!(frames.join().expect("frame thread panicked"), Ok(0));

        let mut window = FakeWindow { frames: 0, close_after: 1, quit };
        assert_eq!(owner.run(&mut window).expect("owner loop"), LoopExit::Disconnected);
        assert_eq!(window.frames, 0);
    }

    #[test]
    fn frame_error_stops_the_loop() {
        let (dispatcher, owner) = channel::<u32>(4);
        let quit = owner.quit_signal();

        let frames = FrameLoop::new(dispatcher, quit, |n: &mut u32| {
            *n += 1;
            anyhow::ensure!(*n < 3, "surface lost");
            Ok(())
        })
        .spawn()
        .expect("spawn frame loop");

        let mut n = 0;
        assert!(owner.run(&mut n).is_err());
        assert_eq!(n, 3);
        assert_eq!(
            frames.join().expect("frame thread panicked"),
            Err(DispatchError::Aborted)
        );
    }
}
