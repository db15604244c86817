use std::thread::{self, ThreadId};

use anyhow::{ensure, Context, Result};
use crossbeam_channel::{Receiver, Sender};

use super::{QuitSignal, Task};

/// Why [`Owner::run`] returned normally.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopExit {
    /// The quit signal was observed after a task.
    Quit,
    /// Every [`Dispatcher`](super::Dispatcher) was dropped and the queue is empty.
    Disconnected,
}

/// Consumer side of the task queue; lives on the owner thread.
///
/// The loop has two states. While *draining* it blocks on the queue, runs one
/// task at a time and checks the quit signal after each. *Terminating* is
/// reached by consuming the owner in [`run`](Self::run): when `run` returns
/// the owner is dropped, no further task can execute, and pending tasks are
/// discarded (their submitters see
/// [`DispatchError::Aborted`](super::DispatchError::Aborted)).
pub struct Owner<S> {
    receiver: Receiver<Task<S>>,
    quit: QuitSignal,
    thread: ThreadId,

    /// Dropped with the owner to release waiters; never sent on.
    _closed: Sender<()>,
}

impl<S: 'static> Owner<S> {
    pub(super) fn new(receiver: Receiver<Task<S>>, closed: Sender<()>, thread: ThreadId) -> Self {
        Self {
            receiver,
            quit: QuitSignal::new(),
            thread,
            _closed: closed,
        }
    }

    /// Returns a handle to the signal that stops this loop.
    pub fn quit_signal(&self) -> QuitSignal {
        self.quit.clone()
    }

    /// Drains the queue until quit is raised or all producers disconnect.
    ///
    /// A task returning `Err` stops the loop and the error is returned; the
    /// graphics state it was touching cannot be trusted afterwards.
    pub fn run(self, state: &mut S) -> Result<LoopExit> {
        ensure!(
            thread::current().id() == self.thread,
            "owner loop must run on the thread that created the queue ({:?})",
            self.thread
        );

        log::debug!("owner loop draining");
        let mut executed: u64 = 0;

        loop {
            let Ok(task) = self.receiver.recv() else {
                log::debug!("owner loop: all producers gone after {executed} tasks");
                return Ok(LoopExit::Disconnected);
            };

            log::trace!("owner loop: running task #{executed}");
            let outcome = task(state);
            executed += 1;

            if let Err(err) = outcome {
                log::error!("owner task #{} failed: {err:#}", executed - 1);
                return Err(err).context("fatal error on the owner thread");
            }

            if self.quit.is_raised() {
                log::debug!("owner loop: quit after {executed} tasks");
                return Ok(LoopExit::Quit);
            }
        }
    }
}

impl<S> Drop for Owner<S> {
    // Buffered tasks are not freed when the receiver goes away; dropping them
    // here releases their completion senders.
    fn drop(&mut self) {
        let discarded = self.receiver.try_iter().count();
        if discarded > 0 {
            log::debug!("owner dropped; discarded {discarded} pending tasks");
        }
    }
}
