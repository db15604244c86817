//! Owner-thread task dispatch.
//!
//! Graphics contexts are bound to the thread that created them. Every call that
//! touches the window, the surface or GPU objects must therefore happen on one
//! designated thread (the *owner thread*). This module funnels work from any
//! thread onto that owner:
//!
//! - [`channel`] creates a bounded FIFO queue with a single [`Owner`] (consumer)
//!   and any number of [`Dispatcher`] handles (producers).
//! - [`Dispatcher::submit_and_wait`] enqueues a task and blocks until the owner
//!   has executed it. A full queue blocks the submitter (back-pressure).
//! - [`Owner::run`] drains the queue on the owner thread and stops once the
//!   [`QuitSignal`] is raised.
//! - [`FrameLoop`] resubmits a per-frame task after each completed frame until
//!   quit is raised.
//!
//! Tasks receive `&mut S`, the state that lives on the owner thread. `S` does not
//! need to be `Send`; only the task closures cross threads.

mod error;
mod frame_loop;
mod owner;
mod queue;
mod quit;

pub use error::DispatchError;
pub use frame_loop::FrameLoop;
pub use owner::{LoopExit, Owner};
pub use queue::{channel, Dispatcher, Task, DEFAULT_QUEUE_CAPACITY};
pub use quit::QuitSignal;
