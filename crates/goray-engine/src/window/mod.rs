//! Window + platform event pump.
//!
//! Owns the `winit` EventLoop and Window on the owner thread and wires them to
//! the GPU layer. Events are pumped on demand (once per frame) instead of
//! handing control of the thread to winit.

mod runtime;

pub use runtime::{PlatformWindow, WindowConfig};
