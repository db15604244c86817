//! The wgpu device and the window surface it presents to.
//!
//! A [`Gpu`] plays the part of a graphics context made current on one thread:
//! it is created, used and dropped on the owner thread only.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::{GpuInit, SurfacePrefs};
