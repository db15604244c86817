//! GPU rendering subsystem.
//!
//! Scene setup builds a [`QuadScene`] (vertex buffer, program, texture) once;
//! [`render_frame`] draws it every frame. Everything here runs on the owner
//! thread.
//!
//! Convention:
//! - geometry is given directly in NDC (`[-1, 1]²`).
//! - shaders are WGSL; see [`shader`].

mod ctx;
mod frame;
mod quad;
pub mod shader;
mod texture;

#[cfg(test)]
pub(crate) mod test_gpu;

pub use ctx::{RenderCtx, RenderTarget};
pub use frame::{clear_for_surface, encode_frame, render_frame, FrameStatus};
pub use quad::{QuadScene, QuadVertex, DEPTH_FORMAT, QUAD_VERTICES};
pub use shader::{ShaderError, ShaderSources, ShaderStage};
pub use texture::{GpuTexture, TextureImage};
