//! The render step executed once per frame on the owner thread.

use anyhow::Result;
use goray_engine::render::{render_frame, FrameStatus};

use crate::app::Viewer;

/// Draws one frame, presents it, pumps window events and raises quit if the
/// window was asked to close. Rescheduling is left to the frame loop.
pub fn render_step(viewer: &mut Viewer) -> Result<()> {
    let time = viewer.clock.tick();
    if let Some(fps) = time.fps {
        log::debug!(
            "{fps:.1} fps (frame {}, last frame {:.2} ms)",
            time.frame_index,
            time.dt * 1000.0
        );
    }

    if viewer.scene.is_none() && !viewer.warned_missing_scene {
        log::warn!("frame {} drawn before scene setup; clearing only", time.frame_index);
        viewer.warned_missing_scene = true;
    }

    viewer.window.pre_present_notify();

    let clear = viewer.clear_color;
    let scene = viewer.scene.as_mut();
    let status = viewer
        .window
        .with_gpu(|gpu| render_frame(gpu, scene, clear))??;

    if status == FrameStatus::Skipped {
        log::trace!("frame {} skipped", time.frame_index);
    }

    viewer.window.poll_events();
    if viewer.window.close_requested() {
        log::info!("window closing after {} frames", time.frame_index + 1);
        viewer.quit.raise();
    }

    Ok(())
}
