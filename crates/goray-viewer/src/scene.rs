//! Scene setup: the one-shot task that creates the render objects.

use anyhow::{Context, Result};
use goray_engine::render::{QuadScene, ShaderSources, TextureImage};

use crate::app::Viewer;

/// Creates the quad's GPU objects and stores them in the viewer.
///
/// Runs on the owner thread. A second call keeps the existing scene.
pub fn setup_scene(viewer: &mut Viewer, image: &TextureImage, shaders: &ShaderSources) -> Result<()> {
    if viewer.scene.is_some() {
        log::warn!("scene already set up; ignoring repeated setup");
        return Ok(());
    }

    let gpu = viewer.window.gpu().context("window has no GPU surface")?;
    let scene = QuadScene::setup(&gpu.render_ctx(), image, shaders).context("scene setup failed")?;

    viewer.scene = Some(scene);
    Ok(())
}
