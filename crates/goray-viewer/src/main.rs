//! `goray`: opens a window and redraws a textured quad every frame, with all
//! graphics work funneled through the main thread.

mod app;
mod config;
mod frame;
mod scene;

use goray_engine::logging::init_logging;

use crate::config::ViewerConfig;

fn main() -> anyhow::Result<()> {
    let config = ViewerConfig::default();
    init_logging(config.logging.clone());

    app::run(config)
}
