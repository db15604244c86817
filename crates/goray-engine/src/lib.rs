//! goray engine crate.
//!
//! Platform window, GPU device and render objects for a single textured quad,
//! plus the dispatch machinery that keeps every graphics call on one owner
//! thread while work is produced from others.

pub mod device;
pub mod dispatch;
pub mod window;
pub mod time;

pub mod logging;
pub mod render;
