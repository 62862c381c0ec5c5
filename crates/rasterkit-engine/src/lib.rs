//! rasterkit engine crate.
//!
//! Software rasterizer over CPU pixel surfaces, composited through GPU layers,
//! plus two batch renderers for high-volume sprites and colored primitives.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod surface;
pub mod raster;
pub mod gpu;
pub mod canvas;
pub mod batch;
