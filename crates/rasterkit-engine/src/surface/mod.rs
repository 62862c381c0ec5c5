//! CPU pixel surfaces.
//!
//! A [`PixelSurface`] is both the off-screen target the rasterizer writes into and
//! the storage for loaded images that get sampled by sprite and texture draws.

mod pixel_surface;
mod sheet;

pub use pixel_surface::{BoundaryMode, PixelSurface};
pub use sheet::SpriteSheet;
