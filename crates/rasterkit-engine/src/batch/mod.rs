//! Batch renderers that accumulate GPU geometry and submit it in as few
//! draws as the texture-unit and capacity limits allow.
//!
//! - [`SpriteBatch`]: textured quads, one texture unit per quad
//! - [`GeometryBatch`]: solid-color lines, triangles and quads

mod common;
mod geometry;
mod sprite;

pub use common::{GEO_BATCH_MAX_VERTICES, TEXTURE_SLOTS};
pub use geometry::{GeoVertex, GeometryBatch, PrimitiveKind};
pub use sprite::{SpriteBatch, SpriteVertex};
