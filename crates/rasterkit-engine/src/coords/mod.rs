//! Coordinate and geometry types shared by the rasterizer and the batch renderers.
//!
//! Canonical CPU space:
//! - pixels
//! - origin top-left
//! - +X right, +Y down
//!
//! Batch renderers convert to NDC on the CPU right before appending vertices.

mod flip;
mod rect;
mod transform;
mod vec2;
mod viewport;

pub use flip::Flip;
pub use rect::Rect;
pub use transform::Transform;
pub use vec2::Vec2;
pub use viewport::Viewport;
