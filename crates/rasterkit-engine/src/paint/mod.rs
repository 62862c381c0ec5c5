//! Paint model shared by the rasterizer, surfaces, and batch renderers.
//!
//! Scope:
//! - 8-bit RGBA color with saturating arithmetic
//! - per-write pixel policy (`PixelMode`)

pub mod color;

pub use color::Color;

/// Per-write pixel policy applied by the rasterizer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PixelMode {
    /// Every write lands.
    #[default]
    Normal,
    /// Writes whose source alpha is exactly 0 are skipped (chroma-keyed sprites).
    Mask,
}

impl PixelMode {
    /// Returns `true` if a write of `color` should reach the surface.
    #[inline]
    pub fn accepts(self, color: Color) -> bool {
        match self {
            PixelMode::Normal => true,
            PixelMode::Mask => color.a != 0,
        }
    }
}
