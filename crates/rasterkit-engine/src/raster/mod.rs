//! Software rasterizer over a [`PixelSurface`].
//!
//! A `Rasterizer` is a short-lived borrow of one surface plus the per-write
//! state that the canvas owns (pixel mode and camera offset). Algorithms live in
//! the sibling modules as `impl Rasterizer` blocks:
//! - `line`: clipped Bresenham
//! - `rect`, `circle`, `triangle`: fills and outlines
//! - `sprite`: nearest-neighbor blits (scaled, flipped, transformed)
//! - `text`: built-in bitmap font
//!
//! Coordinates passed to the public API are in world space. The camera offset
//! is subtracted once, at the write, so clipping always happens in surface space.

mod circle;
mod font;
mod line;
mod rect;
mod shape;
mod sprite;
mod text;
mod triangle;

pub use font::{FONT_HEIGHT, FONT_WIDTH, GLYPH_ADVANCE, LINE_HEIGHT, TAB_ADVANCE};
pub use shape::{Shape, ShapeKind};
pub use text::{TextAlign, measure_text};
pub use triangle::Vertex;

use crate::coords::Vec2;
use crate::paint::{Color, PixelMode};
use crate::surface::{BoundaryMode, PixelSurface};

pub struct Rasterizer<'a> {
    surface: &'a mut PixelSurface,
    mode: PixelMode,
    offset: (i32, i32),
}

impl<'a> Rasterizer<'a> {
    pub fn new(surface: &'a mut PixelSurface) -> Self {
        Self {
            surface,
            mode: PixelMode::Normal,
            offset: (0, 0),
        }
    }

    #[inline]
    pub fn with_pixel_mode(mut self, mode: PixelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Camera offset, subtracted from every world-space write.
    #[inline]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = (offset.x as i32, offset.y as i32);
        self
    }

    #[inline]
    pub fn pixel_mode(&self) -> PixelMode {
        self.mode
    }

    #[inline]
    pub fn set_pixel_mode(&mut self, mode: PixelMode) {
        self.mode = mode;
    }

    #[inline]
    pub fn surface(&self) -> &PixelSurface {
        self.surface
    }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut PixelSurface {
        self.surface
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    #[inline]
    pub(crate) fn boundary(&self) -> BoundaryMode {
        self.surface.boundary_mode()
    }

    /// Runs `f` with the surface boundary mode temporarily replaced.
    pub fn with_boundary_mode<R>(&mut self, mode: BoundaryMode, f: impl FnOnce(&mut Self) -> R) -> R {
        let prev = self.surface.boundary_mode();
        self.surface.set_boundary_mode(mode);
        let out = f(self);
        self.surface.set_boundary_mode(prev);
        out
    }

    /// Fills the whole surface, ignoring the camera and pixel mode.
    pub fn clear(&mut self, color: Color) {
        self.surface.fill(color);
    }

    /// World-space write: applies the pixel mode and the camera offset.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let (x, y) = self.to_surface(x, y);
        self.put(x, y, color);
    }

    /// World-space read.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        let (x, y) = self.to_surface(x, y);
        self.surface.get_pixel(x, y)
    }

    #[inline]
    pub(crate) fn to_surface(&self, x: i32, y: i32) -> (i32, i32) {
        (x.saturating_sub(self.offset.0), y.saturating_sub(self.offset.1))
    }

    /// Surface-space write.
    #[inline]
    pub(crate) fn put(&mut self, x: i32, y: i32, color: Color) {
        if self.mode.accepts(color) {
            self.surface.set_pixel(x, y, color);
        }
    }

    /// Surface-space horizontal span `[sx, ex)` on row `y`.
    pub(crate) fn hspan(&mut self, mut sx: i32, mut ex: i32, y: i32, color: Color) {
        if self.boundary() == BoundaryMode::Reject {
            if y < 0 || y >= self.height() {
                return;
            }
            sx = sx.max(0);
            ex = ex.min(self.width());
        }
        for x in sx..ex {
            self.put(x, y, color);
        }
    }
}

/// Saturating narrow for coordinates computed in `i64`.
#[inline]
pub(crate) fn narrow(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[cfg(test)]
pub(crate) fn count_color(surface: &PixelSurface, color: Color) -> usize {
    surface.pixels().iter().filter(|&&c| c == color).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_shifts_writes() {
        let mut s = PixelSurface::new(4, 4);
        let mut r = Rasterizer::new(&mut s).with_offset(Vec2::new(1.0, 2.0));
        r.set_pixel(2, 3, Color::RED);
        assert_eq!(r.get_pixel(2, 3), Color::RED);
        assert_eq!(s.get_pixel(1, 1), Color::RED);
    }

    #[test]
    fn mask_mode_skips_transparent() {
        let mut s = PixelSurface::new(2, 1);
        let mut r = Rasterizer::new(&mut s).with_pixel_mode(PixelMode::Mask);
        r.set_pixel(0, 0, Color::TRANSPARENT);
        r.set_pixel(1, 0, Color::rgba(1, 2, 3, 1));
        assert_eq!(s.get_pixel(0, 0), Color::default());
        assert_eq!(s.get_pixel(1, 0), Color::rgba(1, 2, 3, 1));
    }

    #[test]
    fn boundary_override_is_restored() {
        let mut s = PixelSurface::new(2, 2);
        let mut r = Rasterizer::new(&mut s);
        r.with_boundary_mode(BoundaryMode::Wrap, |r| r.set_pixel(3, 3, Color::BLUE));
        assert_eq!(r.boundary(), BoundaryMode::Reject);
        assert_eq!(s.get_pixel(1, 1), Color::BLUE);
    }

    #[test]
    fn hspan_clips_under_reject() {
        let mut s = PixelSurface::new(4, 2);
        let mut r = Rasterizer::new(&mut s);
        r.hspan(-10, 10, 1, Color::WHITE);
        r.hspan(0, 4, 5, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 4);
    }

    #[test]
    fn extreme_coordinates_saturate_against_offset() {
        let mut s = PixelSurface::new(4, 4);
        let mut r = Rasterizer::new(&mut s).with_offset(Vec2::new(100.0, -100.0));
        r.set_pixel(i32::MIN, i32::MAX, Color::WHITE);
        assert_eq!(r.get_pixel(i32::MIN + 5, i32::MAX), Color::default());
        assert_eq!(r.to_surface(i32::MIN, i32::MAX), (i32::MIN, i32::MAX));
        assert_eq!(count_color(&s, Color::WHITE), 0);
    }

    #[test]
    fn narrow_saturates() {
        assert_eq!(narrow(i64::MAX), i32::MAX);
        assert_eq!(narrow(i32::MIN as i64 - 1), i32::MIN);
        assert_eq!(narrow(-7), -7);
    }
}
