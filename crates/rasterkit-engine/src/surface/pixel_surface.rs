use std::path::Path;

use anyhow::{Context, Result};

use crate::paint::Color;

/// Out-of-range coordinate policy for single-pixel access.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum BoundaryMode {
    /// Writes are dropped, reads return `Color::default()`.
    #[default]
    Reject,
    /// Coordinates saturate to the nearest edge pixel.
    Clamp,
    /// Coordinates wrap around (always non-negative).
    Wrap,
}

/// Row-major RGBA pixel buffer.
///
/// Invariant: `pixels.len() == width * height`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PixelSurface {
    width: i32,
    height: i32,
    pixels: Vec<Color>,
    boundary: BoundaryMode,
}

impl PixelSurface {
    /// Creates a surface filled with `Color::default()`. Negative sizes are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            pixels: vec![Color::default(); (width as usize) * (height as usize)],
            boundary: BoundaryMode::Reject,
        }
    }

    /// Wraps raw RGBA8 bytes (row-major, 4 bytes per pixel).
    pub fn from_rgba(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        anyhow::ensure!(
            bytes.len() == expected,
            "rgba buffer has {} bytes, expected {expected} for {width}x{height}",
            bytes.len()
        );
        let w = i32::try_from(width).context("surface width exceeds i32")?;
        let h = i32::try_from(height).context("surface height exceeds i32")?;
        Ok(Self {
            width: w,
            height: h,
            pixels: bytemuck::cast_slice::<u8, Color>(bytes).to_vec(),
            boundary: BoundaryMode::Reject,
        })
    }

    /// Decodes an image file into a surface.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("failed to decode image {}", path.display()))?
            .into_rgba8();
        let (w, h) = img.dimensions();
        log::debug!("loaded {} ({w}x{h})", path.display());
        Self::from_rgba(w, h, img.as_raw())
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn boundary_mode(&self) -> BoundaryMode {
        self.boundary
    }

    #[inline]
    pub fn set_boundary_mode(&mut self, mode: BoundaryMode) {
        self.boundary = mode;
    }

    /// Builder-style variant of [`PixelSurface::set_boundary_mode`].
    #[inline]
    pub fn with_boundary_mode(mut self, mode: BoundaryMode) -> Self {
        self.boundary = mode;
        self
    }

    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Raw RGBA8 bytes, ready for texture upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Resolves `(x, y)` to a buffer index under the current boundary mode.
    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.pixels.is_empty() {
            return None;
        }
        let (x, y) = match self.boundary {
            BoundaryMode::Reject => {
                if x < 0 || x >= self.width || y < 0 || y >= self.height {
                    return None;
                }
                (x, y)
            }
            BoundaryMode::Clamp => (x.clamp(0, self.width - 1), y.clamp(0, self.height - 1)),
            BoundaryMode::Wrap => (x.rem_euclid(self.width), y.rem_euclid(self.height)),
        };
        Some(y as usize * self.width as usize + x as usize)
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        self.index(x, y).map_or_else(Color::default, |i| self.pixels[i])
    }

    /// Fills every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Nearest-neighbor resample by independent factors, replacing `self`.
    ///
    /// The new size is `floor(width * sx) × floor(height * sy)`. Non-positive or
    /// non-finite factors produce an empty surface.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        let valid = |s: f32| s.is_finite() && s > 0.0;
        let (w, h) = if valid(sx) && valid(sy) {
            ((self.width as f32 * sx) as i32, (self.height as f32 * sy) as i32)
        } else {
            (0, 0)
        };

        let mut out = PixelSurface::new(w, h).with_boundary_mode(self.boundary);
        for y in 0..h {
            let oy = (y as f32 / sy).floor() as i32;
            for x in 0..w {
                let ox = (x as f32 / sx).floor() as i32;
                out.pixels[(y * w + x) as usize] = self.get_pixel(ox, oy);
            }
        }
        *self = out;
    }

    /// Resamples to exactly `width × height`.
    pub fn resize(&mut self, width: i32, height: i32) {
        if width <= 0 || height <= 0 || self.is_empty() {
            *self = PixelSurface::new(width, height).with_boundary_mode(self.boundary);
            return;
        }
        if width == self.width && height == self.height {
            return;
        }
        let sx = width as f32 / self.width as f32;
        let sy = height as f32 / self.height as f32;
        self.scale(sx, sy);
        // Float rounding may land one short; pad/crop to the requested size.
        if self.width != width || self.height != height {
            let src = std::mem::take(self);
            *self = PixelSurface::new(width, height).with_boundary_mode(src.boundary);
            for y in 0..height {
                for x in 0..width {
                    let c = src.get_pixel(x.min(src.width - 1), y.min(src.height - 1));
                    self.pixels[(y * width + x) as usize] = c;
                }
            }
        }
    }

    /// Blends every non-transparent pixel halfway toward `color`.
    pub fn tint(&mut self, color: Color) {
        for px in &mut self.pixels {
            if px.a != 0 {
                *px = px.lerp(color, 0.5);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [BoundaryMode; 3] = [BoundaryMode::Reject, BoundaryMode::Clamp, BoundaryMode::Wrap];

    fn checker(w: i32, h: i32) -> PixelSurface {
        let mut s = PixelSurface::new(w, h);
        for y in 0..h {
            for x in 0..w {
                s.set_pixel(x, y, Color::rgba(x as u8, y as u8, (x * y) as u8, 255));
            }
        }
        s
    }

    #[test]
    fn pixel_count_matches_dimensions() {
        let s = PixelSurface::new(7, 3);
        assert_eq!(s.pixels().len(), 21);
        assert_eq!(PixelSurface::new(-4, 3).pixels().len(), 0);
    }

    #[test]
    fn set_get_roundtrip_in_bounds_for_every_mode() {
        for mode in MODES {
            for (w, h) in [(1, 1), (3, 5), (16, 9)] {
                let mut s = PixelSurface::new(w, h).with_boundary_mode(mode);
                for y in 0..h {
                    for x in 0..w {
                        let c = Color::rgba(x as u8, y as u8, 7, 200);
                        s.set_pixel(x, y, c);
                        assert_eq!(s.get_pixel(x, y), c, "{mode:?} {w}x{h} at ({x},{y})");
                    }
                }
            }
        }
    }

    #[test]
    fn wrap_is_periodic() {
        let s = checker(5, 3).with_boundary_mode(BoundaryMode::Wrap);
        for k in [-3, -1, 1, 2] {
            for y in 0..3 {
                for x in 0..5 {
                    assert_eq!(s.get_pixel(x, y), s.get_pixel(x + k * 5, y + k * 3));
                }
            }
        }
    }

    #[test]
    fn wrap_write_lands_inside() {
        let mut s = PixelSurface::new(4, 4).with_boundary_mode(BoundaryMode::Wrap);
        s.set_pixel(-1, 5, Color::RED);
        assert_eq!(s.get_pixel(3, 1), Color::RED);
    }

    #[test]
    fn reject_ignores_writes_and_reads_default() {
        let mut s = PixelSurface::new(2, 2);
        s.fill(Color::WHITE);
        s.set_pixel(2, 0, Color::RED);
        s.set_pixel(-1, 0, Color::RED);
        assert!(s.pixels().iter().all(|&c| c == Color::WHITE));
        assert_eq!(s.get_pixel(5, 5), Color::default());
    }

    #[test]
    fn clamp_applies_to_reads_and_writes() {
        let mut s = PixelSurface::new(3, 3).with_boundary_mode(BoundaryMode::Clamp);
        s.set_pixel(10, -10, Color::GREEN);
        assert_eq!(s.get_pixel(2, 0), Color::GREEN);
        assert_eq!(s.get_pixel(99, -1), Color::GREEN);
    }

    #[test]
    fn empty_surface_never_panics() {
        for mode in MODES {
            let mut s = PixelSurface::new(0, 0).with_boundary_mode(mode);
            s.set_pixel(0, 0, Color::RED);
            assert_eq!(s.get_pixel(3, -2), Color::default());
        }
    }

    #[test]
    fn scale_up_then_down_restores_dimensions_and_corners() {
        let mut s = checker(6, 4);
        let original = s.clone();
        s.scale(2.0, 2.0);
        assert_eq!((s.width(), s.height()), (12, 8));
        s.scale(0.5, 0.5);
        assert_eq!((s.width(), s.height()), (6, 4));
        for (x, y) in [(0, 0), (5, 0), (0, 3), (5, 3)] {
            assert_eq!(s.get_pixel(x, y), original.get_pixel(x, y));
        }
    }

    #[test]
    fn resize_hits_exact_size() {
        let mut s = checker(3, 3);
        s.resize(10, 7);
        assert_eq!((s.width(), s.height()), (10, 7));
        assert_eq!(s.pixels().len(), 70);
        assert_eq!(s.get_pixel(0, 0), Color::rgba(0, 0, 0, 255));
    }

    #[test]
    fn tint_skips_transparent_pixels() {
        let mut s = PixelSurface::new(2, 1);
        s.set_pixel(0, 0, Color::TRANSPARENT);
        s.set_pixel(1, 0, Color::BLACK);
        s.tint(Color::WHITE);
        assert_eq!(s.get_pixel(0, 0), Color::TRANSPARENT);
        assert_eq!(s.get_pixel(1, 0), Color::rgba(127, 127, 127, 255));
    }

    #[test]
    fn from_rgba_validates_length() {
        assert!(PixelSurface::from_rgba(2, 2, &[0; 15]).is_err());
        let s = PixelSurface::from_rgba(1, 2, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(s.get_pixel(0, 1), Color::rgba(5, 6, 7, 8));
    }
}
