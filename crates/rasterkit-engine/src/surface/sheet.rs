use crate::coords::Rect;

use super::PixelSurface;

/// A surface split into a grid of equally sized cells (animation frames, tiles).
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    pub surface: PixelSurface,
    pub cell_width: i32,
    pub cell_height: i32,
}

impl SpriteSheet {
    pub fn new(surface: PixelSurface, cell_width: i32, cell_height: i32) -> Self {
        Self { surface, cell_width, cell_height }
    }

    /// Number of whole cells along each axis.
    pub fn grid_size(&self) -> (i32, i32) {
        if self.cell_width <= 0 || self.cell_height <= 0 {
            return (0, 0);
        }
        (self.surface.width() / self.cell_width, self.surface.height() / self.cell_height)
    }

    /// Source rect of cell `(cx, cy)` in surface pixels.
    pub fn cell_rect(&self, cx: i32, cy: i32) -> Rect {
        Rect::new(
            (cx * self.cell_width) as f32,
            (cy * self.cell_height) as f32,
            self.cell_width as f32,
            self.cell_height as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_rect_and_grid() {
        let sheet = SpriteSheet::new(PixelSurface::new(64, 32), 16, 16);
        assert_eq!(sheet.grid_size(), (4, 2));
        assert_eq!(sheet.cell_rect(2, 1), Rect::new(32.0, 16.0, 16.0, 16.0));
    }
}
