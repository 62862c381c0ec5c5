use super::Rasterizer;
use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::surface::BoundaryMode;

impl Rasterizer<'_> {
    /// Fills the half-open rect `[sx, ex) × [sy, ey)`. Corners may be given in any order.
    ///
    /// Under `Reject` the rect is clipped to the surface; otherwise its extent is
    /// capped at the surface size and every write goes through the boundary policy.
    pub fn fill_rect(&mut self, sx: i32, sy: i32, ex: i32, ey: i32, color: Color) {
        let (sx, ex) = (sx.min(ex), sx.max(ex));
        let (sy, ey) = (sy.min(ey), sy.max(ey));
        let (sx, sy) = self.to_surface(sx, sy);
        let (ex, ey) = self.to_surface(ex, ey);

        let (sx, sy, ex, ey) = if self.boundary() == BoundaryMode::Reject {
            (sx.max(0), sy.max(0), ex.min(self.width()), ey.min(self.height()))
        } else {
            let w = (ex - sx).min(self.width());
            let h = (ey - sy).min(self.height());
            (sx, sy, sx + w, sy + h)
        };

        for y in sy..ey {
            for x in sx..ex {
                self.put(x, y, color);
            }
        }
    }

    /// Fills a float rect, truncating its edges to pixels.
    pub fn fill(&mut self, rect: Rect, color: Color) {
        self.fill_rect(
            rect.left() as i32,
            rect.top() as i32,
            rect.right() as i32,
            rect.bottom() as i32,
            color,
        );
    }

    pub fn rect_outline(&mut self, sx: i32, sy: i32, ex: i32, ey: i32, color: Color) {
        self.line(sx, sy, sx, ey, color);
        self.line(sx, sy, ex, sy, color);
        self.line(ex, ey, sx, ey, color);
        self.line(ex, ey, ex, sy, color);
    }

    /// Outline of the rect rotated by `rotation` radians about its center.
    pub fn rotated_rect_outline(&mut self, sx: i32, sy: i32, ex: i32, ey: i32, rotation: f32, color: Color) {
        if rotation == 0.0 {
            self.rect_outline(sx, sy, ex, ey, color);
            return;
        }

        let center = Vec2::new((sx + ex) as f32 * 0.5, (sy + ey) as f32 * 0.5);
        let corner = |x: i32, y: i32| {
            let p = (Vec2::new(x as f32, y as f32) - center).rotated(rotation) + center;
            (p.x.round() as i32, p.y.round() as i32)
        };
        let p1 = corner(sx, sy);
        let p2 = corner(sx, ey);
        let p3 = corner(ex, ey);
        let p4 = corner(ex, sy);

        self.line(p1.0, p1.1, p2.0, p2.1, color);
        self.line(p1.0, p1.1, p4.0, p4.1, color);
        self.line(p3.0, p3.1, p2.0, p2.1, color);
        self.line(p3.0, p3.1, p4.0, p4.1, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::count_color;
    use crate::surface::PixelSurface;

    #[test]
    fn fill_rect_is_half_open_and_order_independent() {
        let mut s = PixelSurface::new(10, 10);
        Rasterizer::new(&mut s).fill_rect(6, 5, 2, 1, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 4 * 4);
        assert_eq!(s.get_pixel(2, 1), Color::WHITE);
        assert_eq!(s.get_pixel(6, 5), Color::default());
    }

    #[test]
    fn fill_rect_clips_under_reject() {
        let mut s = PixelSurface::new(4, 4);
        Rasterizer::new(&mut s).fill_rect(-100, -100, 2, 100, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 2 * 4);
    }

    #[test]
    fn fill_rect_wraps_capped_extent() {
        let mut s = PixelSurface::new(4, 4).with_boundary_mode(BoundaryMode::Wrap);
        Rasterizer::new(&mut s).fill_rect(2, 0, 100, 1, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 4);
    }

    #[test]
    fn outline_traces_the_border() {
        let mut s = PixelSurface::new(8, 8);
        Rasterizer::new(&mut s).rect_outline(1, 1, 5, 4, Color::WHITE);
        // perimeter of a 5×4 box
        assert_eq!(count_color(&s, Color::WHITE), 2 * 5 + 2 * 2);
        assert_eq!(s.get_pixel(3, 2), Color::default());
    }

    #[test]
    fn half_turn_outline_matches_unrotated() {
        let mut a = PixelSurface::new(12, 12);
        let mut b = PixelSurface::new(12, 12);
        Rasterizer::new(&mut a).rect_outline(2, 3, 8, 9, Color::WHITE);
        Rasterizer::new(&mut b).rotated_rect_outline(2, 3, 8, 9, std::f32::consts::PI, Color::WHITE);
        assert_eq!(a, b);
    }
}
