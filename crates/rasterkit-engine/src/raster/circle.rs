use super::{Rasterizer, narrow};
use crate::paint::Color;
use crate::surface::BoundaryMode;

impl Rasterizer<'_> {
    fn misses_surface(&self, cx: i64, cy: i64, radius: i64) -> bool {
        self.boundary() == BoundaryMode::Reject
            && (radius < 0
                || cx - radius > self.width() as i64
                || cx + radius < 0
                || cy - radius > self.height() as i64
                || cy + radius < 0)
    }

    /// Filled circle built from horizontal spans.
    ///
    /// When every surface corner lies inside the circle the whole surface is filled.
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        let (cx, cy) = self.to_surface(cx, cy);
        let (cx, cy, radius) = (cx as i64, cy as i64, radius as i64);
        let (w, h) = (self.width(), self.height());

        let inside = |x: i32, y: i32| {
            let dx = (x as i64 - cx) as i128;
            let dy = (y as i64 - cy) as i128;
            dx * dx + dy * dy <= (radius * radius) as i128
        };
        if radius >= 0 && inside(0, 0) && inside(w, 0) && inside(0, h) && inside(w, h) {
            for y in 0..h {
                self.hspan(0, w, y, color);
            }
            return;
        }
        if self.misses_surface(cx, cy, radius) {
            return;
        }

        let span = |r: &mut Self, x: i64, y: i64| {
            r.hspan(narrow(cx - x), narrow(cx + x), narrow(cy + y), color);
            r.hspan(narrow(cx - x), narrow(cx + x), narrow(cy - y), color);
        };

        let mut x = radius;
        let mut y = 0;
        let mut dx = 1 - radius * 2;
        let mut dy = 0;
        let mut err = 0;
        while x >= y {
            span(self, x, y);
            span(self, y, x);

            y += 1;
            err += dy;
            dy += 2;
            if err * 2 + dx > 0 {
                x -= 1;
                err += dx;
                dx += 2;
            }
        }
    }

    /// One-pixel circle outline using 8-way symmetry.
    pub fn circle_outline(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        let (cx, cy) = self.to_surface(cx, cy);
        let (cx, cy, radius) = (cx as i64, cy as i64, radius as i64);
        if self.misses_surface(cx, cy, radius) {
            return;
        }

        let plot = |r: &mut Self, x: i64, y: i64| {
            for (px, py) in [(x, y), (-x, y), (x, -y), (-x, -y), (y, x), (-y, x), (y, -x), (-y, -x)] {
                r.put(narrow(cx + px), narrow(cy + py), color);
            }
        };

        let mut x = 0;
        let mut y = radius;
        let mut d1 = 1 - radius;
        let mut c1 = 3;
        let mut c2 = 5 - 2 * radius;
        plot(self, x, y);
        while x < y {
            if d1 < 0 {
                d1 += c1;
                c2 += 2;
            } else {
                d1 += c2;
                c2 += 4;
                y -= 1;
            }
            c1 += 2;
            x += 1;
            plot(self, x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::count_color;
    use crate::surface::PixelSurface;

    #[test]
    fn covering_circle_fills_surface() {
        let mut s = PixelSurface::new(6, 4);
        Rasterizer::new(&mut s).fill_circle(3, 2, 100, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 24);
    }

    #[test]
    fn filled_circle_stays_near_radius() {
        let mut s = PixelSurface::new(32, 32);
        Rasterizer::new(&mut s).fill_circle(16, 16, 6, Color::WHITE);
        assert_eq!(s.get_pixel(16, 16), Color::WHITE);
        for y in 0..32 {
            for x in 0..32 {
                if s.get_pixel(x, y) == Color::WHITE {
                    let (dx, dy) = (x - 16, y - 16);
                    assert!(dx * dx + dy * dy <= 7 * 7, "({x}, {y}) outside radius");
                }
            }
        }
    }

    #[test]
    fn negative_radius_draws_nothing() {
        let mut s = PixelSurface::new(8, 8);
        let mut r = Rasterizer::new(&mut s);
        r.fill_circle(4, 4, -3, Color::WHITE);
        r.circle_outline(4, 4, -3, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 0);
    }

    #[test]
    fn off_surface_outline_is_skipped() {
        let mut s = PixelSurface::new(8, 8);
        Rasterizer::new(&mut s).circle_outline(-20, 4, 5, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 0);
    }

    #[test]
    fn outline_hits_axis_extremes() {
        let mut s = PixelSurface::new(16, 16);
        Rasterizer::new(&mut s).circle_outline(8, 8, 5, Color::WHITE);
        for (x, y) in [(13, 8), (3, 8), (8, 13), (8, 3)] {
            assert_eq!(s.get_pixel(x, y), Color::WHITE);
        }
        assert_eq!(s.get_pixel(8, 8), Color::default());
    }

    #[test]
    fn far_away_huge_circles_do_not_overflow() {
        let mut s = PixelSurface::new(8, 8);
        let mut r = Rasterizer::new(&mut s);
        r.fill_circle(i32::MIN, 0, i32::MAX, Color::WHITE);
        r.circle_outline(i32::MIN, i32::MIN, i32::MAX, Color::WHITE);
        assert_eq!(count_color(r.surface(), Color::WHITE), 0);

        r.fill_circle(4, 4, i32::MAX, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 64);
    }

    #[test]
    fn wrapped_fill_matches_shifted_fill() {
        let mut a = PixelSurface::new(16, 16).with_boundary_mode(BoundaryMode::Wrap);
        let mut b = PixelSurface::new(16, 16);
        Rasterizer::new(&mut a).fill_circle(0, 0, 3, Color::WHITE);
        Rasterizer::new(&mut b).fill_circle(8, 8, 3, Color::WHITE);
        assert!(count_color(&b, Color::WHITE) > 0);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(a.get_pixel(x, y), b.get_pixel((x + 8) % 16, (y + 8) % 16), "({x}, {y})");
            }
        }
    }

    #[test]
    fn clamped_fill_collapses_onto_edge() {
        let mut s = PixelSurface::new(8, 8).with_boundary_mode(BoundaryMode::Clamp);
        Rasterizer::new(&mut s).fill_circle(-10, 4, 3, Color::WHITE);
        assert_eq!(s.get_pixel(0, 4), Color::WHITE);
        for y in 0..8 {
            for x in 1..8 {
                assert_eq!(s.get_pixel(x, y), Color::default());
            }
        }
    }
}
