use super::{Rasterizer, narrow};
use crate::paint::Color;
use crate::surface::BoundaryMode;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

// Each pass moves one endpoint onto a clip edge; more than this means rounding ping-pong.
const MAX_CLIP_PASSES: usize = 8;

fn region(x: i64, y: i64, w: i64, h: i64) -> u8 {
    let mut code = INSIDE;
    if x < 0 {
        code |= LEFT;
    } else if x > w {
        code |= RIGHT;
    }
    if y < 0 {
        code |= TOP;
    } else if y > h {
        code |= BOTTOM;
    }
    code
}

/// Cohen–Sutherland clip of a segment against `[0, w] × [0, h]`.
///
/// Returns `None` when the segment lies entirely outside.
pub(crate) fn clip_line(
    (sx, sy): (i32, i32),
    (ex, ey): (i32, i32),
    w: i32,
    h: i32,
) -> Option<((i32, i32), (i32, i32))> {
    let (w, h) = (w as i64, h as i64);
    let (mut x0, mut y0, mut x1, mut y1) = (sx as i64, sy as i64, ex as i64, ey as i64);
    let mut c0 = region(x0, y0, w, h);
    let mut c1 = region(x1, y1, w, h);

    for _ in 0..MAX_CLIP_PASSES {
        if c0 | c1 == INSIDE {
            return Some(((x0 as i32, y0 as i32), (x1 as i32, y1 as i32)));
        }
        if c0 & c1 != INSIDE {
            return None;
        }

        let code = if c0 != INSIDE { c0 } else { c1 };
        let (x, y) = if code & BOTTOM != 0 {
            (x0 + (x1 - x0) * (h - y0) / (y1 - y0), h)
        } else if code & TOP != 0 {
            (x0 + (x1 - x0) * (0 - y0) / (y1 - y0), 0)
        } else if code & RIGHT != 0 {
            (w, y0 + (y1 - y0) * (w - x0) / (x1 - x0))
        } else {
            (0, y0 + (y1 - y0) * (0 - x0) / (x1 - x0))
        };

        if code == c0 {
            (x0, y0) = (x, y);
            c0 = region(x0, y0, w, h);
        } else {
            (x1, y1) = (x, y);
            c1 = region(x1, y1, w, h);
        }
    }
    None
}

/// Moves a segment by whole surface periods so its start lies on the surface.
///
/// An end still more than one period away from the start is wrapped on its own,
/// which keeps the walk bounded.
fn wrap_segment(
    (sx, sy): (i32, i32),
    (ex, ey): (i32, i32),
    w: i32,
    h: i32,
) -> ((i64, i64), (i64, i64)) {
    let (w, h) = (w as i64, h as i64);
    let fold = |s: i64, e: i64, period: i64| {
        let start = s.rem_euclid(period);
        let end = e + (start - s);
        if (end - start).abs() >= period {
            (start, e.rem_euclid(period))
        } else {
            (start, end)
        }
    };
    let (sx, ex) = fold(sx as i64, ex as i64, w);
    let (sy, ey) = fold(sy as i64, ey as i64, h);
    ((sx, sy), (ex, ey))
}

impl Rasterizer<'_> {
    /// Bresenham line between two world-space points, endpoints inclusive.
    ///
    /// Clipped to the surface unless the boundary mode is `Wrap`, where the
    /// segment is first moved onto the surface by whole periods.
    pub fn line(&mut self, sx: i32, sy: i32, ex: i32, ey: i32, color: Color) {
        let start = self.to_surface(sx, sy);
        let end = self.to_surface(ex, ey);
        let (w, h) = (self.width(), self.height());

        let ((sx, sy), (ex, ey)) = if self.boundary() == BoundaryMode::Wrap {
            if w <= 0 || h <= 0 {
                return;
            }
            wrap_segment(start, end, w, h)
        } else {
            match clip_line(start, end, w, h) {
                Some(((sx, sy), (ex, ey))) => ((sx as i64, sy as i64), (ex as i64, ey as i64)),
                None => return,
            }
        };

        let dx = ex - sx;
        let dy = ey - sy;
        let (adx, ady) = (dx.abs(), dy.abs());
        let step_x = dx.signum();
        let step_y = dy.signum();

        let (mut x, mut y) = (sx, sy);
        self.put(narrow(x), narrow(y), color);

        if adx > ady {
            let mut d = 2 * ady - adx;
            for _ in 0..adx {
                x += step_x;
                if d < 0 {
                    d += 2 * ady;
                } else {
                    y += step_y;
                    d += 2 * (ady - adx);
                }
                self.put(narrow(x), narrow(y), color);
            }
        } else {
            let mut d = 2 * adx - ady;
            for _ in 0..ady {
                y += step_y;
                if d < 0 {
                    d += 2 * adx;
                } else {
                    x += step_x;
                    d += 2 * (adx - ady);
                }
                self.put(narrow(x), narrow(y), color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::count_color;
    use crate::coords::Vec2;
    use crate::surface::PixelSurface;

    #[test]
    fn trivially_rejected_line_draws_nothing() {
        let mut s = PixelSurface::new(10, 10);
        Rasterizer::new(&mut s).line(-5, -5, -1, -20, Color::WHITE);
        Rasterizer::new(&mut s).line(11, 3, 30, 8, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 0);
    }

    #[test]
    fn horizontal_line_plots_both_endpoints() {
        let mut s = PixelSurface::new(10, 3);
        Rasterizer::new(&mut s).line(2, 1, 6, 1, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 5);
        assert_eq!(s.get_pixel(2, 1), Color::WHITE);
        assert_eq!(s.get_pixel(6, 1), Color::WHITE);
    }

    #[test]
    fn diagonal_line_is_symmetric_in_direction() {
        let mut a = PixelSurface::new(8, 8);
        let mut b = PixelSurface::new(8, 8);
        Rasterizer::new(&mut a).line(0, 0, 7, 7, Color::WHITE);
        Rasterizer::new(&mut b).line(7, 7, 0, 0, Color::WHITE);
        assert_eq!(a, b);
        assert_eq!(count_color(&a, Color::WHITE), 8);
    }

    #[test]
    fn crossing_line_is_clipped() {
        let mut s = PixelSurface::new(10, 10);
        Rasterizer::new(&mut s).line(-100, 5, 100, 5, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 10);
    }

    #[test]
    fn clip_keeps_inside_segment() {
        assert_eq!(clip_line((1, 1), (4, 4), 10, 10), Some(((1, 1), (4, 4))));
        assert_eq!(clip_line((-10, 0), (-1, 9), 10, 10), None);
    }

    #[test]
    fn wrap_mode_skips_clipping() {
        let mut s = PixelSurface::new(4, 4).with_boundary_mode(BoundaryMode::Wrap);
        Rasterizer::new(&mut s).line(4, 1, 7, 1, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 4);
    }

    #[test]
    fn wrap_mode_handles_full_range_endpoints() {
        let mut s = PixelSurface::new(10, 10).with_boundary_mode(BoundaryMode::Wrap);
        Rasterizer::new(&mut s).line(i32::MIN, 0, i32::MAX, 0, Color::WHITE);
        assert!(count_color(&s, Color::WHITE) > 0);
        for y in 1..10 {
            for x in 0..10 {
                assert_eq!(s.get_pixel(x, y), Color::default());
            }
        }
    }

    #[test]
    fn offset_near_min_is_clipped_without_overflow() {
        let mut s = PixelSurface::new(10, 10);
        Rasterizer::new(&mut s)
            .with_offset(Vec2::new(100.0, 0.0))
            .line(i32::MIN + 5, 0, 5, 5, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 0);
    }

    #[test]
    fn wrapped_line_keeps_its_shape() {
        let mut a = PixelSurface::new(8, 8).with_boundary_mode(BoundaryMode::Wrap);
        let mut b = PixelSurface::new(8, 8).with_boundary_mode(BoundaryMode::Wrap);
        Rasterizer::new(&mut a).line(6, 2, 10, 5, Color::WHITE);
        Rasterizer::new(&mut b).line(-2, -6, 2, -3, Color::WHITE);
        assert_eq!(a.pixels(), b.pixels());
        assert_eq!(count_color(&a, Color::WHITE), 5);
        assert_eq!(a.get_pixel(1, 2), Color::default());
        assert_eq!(a.get_pixel(2, 5), Color::WHITE);
    }

    #[test]
    fn clip_handles_extreme_segments() {
        assert_eq!(clip_line((i32::MIN, 5), (i32::MAX, 5), 10, 10), Some(((0, 5), (10, 5))));
    }
}
