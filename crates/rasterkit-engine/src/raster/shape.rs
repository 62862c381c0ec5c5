use super::Rasterizer;
use crate::coords::Vec2;
use crate::paint::Color;
use crate::surface::BoundaryMode;

/// Geometry of a [`Shape`], relative to its position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ShapeKind {
    /// Rect centered on the position.
    Rect { size: Vec2 },
    Circle { radius: f32 },
    /// Corners as offsets from the position, before rotation.
    Triangle { vertices: [Vec2; 3] },
}

/// A filled primitive with a position, color and accumulated rotation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Shape {
    pub position: Vec2,
    pub color: Color,
    /// Radians. Circles ignore it.
    pub angle: f32,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn rect(center: Vec2, size: Vec2, color: Color) -> Self {
        Self::new(center, color, ShapeKind::Rect { size })
    }

    pub fn circle(center: Vec2, radius: f32, color: Color) -> Self {
        Self::new(center, color, ShapeKind::Circle { radius })
    }

    pub fn triangle(position: Vec2, vertices: [Vec2; 3], color: Color) -> Self {
        Self::new(position, color, ShapeKind::Triangle { vertices })
    }

    fn new(position: Vec2, color: Color, kind: ShapeKind) -> Self {
        Self { position, color, angle: 0.0, kind }
    }

    /// Adds `delta` radians to the current rotation.
    pub fn rotate(&mut self, delta: f32) {
        self.angle += delta;
    }

    pub fn set_rotation(&mut self, angle: f32) {
        self.angle = angle;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Fills the shape using the surface's current boundary mode.
    pub fn draw(&self, r: &mut Rasterizer<'_>) {
        let p = self.position;
        match self.kind {
            ShapeKind::Rect { size } => {
                let half = size * 0.5;
                if self.angle == 0.0 {
                    let (sx, sy) = ((p.x - half.x) as i32, (p.y - half.y) as i32);
                    let (ex, ey) = ((p.x + half.x) as i32, (p.y + half.y) as i32);
                    r.fill_rect(sx, sy, ex, ey, self.color);
                    return;
                }
                let at = |x: f32, y: f32| pixel(Vec2::new(x, y).rotated(self.angle) + p);
                let tl = at(-half.x, -half.y);
                let tr = at(half.x, -half.y);
                let bl = at(-half.x, half.y);
                let br = at(half.x, half.y);
                r.fill_triangle(tl, tr, bl, self.color);
                r.fill_triangle(tr, bl, br, self.color);
            }
            ShapeKind::Circle { radius } => {
                r.fill_circle(p.x as i32, p.y as i32, radius as i32, self.color);
            }
            ShapeKind::Triangle { vertices } => {
                let [a, b, c] = vertices.map(|v| pixel(v.rotated(self.angle) + p));
                r.fill_triangle(a, b, c, self.color);
            }
        }
    }

    /// Fills the shape with `mode` in effect, restoring the previous mode afterwards.
    pub fn draw_with(&self, r: &mut Rasterizer<'_>, mode: BoundaryMode) {
        r.with_boundary_mode(mode, |r| self.draw(r));
    }
}

#[inline]
fn pixel(v: Vec2) -> (i32, i32) {
    (v.x as i32, v.y as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::count_color;
    use crate::surface::PixelSurface;

    #[test]
    fn axis_aligned_rect_fills_its_box() {
        let mut s = PixelSurface::new(16, 16);
        Shape::rect(Vec2::new(8.0, 8.0), Vec2::new(4.0, 6.0), Color::WHITE).draw(&mut Rasterizer::new(&mut s));
        assert_eq!(count_color(&s, Color::WHITE), 24);
        assert_eq!(s.get_pixel(6, 5), Color::WHITE);
    }

    #[test]
    fn rotated_rect_covers_its_center() {
        let mut s = PixelSurface::new(32, 32);
        let mut shape = Shape::rect(Vec2::new(16.0, 16.0), Vec2::new(10.0, 10.0), Color::WHITE);
        shape.rotate(0.4);
        shape.draw(&mut Rasterizer::new(&mut s));
        assert_eq!(s.get_pixel(16, 16), Color::WHITE);
        assert_eq!(s.get_pixel(0, 0), Color::default());
    }

    #[test]
    fn translate_moves_circle() {
        let mut s = PixelSurface::new(32, 32);
        let mut shape = Shape::circle(Vec2::new(5.0, 5.0), 3.0, Color::WHITE);
        shape.translate(Vec2::new(20.0, 20.0));
        shape.draw(&mut Rasterizer::new(&mut s));
        assert_eq!(s.get_pixel(25, 25), Color::WHITE);
        assert_eq!(s.get_pixel(5, 5), Color::default());
    }

    #[test]
    fn triangle_rotates_about_its_position() {
        let verts = [Vec2::new(0.0, -6.0), Vec2::new(5.0, 4.0), Vec2::new(-5.0, 4.0)];
        let mut a = PixelSurface::new(32, 32);
        let mut b = PixelSurface::new(32, 32);
        let mut tri = Shape::triangle(Vec2::new(16.0, 16.0), verts, Color::WHITE);
        tri.draw(&mut Rasterizer::new(&mut a));
        tri.rotate(std::f32::consts::PI);
        tri.draw(&mut Rasterizer::new(&mut b));
        assert_ne!(a, b);
        assert_eq!(b.get_pixel(16, 16), Color::WHITE);
    }

    #[test]
    fn draw_with_wrap_restores_mode() {
        let mut s = PixelSurface::new(8, 8);
        let mut r = Rasterizer::new(&mut s);
        Shape::rect(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0), Color::WHITE).draw_with(&mut r, BoundaryMode::Wrap);
        assert_eq!(r.boundary(), BoundaryMode::Reject);
        assert_eq!(count_color(&s, Color::WHITE), 4);
        assert_eq!(s.get_pixel(7, 7), Color::WHITE);
    }
}
