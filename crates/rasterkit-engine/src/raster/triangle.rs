use super::Rasterizer;
use crate::coords::Vec2;
use crate::paint::Color;
use crate::surface::{BoundaryMode, PixelSurface};

/// Textured-triangle corner: position in pixels, texture coordinate in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Vec2,
    pub uv: Vec2,
    /// Optional tint. Used only when all three vertices carry one.
    pub color: Option<Color>,
}

impl Vertex {
    #[inline]
    pub const fn new(pos: Vec2, uv: Vec2) -> Self {
        Self { pos, uv, color: None }
    }

    #[inline]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// A triangle corner for the scanline walker: `y` plus `N` interpolated channels.
/// Channel 0 is always x.
#[derive(Copy, Clone)]
struct Corner<const N: usize> {
    y: f32,
    attrs: [f32; N],
}

fn lerp_attrs<const N: usize>(a: &[f32; N], b: &[f32; N], t: f32) -> [f32; N] {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

fn edge_slope<const N: usize>(from: &Corner<N>, to: &Corner<N>) -> [f32; N] {
    let dy = to.y - from.y;
    if dy == 0.0 {
        [0.0; N]
    } else {
        std::array::from_fn(|i| (to.attrs[i] - from.attrs[i]) / dy)
    }
}

/// Scanline walk shared by flat and textured triangles.
///
/// Rows run from the top vertex to the bottom vertex inclusive. For every row
/// `span(y, left, right)` receives the channels at both ends, ordered by x.
/// The short edge switches to the lower half once the row reaches the middle
/// vertex. Zero-height triangles emit nothing.
fn scan_triangle<const N: usize>(mut v: [Corner<N>; 3], mut span: impl FnMut(i32, &[f32; N], &[f32; N])) {
    v.sort_by(|a, b| a.y.total_cmp(&b.y));
    let [top, mid, bottom] = v;
    if top.y == bottom.y {
        return;
    }

    let long = edge_slope(&top, &bottom);
    let upper = edge_slope(&top, &mid);
    let lower = edge_slope(&mid, &bottom);

    let first = top.y.floor() as i32;
    let last = bottom.y.floor() as i32;
    for row in first..=last {
        let y = (row as f32).clamp(top.y, bottom.y);

        let a: [f32; N] = std::array::from_fn(|i| top.attrs[i] + long[i] * (y - top.y));
        let b: [f32; N] = if y < mid.y {
            std::array::from_fn(|i| top.attrs[i] + upper[i] * (y - top.y))
        } else {
            std::array::from_fn(|i| mid.attrs[i] + lower[i] * (y - mid.y))
        };

        if a[0] <= b[0] {
            span(row, &a, &b);
        } else {
            span(row, &b, &a);
        }
    }
}

impl Rasterizer<'_> {
    /// Solid triangle. Rows are inclusive, spans are `[floor(left), floor(right))`.
    pub fn fill_triangle(
        &mut self,
        (x1, y1): (i32, i32),
        (x2, y2): (i32, i32),
        (x3, y3): (i32, i32),
        color: Color,
    ) {
        let corner = |r: &Self, x: i32, y: i32| {
            let (x, y) = r.to_surface(x, y);
            Corner { y: y as f32, attrs: [x as f32] }
        };
        let corners = [corner(self, x1, y1), corner(self, x2, y2), corner(self, x3, y3)];

        scan_triangle(corners, |y, l, r| {
            self.hspan(l[0].floor() as i32, r[0].floor() as i32, y, color);
        });
    }

    pub fn triangle_outline(
        &mut self,
        (x1, y1): (i32, i32),
        (x2, y2): (i32, i32),
        (x3, y3): (i32, i32),
        color: Color,
    ) {
        self.line(x1, y1, x2, y2, color);
        self.line(x1, y1, x3, y3, color);
        self.line(x2, y2, x3, y3, color);
    }

    /// Affine-textured triangle sampling `source` with nearest-neighbor lookup.
    ///
    /// When all three vertices carry a color, each sample is blended halfway
    /// towards the interpolated vertex color.
    pub fn textured_triangle(&mut self, source: &PixelSurface, v1: Vertex, v2: Vertex, v3: Vertex) {
        let tinted = v1.color.is_some() && v2.color.is_some() && v3.color.is_some();
        let (sw, sh) = (source.width(), source.height());

        let corner = |r: &Self, v: Vertex| {
            let (x, y) = r.to_surface(0, 0);
            let c = v.color.unwrap_or_default().as_vec4();
            Corner {
                y: v.pos.y + y as f32,
                attrs: [v.pos.x + x as f32, v.uv.x, v.uv.y, c[0], c[1], c[2], c[3]],
            }
        };
        let corners = [corner(self, v1), corner(self, v2), corner(self, v3)];

        let clip = self.boundary() == BoundaryMode::Reject;
        let (w, h) = (self.width(), self.height());

        scan_triangle(corners, |y, l, r| {
            if clip && (y < 0 || y >= h) {
                return;
            }
            let (sx, ex) = (l[0].floor() as i32, r[0].floor() as i32);
            let (sx, ex) = if clip { (sx.max(0), ex.min(w)) } else { (sx, ex) };
            let width = r[0] - l[0];

            for x in sx..ex {
                let t = if width > 0.0 { (x as f32 - l[0]) / width } else { 0.0 };
                let a = lerp_attrs(l, r, t);
                let sample = source.get_pixel(texel(a[1], sw), texel(a[2], sh));
                let out = if tinted {
                    sample.lerp(channel_color(&a[3..7]), 0.5)
                } else {
                    sample
                };
                self.put(x, y, out);
            }
        });
    }
}

/// Nearest texel for coordinate `t`. The closed range `[0, 1]` stays on the
/// texture, so `t == 1.0` picks the last texel; anything outside is left to
/// the source's boundary mode.
fn texel(t: f32, size: i32) -> i32 {
    let i = (t * size as f32).floor() as i32;
    if (0.0..=1.0).contains(&t) { i.min(size - 1).max(0) } else { i }
}

fn channel_color(c: &[f32]) -> Color {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::rgba(q(c[0]), q(c[1]), q(c[2]), q(c[3]))
}
