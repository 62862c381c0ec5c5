use super::Rasterizer;
use super::font::{self, FONT_HEIGHT, FONT_WIDTH, GLYPH_ADVANCE, LINE_HEIGHT, TAB_ADVANCE};
use crate::coords::{Rect, Vec2};
use crate::paint::Color;

/// Horizontal anchoring of a text line relative to its `x` coordinate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TextAlign {
    /// `x` is the left edge.
    #[default]
    Left,
    /// `x` is the center.
    Middle,
    /// `x` is the right edge.
    Right,
}

impl TextAlign {
    /// Fraction of the line width placed left of `x`.
    #[inline]
    pub fn factor(self) -> f32 {
        match self {
            TextAlign::Left => 0.0,
            TextAlign::Middle => 0.5,
            TextAlign::Right => 1.0,
        }
    }
}

/// Advance at scale 1, `None` for characters the font cannot draw.
fn advance(c: char) -> Option<f32> {
    match c {
        '\t' => Some(TAB_ADVANCE),
        c if font::glyph(c).is_some() => Some(GLYPH_ADVANCE),
        _ => None,
    }
}

/// Size of `text` drawn at `scale`: widest line by total line height.
pub fn measure_text(text: &str, scale: Vec2) -> Vec2 {
    let mut width = 0.0f32;
    let mut line = 0.0f32;
    let mut height = FONT_HEIGHT as f32;
    for c in text.chars() {
        if c == '\n' {
            width = width.max(line);
            height += LINE_HEIGHT;
            line = 0.0;
        } else if let Some(a) = advance(c) {
            line += a * scale.x;
        }
    }
    Vec2::new(width.max(line), height * scale.y)
}

impl Rasterizer<'_> {
    /// Draws one glyph stretched over `dst`. Unknown characters draw nothing.
    pub fn glyph(&mut self, dst: Rect, c: char, color: Color) {
        let Some(g) = font::glyph(c) else { return };
        if dst.is_degenerate() {
            return;
        }
        let dst = dst.normalized();
        let x_scale = dst.size.x / FONT_WIDTH as f32;
        let y_scale = dst.size.y / FONT_HEIGHT as f32;

        for y in 0..dst.size.y.ceil() as i32 {
            let row = ((y as f32 / y_scale).floor() as i32).min(FONT_HEIGHT - 1);
            for x in 0..dst.size.x.ceil() as i32 {
                let col = ((x as f32 / x_scale).floor() as i32).min(FONT_WIDTH - 1);
                if font::lit(g, col, row) {
                    let px = (dst.left() + x as f32).floor() as i32;
                    let py = (dst.top() + y as f32).floor() as i32;
                    self.set_pixel(px, py, color);
                }
            }
        }
    }

    /// Draws one glyph with its top-left corner at `(x, y)`.
    pub fn char_at(&mut self, x: i32, y: i32, c: char, scale: Vec2, color: Color) {
        let dst = Rect::new(
            x as f32,
            y as f32,
            FONT_WIDTH as f32 * scale.x,
            FONT_HEIGHT as f32 * scale.y,
        );
        self.glyph(dst, c, color);
    }

    /// Stretches `text` so its measured size fills `dst`. Honors `'\n'`.
    pub fn text_in_rect(&mut self, dst: Rect, text: &str, color: Color) {
        if text.is_empty() || dst.is_degenerate() {
            return;
        }
        let dst = dst.normalized();
        let size = measure_text(text, Vec2::splat(1.0));
        if size.x <= 0.0 {
            return;
        }
        let x_scale = dst.size.x / size.x;
        let y_scale = dst.size.y / size.y;
        let cell = Vec2::new(FONT_WIDTH as f32 * x_scale, FONT_HEIGHT as f32 * y_scale);

        let mut pen = dst.origin;
        for c in text.chars() {
            if c == '\n' {
                pen = Vec2::new(dst.left(), pen.y + LINE_HEIGHT * y_scale);
                continue;
            }
            let Some(a) = advance(c) else { continue };
            self.glyph(Rect { origin: pen, size: cell }, c, color);
            pen.x += a * x_scale;
        }
    }

    /// Draws `text` anchored at `(x, y)`, one line per `'\n'`.
    ///
    /// Each line is measured on its own and shifted left by
    /// `align.factor() × width`, so lines of a multi-line string align independently.
    pub fn text(&mut self, x: i32, y: i32, text: &str, scale: Vec2, color: Color, align: TextAlign) {
        for (i, line) in text.split('\n').enumerate() {
            let size = measure_text(line, scale);
            let top = y as f32 + i as f32 * LINE_HEIGHT * scale.y;
            let left = x as f32 - size.x * align.factor();
            self.text_in_rect(Rect::new(left, top, size.x, size.y), line, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::count_color;
    use crate::surface::PixelSurface;

    fn bbox(s: &PixelSurface, color: Color) -> Option<(i32, i32, i32, i32)> {
        let mut out: Option<(i32, i32, i32, i32)> = None;
        for y in 0..s.height() {
            for x in 0..s.width() {
                if s.get_pixel(x, y) == color {
                    out = Some(match out {
                        None => (x, y, x, y),
                        Some((a, b, c, d)) => (a.min(x), b.min(y), c.max(x), d.max(y)),
                    });
                }
            }
        }
        out
    }

    #[test]
    fn measure_counts_advances_and_lines() {
        let one = Vec2::splat(1.0);
        assert_eq!(measure_text("ab", one), Vec2::new(18.0, 13.0));
        assert_eq!(measure_text("a\tb", one), Vec2::new(36.0, 13.0));
        assert_eq!(measure_text("abc\nd", Vec2::splat(2.0)), Vec2::new(54.0, 54.0));
        assert_eq!(measure_text("", one), Vec2::new(0.0, 13.0));
    }

    #[test]
    fn unknown_characters_are_skipped() {
        let one = Vec2::splat(1.0);
        assert_eq!(measure_text("a\u{1}b", one), measure_text("ab", one));

        let mut s = PixelSurface::new(16, 16);
        Rasterizer::new(&mut s).char_at(0, 0, '\u{7f}', one, Color::WHITE);
        assert_eq!(count_color(&s, Color::WHITE), 0);
    }

    #[test]
    fn glyph_stays_inside_its_cell() {
        let mut s = PixelSurface::new(32, 32);
        Rasterizer::new(&mut s).char_at(4, 6, 'W', Vec2::splat(1.0), Color::WHITE);
        let (x0, y0, x1, y1) = bbox(&s, Color::WHITE).unwrap();
        assert!(x0 >= 4 && y0 >= 6);
        assert!(x1 < 4 + FONT_WIDTH && y1 < 6 + FONT_HEIGHT);
    }

    #[test]
    fn doubling_scale_doubles_coverage() {
        let mut a = PixelSurface::new(64, 64);
        let mut b = PixelSurface::new(64, 64);
        Rasterizer::new(&mut a).char_at(0, 0, 'A', Vec2::splat(1.0), Color::WHITE);
        Rasterizer::new(&mut b).char_at(0, 0, 'A', Vec2::splat(2.0), Color::WHITE);
        assert_eq!(count_color(&b, Color::WHITE), 4 * count_color(&a, Color::WHITE));
    }

    #[test]
    fn right_alignment_ends_at_anchor() {
        let mut s = PixelSurface::new(64, 20);
        Rasterizer::new(&mut s).text(40, 0, "II", Vec2::splat(1.0), Color::WHITE, TextAlign::Right);
        let (x0, _, x1, _) = bbox(&s, Color::WHITE).unwrap();
        assert!(x1 < 40);
        assert!(x0 >= 40 - 18);
    }

    #[test]
    fn second_line_starts_one_line_height_down() {
        let mut s = PixelSurface::new(32, 40);
        Rasterizer::new(&mut s).text(0, 0, "\n_", Vec2::splat(1.0), Color::WHITE, TextAlign::Left);
        let (_, y0, _, _) = bbox(&s, Color::WHITE).unwrap();
        assert!(y0 >= LINE_HEIGHT as i32);
    }
}
