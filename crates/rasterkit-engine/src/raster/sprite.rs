use super::Rasterizer;
use crate::coords::{Flip, Rect, Transform, Vec2};
use crate::surface::{BoundaryMode, PixelSurface};

impl Rasterizer<'_> {
    /// Scales the whole `sprite` into `dst` (nearest neighbor).
    pub fn sprite(&mut self, sprite: &PixelSurface, dst: Rect, flip: Flip) {
        let src = Rect::new(0.0, 0.0, sprite.width() as f32, sprite.height() as f32);
        self.sprite_region(sprite, dst, src, flip);
    }

    /// Scales the pixel rect `src` of `sprite` into `dst`.
    ///
    /// Either rect may have reversed edges. A degenerate `dst` or `src` draws nothing.
    /// Flipping mirrors the destination, so the first source column lands on the
    /// opposite edge.
    pub fn sprite_region(&mut self, sprite: &PixelSurface, dst: Rect, src: Rect, flip: Flip) {
        if dst.is_degenerate() || src.is_degenerate() {
            return;
        }
        let dst = dst.normalized();
        let src = src.normalized();

        let x_scale = dst.size.x / src.size.x;
        let y_scale = dst.size.y / src.size.y;
        let (src_x, src_y) = (src.left() as i32, src.top() as i32);
        let (src_w, src_h) = (src.size.x as i32, src.size.y as i32);

        let cols = dst.size.x.ceil() as i32;
        let rows = dst.size.y.ceil() as i32;
        for y in 0..rows {
            let oy = ((y as f32 / y_scale).floor() as i32).min(src_h - 1);
            let py = if flip.vertical {
                dst.bottom() - 1.0 - y as f32
            } else {
                dst.top() + y as f32
            };
            for x in 0..cols {
                let ox = ((x as f32 / x_scale).floor() as i32).min(src_w - 1);
                let px = if flip.horizontal {
                    dst.right() - 1.0 - x as f32
                } else {
                    dst.left() + x as f32
                };
                let color = sprite.get_pixel(src_x + ox, src_y + oy);
                self.set_pixel(px.floor() as i32, py.floor() as i32, color);
            }
        }
    }

    /// Draws `sprite` centered on `(x, y)`, scaled per axis by `scale`.
    pub fn sprite_at(&mut self, x: i32, y: i32, sprite: &PixelSurface, scale: Vec2, flip: Flip) {
        let size = Vec2::new(sprite.width() as f32 * scale.x, sprite.height() as f32 * scale.y);
        self.sprite(sprite, centered(x, y, size), flip);
    }

    /// Draws the pixel rect `src` of `sprite` centered on `(x, y)`.
    pub fn sprite_region_at(
        &mut self,
        x: i32,
        y: i32,
        src: Rect,
        sprite: &PixelSurface,
        scale: Vec2,
        flip: Flip,
    ) {
        if src.is_degenerate() {
            return;
        }
        let src = src.normalized();
        let size = Vec2::new(src.size.x * scale.x, src.size.y * scale.y);
        self.sprite_region(sprite, centered(x, y, size), src, flip);
    }

    /// Draws `sprite` through an affine transform.
    ///
    /// Walks the bounding box of the transformed sprite and samples each pixel
    /// through the inverse. Under a `Reject` sprite, samples that fall outside
    /// the sprite are skipped instead of drawing the reject color.
    pub fn sprite_transformed(&mut self, sprite: &PixelSurface, transform: &Transform, flip: Flip) {
        if sprite.is_empty() {
            return;
        }
        let (w, h) = (sprite.width() as f32, sprite.height() as f32);

        let corners = [
            transform.forward(Vec2::new(0.0, 0.0)),
            transform.forward(Vec2::new(w, 0.0)),
            transform.forward(Vec2::new(0.0, h)),
            transform.forward(Vec2::new(w, h)),
        ];
        let (mut sx, mut sy) = (f32::MAX, f32::MAX);
        let (mut ex, mut ey) = (f32::MIN, f32::MIN);
        for c in corners {
            sx = sx.min(c.x);
            sy = sy.min(c.y);
            ex = ex.max(c.x);
            ey = ey.max(c.y);
        }

        let mut inverse = *transform;
        inverse.invert();

        let skip_outside = sprite.boundary_mode() == BoundaryMode::Reject;
        for j in sy.floor() as i32..ey.ceil() as i32 {
            for i in sx.floor() as i32..ex.ceil() as i32 {
                let o = inverse.backward(Vec2::new(i as f32, j as f32));
                let (u, v) = (o.x.floor() as i32, o.y.floor() as i32);
                if skip_outside && (u < 0 || v < 0 || u >= sprite.width() || v >= sprite.height()) {
                    continue;
                }
                let u = if flip.horizontal { sprite.width() - 1 - u } else { u };
                let v = if flip.vertical { sprite.height() - 1 - v } else { v };
                self.set_pixel(i, j, sprite.get_pixel(u, v));
            }
        }
    }
}

fn centered(x: i32, y: i32, size: Vec2) -> Rect {
    Rect::new(x as f32 - size.x * 0.5, y as f32 - size.y * 0.5, size.x, size.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{Color, PixelMode};
    use crate::raster::count_color;

    /// 2×1 sprite: red on the left, blue on the right.
    fn red_blue() -> PixelSurface {
        let mut s = PixelSurface::new(2, 1);
        s.set_pixel(0, 0, Color::RED);
        s.set_pixel(1, 0, Color::BLUE);
        s
    }

    #[test]
    fn scaled_blit_repeats_pixels() {
        let sprite = red_blue();
        let mut s = PixelSurface::new(8, 4);
        Rasterizer::new(&mut s).sprite(&sprite, Rect::new(0.0, 0.0, 4.0, 2.0), Flip::NONE);
        assert_eq!(s.get_pixel(0, 0), Color::RED);
        assert_eq!(s.get_pixel(1, 1), Color::RED);
        assert_eq!(s.get_pixel(2, 0), Color::BLUE);
        assert_eq!(s.get_pixel(3, 1), Color::BLUE);
        assert_eq!(s.get_pixel(4, 0), Color::default());
    }

    #[test]
    fn horizontal_flip_mirrors_inside_dst() {
        let sprite = red_blue();
        let mut s = PixelSurface::new(8, 4);
        Rasterizer::new(&mut s).sprite(&sprite, Rect::new(2.0, 0.0, 2.0, 1.0), Flip::HORIZONTAL);
        assert_eq!(s.get_pixel(2, 0), Color::BLUE);
        assert_eq!(s.get_pixel(3, 0), Color::RED);
        assert_eq!(s.get_pixel(4, 0), Color::default());
        assert_eq!(s.get_pixel(1, 0), Color::default());
    }

    #[test]
    fn degenerate_rect_is_noop() {
        let sprite = red_blue();
        let mut s = PixelSurface::new(4, 4);
        Rasterizer::new(&mut s).sprite(&sprite, Rect::new(1.0, 1.0, 0.0, 3.0), Flip::NONE);
        assert_eq!(count_color(&s, Color::RED), 0);
    }

    #[test]
    fn region_picks_source_cell() {
        let sprite = red_blue();
        let mut s = PixelSurface::new(4, 4);
        Rasterizer::new(&mut s).sprite_region_at(
            2,
            2,
            Rect::new(1.0, 0.0, 1.0, 1.0),
            &sprite,
            Vec2::splat(2.0),
            Flip::NONE,
        );
        assert_eq!(count_color(&s, Color::BLUE), 4);
        assert_eq!(s.get_pixel(1, 1), Color::BLUE);
    }

    #[test]
    fn mask_mode_keeps_background_under_transparent_texels() {
        let mut sprite = red_blue();
        sprite.set_pixel(1, 0, Color::TRANSPARENT);
        let mut s = PixelSurface::new(2, 1);
        s.fill(Color::GREEN);
        Rasterizer::new(&mut s)
            .with_pixel_mode(PixelMode::Mask)
            .sprite(&sprite, Rect::new(0.0, 0.0, 2.0, 1.0), Flip::NONE);
        assert_eq!(s.get_pixel(0, 0), Color::RED);
        assert_eq!(s.get_pixel(1, 0), Color::GREEN);
    }

    #[test]
    fn identity_transform_matches_plain_blit() {
        let sprite = red_blue();
        let mut a = PixelSurface::new(4, 4);
        let mut b = PixelSurface::new(4, 4);
        let mut t = Transform::new();
        t.translate(1.0, 1.0);
        Rasterizer::new(&mut a).sprite_transformed(&sprite, &t, Flip::NONE);
        Rasterizer::new(&mut b).sprite(&sprite, Rect::new(1.0, 1.0, 2.0, 1.0), Flip::NONE);
        assert_eq!(a, b);
    }

    #[test]
    fn transformed_flip_swaps_columns() {
        let sprite = red_blue();
        let mut s = PixelSurface::new(4, 4);
        Rasterizer::new(&mut s).sprite_transformed(&sprite, &Transform::new(), Flip::HORIZONTAL);
        assert_eq!(s.get_pixel(0, 0), Color::BLUE);
        assert_eq!(s.get_pixel(1, 0), Color::RED);
    }
}
