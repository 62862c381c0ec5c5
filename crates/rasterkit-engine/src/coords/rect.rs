use super::Vec2;

/// Axis-aligned rectangle in pixels (top-left origin).
///
/// Size may be negative when built from reversed edges; call [`Rect::normalized`]
/// before iterating over it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Builds a rect from start/end edges. The edges may be given in either order.
    #[inline]
    pub fn from_edges(sx: f32, sy: f32, ex: f32, ey: f32) -> Self {
        Self::new(sx, sy, ex - sx, ey - sy)
    }

    /// Unit rect `[0, 1] × [0, 1]`, the full texture in normalized coordinates.
    #[inline]
    pub const fn unit() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    #[inline]
    pub fn left(self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn top(self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.origin.y + self.size.y
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x * 0.5, self.origin.y + self.size.y * 0.5)
    }

    /// True when either axis has zero (or negative) extent.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// True when start == end on either axis, regardless of direction.
    #[inline]
    pub fn is_degenerate(self) -> bool {
        self.size.x == 0.0 || self.size.y == 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        p.x >= r.left() && p.y >= r.top() && p.x < r.right() && p.y < r.bottom()
    }

    /// Mirrors the rect horizontally by swapping its left and right edges.
    #[inline]
    pub fn flipped_h(self) -> Self {
        Rect::from_edges(self.right(), self.top(), self.left(), self.bottom())
    }

    /// Mirrors the rect vertically by swapping its top and bottom edges.
    #[inline]
    pub fn flipped_v(self) -> Self {
        Rect::from_edges(self.left(), self.bottom(), self.right(), self.top())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    #[test]
    fn normalized_positive_is_identity() {
        let rect = r(1.0, 2.0, 10.0, 20.0);
        assert_eq!(rect.normalized(), rect);
    }

    #[test]
    fn normalized_reversed_edges() {
        let n = Rect::from_edges(10.0, 7.0, 6.0, 2.0).normalized();
        assert_eq!(n, r(6.0, 2.0, 4.0, 5.0));
    }

    #[test]
    fn contains_is_half_open() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(9.5, 9.5)));
        assert!(!rect.contains(Vec2::new(10.0, 10.0)));
        assert!(!rect.contains(Vec2::new(-1.0, 5.0)));
    }

    #[test]
    fn degenerate_either_axis() {
        assert!(Rect::from_edges(3.0, 0.0, 3.0, 5.0).is_degenerate());
        assert!(Rect::from_edges(0.0, 4.0, 5.0, 4.0).is_degenerate());
        assert!(!Rect::from_edges(5.0, 5.0, 0.0, 0.0).is_degenerate());
    }

    #[test]
    fn flips_swap_edges() {
        let rect = Rect::unit();
        let h = rect.flipped_h();
        assert_eq!((h.left(), h.right()), (1.0, 0.0));
        let v = rect.flipped_v();
        assert_eq!((v.top(), v.bottom()), (1.0, 0.0));
    }
}
