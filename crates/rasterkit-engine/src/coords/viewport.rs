use super::Vec2;

/// Screen size in pixels.
///
/// Batch renderers use it as the basis for converting pixel positions to NDC.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Maps a pixel position to normalized device coordinates.
    ///
    /// `(0, 0)` lands on `(-1, 1)` and `(width, height)` on `(1, -1)`.
    #[inline]
    pub fn to_ndc(self, p: Vec2) -> [f32; 2] {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        [p.x * 2.0 / w - 1.0, 1.0 - p.y * 2.0 / h]
    }
}
