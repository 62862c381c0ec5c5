use super::Vec2;

type Mat3 = [[f32; 3]; 3];

const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// 2D affine transform stored as a 3×3 matrix.
///
/// Operations post-multiply, so the last call is applied to points first:
/// `rotate(a); translate(x, y); scale(s, s)` scales, then translates, then rotates.
///
/// The inverse is cached and only recomputed by [`Transform::invert`] after a change.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    forward: Mat3,
    inverse: Mat3,
    stale: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub const fn new() -> Self {
        Self { forward: IDENTITY, inverse: IDENTITY, stale: false }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Rotation by `angle` radians, same direction as [`Vec2::rotated`].
    pub fn rotate(&mut self, angle: f32) -> &mut Self {
        let (s, c) = angle.sin_cos();
        self.apply([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn translate(&mut self, dx: f32, dy: f32) -> &mut Self {
        self.apply([[1.0, 0.0, dx], [0.0, 1.0, dy], [0.0, 0.0, 1.0]])
    }

    pub fn scale(&mut self, sx: f32, sy: f32) -> &mut Self {
        self.apply([[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Maps a point through the transform.
    #[inline]
    pub fn forward(&self, p: Vec2) -> Vec2 {
        project(&self.forward, p)
    }

    /// Maps a point through the cached inverse. Call [`Transform::invert`] first
    /// after modifying the transform.
    #[inline]
    pub fn backward(&self, p: Vec2) -> Vec2 {
        debug_assert!(!self.stale, "Transform::backward called with a stale inverse");
        project(&self.inverse, p)
    }

    /// Refreshes the cached inverse if the transform changed since the last call.
    ///
    /// A singular matrix leaves the previous inverse in place.
    pub fn invert(&mut self) {
        if !self.stale {
            return;
        }
        match inverse(&self.forward) {
            Some(inv) => self.inverse = inv,
            None => log::debug!("Transform::invert: singular matrix; keeping previous inverse"),
        }
        self.stale = false;
    }

    fn apply(&mut self, rhs: Mat3) -> &mut Self {
        self.forward = mul(&self.forward, &rhs);
        self.stale = true;
        self
    }
}

fn project(m: &Mat3, p: Vec2) -> Vec2 {
    let x = m[0][0] * p.x + m[0][1] * p.y + m[0][2];
    let y = m[1][0] * p.x + m[1][1] * p.y + m[1][2];
    let z = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
    let z = if z == 0.0 { 1.0 } else { z };
    Vec2::new(x / z, y / z)
}

fn mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[r][k] * b[k][c]).sum();
        }
    }
    out
}

fn inverse(m: &Mat3) -> Option<Mat3> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
    if det.abs() <= f32::EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
        ],
    ])
}
