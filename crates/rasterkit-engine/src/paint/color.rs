use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Sub};

use bytemuck::{Pod, Zeroable};

/// Straight-alpha 8-bit RGBA color.
///
/// Memory layout is `[r, g, b, a]`, so a `&[Color]` can be handed to the GPU as
/// `Rgba8Unorm` texel data without conversion. Equality and hashing go through
/// the packed 32-bit word.
///
/// Arithmetic saturates per channel; results are always within `[0, 255]`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Same value on all four channels.
    #[inline]
    pub const fn splat(v: u8) -> Self {
        Self::rgba(v, v, v, v)
    }

    /// Packed `[r, g, b, a]` word in native byte order.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        u32::from_ne_bytes([self.r, self.g, self.b, self.a])
    }

    #[inline]
    pub const fn from_u32(v: u32) -> Self {
        let [r, g, b, a] = v.to_ne_bytes();
        Self { r, g, b, a }
    }

    /// Linear interpolation toward `other`; `t = 0` returns `self`, `t = 1` returns `other`.
    ///
    /// Channels are truncated toward zero after interpolation.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let mix = |a: u8, b: u8| -> u8 {
            let v = (b as f32 - a as f32) * t + a as f32;
            v.clamp(0.0, 255.0) as u8
        };
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Normalized `[r, g, b, a]` in `[0, 1]` for vertex colors and uniforms.
    #[inline]
    pub fn as_vec4(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    fn map(self, f: impl Fn(u8) -> u8) -> Color {
        Color::rgba(f(self.r), f(self.g), f(self.b), f(self.a))
    }

    fn zip(self, rhs: Color, f: impl Fn(u8, u8) -> u8) -> Color {
        Color::rgba(f(self.r, rhs.r), f(self.g, rhs.g), f(self.b, rhs.b), f(self.a, rhs.a))
    }
}

impl Default for Color {
    /// Opaque black.
    #[inline]
    fn default() -> Self {
        Color::BLACK
    }
}

impl PartialEq for Color {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.to_u32() == other.to_u32()
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_u32().hash(state);
    }
}

impl Add for Color {
    type Output = Color;
    #[inline]
    fn add(self, rhs: Color) -> Color {
        self.zip(rhs, u8::saturating_add)
    }
}

impl Sub for Color {
    type Output = Color;
    #[inline]
    fn sub(self, rhs: Color) -> Color {
        self.zip(rhs, u8::saturating_sub)
    }
}

impl Add<u8> for Color {
    type Output = Color;
    #[inline]
    fn add(self, rhs: u8) -> Color {
        self.map(|c| c.saturating_add(rhs))
    }
}

impl Sub<u8> for Color {
    type Output = Color;
    #[inline]
    fn sub(self, rhs: u8) -> Color {
        self.map(|c| c.saturating_sub(rhs))
    }
}

impl Mul<f32> for Color {
    type Output = Color;
    #[inline]
    fn mul(self, rhs: f32) -> Color {
        self.map(|c| (c as f32 * rhs).clamp(0.0, 255.0) as u8)
    }
}

impl Div<f32> for Color {
    type Output = Color;
    #[inline]
    fn div(self, rhs: f32) -> Color {
        self.map(|c| (c as f32 / rhs).clamp(0.0, 255.0) as u8)
    }
}
