use crate::coords::Vec2;
use crate::gpu::Texture;
use crate::surface::PixelSurface;

/// A CPU draw target and the GPU texture it is composited through.
///
/// The texture is created on the first swap and recreated when the surface
/// dimensions change.
pub struct Layer {
    pub(super) surface: PixelSurface,
    pub(super) texture: Option<Texture>,
    scroll_offset: Vec2,
    camera_enabled: bool,
}

impl Layer {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            surface: PixelSurface::new(width, height),
            texture: None,
            scroll_offset: Vec2::zero(),
            camera_enabled: false,
        }
    }

    #[inline]
    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut PixelSurface {
        &mut self.surface
    }

    #[inline]
    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    #[inline]
    pub fn scroll_offset(&self) -> Vec2 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: Vec2) {
        self.scroll_offset = offset;
    }

    #[inline]
    pub fn camera_enabled(&self) -> bool {
        self.camera_enabled
    }

    pub fn set_camera_enabled(&mut self, enabled: bool) {
        self.camera_enabled = enabled;
    }

    /// Offset applied to rasterizer writes: the scroll offset when the camera is on.
    #[inline]
    pub fn camera_offset(&self) -> Vec2 {
        if self.camera_enabled { self.scroll_offset } else { Vec2::zero() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_offset_follows_toggle() {
        let mut layer = Layer::new(4, 4);
        layer.set_scroll_offset(Vec2::new(3.0, -2.0));
        assert_eq!(layer.camera_offset(), Vec2::zero());
        layer.set_camera_enabled(true);
        assert_eq!(layer.camera_offset(), Vec2::new(3.0, -2.0));
    }
}
