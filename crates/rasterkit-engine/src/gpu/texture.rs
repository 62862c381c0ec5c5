use std::path::Path;
use std::rc::Rc;

use anyhow::Result;

use super::api::{GraphicsApi, NO_RESOURCE, ResourceId};
use crate::surface::PixelSurface;

/// Owned 2D RGBA8 texture, released on drop.
pub struct Texture {
    api: Rc<dyn GraphicsApi>,
    id: ResourceId,
    width: u32,
    height: u32,
}

impl Texture {
    /// Uploads `surface` into a new texture. An empty surface yields an unallocated texture.
    pub fn from_surface(api: Rc<dyn GraphicsApi>, surface: &PixelSurface) -> Self {
        let mut tex = Self { api, id: NO_RESOURCE, width: 0, height: 0 };
        tex.update(surface);
        tex
    }

    /// Decodes an image file and uploads it.
    pub fn load(api: Rc<dyn GraphicsApi>, path: impl AsRef<Path>) -> Result<Self> {
        let surface = PixelSurface::load(path)?;
        Ok(Self::from_surface(api, &surface))
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.id != NO_RESOURCE
    }

    /// Re-uploads the full surface, recreating the texture if its size changed.
    pub fn update(&mut self, surface: &PixelSurface) {
        let (w, h) = (surface.width() as u32, surface.height() as u32);
        if surface.is_empty() {
            self.release();
            return;
        }
        if self.is_allocated() && (w, h) == (self.width, self.height) {
            self.api.update_texture(self.id, w, h, surface.as_bytes());
            return;
        }
        self.release();
        self.id = self.api.create_texture(w, h, surface.as_bytes());
        self.width = w;
        self.height = h;
        log::debug!("texture {} created ({w}x{h})", self.id);
    }

    pub fn bind(&self, unit: u32) {
        self.api.bind_texture(unit, self.id);
    }

    pub fn release(&mut self) {
        if self.is_allocated() {
            self.api.release_texture(self.id);
            self.id = NO_RESOURCE;
            self.width = 0;
            self.height = 0;
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::recording::{ApiCall, RecordingApi};

    #[test]
    fn same_size_update_reuses_texture() {
        let rec = Rc::new(RecordingApi::new());
        let mut tex = Texture::from_surface(rec.clone(), &PixelSurface::new(4, 2));
        let id = tex.id();
        tex.update(&PixelSurface::new(4, 2));
        assert_eq!(tex.id(), id);
        assert_eq!(rec.count(|c| matches!(c, ApiCall::UpdateTexture { .. })), 1);
    }

    #[test]
    fn resized_surface_recreates_texture() {
        let rec = Rc::new(RecordingApi::new());
        let mut tex = Texture::from_surface(rec.clone(), &PixelSurface::new(4, 2));
        tex.update(&PixelSurface::new(8, 8));
        assert_eq!(tex.size(), (8, 8));
        assert_eq!(rec.texture_size(tex.id()), Some((8, 8)));
        assert_eq!(rec.releases(), 1);
        drop(tex);
        assert_eq!(rec.live(), 0);
    }

    #[test]
    fn empty_surface_allocates_nothing() {
        let rec = Rc::new(RecordingApi::new());
        let tex = Texture::from_surface(rec.clone(), &PixelSurface::new(0, 0));
        assert!(!tex.is_allocated());
        assert_eq!(rec.live(), 0);
    }
}
