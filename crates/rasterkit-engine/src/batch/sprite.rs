//! Textured-quad batch: up to [`TEXTURE_SLOTS`] quads per indexed draw, each
//! sampling its own texture unit.

use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use super::common::{TEXTURE_SLOTS, push_quad_indices};
use crate::coords::{Flip, Rect, Transform, Vec2, Viewport};
use crate::gpu::{
    AttribFormat, BufferHandle, BufferKind, BufferUsage, DrawCall, GraphicsApi, Program, ResourceId, Texture,
    Topology, VertexLayoutDesc, VertexLayoutHandle,
};
use crate::paint::Color;

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    /// NDC position.
    pub pos: [f32; 2],
    /// Normalized texture coordinates.
    pub uv: [f32; 2],
    pub color: [f32; 4],
    /// Texture unit sampled by this vertex.
    pub slot: u32,
}

impl SpriteVertex {
    pub fn layout() -> VertexLayoutDesc {
        VertexLayoutDesc::new(size_of::<SpriteVertex>() as u32)
            .attrib(0, AttribFormat::Float32x2, 0)
            .attrib(1, AttribFormat::Float32x2, 8)
            .attrib(2, AttribFormat::Float32x4, 16)
            .attrib(3, AttribFormat::Uint32, 32)
    }
}

// ── batch ─────────────────────────────────────────────────────────────────

/// Accumulates textured quads and submits them in chunks on [`SpriteBatch::flush`].
///
/// Positions are pixels in a top-left-origin viewport and are converted to NDC
/// when a quad is appended, so changing the viewport only affects later quads.
pub struct SpriteBatch {
    api: Rc<dyn GraphicsApi>,
    viewport: Viewport,
    layout: VertexLayoutHandle,
    vbo: BufferHandle<SpriteVertex>,
    ibo: BufferHandle<u16>,
    vertices: Vec<SpriteVertex>,
    textures: Vec<ResourceId>,
    indices: Vec<u16>,
}

impl SpriteBatch {
    pub fn new(api: Rc<dyn GraphicsApi>, viewport: Viewport) -> Self {
        Self {
            layout: VertexLayoutHandle::new(Rc::clone(&api), SpriteVertex::layout()),
            vbo: BufferHandle::new(Rc::clone(&api), BufferKind::Vertex, BufferUsage::Dynamic),
            ibo: BufferHandle::new(Rc::clone(&api), BufferKind::Index, BufferUsage::Dynamic),
            api,
            viewport,
            vertices: Vec::new(),
            textures: Vec::new(),
            indices: Vec::new(),
        }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Number of quads waiting for the next flush.
    #[inline]
    pub fn pending(&self) -> usize {
        self.textures.len()
    }

    /// Appends `src` (normalized texture coordinates) of `texture` stretched over `dst`.
    pub fn draw_rect(&mut self, texture: &Texture, dst: Rect, src: Rect, flip: Flip, tint: Color) {
        let corners = [
            Vec2::new(dst.left(), dst.bottom()),
            Vec2::new(dst.left(), dst.top()),
            Vec2::new(dst.right(), dst.bottom()),
            Vec2::new(dst.right(), dst.top()),
        ];
        self.push_quad(texture, corners, src, flip, tint);
    }

    /// Appends the whole of `texture`, mapping its pixel rect `(0, 0)..(w, h)`
    /// through `transform`.
    pub fn draw_transformed(&mut self, texture: &Texture, transform: &Transform, src: Rect, flip: Flip, tint: Color) {
        let (w, h) = texture.size();
        let (w, h) = (w as f32, h as f32);
        let corners = [
            transform.forward(Vec2::new(0.0, h)),
            transform.forward(Vec2::new(0.0, 0.0)),
            transform.forward(Vec2::new(w, h)),
            transform.forward(Vec2::new(w, 0.0)),
        ];
        self.push_quad(texture, corners, src, flip, tint);
    }

    /// Appends `texture` centered on `(x, y)`, scaled by `size` and rotated
    /// about its center by `rotation` radians.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_at(
        &mut self,
        texture: &Texture,
        x: f32,
        y: f32,
        size: Vec2,
        rotation: f32,
        flip: Flip,
        tint: Color,
    ) {
        let (w, h) = texture.size();
        let mut t = Transform::new();
        t.translate(x, y)
            .rotate(rotation)
            .scale(size.x, size.y)
            .translate(-(w as f32) * 0.5, -(h as f32) * 0.5);
        self.draw_transformed(texture, &t, Rect::unit(), flip, tint);
    }

    fn push_quad(&mut self, texture: &Texture, corners: [Vec2; 4], src: Rect, flip: Flip, tint: Color) {
        let mut src = src;
        if flip.horizontal {
            src = src.flipped_h();
        }
        if flip.vertical {
            src = src.flipped_v();
        }
        let uvs = [
            [src.left(), src.bottom()],
            [src.left(), src.top()],
            [src.right(), src.bottom()],
            [src.right(), src.top()],
        ];
        let slot = (self.textures.len() % TEXTURE_SLOTS) as u32;
        let color = tint.as_vec4();
        let vp = self.viewport;
        self.vertices.extend(corners.iter().zip(uvs).map(|(&p, uv)| SpriteVertex {
            pos: vp.to_ndc(p),
            uv,
            color,
            slot,
        }));
        self.textures.push(texture.id());
    }

    /// Submits every pending quad, at most [`TEXTURE_SLOTS`] per draw.
    pub fn flush(&mut self) {
        if self.textures.is_empty() {
            return;
        }
        let layout = self.layout.bind();
        self.api.use_program(Program::Sprite);

        let mut draws = 0;
        for (quads, textures) in self.vertices.chunks(4 * TEXTURE_SLOTS).zip(self.textures.chunks(TEXTURE_SLOTS)) {
            let n = textures.len();
            self.vbo.resize(n * 4);
            self.vbo.map(quads, 0);

            self.indices.clear();
            push_quad_indices(n, &mut self.indices);
            self.ibo.map(&self.indices, 0);

            for (unit, &id) in textures.iter().enumerate() {
                self.api.bind_texture(unit as u32, id);
            }
            self.api.draw(&DrawCall {
                program: Program::Sprite,
                topology: Topology::Triangles,
                layout,
                vertices: self.vbo.id(),
                indices: Some(self.ibo.id()),
                count: self.indices.len() as u32,
            });
            draws += 1;
        }
        log::trace!("sprite batch: {} quads in {} draws", self.textures.len(), draws);

        self.vertices.clear();
        self.textures.clear();
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{ApiCall, RecordingApi};
    use crate::surface::PixelSurface;

    fn setup() -> (Rc<RecordingApi>, SpriteBatch, Texture) {
        let rec = Rc::new(RecordingApi::new());
        let batch = SpriteBatch::new(rec.clone(), Viewport::new(100.0, 100.0));
        let texture = Texture::from_surface(rec.clone(), &PixelSurface::new(10, 10));
        (rec, batch, texture)
    }

    fn push(batch: &mut SpriteBatch, texture: &Texture, n: usize) {
        for i in 0..n {
            let dst = Rect::new(i as f32, 0.0, 10.0, 10.0);
            batch.draw_rect(texture, dst, Rect::unit(), Flip::NONE, Color::WHITE);
        }
    }

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(size_of::<SpriteVertex>(), 36);
        let desc = SpriteVertex::layout();
        assert_eq!(desc.stride, 36);
        assert_eq!(desc.attribs.len(), 4);
    }

    #[test]
    fn draw_count_is_ceil_of_slots() {
        for (quads, draws) in [(1, 1), (16, 1), (17, 2), (32, 2), (33, 3)] {
            let (rec, mut batch, texture) = setup();
            push(&mut batch, &texture, quads);
            batch.flush();
            assert_eq!(rec.draws().len(), draws, "{quads} quads");
            assert_eq!(batch.pending(), 0);
        }
    }

    #[test]
    fn empty_flush_issues_nothing() {
        let (rec, mut batch, _texture) = setup();
        let before = rec.calls().len();
        batch.flush();
        assert_eq!(rec.calls().len(), before);
    }

    #[test]
    fn indices_follow_quad_pattern() {
        let (rec, mut batch, texture) = setup();
        push(&mut batch, &texture, 2);
        batch.flush();
        let draw = rec.draws()[0];
        assert_eq!(draw.count, 12);
        let indices = rec.buffer_elems::<u16>(draw.indices.unwrap()).unwrap();
        assert_eq!(&indices[..12], &[0, 1, 3, 0, 3, 2, 4, 5, 7, 4, 7, 6]);
    }

    #[test]
    fn slots_cycle_and_bind_per_quad() {
        let (rec, mut batch, texture) = setup();
        push(&mut batch, &texture, 18);
        let slots: Vec<u32> = batch.vertices.iter().step_by(4).map(|v| v.slot).collect();
        assert_eq!(slots[15], 15);
        assert_eq!(slots[16], 0);
        assert_eq!(slots[17], 1);
        batch.flush();
        let binds = rec.count(|c| matches!(c, ApiCall::BindTexture { .. }));
        assert_eq!(binds, 18);
    }

    #[test]
    fn positions_convert_to_ndc() {
        let (_rec, mut batch, texture) = setup();
        batch.draw_rect(&texture, Rect::new(0.0, 0.0, 50.0, 100.0), Rect::unit(), Flip::NONE, Color::WHITE);
        let pos: Vec<[f32; 2]> = batch.vertices.iter().map(|v| v.pos).collect();
        assert_eq!(pos, vec![[-1.0, -1.0], [-1.0, 1.0], [0.0, -1.0], [0.0, 1.0]]);
    }

    #[test]
    fn flip_swaps_source_edges() {
        let (_rec, mut batch, texture) = setup();
        let dst = Rect::new(0.0, 0.0, 10.0, 10.0);
        batch.draw_rect(&texture, dst, Rect::unit(), Flip::HORIZONTAL, Color::WHITE);
        assert_eq!(batch.vertices[0].uv, [1.0, 1.0]);
        assert_eq!(batch.vertices[3].uv, [0.0, 0.0]);
    }

    #[test]
    fn draw_at_centers_texture() {
        let (_rec, mut batch, texture) = setup();
        batch.draw_at(&texture, 50.0, 50.0, Vec2::splat(1.0), 0.0, Flip::NONE, Color::WHITE);
        let vp = batch.viewport();
        assert_eq!(batch.vertices[1].pos, vp.to_ndc(Vec2::new(45.0, 45.0)));
        assert_eq!(batch.vertices[2].pos, vp.to_ndc(Vec2::new(55.0, 55.0)));
    }
}
