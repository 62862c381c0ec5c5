//! Colored primitive batch: lines, triangles and quads of a single kind per draw.

use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use super::common::{GEO_BATCH_MAX_VERTICES, push_quad_indices, push_sequential_indices};
use crate::coords::{Transform, Vec2, Viewport};
use crate::gpu::{
    AttribFormat, BufferHandle, BufferKind, BufferUsage, DrawCall, GraphicsApi, Program, Topology, VertexLayoutDesc,
    VertexLayoutHandle,
};
use crate::paint::Color;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct GeoVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

impl GeoVertex {
    pub fn layout() -> VertexLayoutDesc {
        VertexLayoutDesc::new(size_of::<GeoVertex>() as u32)
            .attrib(0, AttribFormat::Float32x2, 0)
            .attrib(1, AttribFormat::Float32x4, 8)
    }
}

/// Primitive kind currently accumulated by a [`GeometryBatch`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PrimitiveKind {
    #[default]
    None,
    Line,
    Triangle,
    Quad,
}

impl PrimitiveKind {
    fn vertices(self) -> usize {
        match self {
            PrimitiveKind::None => 0,
            PrimitiveKind::Line => 2,
            PrimitiveKind::Triangle => 3,
            PrimitiveKind::Quad => 4,
        }
    }
}

/// Batches colored primitives. Switching kinds or reaching
/// [`GEO_BATCH_MAX_VERTICES`] flushes implicitly.
pub struct GeometryBatch {
    api: Rc<dyn GraphicsApi>,
    viewport: Viewport,
    layout: VertexLayoutHandle,
    vbo: BufferHandle<GeoVertex>,
    ibo: BufferHandle<u16>,
    kind: PrimitiveKind,
    vertices: Vec<GeoVertex>,
    indices: Vec<u16>,
}

impl GeometryBatch {
    pub fn new(api: Rc<dyn GraphicsApi>, viewport: Viewport) -> Self {
        Self {
            layout: VertexLayoutHandle::new(Rc::clone(&api), GeoVertex::layout()),
            vbo: BufferHandle::new(Rc::clone(&api), BufferKind::Vertex, BufferUsage::Dynamic),
            ibo: BufferHandle::new(Rc::clone(&api), BufferKind::Index, BufferUsage::Dynamic),
            api,
            viewport,
            kind: PrimitiveKind::None,
            vertices: Vec::with_capacity(GEO_BATCH_MAX_VERTICES),
            indices: Vec::new(),
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[inline]
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    #[inline]
    pub fn pending_vertices(&self) -> usize {
        self.vertices.len()
    }

    fn push(&mut self, kind: PrimitiveKind, points: &[Vec2], color: Color) {
        if self.kind != kind || self.vertices.len() + kind.vertices() >= GEO_BATCH_MAX_VERTICES {
            self.flush();
        }
        self.kind = kind;
        let color = color.as_vec4();
        let vp = self.viewport;
        self.vertices.extend(points.iter().map(|&p| GeoVertex { pos: vp.to_ndc(p), color }));
    }

    pub fn draw_line(&mut self, start: Vec2, end: Vec2, color: Color) {
        self.push(PrimitiveKind::Line, &[start, end], color);
    }

    pub fn draw_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        self.push(PrimitiveKind::Triangle, &[a, b, c], color);
    }

    /// Filled rect of `size` centered on `center`, rotated about it by `rotation` radians.
    pub fn draw_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, color: Color) {
        let corners = rect_corners(center, size, rotation);
        self.push(PrimitiveKind::Quad, &corners, color);
    }

    pub fn draw_rect_outline(&mut self, center: Vec2, size: Vec2, rotation: f32, color: Color) {
        // corners: left-bottom, left-top, right-bottom, right-top
        let [lb, lt, rb, rt] = rect_corners(center, size, rotation);
        self.draw_line(lt, rt, color);
        self.draw_line(rt, rb, color);
        self.draw_line(rb, lb, color);
        self.draw_line(lb, lt, color);
    }

    pub fn draw_triangle_outline(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        self.draw_line(a, b, color);
        self.draw_line(b, c, color);
        self.draw_line(c, a, color);
    }

    /// Uploads and draws the pending primitives, then resets the kind to `None`.
    pub fn flush(&mut self) {
        let kind = std::mem::take(&mut self.kind);
        if self.vertices.is_empty() {
            return;
        }

        self.indices.clear();
        let topology = match kind {
            PrimitiveKind::None => {
                self.vertices.clear();
                return;
            }
            PrimitiveKind::Line => {
                push_sequential_indices(self.vertices.len(), 2, &mut self.indices);
                Topology::Lines
            }
            PrimitiveKind::Triangle => {
                push_sequential_indices(self.vertices.len(), 3, &mut self.indices);
                Topology::Triangles
            }
            PrimitiveKind::Quad => {
                push_quad_indices(self.vertices.len() / 4, &mut self.indices);
                Topology::Triangles
            }
        };

        self.vbo.map(&self.vertices, 0);
        self.ibo.map(&self.indices, 0);
        let layout = self.layout.bind();
        self.api.use_program(Program::Geometry);
        self.api.draw(&DrawCall {
            program: Program::Geometry,
            topology,
            layout,
            vertices: self.vbo.id(),
            indices: Some(self.ibo.id()),
            count: self.indices.len() as u32,
        });
        log::trace!("geometry batch: {:?} x {} vertices", kind, self.vertices.len());

        self.vertices.clear();
        self.indices.clear();
    }
}

fn rect_corners(center: Vec2, size: Vec2, rotation: f32) -> [Vec2; 4] {
    let (w, h) = (size.x * 0.5, size.y * 0.5);
    let mut t = Transform::new();
    t.translate(center.x, center.y).rotate(rotation);
    [
        t.forward(Vec2::new(-w, h)),
        t.forward(Vec2::new(-w, -h)),
        t.forward(Vec2::new(w, h)),
        t.forward(Vec2::new(w, -h)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::RecordingApi;

    fn setup() -> (Rc<RecordingApi>, GeometryBatch) {
        let rec = Rc::new(RecordingApi::new());
        let batch = GeometryBatch::new(rec.clone(), Viewport::new(100.0, 100.0));
        (rec, batch)
    }

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn kind_switch_produces_two_draws() {
        let (rec, mut batch) = setup();
        batch.draw_line(v(0.0, 0.0), v(10.0, 10.0), Color::RED);
        batch.draw_triangle(v(0.0, 0.0), v(10.0, 0.0), v(0.0, 10.0), Color::GREEN);
        batch.flush();
        let draws = rec.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].topology, Topology::Lines);
        assert_eq!(draws[0].count, 2);
        assert_eq!(draws[1].topology, Topology::Triangles);
        assert_eq!(draws[1].count, 3);
    }

    #[test]
    fn capacity_flushes_before_reaching_limit() {
        let (rec, mut batch) = setup();
        for i in 0..24 {
            batch.draw_line(v(i as f32, 0.0), v(i as f32, 10.0), Color::WHITE);
        }
        assert_eq!(rec.draws().len(), 1);
        assert_eq!(rec.draws()[0].count, 46);
        assert_eq!(batch.pending_vertices(), 2);
        batch.flush();
        assert_eq!(rec.draws().len(), 2);
    }

    #[test]
    fn flush_without_vertices_is_silent() {
        let (rec, mut batch) = setup();
        batch.flush();
        batch.flush();
        assert!(rec.draws().is_empty());
        assert_eq!(batch.kind(), PrimitiveKind::None);
    }

    #[test]
    fn quads_use_quad_index_pattern() {
        let (rec, mut batch) = setup();
        batch.draw_rect(v(50.0, 50.0), v(20.0, 10.0), 0.0, Color::BLUE);
        batch.flush();
        let draw = rec.draws()[0];
        assert_eq!(draw.count, 6);
        let indices = rec.buffer_elems::<u16>(draw.indices.unwrap()).unwrap();
        assert_eq!(&indices[..6], &[0, 1, 3, 0, 3, 2]);
        let verts = rec.buffer_elems::<GeoVertex>(draw.vertices).unwrap();
        let vp = Viewport::new(100.0, 100.0);
        assert_eq!(verts[0].pos, vp.to_ndc(v(40.0, 55.0)));
        assert_eq!(verts[3].pos, vp.to_ndc(v(60.0, 45.0)));
    }

    #[test]
    fn outlines_emit_lines() {
        let (rec, mut batch) = setup();
        batch.draw_rect_outline(v(50.0, 50.0), v(10.0, 10.0), 0.0, Color::RED);
        batch.draw_triangle_outline(v(0.0, 0.0), v(10.0, 0.0), v(0.0, 10.0), Color::RED);
        assert_eq!(batch.kind(), PrimitiveKind::Line);
        assert_eq!(batch.pending_vertices(), 14);
        batch.flush();
        assert_eq!(rec.draws().len(), 1);
        assert_eq!(rec.draws()[0].count, 14);
    }

    #[test]
    fn rotated_rect_turns_about_center() {
        let corners = rect_corners(v(10.0, 10.0), v(4.0, 2.0), std::f32::consts::FRAC_PI_2);
        for c in corners {
            let d = c - v(10.0, 10.0);
            assert!((d.x.abs() - 1.0).abs() < 1e-4 && (d.y.abs() - 2.0).abs() < 1e-4, "{c:?}");
        }
    }
}
