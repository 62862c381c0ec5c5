//! Layered compositor over CPU pixel surfaces.
//!
//! A [`Canvas`] owns an ordered stack of [`Layer`]s. Software drawing goes to
//! the current layer through [`Canvas::raster`]; [`Canvas::swap_buffers`]
//! re-uploads every layer and blits it as a full-screen quad, bottom layer first.

mod layer;

pub use layer::Layer;

use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use crate::coords::Viewport;
use crate::gpu::{
    AttribFormat, BufferHandle, BufferKind, BufferUsage, DrawCall, GraphicsApi, Program, Texture, Topology,
    VertexLayoutDesc, VertexLayoutHandle,
};
use crate::paint::{Color, PixelMode};
use crate::raster::Rasterizer;
use crate::surface::BoundaryMode;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BlitVertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

/// Triangle strip covering clip space; surface row 0 maps to the top edge.
const BLIT_QUAD: [BlitVertex; 4] = [
    BlitVertex { pos: [-1.0, 1.0], uv: [0.0, 0.0] },
    BlitVertex { pos: [-1.0, -1.0], uv: [0.0, 1.0] },
    BlitVertex { pos: [1.0, 1.0], uv: [1.0, 0.0] },
    BlitVertex { pos: [1.0, -1.0], uv: [1.0, 1.0] },
];

fn blit_layout() -> VertexLayoutDesc {
    VertexLayoutDesc::new(size_of::<BlitVertex>() as u32)
        .attrib(0, AttribFormat::Float32x2, 0)
        .attrib(1, AttribFormat::Float32x2, 8)
}

pub struct Canvas {
    api: Rc<dyn GraphicsApi>,
    layers: Vec<Layer>,
    current: usize,
    pixel_mode: PixelMode,
    blit_layout: VertexLayoutHandle,
    blit_vbo: BufferHandle<BlitVertex>,
}

impl Canvas {
    /// Creates a canvas with a single `width × height` layer.
    pub fn new(api: Rc<dyn GraphicsApi>, width: i32, height: i32) -> Self {
        Self {
            blit_layout: VertexLayoutHandle::new(Rc::clone(&api), blit_layout()),
            blit_vbo: BufferHandle::new(Rc::clone(&api), BufferKind::Vertex, BufferUsage::Static),
            api,
            layers: vec![Layer::new(width, height)],
            current: 0,
            pixel_mode: PixelMode::Normal,
        }
    }

    #[inline]
    pub fn api(&self) -> &Rc<dyn GraphicsApi> {
        &self.api
    }

    /// Rasterizer targeting the current layer, with its camera offset applied.
    pub fn raster(&mut self) -> Rasterizer<'_> {
        let mode = self.pixel_mode;
        let layer = &mut self.layers[self.current];
        let offset = layer.camera_offset();
        Rasterizer::new(&mut layer.surface).with_pixel_mode(mode).with_offset(offset)
    }

    /// Fills the current layer.
    pub fn clear(&mut self, color: Color) {
        self.layers[self.current].surface.fill(color);
    }

    /// Appends a layer on top of the stack and returns its index.
    pub fn create_layer(&mut self, width: i32, height: i32) -> usize {
        self.layers.push(Layer::new(width, height));
        log::debug!("canvas: layer {} created ({width}x{height})", self.layers.len() - 1);
        self.layers.len() - 1
    }

    /// Makes `index` the draw target. Out-of-range indices are ignored.
    pub fn set_current_layer(&mut self, index: usize) {
        if index < self.layers.len() {
            self.current = index;
        } else {
            log::warn!("canvas: no layer {index} ({} layers)", self.layers.len());
        }
    }

    #[inline]
    pub fn current_layer(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Boundary policy of the current layer's surface.
    pub fn set_boundary_mode(&mut self, mode: BoundaryMode) {
        self.layers[self.current].surface.set_boundary_mode(mode);
    }

    pub fn boundary_mode(&self) -> BoundaryMode {
        self.layers[self.current].surface.boundary_mode()
    }

    pub fn set_pixel_mode(&mut self, mode: PixelMode) {
        self.pixel_mode = mode;
    }

    #[inline]
    pub fn pixel_mode(&self) -> PixelMode {
        self.pixel_mode
    }

    /// Size of the current layer.
    pub fn screen_size(&self) -> Viewport {
        let s = &self.layers[self.current].surface;
        Viewport::new(s.width() as f32, s.height() as f32)
    }

    /// Uploads every layer and composites it over the frame, in layer order.
    pub fn swap_buffers(&mut self) {
        if !self.blit_vbo.is_built() {
            self.blit_vbo.build(&BLIT_QUAD);
        }
        let layout = self.blit_layout.bind();
        let vertices = self.blit_vbo.bind();

        self.api.use_program(Program::Blit);
        for layer in &mut self.layers {
            match layer.texture.as_mut() {
                Some(texture) => texture.update(&layer.surface),
                None => layer.texture = Some(Texture::from_surface(Rc::clone(&self.api), &layer.surface)),
            }
            let Some(texture) = layer.texture.as_ref().filter(|t| t.is_allocated()) else {
                continue;
            };
            texture.bind(0);
            self.api.draw(&DrawCall {
                program: Program::Blit,
                topology: Topology::TriangleStrip,
                layout,
                vertices,
                indices: None,
                count: BLIT_QUAD.len() as u32,
            });
        }
    }
}
