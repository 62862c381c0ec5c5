//! Immediate-mode graphics seam.
//!
//! Resource handles, the canvas and the batch renderers talk to the GPU only
//! through [`GraphicsApi`]. Resources are referred to by [`ResourceId`]; id 0
//! never names a live resource.

/// Opaque backend resource id. `0` means "no resource".
pub type ResourceId = u32;

pub const NO_RESOURCE: ResourceId = 0;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    Vertex,
    /// `u16` element indices.
    Index,
}

/// Update-frequency hint. Backends may ignore it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BufferUsage {
    #[default]
    Static,
    Dynamic,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttribFormat {
    Float32,
    Float32x2,
    Float32x4,
    Uint32,
}

impl AttribFormat {
    pub const fn size(self) -> u32 {
        match self {
            AttribFormat::Float32 | AttribFormat::Uint32 => 4,
            AttribFormat::Float32x2 => 8,
            AttribFormat::Float32x4 => 16,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttrib {
    pub location: u32,
    pub format: AttribFormat,
    /// Byte offset inside one vertex.
    pub offset: u32,
}

/// Interleaved vertex layout: one buffer, fixed stride.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct VertexLayoutDesc {
    pub stride: u32,
    pub attribs: Vec<VertexAttrib>,
}

impl VertexLayoutDesc {
    pub fn new(stride: u32) -> Self {
        Self { stride, attribs: Vec::new() }
    }

    /// Appends an attribute; builder style.
    pub fn attrib(mut self, location: u32, format: AttribFormat, offset: u32) -> Self {
        self.attribs.push(VertexAttrib { location, format, offset });
        self
    }
}

/// Fixed shader programs known to every backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Program {
    /// Full-screen textured quad (layer compositing).
    Blit,
    /// Textured, tinted quads sampling one of the bound texture units.
    Sprite,
    /// Flat-colored lines and triangles.
    Geometry,
}

impl Program {
    pub const ALL: [Program; 3] = [Program::Blit, Program::Sprite, Program::Geometry];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    Triangles,
    TriangleStrip,
    Lines,
}

/// One draw submitted with the currently active program and texture units.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub program: Program,
    pub topology: Topology,
    pub layout: ResourceId,
    pub vertices: ResourceId,
    /// Index buffer; `None` draws `count` vertices in order.
    pub indices: Option<ResourceId>,
    /// Number of indices (or vertices when `indices` is `None`).
    pub count: u32,
}

/// Graphics backend. Shared as `Rc<dyn GraphicsApi>`, so methods take `&self`.
pub trait GraphicsApi {
    /// Allocates a zero-filled buffer of `size` bytes.
    fn create_buffer(&self, kind: BufferKind, usage: BufferUsage, size: u64) -> ResourceId;
    /// Replaces the storage of `id` with `size` fresh zeroed bytes.
    fn reallocate_buffer(&self, id: ResourceId, size: u64);
    fn write_buffer(&self, id: ResourceId, offset: u64, bytes: &[u8]);
    fn clear_buffer(&self, id: ResourceId);
    fn release_buffer(&self, id: ResourceId);

    fn create_vertex_layout(&self, desc: &VertexLayoutDesc) -> ResourceId;
    fn release_vertex_layout(&self, id: ResourceId);

    /// Creates a 2D RGBA8 texture initialised from `rgba` (row-major, tightly packed).
    fn create_texture(&self, width: u32, height: u32, rgba: &[u8]) -> ResourceId;
    /// Overwrites the full texture. Dimensions must match its creation size.
    fn update_texture(&self, id: ResourceId, width: u32, height: u32, rgba: &[u8]);
    fn release_texture(&self, id: ResourceId);

    /// Binds a texture to unit `unit` (`0..TEXTURE_UNITS`).
    fn bind_texture(&self, unit: u32, id: ResourceId);
    /// Selects the program for subsequent draws. Re-selecting the active program does nothing.
    fn use_program(&self, program: Program);
    fn draw(&self, call: &DrawCall);
}

/// Number of texture units every backend exposes.
pub const TEXTURE_UNITS: u32 = 16;
