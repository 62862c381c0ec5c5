//! GPU resources behind an immediate-mode API seam.
//!
//! - `api`: the [`GraphicsApi`] trait and its plain-data vocabulary
//! - `handle`, `texture`: RAII owners of backend resources
//! - `wgpu_api`: the wgpu backend used at runtime
//! - `recording`: a headless backend that logs every call

mod api;
mod handle;
mod recording;
mod shaders;
mod texture;
mod wgpu_api;

pub use api::{
    AttribFormat, BufferKind, BufferUsage, DrawCall, GraphicsApi, NO_RESOURCE, Program, ResourceId, TEXTURE_UNITS,
    Topology, VertexAttrib, VertexLayoutDesc,
};
pub use handle::{BufferHandle, VertexLayoutHandle};
pub use recording::{ApiCall, RecordingApi};
pub use shaders::ShaderRegistry;
pub use texture::Texture;
pub use wgpu_api::WgpuApi;
