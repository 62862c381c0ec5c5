//! Headless backend that records every call.
//!
//! Keeps buffer contents and texture sizes so callers can inspect what would
//! have reached the GPU. Used by the tests and by tools running without a device.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use bytemuck::Pod;

use super::api::{
    BufferKind, BufferUsage, DrawCall, GraphicsApi, Program, ResourceId, TEXTURE_UNITS, VertexLayoutDesc,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CreateBuffer { id: ResourceId, kind: BufferKind, size: u64 },
    ReallocateBuffer { id: ResourceId, size: u64 },
    WriteBuffer { id: ResourceId, offset: u64, len: usize },
    ClearBuffer { id: ResourceId },
    ReleaseBuffer { id: ResourceId },
    CreateVertexLayout { id: ResourceId },
    ReleaseVertexLayout { id: ResourceId },
    CreateTexture { id: ResourceId, width: u32, height: u32 },
    UpdateTexture { id: ResourceId, width: u32, height: u32 },
    ReleaseTexture { id: ResourceId },
    BindTexture { unit: u32, id: ResourceId },
    UseProgram(Program),
    Draw(DrawCall),
}

#[derive(Default)]
struct Inner {
    calls: Vec<ApiCall>,
    next_id: ResourceId,
    buffers: HashMap<ResourceId, Vec<u8>>,
    layouts: HashSet<ResourceId>,
    textures: HashMap<ResourceId, (u32, u32)>,
    releases: usize,
    program: Option<Program>,
}

impl Inner {
    fn alloc_id(&mut self) -> ResourceId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct RecordingApi {
    inner: RefCell<Inner>,
}

fn unknown(what: &str, id: ResourceId) {
    log::error!("RecordingApi: {what} on unknown id {id}");
    debug_assert!(false, "{what} on unknown id {id}");
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter_map(|c| if let ApiCall::Draw(d) = c { Some(*d) } else { None })
            .collect()
    }

    /// Number of calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.inner.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Total resources released so far (buffers, layouts, textures).
    pub fn releases(&self) -> usize {
        self.inner.borrow().releases
    }

    /// Resources currently alive.
    pub fn live(&self) -> usize {
        let inner = self.inner.borrow();
        inner.buffers.len() + inner.layouts.len() + inner.textures.len()
    }

    pub fn buffer_size(&self, id: ResourceId) -> Option<u64> {
        self.inner.borrow().buffers.get(&id).map(|b| b.len() as u64)
    }

    pub fn buffer_contents(&self, id: ResourceId) -> Option<Vec<u8>> {
        self.inner.borrow().buffers.get(&id).cloned()
    }

    /// Buffer contents reinterpreted as elements of `T`.
    pub fn buffer_elems<T: Pod>(&self, id: ResourceId) -> Option<Vec<T>> {
        let inner = self.inner.borrow();
        let bytes = inner.buffers.get(&id)?;
        Some(bytes.chunks_exact(size_of::<T>()).map(bytemuck::pod_read_unaligned).collect())
    }

    pub fn texture_size(&self, id: ResourceId) -> Option<(u32, u32)> {
        self.inner.borrow().textures.get(&id).copied()
    }

    /// Forgets recorded calls; live resources are kept.
    pub fn clear_log(&self) {
        self.inner.borrow_mut().calls.clear();
    }
}

impl GraphicsApi for RecordingApi {
    fn create_buffer(&self, kind: BufferKind, _usage: BufferUsage, size: u64) -> ResourceId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.alloc_id();
        inner.buffers.insert(id, vec![0; size as usize]);
        inner.calls.push(ApiCall::CreateBuffer { id, kind, size });
        id
    }

    fn reallocate_buffer(&self, id: ResourceId, size: u64) {
        let mut inner = self.inner.borrow_mut();
        let Some(buf) = inner.buffers.get_mut(&id) else {
            return unknown("reallocate_buffer", id);
        };
        *buf = vec![0; size as usize];
        inner.calls.push(ApiCall::ReallocateBuffer { id, size });
    }

    fn write_buffer(&self, id: ResourceId, offset: u64, bytes: &[u8]) {
        let mut inner = self.inner.borrow_mut();
        let Some(buf) = inner.buffers.get_mut(&id) else {
            return unknown("write_buffer", id);
        };
        let start = offset as usize;
        let end = start + bytes.len();
        if end > buf.len() {
            log::error!("RecordingApi: write of {} bytes at {start} overflows buffer {id} ({} bytes)", bytes.len(), buf.len());
            debug_assert!(false, "buffer write out of bounds");
            return;
        }
        buf[start..end].copy_from_slice(bytes);
        inner.calls.push(ApiCall::WriteBuffer { id, offset, len: bytes.len() });
    }

    fn clear_buffer(&self, id: ResourceId) {
        let mut inner = self.inner.borrow_mut();
        let Some(buf) = inner.buffers.get_mut(&id) else {
            return unknown("clear_buffer", id);
        };
        buf.fill(0);
        inner.calls.push(ApiCall::ClearBuffer { id });
    }

    fn release_buffer(&self, id: ResourceId) {
        let mut inner = self.inner.borrow_mut();
        if inner.buffers.remove(&id).is_none() {
            return unknown("release_buffer", id);
        }
        inner.releases += 1;
        inner.calls.push(ApiCall::ReleaseBuffer { id });
    }

    fn create_vertex_layout(&self, _desc: &VertexLayoutDesc) -> ResourceId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.alloc_id();
        inner.layouts.insert(id);
        inner.calls.push(ApiCall::CreateVertexLayout { id });
        id
    }

    fn release_vertex_layout(&self, id: ResourceId) {
        let mut inner = self.inner.borrow_mut();
        if !inner.layouts.remove(&id) {
            return unknown("release_vertex_layout", id);
        }
        inner.releases += 1;
        inner.calls.push(ApiCall::ReleaseVertexLayout { id });
    }

    fn create_texture(&self, width: u32, height: u32, _rgba: &[u8]) -> ResourceId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.alloc_id();
        inner.textures.insert(id, (width, height));
        inner.calls.push(ApiCall::CreateTexture { id, width, height });
        id
    }

    fn update_texture(&self, id: ResourceId, width: u32, height: u32, _rgba: &[u8]) {
        let mut inner = self.inner.borrow_mut();
        match inner.textures.get(&id) {
            None => return unknown("update_texture", id),
            Some(&size) if size != (width, height) => {
                log::error!("RecordingApi: update_texture {id} with {width}x{height}, created as {size:?}");
                debug_assert!(false, "texture size mismatch");
                return;
            }
            Some(_) => {}
        }
        inner.calls.push(ApiCall::UpdateTexture { id, width, height });
    }

    fn release_texture(&self, id: ResourceId) {
        let mut inner = self.inner.borrow_mut();
        if inner.textures.remove(&id).is_none() {
            return unknown("release_texture", id);
        }
        inner.releases += 1;
        inner.calls.push(ApiCall::ReleaseTexture { id });
    }

    fn bind_texture(&self, unit: u32, id: ResourceId) {
        debug_assert!(unit < TEXTURE_UNITS, "texture unit {unit} out of range");
        self.inner.borrow_mut().calls.push(ApiCall::BindTexture { unit, id });
    }

    fn use_program(&self, program: Program) {
        let mut inner = self.inner.borrow_mut();
        if inner.program == Some(program) {
            return;
        }
        inner.program = Some(program);
        inner.calls.push(ApiCall::UseProgram(program));
    }

    fn draw(&self, call: &DrawCall) {
        self.inner.borrow_mut().calls.push(ApiCall::Draw(*call));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_nonzero() {
        let api = RecordingApi::new();
        let a = api.create_buffer(BufferKind::Vertex, BufferUsage::Static, 8);
        let b = api.create_texture(1, 1, &[0; 4]);
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert_eq!(api.live(), 2);
    }

    #[test]
    fn writes_land_in_contents() {
        let api = RecordingApi::new();
        let id = api.create_buffer(BufferKind::Index, BufferUsage::Dynamic, 4);
        api.write_buffer(id, 2, &[7, 9]);
        assert_eq!(api.buffer_contents(id), Some(vec![0, 0, 7, 9]));
        api.clear_buffer(id);
        assert_eq!(api.buffer_contents(id), Some(vec![0; 4]));
    }

    #[test]
    fn repeated_program_is_recorded_once() {
        let api = RecordingApi::new();
        api.use_program(Program::Sprite);
        api.use_program(Program::Sprite);
        api.use_program(Program::Blit);
        assert_eq!(api.count(|c| matches!(c, ApiCall::UseProgram(_))), 2);
    }
}
