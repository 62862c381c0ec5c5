//! Move-only RAII wrappers around backend buffers and vertex layouts.
//!
//! A handle owns at most one backend resource and releases it exactly once:
//! explicitly through `release`, or on drop. Allocation is lazy; `bind` and
//! `map` build the resource on first use.

use std::marker::PhantomData;
use std::rc::Rc;

use bytemuck::Pod;

use super::api::{BufferKind, BufferUsage, GraphicsApi, NO_RESOURCE, ResourceId, VertexLayoutDesc};

/// Typed GPU buffer holding elements of `T`.
///
/// `capacity` counts elements, not bytes.
pub struct BufferHandle<T: Pod> {
    api: Rc<dyn GraphicsApi>,
    id: ResourceId,
    capacity: usize,
    kind: BufferKind,
    usage: BufferUsage,
    _elem: PhantomData<T>,
}

impl<T: Pod> BufferHandle<T> {
    /// Creates an empty handle; no backend resource is allocated yet.
    pub fn new(api: Rc<dyn GraphicsApi>, kind: BufferKind, usage: BufferUsage) -> Self {
        Self {
            api,
            id: NO_RESOURCE,
            capacity: 0,
            kind,
            usage,
            _elem: PhantomData,
        }
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.id != NO_RESOURCE
    }

    #[inline]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    fn byte_len(elems: usize) -> u64 {
        (elems * size_of::<T>()) as u64
    }

    /// (Re)allocates the buffer sized to `data` and uploads it.
    pub fn build(&mut self, data: &[T]) {
        self.release();
        self.id = self.api.create_buffer(self.kind, self.usage, Self::byte_len(data.len()));
        self.capacity = data.len();
        if !data.is_empty() {
            self.api.write_buffer(self.id, 0, bytemuck::cast_slice(data));
        }
        log::debug!("buffer {} built ({:?}, {} elems)", self.id, self.kind, self.capacity);
    }

    /// Uploads `data` starting at element `offset`.
    ///
    /// Builds the buffer on first use. Growing past the current capacity
    /// reallocates (previous contents are discarded); otherwise writes in place.
    pub fn map(&mut self, data: &[T], offset: usize) {
        let required = offset + data.len();
        if !self.is_built() {
            self.id = self.api.create_buffer(self.kind, self.usage, Self::byte_len(required));
            self.capacity = required;
        } else if required > self.capacity {
            self.api.reallocate_buffer(self.id, Self::byte_len(required));
            self.capacity = required;
        }
        if !data.is_empty() {
            self.api.write_buffer(self.id, Self::byte_len(offset), bytemuck::cast_slice(data));
        }
    }

    /// Ensures room for `elems` elements. Never shrinks.
    pub fn resize(&mut self, elems: usize) {
        if elems <= self.capacity && self.is_built() {
            return;
        }
        if self.is_built() {
            self.api.reallocate_buffer(self.id, Self::byte_len(elems));
        } else {
            self.id = self.api.create_buffer(self.kind, self.usage, Self::byte_len(elems));
        }
        self.capacity = elems;
    }

    /// Zero-fills the allocation.
    pub fn clear(&mut self) {
        if self.is_built() && self.capacity != 0 {
            self.api.clear_buffer(self.id);
        }
    }

    /// Returns the backend id, building an empty buffer if needed.
    pub fn bind(&mut self) -> ResourceId {
        if !self.is_built() {
            self.build(&[]);
        }
        self.id
    }

    /// Moves the resource into a new handle, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        let out = Self {
            api: Rc::clone(&self.api),
            id: self.id,
            capacity: self.capacity,
            kind: self.kind,
            usage: self.usage,
            _elem: PhantomData,
        };
        self.id = NO_RESOURCE;
        self.capacity = 0;
        out
    }

    /// Frees the backend resource. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.is_built() {
            self.api.release_buffer(self.id);
            self.id = NO_RESOURCE;
            self.capacity = 0;
        }
    }
}

impl<T: Pod> Drop for BufferHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Owns a vertex-layout object describing how a vertex buffer is read.
pub struct VertexLayoutHandle {
    api: Rc<dyn GraphicsApi>,
    id: ResourceId,
    desc: VertexLayoutDesc,
}

impl VertexLayoutHandle {
    pub fn new(api: Rc<dyn GraphicsApi>, desc: VertexLayoutDesc) -> Self {
        Self { api, id: NO_RESOURCE, desc }
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    #[inline]
    pub fn desc(&self) -> &VertexLayoutDesc {
        &self.desc
    }

    pub fn build(&mut self) {
        self.release();
        self.id = self.api.create_vertex_layout(&self.desc);
        log::debug!("vertex layout {} built (stride {})", self.id, self.desc.stride);
    }

    /// Returns the backend id, building the layout on first use.
    pub fn bind(&mut self) -> ResourceId {
        if self.id == NO_RESOURCE {
            self.build();
        }
        self.id
    }

    pub fn take(&mut self) -> Self {
        let out = Self {
            api: Rc::clone(&self.api),
            id: self.id,
            desc: self.desc.clone(),
        };
        self.id = NO_RESOURCE;
        out
    }

    pub fn release(&mut self) {
        if self.id != NO_RESOURCE {
            self.api.release_vertex_layout(self.id);
            self.id = NO_RESOURCE;
        }
    }
}

impl Drop for VertexLayoutHandle {
    fn drop(&mut self) {
        self.release();
    }
}
