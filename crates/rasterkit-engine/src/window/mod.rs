//! Window + runtime loop.
//!
//! Owns the `winit` event loop and windows, and binds each window to a GPU
//! context and a [`crate::gpu::WgpuApi`] backend.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
