//! GPU device + surface management.
//!
//! - `gpu`: Instance/Adapter/Device/Queue and the configured swapchain
//! - `surface`: format/alpha selection, resize and error recovery
//! - `frame`: a single acquired swapchain frame

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
