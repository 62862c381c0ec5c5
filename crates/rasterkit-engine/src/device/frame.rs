/// One acquired swapchain frame.
///
/// Holding it blocks acquisition of the next frame; hand it back to
/// [`super::Gpu::present`] promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    /// Commands recorded directly by the frame owner (the clear pass).
    pub encoder: wgpu::CommandEncoder,
}
