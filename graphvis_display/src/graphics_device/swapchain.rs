/// Swapchain description consumed by the renderables
///
/// Presentation itself (image acquisition, present) belongs to the host; the
/// renderables only need the image count, the pixel extent and the render pass
/// their command buffers are recorded against.

/// Opaque render pass handle (backend raw handle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderPassHandle(pub u64);

/// Current swapchain properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainInfo {
    /// Number of images the presentation layer rotates through
    pub image_count: usize,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Render pass command buffers are recorded against
    pub render_pass: RenderPassHandle,
}

impl SwapchainInfo {
    /// Width / height, 1.0 for a degenerate extent
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}
