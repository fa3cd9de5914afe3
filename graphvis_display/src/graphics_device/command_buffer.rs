/// CommandBuffer trait - secondary command buffer recorded per swapchain image

use crate::error::Result;
use crate::graphics_device::{
    Buffer, DescriptorSet, Pipeline, RenderPassHandle, ResourceId, ShaderStageFlags,
};

/// Viewport rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-extent viewport with a [0, 1] depth range
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Command buffer for recording one renderable's draw
///
/// Recorded as a secondary command buffer executed inside the frame's render pass.
pub trait CommandBuffer: Send + Sync {
    /// Process-unique id
    fn id(&self) -> ResourceId;

    /// Reset and begin recording inside `render_pass`
    fn begin(&mut self, render_pass: RenderPassHandle) -> Result<()>;

    /// Set the dynamic viewport and scissor
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Bind a graphics pipeline
    fn bind_pipeline(&mut self, pipeline: &dyn Pipeline) -> Result<()>;

    /// Bind a descriptor set at set index 0 of `pipeline`'s layout
    fn bind_descriptor_set(&mut self, pipeline: &dyn Pipeline, set: &dyn DescriptorSet) -> Result<()>;

    /// Bind the vertex buffer at binding 0
    fn bind_vertex_buffer(&mut self, buffer: &dyn Buffer, offset: u64) -> Result<()>;

    /// Push constants
    fn push_constants(
        &mut self,
        pipeline: &dyn Pipeline,
        stages: ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) -> Result<()>;

    /// Draw non-indexed vertices
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    /// Finish recording
    fn end(&mut self) -> Result<()>;
}
