/// Pipeline - Vulkan implementation of the Pipeline trait

use graphvis_display::graphvis::device::{Pipeline as GraphicsPipeline, ResourceId};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan pipeline implementation
pub struct Pipeline {
    ctx: Arc<GpuContext>,
    /// Vulkan graphics pipeline
    pub(crate) pipeline: vk::Pipeline,
    /// Pipeline layout (descriptor set binding and push constants)
    pub(crate) pipeline_layout: vk::PipelineLayout,
    name: String,
    id: ResourceId,
}

impl Pipeline {
    pub fn new(
        ctx: Arc<GpuContext>,
        pipeline: vk::Pipeline,
        pipeline_layout: vk::PipelineLayout,
        name: String,
    ) -> Self {
        Self {
            ctx,
            pipeline,
            pipeline_layout,
            name,
            id: ResourceId::next(),
        }
    }
}

impl GraphicsPipeline for Pipeline {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_pipeline(self.pipeline, None);
            self.ctx.device.destroy_pipeline_layout(self.pipeline_layout, None);
        }
    }
}
