/// DescriptorSet - Vulkan implementation of the DescriptorSet trait

use graphvis_display::graphvis::device::{DescriptorSet as GraphicsDescriptorSet, ResourceId};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan descriptor set implementation
///
/// Returned to its pool on drop. The layout belongs to the device's layout cache.
pub struct DescriptorSet {
    ctx: Arc<GpuContext>,
    pub(crate) descriptor_set: vk::DescriptorSet,
    pool: vk::DescriptorPool,
    id: ResourceId,
}

impl DescriptorSet {
    pub fn new(ctx: Arc<GpuContext>, descriptor_set: vk::DescriptorSet, pool: vk::DescriptorPool) -> Self {
        Self {
            ctx,
            descriptor_set,
            pool,
            id: ResourceId::next(),
        }
    }
}

impl GraphicsDescriptorSet for DescriptorSet {
    fn id(&self) -> ResourceId {
        self.id
    }
}

impl Drop for DescriptorSet {
    fn drop(&mut self) {
        // Pools are externally synchronized: hold the pool lock while freeing
        if let Ok(_pools) = self.ctx.descriptor_pools() {
            unsafe {
                self.ctx.device.free_descriptor_sets(self.pool, &[self.descriptor_set]).ok();
            }
        }
    }
}
