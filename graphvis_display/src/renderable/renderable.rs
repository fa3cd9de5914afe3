/// Renderable trait - what the display renderer sees of each drawable kind

use crate::error::Result;
use crate::graphics_device::{CommandBuffer, ResourceId, SwapchainInfo};
use crate::renderable::SharedResources;

/// One kind of drawable graph element with its own GPU resources
///
/// Every call happens on the render thread.
pub trait Renderable: Send {
    fn name(&self) -> &str;

    /// Bind the render thread and create the resources that outlive swapchains
    fn initialise(&mut self) -> Result<()>;

    fn set_new_swapchain(&mut self, swapchain: &SwapchainInfo) -> Result<()>;

    /// Whether [`Renderable::display_update`] has work to do this frame
    fn needs_display_update(&self, shared: &SharedResources) -> bool;

    fn display_update(&mut self, shared: &SharedResources) -> Result<()>;

    /// Record the draw for `image_index`, returning the command buffer id
    fn record_command_buffer(&mut self, image_index: usize) -> Result<ResourceId>;

    fn command_buffer(&self, image_index: usize) -> Option<&dyn CommandBuffer>;

    fn vertex_count(&self) -> usize;

    fn destroy(&mut self);

    fn is_destroyed(&self) -> bool;
}

/// Implement [`Renderable`] for a kind wrapping a `manager: ResourceManager<..>` field
macro_rules! delegate_renderable {
    ($kind:ty) => {
        impl $crate::renderable::Renderable for $kind {
            fn name(&self) -> &str {
                self.manager.name()
            }

            fn initialise(&mut self) -> $crate::error::Result<()> {
                self.manager.initialise()
            }

            fn set_new_swapchain(
                &mut self,
                swapchain: &$crate::graphics_device::SwapchainInfo,
            ) -> $crate::error::Result<()> {
                self.manager.set_new_swapchain(swapchain)
            }

            fn needs_display_update(&self, shared: &$crate::renderable::SharedResources) -> bool {
                self.manager.needs_display_update(shared)
            }

            fn display_update(
                &mut self,
                shared: &$crate::renderable::SharedResources,
            ) -> $crate::error::Result<()> {
                self.manager.display_update(shared)
            }

            fn record_command_buffer(
                &mut self,
                image_index: usize,
            ) -> $crate::error::Result<$crate::graphics_device::ResourceId> {
                self.manager.record_command_buffer(image_index)
            }

            fn command_buffer(
                &self,
                image_index: usize,
            ) -> Option<&dyn $crate::graphics_device::CommandBuffer> {
                self.manager.command_buffer(image_index)
            }

            fn vertex_count(&self) -> usize {
                self.manager.vertex_count()
            }

            fn destroy(&mut self) {
                self.manager.destroy()
            }

            fn is_destroyed(&self) -> bool {
                self.manager.is_destroyed()
            }
        }
    };
}

pub(crate) use delegate_renderable;
