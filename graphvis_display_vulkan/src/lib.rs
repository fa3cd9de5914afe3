/*!
# Graphvis Display - Vulkan Backend

Vulkan implementation of the graphvis display device traits.

This crate provides [`VulkanGraphicsDevice`](graphvis::VulkanGraphicsDevice), a
`GraphicsDevice` built on Ash for Vulkan bindings and gpu-allocator for memory
management. The host application owns the swapchain and render pass; the
renderables record secondary command buffers that the host executes inside
that render pass.

```no_run
use graphvis_display::graphvis::device::Config;
use graphvis_display::graphvis::resource::DeviceContext;
use graphvis_display_vulkan::graphvis::VulkanGraphicsDevice;

# fn run(window: &winit::window::Window) -> graphvis_display::graphvis::Result<()> {
let mut device = VulkanGraphicsDevice::new(window, Config::default())?;
let spirv = std::fs::read("shaders/icons.vert.spv").unwrap_or_default();
device.register_shader("icons.vert", &spirv)?;
let context = DeviceContext::from_device(device)?;
# Ok(())
# }
```
*/

mod vulkan;
mod vulkan_context;
mod vulkan_buffer;
mod vulkan_descriptor_set;
mod vulkan_pipeline;
mod vulkan_command_buffer;
mod vulkan_format;
mod vulkan_shader;
#[cfg(feature = "vulkan-validation")]
mod debug;

pub mod graphvis {
    pub use crate::vulkan::{raw_command_buffer, render_pass_handle, VulkanGraphicsDevice};
    pub use crate::vulkan_shader::ShaderLibrary;

    /// Vulkan resource types (for downcasting in host code)
    pub mod vulkan {
        pub use crate::vulkan_buffer::Buffer;
        pub use crate::vulkan_command_buffer::CommandBuffer;
        pub use crate::vulkan_context::GpuContext;
        pub use crate::vulkan_descriptor_set::DescriptorSet;
        pub use crate::vulkan_pipeline::Pipeline;
    }

    /// Validation layer statistics
    #[cfg(feature = "vulkan-validation")]
    pub mod validation {
        pub use crate::debug::{
            get_validation_stats, print_validation_stats_report, ValidationStats,
        };
    }
}
