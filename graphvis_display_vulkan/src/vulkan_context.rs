/// GpuContext - Vulkan objects shared by every resource the device creates
///
/// Buffers, descriptor sets, pipelines and command buffers hold an
/// `Arc<GpuContext>` so they can release themselves on drop. Device and
/// instance destruction is left to `VulkanGraphicsDevice::drop`, which runs
/// once the last resource is gone.

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::{Mutex, MutexGuard};

use graphvis_display::graphvis::{Error, Result};

pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop so it is dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Graphics queue, also used for transfers
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Command pool for one-shot transfer command buffers
    /// (created with TRANSIENT + RESET_COMMAND_BUFFER flags)
    pub upload_command_pool: Mutex<vk::CommandPool>,

    /// Descriptor pools (created with FREE_DESCRIPTOR_SET, grown when exhausted)
    pub descriptor_pools: Mutex<Vec<vk::DescriptorPool>>,
}

impl GpuContext {
    pub fn new(
        device: ash::Device,
        allocator: Allocator,
        graphics_queue: vk::Queue,
        graphics_queue_family: u32,
        upload_command_pool: vk::CommandPool,
        descriptor_pool: vk::DescriptorPool,
    ) -> Self {
        Self {
            device,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            graphics_queue,
            graphics_queue_family,
            upload_command_pool: Mutex::new(upload_command_pool),
            descriptor_pools: Mutex::new(vec![descriptor_pool]),
        }
    }

    pub fn allocator(&self) -> Result<MutexGuard<'_, Allocator>> {
        self.allocator
            .lock()
            .map_err(|_| Error::DriverCallFailure("GPU allocator lock poisoned".to_string()))
    }

    pub fn upload_pool(&self) -> Result<MutexGuard<'_, vk::CommandPool>> {
        self.upload_command_pool
            .lock()
            .map_err(|_| Error::DriverCallFailure("upload command pool lock poisoned".to_string()))
    }

    pub fn descriptor_pools(&self) -> Result<MutexGuard<'_, Vec<vk::DescriptorPool>>> {
        self.descriptor_pools
            .lock()
            .map_err(|_| Error::DriverCallFailure("descriptor pool lock poisoned".to_string()))
    }
}
