/// Buffer - Vulkan implementation of the Buffer trait

use graphvis_display::graphvis::{Error, Result};
use graphvis_display::graphvis::device::{Buffer as GraphicsBuffer, MemoryLocation, ResourceId};
use graphvis_display::engine_error;
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan buffer implementation
pub struct Buffer {
    /// Shared GPU context (device, allocator)
    ctx: Arc<GpuContext>,
    /// Vulkan buffer
    pub(crate) buffer: vk::Buffer,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    /// Buffer size
    pub(crate) size: u64,
    location: MemoryLocation,
    id: ResourceId,
}

impl Buffer {
    pub fn new(
        ctx: Arc<GpuContext>,
        buffer: vk::Buffer,
        allocation: Allocation,
        size: u64,
        location: MemoryLocation,
    ) -> Self {
        Self {
            ctx,
            buffer,
            allocation: Some(allocation),
            size,
            location,
            id: ResourceId::next(),
        }
    }
}

impl GraphicsBuffer for Buffer {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn location(&self) -> MemoryLocation {
        self.location
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            return Err(Error::InvalidResource(format!(
                "write of {} bytes at {} overflows {}-byte buffer",
                data.len(),
                offset,
                self.size
            )));
        }
        let Some(allocation) = &self.allocation else {
            engine_error!("graphvis::vulkan", "Buffer update failed: no GPU allocation");
            return Err(Error::DriverCallFailure("Buffer has no allocation".to_string()));
        };
        let mapped_ptr = allocation
            .mapped_ptr()
            .ok_or_else(|| Error::InvalidResource("Buffer is not CPU-accessible".to_string()))?
            .as_ptr() as *mut u8;

        // SAFETY: the mapping covers `size` bytes and the range was checked above
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped_ptr.add(offset as usize), data.len());
        }
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.ctx.allocator() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
