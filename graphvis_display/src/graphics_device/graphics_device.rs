/// GraphicsDevice trait - factory for every GPU object a renderable owns

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferCopy, BufferDesc, CommandBuffer, DescriptorLayoutDesc, DescriptorSet,
    DescriptorWrite, Pipeline, PipelineDesc,
};

/// Process-unique identifier of a GPU object
///
/// Raw API handles can be recycled by the driver after destruction, so they
/// cannot tell a recreated buffer from the old one. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

impl ResourceId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value (for logging)
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Device capabilities the resource managers depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Required alignment of uniform buffer sizes and offsets, in bytes
    pub min_uniform_buffer_offset_alignment: u64,
    /// Maximum push constant block size, in bytes
    pub max_push_constants_size: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            min_uniform_buffer_offset_alignment: 256,
            max_push_constants_size: 128,
        }
    }
}

/// Backend configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable validation layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Descriptor sets per descriptor pool
    pub descriptor_pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Graphvis Display".to_string(),
            app_version: (1, 0, 0),
            descriptor_pool_size: 256,
        }
    }
}

/// Main graphics device trait
///
/// Creates GPU resources and performs the synchronous transfer and descriptor
/// calls the resource lifecycle needs. All calls are fail-fast: a failure is
/// returned immediately with no timeout or retry.
///
/// Resources are reference-counted; dropping the last handle destroys the GPU object.
pub trait GraphicsDevice: Send + Sync {
    /// Create a buffer
    ///
    /// Fails with `Error::AllocationFailure` when memory is exhausted.
    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Copy a byte region between two buffers and wait for completion
    fn copy_buffer(&mut self, src: &dyn Buffer, dst: &dyn Buffer, region: BufferCopy) -> Result<()>;

    /// Allocate a descriptor set with the given layout
    fn create_descriptor_set(&mut self, layout: &DescriptorLayoutDesc) -> Result<Arc<dyn DescriptorSet>>;

    /// Point descriptor bindings at buffers
    fn update_descriptor_set(&mut self, set: &dyn DescriptorSet, writes: &[DescriptorWrite<'_>]) -> Result<()>;

    /// Create a graphics pipeline
    fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Allocate a secondary command buffer
    fn create_command_buffer(&mut self) -> Result<Box<dyn CommandBuffer>>;

    /// Device capabilities
    fn limits(&self) -> DeviceLimits;

    /// Block until the device is idle
    fn wait_idle(&self) -> Result<()>;
}
