/// Buffer trait and buffer descriptor

use bitflags::bitflags;
use crate::error::Result;
use crate::graphics_device::ResourceId;

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Vertex buffer
        const VERTEX = 1 << 0;
        /// Uniform buffer
        const UNIFORM = 1 << 1;
        /// Storage buffer (shared node positions)
        const STORAGE = 1 << 2;
        /// Source of a transfer
        const TRANSFER_SRC = 1 << 3;
        /// Destination of a transfer
        const TRANSFER_DST = 1 << 4;
    }
}

/// Where a buffer's memory lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLocation {
    /// Host-visible, persistently mapped (staging)
    HostVisible,
    /// GPU-local, not host-writable
    DeviceLocal,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Debug label
    pub label: String,
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
    /// Memory location
    pub location: MemoryLocation,
}

impl BufferDesc {
    /// Host-visible transfer source
    pub fn staging(label: impl Into<String>, size: u64) -> Self {
        Self {
            label: label.into(),
            size,
            usage: BufferUsage::TRANSFER_SRC,
            location: MemoryLocation::HostVisible,
        }
    }

    /// Device-local transfer destination with the given usage
    pub fn device_local(label: impl Into<String>, size: u64, usage: BufferUsage) -> Self {
        Self {
            label: label.into(),
            size,
            usage: usage | BufferUsage::TRANSFER_DST,
            location: MemoryLocation::DeviceLocal,
        }
    }
}

/// Byte region of a buffer-to-buffer copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCopy {
    pub src_offset: u64,
    pub dst_offset: u64,
    pub size: u64,
}

impl BufferCopy {
    /// Same region in source and destination
    pub fn aligned(offset: u64, size: u64) -> Self {
        Self { src_offset: offset, dst_offset: offset, size }
    }
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types (e.g., the Vulkan buffer).
/// The buffer is automatically destroyed when dropped.
pub trait Buffer: Send + Sync {
    /// Process-unique id
    fn id(&self) -> ResourceId;

    /// Size in bytes
    fn size(&self) -> u64;

    /// Memory location
    fn location(&self) -> MemoryLocation;

    /// Write data into a host-visible buffer
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;
}
