/// Graphics device module - the backend-facing traits and descriptors
///
/// The core never talks to a graphics API directly. Backends (Vulkan) implement
/// these traits; tests use the headless mock.

// Module declarations
pub mod graphics_device;
pub mod buffer;
pub mod descriptor_set;
pub mod pipeline;
pub mod command_buffer;
pub mod swapchain;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use buffer::*;
pub use descriptor_set::*;
pub use pipeline::*;
pub use command_buffer::*;
pub use swapchain::*;

// Headless graphics device (no GPU required), used by unit and integration tests
pub mod mock_graphics_device;
