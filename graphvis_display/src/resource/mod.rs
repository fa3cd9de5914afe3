/// Resource module - GPU resource lifecycle building blocks
///
/// Everything here is owned by the render thread. Producer-side code only ever
/// reaches these types through update tasks.

pub mod resource_state;
pub mod staged_buffer;
pub mod staged_uniform;
pub mod buffered_resource;
pub mod device_context;
pub mod render_thread;

pub use resource_state::{ResourceCategory, ResourceState, StateTable};
pub use staged_buffer::StagedBuffer;
pub use staged_uniform::StagedUniform;
pub use buffered_resource::BufferedResource;
pub use device_context::DeviceContext;
pub use render_thread::RenderThread;
