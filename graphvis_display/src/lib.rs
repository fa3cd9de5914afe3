/*!
# Graphvis Display

Core types for the GPU display of a graph visualisation.

Each kind of graph element (axes, node icons, labels, blazes, loops, links) is
drawn by a *renderable* that owns its GPU resources. This crate implements the
lifecycle of those resources: when they are rebuilt, updated in place or left
alone, driven by update tasks prepared on a producer thread and committed on
the render thread.

## Architecture

- **GraphicsDevice**: factory trait for buffers, descriptor sets, pipelines and command buffers
- **StateTable**: per-category resource state (`Clean`, `NeedsUpdate`, `NeedsRebuild`)
- **StagedBuffer**: host-visible staging buffer paired with a device-local buffer
- **UpdateTask**: move-only deferred work handed from the producer to the render thread
- **ResourceManager**: generic per-renderable state machine, implemented once
- **DisplayRenderer**: render-thread frame loop over every renderable

Backend implementations (Vulkan) provide concrete types for the device traits.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod graphics_device;
pub mod resource;
pub mod task;
pub mod visual;
pub mod renderable;
pub mod renderer;

// Main graphvis namespace module
pub mod graphvis {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton (logging)
    pub use crate::engine::Engine;

    // Graphics device trait
    pub use crate::graphics_device::GraphicsDevice;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Device sub-module with all backend-facing types
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Resource lifecycle sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Update task sub-module
    pub mod task {
        pub use crate::task::*;
    }

    // Graph data access sub-module
    pub mod visual {
        pub use crate::visual::*;
    }

    // Renderables sub-module
    pub mod renderable {
        pub use crate::renderable::*;
    }

    // Frame loop sub-module
    pub mod renderer {
        pub use crate::renderer::*;
    }
}

// Re-export math library at crate root
pub use glam;
