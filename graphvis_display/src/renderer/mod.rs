/// Renderer module - the render-thread side of the display

// Module declarations
pub mod display_config;
pub mod display_renderer;

pub use display_config::DisplayConfig;
pub use display_renderer::{create_display, DisplayRenderer, FrameOutcome};
