/// Visual module - the producer side of the display
///
/// Graph data is read through [`VisualAccess`]; change notifications are
/// consolidated and turned into update tasks by the [`VisualProcessor`].

pub mod visual_access;
pub mod memory_graph;
pub mod visual_change;
pub mod visual_processor;

pub use visual_access::{Blaze, ConnectionVisual, LineStyle, NodeVisual, VisualAccess};
pub use memory_graph::MemoryGraph;
pub use visual_change::{consolidate, VisualChange, VisualProperty};
pub use visual_processor::VisualProcessor;
