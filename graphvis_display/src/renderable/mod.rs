/// Renderable module - the drawable graph element kinds
///
/// Every kind wraps one generic [`ResourceManager`] configured by a
/// [`RenderableDesc`] and exposes producer-side `task_*` functions that read
/// [`VisualAccess`](crate::visual::VisualAccess) and return update tasks.

pub mod resource_manager;
pub mod renderable;
pub mod uniforms;
pub mod shared_resources;
pub mod renderable_set;
pub mod axes;
pub mod icons;
pub mod node_labels;
pub mod link_labels;
pub mod blazes;
pub mod loops;
pub mod links;

pub use resource_manager::{GeometryHook, RenderableDesc, ResourceManager};
pub use renderable::Renderable;
pub use shared_resources::{task_positions, SharedResources};
pub use renderable_set::{RenderableSet, RENDERABLE_COUNT};
pub use axes::Axes;
pub use icons::Icons;
pub use node_labels::NodeLabels;
pub use link_labels::LinkLabels;
pub use blazes::Blazes;
pub use loops::Loops;
pub use links::Links;
