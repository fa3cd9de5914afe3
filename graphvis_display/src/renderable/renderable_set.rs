/// RenderableSet - every renderable kind plus the resources they share
///
/// The task queue is typed on the whole set; kind-specific tasks are routed
/// to their field with the `*_mut` selectors.

use std::sync::Arc;

use crate::renderable::{
    Axes, Blazes, Icons, LinkLabels, Links, Loops, NodeLabels, Renderable, SharedResources,
};
use crate::renderer::DisplayConfig;
use crate::resource::DeviceContext;

/// Number of renderable kinds
pub const RENDERABLE_COUNT: usize = 7;

pub struct RenderableSet {
    pub axes: Axes,
    pub icons: Icons,
    pub node_labels: NodeLabels,
    pub link_labels: LinkLabels,
    pub blazes: Blazes,
    pub loops: Loops,
    pub links: Links,
    pub shared: SharedResources,
}

impl RenderableSet {
    pub fn new(context: Arc<DeviceContext>, config: &DisplayConfig) -> Self {
        Self {
            axes: Axes::new(Arc::clone(&context), config),
            icons: Icons::new(Arc::clone(&context), config),
            node_labels: NodeLabels::new(Arc::clone(&context), config),
            link_labels: LinkLabels::new(Arc::clone(&context), config),
            blazes: Blazes::new(Arc::clone(&context), config),
            loops: Loops::new(Arc::clone(&context), config),
            links: Links::new(Arc::clone(&context), config),
            shared: SharedResources::new(context),
        }
    }

    /// Renderables in draw order: links under loops under icons, labels on top
    pub fn renderables(&self) -> [&dyn Renderable; RENDERABLE_COUNT] {
        [
            &self.links,
            &self.loops,
            &self.icons,
            &self.blazes,
            &self.node_labels,
            &self.link_labels,
            &self.axes,
        ]
    }

    /// Shared resources alongside mutable renderables, in draw order
    pub fn split_mut(&mut self) -> (&SharedResources, [&mut dyn Renderable; RENDERABLE_COUNT]) {
        (
            &self.shared,
            [
                &mut self.links,
                &mut self.loops,
                &mut self.icons,
                &mut self.blazes,
                &mut self.node_labels,
                &mut self.link_labels,
                &mut self.axes,
            ],
        )
    }

    /// Look a renderable up by name
    pub fn find(&self, name: &str) -> Option<&dyn Renderable> {
        self.renderables().into_iter().find(|r| r.name() == name)
    }

    // ===== TASK ROUTING =====

    pub fn axes_mut(&mut self) -> &mut Axes {
        &mut self.axes
    }

    pub fn icons_mut(&mut self) -> &mut Icons {
        &mut self.icons
    }

    pub fn node_labels_mut(&mut self) -> &mut NodeLabels {
        &mut self.node_labels
    }

    pub fn link_labels_mut(&mut self) -> &mut LinkLabels {
        &mut self.link_labels
    }

    pub fn blazes_mut(&mut self) -> &mut Blazes {
        &mut self.blazes
    }

    pub fn loops_mut(&mut self) -> &mut Loops {
        &mut self.loops
    }

    pub fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }

    pub fn shared_mut(&mut self) -> &mut SharedResources {
        &mut self.shared
    }
}
