/// VisualProcessor - producer-side dispatcher of visual changes
///
/// Runs on the producer thread. Each change batch is consolidated, then every
/// surviving change becomes one or more update tasks for the renderables it
/// affects. Tasks capture their snapshot here and are sent in order; the render
/// thread commits them before its next display update.
///
/// A range change is only meaningful against the element count the render
/// thread already holds. When the graph's node or connection count differs
/// from the last full rebuild sent, the change is widened to a full rebuild of
/// every buffer indexed by those elements.

use crate::error::Result;
use crate::renderable::{axes, blazes, icons, link_labels, links, loops, node_labels};
use crate::renderable::{task_positions, RenderableSet};
use crate::task::{ChangeSet, TaskSender, UpdateTask};
use crate::visual::{consolidate, VisualAccess, VisualChange, VisualProperty};

const SOURCE: &str = "graphvis::VisualProcessor";

pub struct VisualProcessor {
    sender: TaskSender<RenderableSet>,
    // Element counts of the last full rebuilds sent
    node_count: Option<usize>,
    connection_count: Option<usize>,
    sent: usize,
}

impl VisualProcessor {
    pub fn new(sender: TaskSender<RenderableSet>) -> Self {
        Self {
            sender,
            node_count: None,
            connection_count: None,
            sent: 0,
        }
    }

    /// Total tasks sent so far
    pub fn tasks_sent(&self) -> usize {
        self.sent
    }

    /// Whether the render thread still listens
    pub fn is_connected(&self) -> bool {
        self.sender.is_connected()
    }

    /// Turn a batch of change notifications into tasks, returning how many were sent
    pub fn process(&mut self, access: &dyn VisualAccess, changes: &[VisualChange]) -> Result<usize> {
        let start = self.sent;
        for change in consolidate(changes) {
            self.dispatch(access, change)?;
        }
        let sent = self.sent - start;
        crate::engine_trace!(SOURCE, "{} changes -> {} tasks", changes.len(), sent);
        Ok(sent)
    }

    /// Send everything needed to draw `access` from scratch
    pub fn full_refresh(&mut self, access: &dyn VisualAccess) -> Result<usize> {
        let start = self.sent;
        self.send(axes::task_axes_vertices(), RenderableSet::axes_mut)?;
        self.rebuild_nodes(access)?;
        self.rebuild_connections(access)?;
        self.send(node_labels::task_node_labels_vertices(access, ChangeSet::Full), RenderableSet::node_labels_mut)?;
        self.send(link_labels::task_link_labels_vertices(access, ChangeSet::Full), RenderableSet::link_labels_mut)?;
        self.send(blazes::task_blazes_style(access), RenderableSet::blazes_mut)?;
        self.send(links::task_links_opacity(access), RenderableSet::links_mut)?;
        self.highlight(access)?;
        self.camera(access)?;
        let sent = self.sent - start;
        crate::engine_debug!(
            SOURCE,
            "Full refresh: {} nodes, {} connections, {} tasks",
            access.node_count(),
            access.connection_count(),
            sent
        );
        Ok(sent)
    }

    fn dispatch(&mut self, access: &dyn VisualAccess, change: VisualChange) -> Result<()> {
        use VisualProperty::*;

        let nodes_known = self.node_count == Some(access.node_count());
        let connections_known = self.connection_count == Some(access.connection_count());

        match change.property {
            VerticesRebuild => {
                self.rebuild_nodes(access)?;
                self.send(node_labels::task_node_labels_vertices(access, ChangeSet::Full), RenderableSet::node_labels_mut)?;
            }
            VertexX | VertexColor | VertexSelected | VertexForegroundIcon | NodeLabelsRebuild
                if !nodes_known =>
            {
                return self.dispatch(access, VisualChange::full(VerticesRebuild));
            }
            VertexX => {
                self.send(task_positions(access, change.changes), RenderableSet::shared_mut)?;
            }
            VertexColor | VertexForegroundIcon => {
                self.send(icons::task_icons_vertices(access, change.changes), RenderableSet::icons_mut)?;
            }
            // Label vertices carry the selected and dimmed flags too
            VertexSelected => {
                self.send(icons::task_icons_vertices(access, change.changes), RenderableSet::icons_mut)?;
                self.send(node_labels::task_node_labels_vertices(access, change.changes), RenderableSet::node_labels_mut)?;
            }
            VertexBlazed => {
                self.send(blazes::task_blazes_vertices(access), RenderableSet::blazes_mut)?;
            }
            NodeLabelsRebuild => {
                self.send(node_labels::task_node_labels_vertices(access, change.changes), RenderableSet::node_labels_mut)?;
            }
            ConnectionsRebuild => {
                self.rebuild_connections(access)?;
                self.send(link_labels::task_link_labels_vertices(access, ChangeSet::Full), RenderableSet::link_labels_mut)?;
            }
            ConnectionColor | ConnectionSelected | ConnectionLabelsRebuild if !connections_known => {
                return self.dispatch(access, VisualChange::full(ConnectionsRebuild));
            }
            ConnectionColor => {
                self.send(links::task_links_vertices(access, change.changes), RenderableSet::links_mut)?;
                self.send(loops::task_loops_vertices(access), RenderableSet::loops_mut)?;
            }
            ConnectionSelected => {
                self.send(links::task_links_vertices(access, change.changes), RenderableSet::links_mut)?;
                self.send(loops::task_loops_vertices(access), RenderableSet::loops_mut)?;
                self.send(link_labels::task_link_labels_vertices(access, change.changes), RenderableSet::link_labels_mut)?;
            }
            ConnectionLabelsRebuild => {
                self.send(link_labels::task_link_labels_vertices(access, change.changes), RenderableSet::link_labels_mut)?;
            }
            BlazeSize => {
                self.send(blazes::task_blazes_style(access), RenderableSet::blazes_mut)?;
            }
            ConnectionsOpacity => {
                self.send(links::task_links_opacity(access), RenderableSet::links_mut)?;
            }
            HighlightColour => self.highlight(access)?,
            Camera => self.camera(access)?,
            // Only master properties survive consolidation
            _ => {}
        }
        Ok(())
    }

    /// Every buffer indexed by node
    fn rebuild_nodes(&mut self, access: &dyn VisualAccess) -> Result<()> {
        self.send(task_positions(access, ChangeSet::Full), RenderableSet::shared_mut)?;
        self.send(icons::task_icons_vertices(access, ChangeSet::Full), RenderableSet::icons_mut)?;
        self.send(blazes::task_blazes_vertices(access), RenderableSet::blazes_mut)?;
        self.node_count = Some(access.node_count());
        Ok(())
    }

    /// Every buffer indexed by connection
    fn rebuild_connections(&mut self, access: &dyn VisualAccess) -> Result<()> {
        self.send(links::task_links_vertices(access, ChangeSet::Full), RenderableSet::links_mut)?;
        self.send(loops::task_loops_vertices(access), RenderableSet::loops_mut)?;
        self.connection_count = Some(access.connection_count());
        Ok(())
    }

    fn highlight(&mut self, access: &dyn VisualAccess) -> Result<()> {
        self.send(icons::task_icons_highlight(access), RenderableSet::icons_mut)?;
        self.send(node_labels::task_node_labels_highlight(access), RenderableSet::node_labels_mut)?;
        self.send(link_labels::task_link_labels_highlight(access), RenderableSet::link_labels_mut)?;
        self.send(loops::task_loops_highlight(access), RenderableSet::loops_mut)?;
        self.send(links::task_links_highlight(access), RenderableSet::links_mut)
    }

    fn camera(&mut self, access: &dyn VisualAccess) -> Result<()> {
        self.send(axes::task_axes_camera(access), RenderableSet::axes_mut)?;
        self.send(icons::task_icons_camera(access), RenderableSet::icons_mut)?;
        self.send(node_labels::task_node_labels_camera(access), RenderableSet::node_labels_mut)?;
        self.send(link_labels::task_link_labels_camera(access), RenderableSet::link_labels_mut)?;
        self.send(blazes::task_blazes_camera(access), RenderableSet::blazes_mut)?;
        self.send(loops::task_loops_camera(access), RenderableSet::loops_mut)?;
        self.send(links::task_links_camera(access), RenderableSet::links_mut)
    }

    fn send<T: 'static>(&mut self, task: UpdateTask<T>, select: fn(&mut RenderableSet) -> &mut T) -> Result<()> {
        self.sender.send(task.route(select))?;
        self.sent += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "visual_processor_tests.rs"]
mod tests;
