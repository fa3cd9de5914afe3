/// SharedResources - GPU data read by several renderables
///
/// Node positions live in one storage buffer that icons, node labels and
/// blazes all bind. It is synced before any renderable's display update, so
/// every renderable sees the same buffer within a frame. Renderables notice a
/// recreated buffer by its id and refresh their descriptor sets.

use std::sync::Arc;
use glam::Vec4;

use crate::error::{Error, Result};
use crate::graphics_device::{Buffer, BufferUsage, ResourceId};
use crate::resource::{DeviceContext, RenderThread, ResourceState, StagedBuffer};
use crate::task::{ChangeSet, UpdateTask, VertexSnapshot};
use crate::visual::VisualAccess;

const SOURCE: &str = "graphvis::SharedResources";

pub struct SharedResources {
    context: Arc<DeviceContext>,
    render_thread: RenderThread,
    positions: StagedBuffer<Vec4>,
    state: ResourceState,
}

impl SharedResources {
    pub fn new(context: Arc<DeviceContext>) -> Self {
        Self {
            context,
            render_thread: RenderThread::new(),
            positions: StagedBuffer::new("node positions", BufferUsage::STORAGE),
            state: ResourceState::Clean,
        }
    }

    /// Bind to the render thread
    pub fn initialise(&mut self) {
        self.render_thread.bind();
    }

    /// Stage node positions (xyz, radius in w)
    pub fn commit_positions(&mut self, snapshot: VertexSnapshot<Vec4>) -> Result<()> {
        self.render_thread.verify("commit_positions");
        match snapshot {
            VertexSnapshot::Rebuild(positions) => {
                let context = Arc::clone(&self.context);
                let mut device = context.lock_device()?;
                let staged = self.positions.stage_rebuild(&mut *device, &positions);
                self.state = self.state.merge(ResourceState::NeedsRebuild);
                staged?;
            }
            VertexSnapshot::Partial { first, vertices, element_count } => {
                if element_count != self.positions.count() {
                    crate::engine_warn!(
                        SOURCE,
                        "position update for {} nodes, {} staged",
                        element_count,
                        self.positions.count()
                    );
                    return Err(Error::InvalidRange {
                        first,
                        last: first + vertices.len().saturating_sub(1),
                        count: self.positions.count(),
                    });
                }
                let staged = self.positions.stage_partial(first, &vertices);
                if self.positions.has_pending_copy() {
                    self.state = self.state.merge(ResourceState::NeedsUpdate);
                }
                staged?;
            }
        }
        Ok(())
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn needs_update(&self) -> bool {
        self.state.is_dirty()
    }

    /// Copy staged positions to the device buffer
    pub fn sync(&mut self) -> Result<()> {
        self.render_thread.verify("sync");
        if !self.state.is_dirty() {
            return Ok(());
        }
        let rebuild = self.state == ResourceState::NeedsRebuild;
        let context = Arc::clone(&self.context);
        let mut device = context.lock_device()?;
        self.positions.sync_device(&mut *device, rebuild)?;
        crate::engine_trace!(
            SOURCE,
            "{} node positions synced ({})",
            self.positions.count(),
            if rebuild { "rebuild" } else { "update" }
        );
        self.state = ResourceState::Clean;
        Ok(())
    }

    pub fn positions(&self) -> &StagedBuffer<Vec4> {
        &self.positions
    }

    pub fn positions_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.positions.device_buffer()
    }

    pub fn positions_id(&self) -> Option<ResourceId> {
        self.positions.device_id()
    }

    pub fn node_count(&self) -> usize {
        self.positions.count()
    }

    pub fn destroy(&mut self) {
        self.render_thread.verify("destroy");
        self.positions.destroy();
        self.state = ResourceState::Clean;
    }
}

/// Snapshot node positions (xyz) and radii (w) for the changed nodes
pub fn task_positions(access: &dyn VisualAccess, change: ChangeSet) -> UpdateTask<SharedResources> {
    let snapshot = VertexSnapshot::build(change, access.node_count(), |i| {
        let node = access.node(i);
        node.position.extend(node.radius)
    });
    UpdateTask::new("positions", move |shared: &mut SharedResources| shared.commit_positions(snapshot))
}

#[cfg(test)]
#[path = "shared_resources_tests.rs"]
mod tests;
