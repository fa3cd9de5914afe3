/// DisplayRenderer - render-thread frame loop over every renderable
///
/// Owns the [`RenderableSet`] and the receiving end of the task queue. A frame
/// drains queued tasks, brings dirty resources up to date (shared positions
/// first, then each renderable in draw order) and records one command buffer
/// per non-empty renderable for the requested swapchain image.
///
/// A failing frame is dropped without rollback: whatever was rebuilt stays
/// rebuilt, the failed category stays dirty and is retried next frame.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::graphics_device::{ResourceId, SwapchainInfo};
use crate::renderable::{Renderable, RenderableSet};
use crate::renderer::DisplayConfig;
use crate::resource::{DeviceContext, RenderThread};
use crate::task::{task_queue, DrainReport, TaskReceiver};
use crate::visual::VisualProcessor;

const SOURCE: &str = "graphvis::DisplayRenderer";

/// Result of one [`DisplayRenderer::frame`]
#[derive(Debug)]
pub enum FrameOutcome {
    /// Command buffers to submit, in draw order
    Presented { command_buffers: Vec<ResourceId> },
    /// Nothing to submit this frame
    Dropped(Error),
}

impl FrameOutcome {
    pub fn is_presented(&self) -> bool {
        matches!(self, FrameOutcome::Presented { .. })
    }
}

/// Build a renderer and the processor feeding it
///
/// The processor stays on the producer thread; the renderer moves to the
/// render thread and is bound there by [`DisplayRenderer::initialise`].
pub fn create_display(context: Arc<DeviceContext>, config: DisplayConfig) -> (DisplayRenderer, VisualProcessor) {
    let (sender, receiver) = task_queue();
    let renderer = DisplayRenderer::new(context, config, receiver);
    (renderer, VisualProcessor::new(sender))
}

pub struct DisplayRenderer {
    context: Arc<DeviceContext>,
    config: DisplayConfig,
    renderables: RenderableSet,
    tasks: TaskReceiver<RenderableSet>,
    render_thread: RenderThread,
    swapchain: Option<SwapchainInfo>,
    frames_presented: u64,
    frames_dropped: u64,
    initialised: bool,
}

impl DisplayRenderer {
    pub fn new(context: Arc<DeviceContext>, config: DisplayConfig, tasks: TaskReceiver<RenderableSet>) -> Self {
        let renderables = RenderableSet::new(Arc::clone(&context), &config);
        Self {
            context,
            config,
            renderables,
            tasks,
            render_thread: RenderThread::new(),
            swapchain: None,
            frames_presented: 0,
            frames_dropped: 0,
            initialised: false,
        }
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn renderables(&self) -> &RenderableSet {
        &self.renderables
    }

    pub fn swapchain(&self) -> Option<&SwapchainInfo> {
        self.swapchain.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.pending()
    }

    // ===== LIFECYCLE =====

    /// Bind every renderable to the calling thread and create staging resources
    pub fn initialise(&mut self) -> Result<()> {
        self.render_thread.bind();
        self.renderables.shared.initialise();
        let (_, renderables) = self.renderables.split_mut();
        for renderable in renderables {
            renderable.initialise()?;
        }
        self.initialised = true;
        crate::engine_info!(SOURCE, "Display initialised");
        Ok(())
    }

    /// Adopt a new or resized swapchain
    pub fn set_new_swapchain(&mut self, swapchain: &SwapchainInfo) -> Result<()> {
        self.render_thread.verify("set_new_swapchain");
        let (_, renderables) = self.renderables.split_mut();
        for renderable in renderables {
            renderable.set_new_swapchain(swapchain)?;
        }
        crate::engine_debug!(
            SOURCE,
            "Swapchain {}x{} with {} images",
            swapchain.width,
            swapchain.height,
            swapchain.image_count
        );
        self.swapchain = Some(*swapchain);
        Ok(())
    }

    /// Commit every queued task
    pub fn process_tasks(&mut self) -> DrainReport {
        self.render_thread.verify("process_tasks");
        self.tasks.drain(&mut self.renderables)
    }

    pub fn needs_display_update(&self) -> bool {
        let shared = &self.renderables.shared;
        shared.needs_update()
            || self.renderables.renderables().iter().any(|r| r.needs_display_update(shared))
    }

    /// Bring every dirty resource up to date, stopping at the first failure
    pub fn display_update(&mut self) -> Result<()> {
        self.render_thread.verify("display_update");
        if !self.initialised {
            return Err(Error::InitializationFailed("display updated before initialise".to_string()));
        }
        self.renderables.shared.sync()?;
        let (shared, renderables) = self.renderables.split_mut();
        for renderable in renderables {
            if renderable.needs_display_update(shared) {
                renderable.display_update(shared)?;
            }
        }
        Ok(())
    }

    /// Record command buffers for `image_index`, skipping empty renderables
    pub fn record_frame(&mut self, image_index: usize) -> Result<Vec<ResourceId>> {
        self.render_thread.verify("record_frame");
        let image_count = self.swapchain.map_or(0, |s| s.image_count);
        if image_index >= image_count {
            return Err(Error::InvalidResource(format!(
                "swapchain image {} of {}",
                image_index, image_count
            )));
        }
        let (_, renderables) = self.renderables.split_mut();
        let mut command_buffers = Vec::new();
        for renderable in renderables {
            if renderable.vertex_count() > 0 {
                command_buffers.push(renderable.record_command_buffer(image_index)?);
            }
        }
        Ok(command_buffers)
    }

    /// Run one frame for swapchain image `image_index`
    ///
    /// A failed commit drops the frame; the renderable keeps the failed work
    /// and the next frame retries it.
    pub fn frame(&mut self, image_index: usize) -> FrameOutcome {
        let recorded = match self.process_tasks().error {
            Some(e) => Err(e),
            None => self.display_update().and_then(|()| self.record_frame(image_index)),
        };
        match recorded {
            Ok(command_buffers) => {
                self.frames_presented += 1;
                FrameOutcome::Presented { command_buffers }
            }
            Err(e) => {
                self.frames_dropped += 1;
                if e.is_fatal() {
                    crate::engine_error!(SOURCE, "Frame {} dropped: {}", image_index, e);
                } else {
                    crate::engine_warn!(SOURCE, "Frame {} dropped: {}", image_index, e);
                }
                FrameOutcome::Dropped(e)
            }
        }
    }

    /// Release every GPU resource once the device is idle
    pub fn destroy(&mut self) {
        self.render_thread.verify("destroy");
        match self.context.lock_device().and_then(|device| device.wait_idle()) {
            Ok(()) => {}
            Err(e) => crate::engine_warn!(SOURCE, "wait_idle before destroy failed: {}", e),
        }
        let (_, renderables) = self.renderables.split_mut();
        for renderable in renderables {
            renderable.destroy();
        }
        self.renderables.shared.destroy();
        self.swapchain = None;
        self.initialised = false;
        crate::engine_info!(
            SOURCE,
            "Display destroyed after {} frames ({} dropped)",
            self.frames_presented + self.frames_dropped,
            self.frames_dropped
        );
    }
}

#[cfg(test)]
#[path = "display_renderer_tests.rs"]
mod tests;
