/// Render-thread affinity check
///
/// Resource managers have no locks: every mutating call must come from the
/// render thread. The owning thread is bound on the first render-thread call
/// (`initialise`), so a renderer can be built on one thread and moved to the
/// render thread before use.

use std::thread::{self, ThreadId};

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderThread {
    owner: Option<ThreadId>,
}

impl RenderThread {
    pub fn new() -> Self {
        Self { owner: None }
    }

    /// Bind to the calling thread
    pub fn bind(&mut self) {
        self.owner = Some(thread::current().id());
    }

    pub fn is_bound(&self) -> bool {
        self.owner.is_some()
    }

    /// True when unbound or called from the owning thread
    pub fn is_current(&self) -> bool {
        self.owner.map_or(true, |owner| owner == thread::current().id())
    }

    /// Assert the caller runs on the render thread
    #[track_caller]
    pub fn verify(&self, operation: &str) {
        debug_assert!(
            self.is_current(),
            "{} called off the render thread",
            operation
        );
    }
}

#[cfg(test)]
#[path = "render_thread_tests.rs"]
mod tests;
