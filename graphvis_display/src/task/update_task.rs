/// UpdateTask - move-only unit of render-thread work
///
/// Built on the producer thread, committed exactly once on the render thread.
/// The captured snapshot moves with the task; nothing is shared with the
/// producer after construction. Tasks are deliberately not `Clone`.

use std::fmt;

use crate::error::Result;

type CommitFn<T> = Box<dyn FnOnce(&mut T) -> Result<()> + Send>;

pub struct UpdateTask<T> {
    label: String,
    commit: CommitFn<T>,
}

impl<T> UpdateTask<T> {
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T: 'static> UpdateTask<T> {
    /// Wrap a commit closure
    ///
    /// `label` names the task in logs (e.g. "links: update vertices").
    pub fn new<F>(label: impl Into<String>, commit: F) -> Self
    where
        F: FnOnce(&mut T) -> Result<()> + Send + 'static,
    {
        Self {
            label: label.into(),
            commit: Box::new(commit),
        }
    }

    /// Run the task against its target (render thread only)
    pub fn commit(self, target: &mut T) -> Result<()> {
        (self.commit)(target)
    }

    /// Re-target the task at a value containing `T`
    ///
    /// Used to send renderable-specific tasks through one queue typed on the
    /// whole renderable set.
    pub fn route<U: 'static>(self, select: fn(&mut U) -> &mut T) -> UpdateTask<U> {
        let commit = self.commit;
        UpdateTask {
            label: self.label,
            commit: Box::new(move |outer: &mut U| commit(select(outer))),
        }
    }
}

impl<T> fmt::Debug for UpdateTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateTask").field("label", &self.label).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "update_task_tests.rs"]
mod tests;
