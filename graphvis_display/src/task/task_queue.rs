/// Task queue - ordered, unbounded FIFO between one producer and the render thread
///
/// Neither end is `Clone`: there is exactly one producer and one consumer.
/// Tasks are never reordered; the render thread drains everything queued
/// before a frame's display update.

use flume::{Receiver, Sender};

use crate::error::{Error, Result};
use crate::task::UpdateTask;

/// Create a connected sender/receiver pair
pub fn task_queue<T>() -> (TaskSender<T>, TaskReceiver<T>) {
    let (tx, rx) = flume::unbounded();
    (TaskSender { tx }, TaskReceiver { rx })
}

/// Producer end
pub struct TaskSender<T> {
    tx: Sender<UpdateTask<T>>,
}

impl<T> TaskSender<T> {
    /// Queue a task; fails once the receiver is gone
    pub fn send(&self, task: UpdateTask<T>) -> Result<()> {
        self.tx.send(task).map_err(|e| {
            Error::InvalidResource(format!("task queue closed, '{}' discarded", e.into_inner().label()))
        })
    }

    /// Whether the render thread still holds the receiver
    pub fn is_connected(&self) -> bool {
        !self.tx.is_disconnected()
    }
}

/// Outcome of one drain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub committed: usize,
    pub failed: usize,
    /// First fatal failure, else the first failure
    pub error: Option<Error>,
}

impl DrainReport {
    pub fn total(&self) -> usize {
        self.committed + self.failed
    }

    fn record_failure(&mut self, error: Error) {
        self.failed += 1;
        let replace = match &self.error {
            None => true,
            Some(current) => error.is_fatal() && !current.is_fatal(),
        };
        if replace {
            self.error = Some(error);
        }
    }
}

/// Render-thread end
pub struct TaskReceiver<T> {
    rx: Receiver<UpdateTask<T>>,
}

impl<T: 'static> TaskReceiver<T> {
    /// Number of queued tasks
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Commit every task queued when the drain starts, in submission order
    ///
    /// Tasks sent while draining wait for the next frame. A failed commit is
    /// logged, reported in [`DrainReport::error`], and the drain continues:
    /// the target keeps the failed work and later tasks queue behind it.
    pub fn drain(&self, target: &mut T) -> DrainReport {
        let mut report = DrainReport::default();
        let queued = self.rx.len();
        for task in self.rx.try_iter().take(queued) {
            let label = task.label().to_string();
            match task.commit(target) {
                Ok(()) => report.committed += 1,
                Err(e) => {
                    crate::engine_warn!("graphvis::TaskQueue", "Task '{}' failed: {}", label, e);
                    report.record_failure(e);
                }
            }
        }
        if report.total() > 0 {
            crate::engine_trace!(
                "graphvis::TaskQueue",
                "Drained {} tasks ({} failed)",
                report.total(),
                report.failed
            );
        }
        report
    }
}

#[cfg(test)]
#[path = "task_queue_tests.rs"]
mod tests;
