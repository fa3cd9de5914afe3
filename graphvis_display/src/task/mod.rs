/// Task module - deferred work handed from the producer thread to the render thread
///
/// The producer reads graph data, decides what changed and captures an
/// immutable snapshot inside an [`UpdateTask`]. The task is moved through a
/// FIFO [`task_queue`] and committed once, on the render thread, where it only
/// stages data and requests resource states. Resources become clean in the
/// renderer's display update, never inside a task.

pub mod update_task;
pub mod task_queue;
pub mod change_set;

pub use update_task::UpdateTask;
pub use task_queue::{task_queue, DrainReport, TaskReceiver, TaskSender};
pub use change_set::{ChangeSet, VertexSnapshot};
