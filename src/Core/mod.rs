pub mod clock;
pub mod event;
pub mod kernel;
pub mod task;
mod debug;

pub use clock::SimTime;
pub use event::Event;
pub use kernel::{Kernel, RunSummary, StopHandle, StopReason, TaskId};
pub use task::{
    current_task, current_task_name, now, wait, wait_for, wait_timeout, WaitOutcome,
};
