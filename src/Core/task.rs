//! Suspension points available to code running inside a kernel task.
//!
//! Each task thread carries its own context, so these are free functions in the
//! same way a cooperative runtime exposes `wait()`: the caller does not pass a
//! handle to the scheduler. Called from any other thread they return
//! [`Error::NoTask`].

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use super::clock::SimTime;
use super::event::{Event, Waiter};
use super::kernel::{Shared, TaskId, WakeReason};
use crate::error::{Error, Result};

thread_local! {
    static CURRENT: RefCell<Option<TaskContext>> = const { RefCell::new(None) };
}

#[derive(Clone)]
pub(crate) struct TaskContext {
    pub(crate) shared: Arc<Shared>,
    pub(crate) id: TaskId,
}

/// How a bounded wait ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Notified,
    TimedOut,
}

pub(crate) fn enter(ctx: TaskContext) {
    CURRENT.with(|current| *current.borrow_mut() = Some(ctx));
}

pub(crate) fn leave() {
    CURRENT.with(|current| current.borrow_mut().take());
}

fn current() -> Result<TaskContext> {
    CURRENT
        .with(|current| current.borrow().clone())
        .ok_or(Error::NoTask)
}

impl TaskContext {
    /// Gives the baton back to the kernel until the event fires or the delay
    /// elapses, whichever comes first. The wake-up is only a hint: callers
    /// re-check their own condition.
    fn suspend(&self, event: Option<&Event>, delay: Option<Duration>) -> Result<WakeReason> {
        let mut state = self.shared.state.lock();
        if state.stopped {
            return Err(Error::Stopped);
        }

        let token = state.begin_wait(self.id);
        if let Some(event) = event {
            event.add_waiter(Waiter {
                shared: Arc::clone(&self.shared),
                task: self.id,
                token,
            });
        }
        if let Some(delay) = delay {
            state.schedule_wake(self.id, token, delay);
        }

        state.release_turn(self.id);
        self.shared.turn.notify_all();
        self.shared.await_turn(&mut state, self.id)?;
        Ok(state.take_wake_reason(self.id))
    }
}

/// Suspends the calling task until `event` is notified.
pub fn wait(event: &Event) -> Result<()> {
    current()?.suspend(Some(event), None).map(|_| ())
}

/// Suspends the calling task for `delay` of logical time.
pub fn wait_for(delay: Duration) -> Result<()> {
    current()?.suspend(None, Some(delay)).map(|_| ())
}

/// Suspends until `event` is notified or `timeout` of logical time passes.
pub fn wait_timeout(event: &Event, timeout: Duration) -> Result<WaitOutcome> {
    let reason = current()?.suspend(Some(event), Some(timeout))?;
    Ok(match reason {
        WakeReason::TimedOut => WaitOutcome::TimedOut,
        WakeReason::Notified | WakeReason::Started => WaitOutcome::Notified,
    })
}

/// Logical time as seen by the calling task.
pub fn now() -> Result<SimTime> {
    let ctx = current()?;
    let now = ctx.shared.state.lock().now;
    Ok(now)
}

/// Id the kernel assigned to the calling task, in spawn order.
pub fn current_task() -> Result<TaskId> {
    current().map(|ctx| ctx.id)
}

/// Name the calling task was spawned with.
pub fn current_task_name() -> Result<Arc<str>> {
    let ctx = current()?;
    let name = Arc::clone(&ctx.shared.state.lock().tasks[ctx.id].name);
    Ok(name)
}
