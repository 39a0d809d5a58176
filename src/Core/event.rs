use std::sync::Arc;

use parking_lot::Mutex;

use super::kernel::{Shared, TaskId, WakeReason};

pub(crate) struct Waiter {
    pub(crate) shared: Arc<Shared>,
    pub(crate) task: TaskId,
    pub(crate) token: u64,
}

pub(crate) struct EventInner {
    pub(crate) name: String,
    pub(crate) waiters: Mutex<Vec<Waiter>>,
}

/// An edge-triggered wake condition.
///
/// Notifying releases the tasks suspended on the event at that moment; they
/// resume in the next delta cycle of their kernel. Nothing is latched, so a
/// notify with no waiters is lost. Release order among several waiters is not
/// a guarantee callers may rely on.
#[derive(Clone)]
pub struct Event {
    pub(crate) inner: Arc<EventInner>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EventInner {
                name: name.into(),
                waiters: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Registrations currently held, including ones a timeout already made stale.
    pub fn registered_waiters(&self) -> usize {
        self.inner.waiters.lock().len()
    }

    /// Releases the current waiters and returns how many were actually woken.
    pub fn notify(&self) -> usize {
        let waiters = std::mem::take(&mut *self.inner.waiters.lock());
        let mut woken = 0;
        for waiter in waiters {
            if waiter
                .shared
                .state
                .lock()
                .wake(waiter.task, waiter.token, WakeReason::Notified)
            {
                woken += 1;
            }
        }
        if woken > 0 {
            log::trace!("event `{}` released {woken} waiter(s)", self.inner.name);
        }
        woken
    }

    /// A task is suspended at most once at a time, so any older registration
    /// of the same task is stale and is replaced.
    pub(crate) fn add_waiter(&self, waiter: Waiter) {
        let mut waiters = self.inner.waiters.lock();
        waiters.retain(|w| !(w.task == waiter.task && Arc::ptr_eq(&w.shared, &waiter.shared)));
        waiters.push(waiter);
    }
}
