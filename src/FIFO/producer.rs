// Periodic writer task bound to a FIFO port

use std::sync::Arc;
use std::time::Duration;

use super::FifoInterface;
use crate::error::Result;
use crate::Core::{task, SimTime};

type EmitHook = Box<dyn FnMut(SimTime, u64) + Send>;

/// A task body that writes an increasing counter into a channel.
///
/// Each iteration waits one `period` of logical time, reports the value about
/// to be written, then writes it. The write may suspend the task while the
/// channel is full, which is what throttles a fast producer to the pace of
/// its consumer.
pub struct Producer<C: ?Sized> {
    port: Arc<C>,
    period: Duration,
    next: u64,
    limit: Option<u64>,
    on_emit: Option<EmitHook>,
}

impl<C> Producer<C>
where
    C: FifoInterface<u64> + ?Sized,
{
    pub fn new(port: Arc<C>, period: Duration) -> Self {
        Self {
            port,
            period,
            next: 0,
            limit: None,
            on_emit: None,
        }
    }

    /// First value of the sequence (defaults to 0).
    pub fn starting_at(mut self, first: u64) -> Self {
        self.next = first;
        self
    }

    /// Stop after writing `count` values instead of looping forever.
    pub fn with_limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    /// Called with the current time and the value just before each write.
    pub fn on_emit<F>(mut self, hook: F) -> Self
    where
        F: FnMut(SimTime, u64) + Send + 'static,
    {
        self.on_emit = Some(Box::new(hook));
        self
    }

    pub fn run(mut self) -> Result<()> {
        let mut written = 0u64;
        while self.limit.map_or(true, |limit| written < limit) {
            task::wait_for(self.period)?;

            let value = self.next;
            if let Some(hook) = self.on_emit.as_mut() {
                hook(task::now()?, value);
            }
            self.port.write(value)?;
            written += 1;

            if self.limit.is_some_and(|limit| written >= limit) {
                break;
            }
            let Some(next) = self.next.checked_add(1) else {
                log::debug!(
                    "{}: counter exhausted after {written} writes",
                    task::current_task_name()?
                );
                break;
            };
            self.next = next;
        }
        log::trace!("{}: done writing", task::current_task_name()?);
        Ok(())
    }
}
