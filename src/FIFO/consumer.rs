// Periodic reader task bound to a FIFO port

use std::sync::Arc;
use std::time::Duration;

use super::FifoInterface;
use crate::error::Result;
use crate::Core::{task, SimTime};

type ConsumeHook = Box<dyn FnMut(SimTime, u64) + Send>;

/// A task body that drains a channel at a fixed pace.
///
/// Each iteration waits one `period` of logical time, then reads (suspending
/// while the channel is empty) and hands the value to the observer.
pub struct Consumer<C: ?Sized> {
    port: Arc<C>,
    period: Duration,
    limit: Option<u64>,
    on_consume: Option<ConsumeHook>,
}

impl<C> Consumer<C>
where
    C: FifoInterface<u64> + ?Sized,
{
    pub fn new(port: Arc<C>, period: Duration) -> Self {
        Self {
            port,
            period,
            limit: None,
            on_consume: None,
        }
    }

    /// Stop after reading `count` values.
    pub fn with_limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    /// Called with the time each read was issued and the value it returned.
    /// The two times differ when the read had to wait for a writer.
    pub fn on_consume<F>(mut self, hook: F) -> Self
    where
        F: FnMut(SimTime, u64) + Send + 'static,
    {
        self.on_consume = Some(Box::new(hook));
        self
    }

    pub fn run(mut self) -> Result<()> {
        let mut read = 0u64;
        while self.limit.map_or(true, |limit| read < limit) {
            task::wait_for(self.period)?;

            let issued = task::now()?;
            let value = self.port.read()?;
            if let Some(hook) = self.on_consume.as_mut() {
                hook(issued, value);
            }
            read += 1;
        }
        log::trace!("{}: done reading", task::current_task_name()?);
        Ok(())
    }
}
