use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

use super::Channel::BoundedChannel;
use crate::error::{Error, Result, TryWriteError, WriteError};
use crate::Core::{task, Event, WaitOutcome};

impl<T> BoundedChannel<T> {
    /// Create a channel with room for `capacity` values.
    ///
    /// A zero capacity could never accept a write and would deadlock the first
    /// writer, so it is rejected here.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_name("fifo", capacity)
    }

    /// Like [`BoundedChannel::new`], naming the two wake events after `name`.
    pub fn with_name(name: &str, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        Ok(Self {
            storage: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            has_data: Event::new(format!("{name}.has_data")),
            has_space: Event::new(format!("{name}.has_space")),
        })
    }

    /// Append to the tail if there is room, handing the value back otherwise.
    fn push(&self, value: T) -> Result<(), T> {
        let mut storage = self.storage.lock();
        if storage.len() >= self.capacity {
            return Err(value);
        }
        storage.push_back(value);
        drop(storage);

        self.has_data.notify();
        Ok(())
    }

    fn pop(&self) -> Option<T> {
        let value = self.storage.lock().pop_front()?;
        self.has_space.notify();
        Some(value)
    }

    /// Enqueue `value`, suspending the calling task while the channel is full.
    ///
    /// Fails only when the kernel stops during the wait, or when called from
    /// outside a kernel task while the channel is full.
    pub fn write(&self, value: T) -> Result<()> {
        let mut value = value;
        loop {
            match self.push(value) {
                Ok(()) => return Ok(()),
                Err(rejected) => value = rejected,
            }
            task::wait(&self.has_space)?;
        }
    }

    /// Dequeue the oldest value, suspending the calling task while the channel is empty.
    pub fn read(&self) -> Result<T> {
        loop {
            if let Some(value) = self.pop() {
                return Ok(value);
            }
            task::wait(&self.has_data)?;
        }
    }

    /// Enqueue without suspending.
    pub fn try_write(&self, value: T) -> Result<(), TryWriteError<T>> {
        self.push(value).map_err(TryWriteError::Full)
    }

    /// Dequeue without suspending.
    pub fn try_read(&self) -> Option<T> {
        self.pop()
    }

    /// Like [`BoundedChannel::write`], giving up after `timeout` of logical time.
    /// The value comes back inside the error.
    pub fn write_timeout(&self, value: T, timeout: Duration) -> Result<(), WriteError<T>> {
        let deadline = match task::now() {
            Ok(now) => now.saturating_add(timeout),
            Err(error) => return Err(WriteError { value, error }),
        };

        let mut value = value;
        loop {
            match self.push(value) {
                Ok(()) => return Ok(()),
                Err(rejected) => value = rejected,
            }

            let now = match task::now() {
                Ok(now) => now,
                Err(error) => return Err(WriteError { value, error }),
            };
            if now >= deadline {
                return Err(WriteError {
                    value,
                    error: Error::TimedOut,
                });
            }

            match task::wait_timeout(&self.has_space, deadline.duration_since(now)) {
                Ok(WaitOutcome::Notified) => {}
                Ok(WaitOutcome::TimedOut) => {
                    return self.push(value).map_err(|value| WriteError {
                        value,
                        error: Error::TimedOut,
                    });
                }
                Err(error) => return Err(WriteError { value, error }),
            }
        }
    }

    /// Like [`BoundedChannel::read`], giving up with [`Error::TimedOut`] after
    /// `timeout` of logical time.
    pub fn read_timeout(&self, timeout: Duration) -> Result<T> {
        let deadline = task::now()?.saturating_add(timeout);
        loop {
            if let Some(value) = self.pop() {
                return Ok(value);
            }

            let now = task::now()?;
            if now >= deadline {
                return Err(Error::TimedOut);
            }
            if task::wait_timeout(&self.has_data, deadline.duration_since(now))?
                == WaitOutcome::TimedOut
            {
                return self.pop().ok_or(Error::TimedOut);
            }
        }
    }
}

impl<T: Send> crate::FIFO::FifoInterface<T> for BoundedChannel<T> {
    fn read(&self) -> Result<T> {
        BoundedChannel::read(self)
    }

    fn write(&self, value: T) -> Result<()> {
        BoundedChannel::write(self, value)
    }

    fn try_read(&self) -> Option<T> {
        BoundedChannel::try_read(self)
    }

    fn try_write(&self, value: T) -> Result<(), TryWriteError<T>> {
        BoundedChannel::try_write(self, value)
    }

    fn capacity(&self) -> usize {
        BoundedChannel::capacity(self)
    }

    fn len(&self) -> usize {
        BoundedChannel::len(self)
    }
}
