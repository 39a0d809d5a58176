// Bounded FIFO for plain OS threads, outside of any kernel

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::FifoInterface;
use crate::error::{Error, Result, TryWriteError, WriteError};

struct ThreadState<T> {
    queue: VecDeque<T>,
    closed: bool,
}

/// The same bounded, blocking contract as [`super::BoundedChannel`], for
/// preemptively scheduled threads: a mutex guards the queue and two condition
/// variables stand in for the wake events.
///
/// Never use it from inside a kernel task; a blocked call would hold the
/// kernel's baton and stall every other task.
pub struct ThreadChannel<T> {
    state: Mutex<ThreadState<T>>,
    has_data: Condvar,
    has_space: Condvar,
    capacity: usize,
    name: String,
}

impl<T> ThreadChannel<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_name("fifo", capacity)
    }

    /// The name only shows up in `Debug` output.
    pub fn with_name(name: impl Into<String>, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        Ok(Self {
            state: Mutex::new(ThreadState {
                queue: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            has_data: Condvar::new(),
            has_space: Condvar::new(),
            capacity,
            name: name.into(),
        })
    }

    pub fn write(&self, value: T) -> Result<()> {
        let mut state = self.state.lock();
        while state.queue.len() >= self.capacity && !state.closed {
            self.has_space.wait(&mut state);
        }
        if state.closed {
            return Err(Error::Closed);
        }
        state.queue.push_back(value);
        self.has_data.notify_one();
        Ok(())
    }

    /// Buffered values are still handed out after `close`; only an empty,
    /// closed channel fails with [`Error::Closed`].
    pub fn read(&self) -> Result<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(value) = state.queue.pop_front() {
                self.has_space.notify_one();
                return Ok(value);
            }
            if state.closed {
                return Err(Error::Closed);
            }
            self.has_data.wait(&mut state);
        }
    }

    pub fn try_write(&self, value: T) -> Result<(), TryWriteError<T>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(TryWriteError::Closed(value));
        }
        if state.queue.len() >= self.capacity {
            return Err(TryWriteError::Full(value));
        }
        state.queue.push_back(value);
        self.has_data.notify_one();
        Ok(())
    }

    pub fn try_read(&self) -> Option<T> {
        let value = self.state.lock().queue.pop_front()?;
        self.has_space.notify_one();
        Some(value)
    }

    /// Blocks at most `timeout` of wall-clock time waiting for room.
    pub fn write_timeout(&self, value: T, timeout: Duration) -> Result<(), WriteError<T>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.queue.len() >= self.capacity && !state.closed {
            if self.has_space.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        if state.closed {
            return Err(WriteError {
                value,
                error: Error::Closed,
            });
        }
        if state.queue.len() >= self.capacity {
            return Err(WriteError {
                value,
                error: Error::TimedOut,
            });
        }
        state.queue.push_back(value);
        self.has_data.notify_one();
        Ok(())
    }

    /// Blocks at most `timeout` of wall-clock time waiting for a value.
    pub fn read_timeout(&self, timeout: Duration) -> Result<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(value) = state.queue.pop_front() {
                self.has_space.notify_one();
                return Ok(value);
            }
            if state.closed {
                return Err(Error::Closed);
            }
            if self.has_data.wait_until(&mut state, deadline).timed_out() {
                return state.queue.pop_front().map_or(Err(Error::TimedOut), |value| {
                    self.has_space.notify_one();
                    Ok(value)
                });
            }
        }
    }

    /// Rejects further writes and wakes every blocked reader and writer.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);
        self.has_data.notify_all();
        self.has_space.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Send> FifoInterface<T> for ThreadChannel<T> {
    fn read(&self) -> Result<T> {
        ThreadChannel::read(self)
    }

    fn write(&self, value: T) -> Result<()> {
        ThreadChannel::write(self, value)
    }

    fn try_read(&self) -> Option<T> {
        ThreadChannel::try_read(self)
    }

    fn try_write(&self, value: T) -> Result<(), TryWriteError<T>> {
        ThreadChannel::try_write(self, value)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        ThreadChannel::len(self)
    }
}

impl<T> fmt::Debug for ThreadChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_thread_channel(self, f)
    }
}
