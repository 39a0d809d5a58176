use crate::error::{Result, TryWriteError};

/// The capability a task is given to reach a channel.
///
/// Task code only sees this trait, so the queue behind it can be swapped
/// without touching the tasks.
pub trait FifoInterface<T>: Send + Sync {
    /// Remove and return the oldest value, blocking while the channel is empty.
    fn read(&self) -> Result<T>;

    /// Append a value, blocking while the channel is full.
    fn write(&self, value: T) -> Result<()>;

    fn try_read(&self) -> Option<T>;

    fn try_write(&self, value: T) -> Result<(), TryWriteError<T>>;

    fn capacity(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
