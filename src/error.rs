use std::fmt;

/// Errors surfaced by the kernel, the task suspension API and the channels.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A channel was configured with room for nothing; it could never accept a write.
    #[error("channel capacity must be greater than zero")]
    ZeroCapacity,

    /// The kernel shut down while the calling task was suspended.
    #[error("simulation stopped while the task was suspended")]
    Stopped,

    /// A suspension point was reached from a thread that is not a kernel task.
    #[error("suspension requested outside of a simulation task")]
    NoTask,

    /// A threaded channel was closed while the caller was blocked on it.
    #[error("channel closed")]
    Closed,

    /// A bounded wait reached its deadline before its condition held.
    #[error("wait timed out")]
    TimedOut,

    #[error("task `{0}` panicked")]
    TaskPanicked(String),

    #[error("failed to spawn task thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returned by `try_write` when the value could not be enqueued right now.
/// The rejected value is handed back to the caller.
#[derive(PartialEq, Eq)]
pub enum TryWriteError<T> {
    Full(T),
    Closed(T),
}

impl<T> TryWriteError<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) | Self::Closed(value) => value,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }
}

impl<T> fmt::Debug for TryWriteError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> fmt::Display for TryWriteError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("channel full"),
            Self::Closed(_) => f.write_str("channel closed"),
        }
    }
}

impl<T> std::error::Error for TryWriteError<T> {}

/// A blocking write that gave up, with the value it could not enqueue.
pub struct WriteError<T> {
    pub value: T,
    pub error: Error,
}

impl<T> WriteError<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> fmt::Debug for WriteError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for WriteError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "write failed: {}", self.error)
    }
}

impl<T> std::error::Error for WriteError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
