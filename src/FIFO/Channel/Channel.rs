// The bounded FIFO shared by a producing task and a consuming task

use crate::Core::Event;

use parking_lot::Mutex;
use std::collections::VecDeque;

/// Default number of slots when none is configured.
pub const DEFAULT_CAPACITY: usize = 16;

/// Fill level of a channel. A fresh channel starts `Empty`; there is no
/// terminal state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Occupancy {
    /// `len == 0`
    Empty,
    /// `0 < len < capacity`
    Partial,
    /// `len == capacity`
    Full,
}

/// A fixed-capacity FIFO whose blocking operations suspend the calling kernel task.
///
/// ### Concurrency Design:
/// - **Writers**: a writer that finds the queue full suspends on `has_space`.
///   Every wake-up is a hint; the writer re-checks the fill level before it
///   appends, so several writers can share one channel without overfilling it.
/// - **Readers**: symmetric, suspending on `has_data` while the queue is empty.
/// - The kernel runs one task at a time, so the lock around `storage` is never
///   contended. It exists only to make the type `Sync` and is never held across
///   a suspension point.
pub struct BoundedChannel<T> {
    /// Queued values, oldest at the front.
    pub(crate) storage: Mutex<VecDeque<T>>,

    /// Fixed at construction, always at least 1.
    pub(crate) capacity: usize,

    /// Notified after every successful write.
    pub(crate) has_data: Event,

    /// Notified after every successful read.
    pub(crate) has_space: Event,
}
