use std::fmt;

use crate::Core::{Event, Kernel};
use crate::FIFO::{BoundedChannel, ThreadChannel};

/// Debug function for Kernel
///
/// Provides a summary that shows:
/// - Current logical time
/// - Task count and how many are still alive
/// - Whether the kernel has been shut down
pub fn debug_kernel(kernel: &Kernel, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = kernel.shared.state.lock();
    f.debug_struct("Kernel")
        .field("now", &format_args!("{}", state.now))
        .field("tasks", &state.tasks.len())
        .field("live_tasks", &state.live_tasks())
        .field("delta_cycles", &state.delta_cycles)
        .field("stopped", &state.stopped)
        .finish()
}

/// Debug function for Event
///
/// Shows the name and the number of registrations; waiter handles stay opaque.
pub fn debug_event(event: &Event, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Event")
        .field("name", &event.name())
        .field("registered_waiters", &event.registered_waiters())
        .finish()
}

/// Debug function for BoundedChannel
///
/// Displays occupancy without touching the stored values
pub fn debug_bounded_channel<T>(
    channel: &BoundedChannel<T>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_struct("BoundedChannel")
        .field("len", &channel.len())
        .field("capacity", &channel.capacity())
        .field("occupancy", &channel.occupancy())
        .field("has_data", &channel.has_data)
        .field("has_space", &channel.has_space)
        .finish()
}

pub fn debug_thread_channel<T>(
    channel: &ThreadChannel<T>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_struct("ThreadChannel")
        .field("name", &channel.name())
        .field("len", &channel.len())
        .field("capacity", &channel.capacity())
        .field("closed", &channel.is_closed())
        .finish_non_exhaustive()
}
