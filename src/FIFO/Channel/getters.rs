use super::Channel::{BoundedChannel, Occupancy};

/// Read-only views of a channel's fill level, for tracing and assertions.
impl<T> BoundedChannel<T> {
    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.storage.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Maximum number of queued values, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn occupancy(&self) -> Occupancy {
        match self.len() {
            0 => Occupancy::Empty,
            len if len >= self.capacity => Occupancy::Full,
            _ => Occupancy::Partial,
        }
    }
}
