use super::Channel::Channel::DEFAULT_CAPACITY;
use super::{BoundedChannel, ThreadChannel};
use crate::error::Result;

pub struct ChannelBuilder {
    capacity: usize,
    name: String,
}

impl Default for ChannelBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            name: "fifo".to_string(),
        }
    }
}

impl ChannelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Prefix for the channel's wake events, visible in traces. A threaded
    /// channel keeps it for its `Debug` output.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// A channel driven by the simulation kernel.
    pub fn build<T>(self) -> Result<BoundedChannel<T>> {
        BoundedChannel::with_name(&self.name, self.capacity)
    }

    /// A channel for ordinary OS threads.
    pub fn build_threaded<T>(self) -> Result<ThreadChannel<T>> {
        ThreadChannel::with_name(self.name, self.capacity)
    }
}
