mod blocking;
mod builder;
mod consumer;
mod interface;
mod producer;

pub use blocking::ThreadChannel;
pub use builder::ChannelBuilder;
pub use consumer::Consumer;
pub use interface::FifoInterface;
pub use producer::Producer;

pub mod Channel {
    pub mod Channel;
    pub mod Channel_impl;
    mod debug;
    mod getters;
    pub use Channel::{BoundedChannel, Occupancy}; // re-export for stable path
}

pub use Channel::{BoundedChannel, Occupancy};
