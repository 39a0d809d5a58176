use super::Channel::BoundedChannel;
use std::fmt;

impl<T> fmt::Debug for BoundedChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_bounded_channel(self, f)
    }
}
