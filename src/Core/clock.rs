use std::fmt;
use std::time::Duration;

/// A point on the kernel's logical clock, in nanoseconds since the run began.
///
/// The clock only moves when the kernel advances it; it has no relation to
/// wall-clock time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    pub const MAX: SimTime = SimTime(u64::MAX);

    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Adds a delay, clamping at `SimTime::MAX`. Sub-nanosecond parts are dropped.
    pub fn saturating_add(self, delay: Duration) -> Self {
        let nanos = u64::try_from(delay.as_nanos()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(nanos))
    }

    /// Logical time elapsed since `earlier`, or zero if `earlier` is later.
    pub fn duration_since(self, earlier: SimTime) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ns", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_add_truncates_and_clamps() {
        let t = SimTime::from_nanos(10).saturating_add(Duration::from_nanos(5));
        assert_eq!(t.as_nanos(), 15);
        assert_eq!(SimTime::MAX.saturating_add(Duration::from_secs(1)), SimTime::MAX);
        assert_eq!(t.to_string(), "15 ns");
        assert_eq!(t.duration_since(SimTime::from_nanos(20)), Duration::ZERO);
    }
}
