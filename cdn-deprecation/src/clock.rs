//! Clock - Source of "now" for deprecation checks

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

/// Supplies the current instant and the caller's local UTC offset at that instant
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;

    /// Offset of the caller's local timezone at `at`
    fn local_offset(&self, at: DateTime<Utc>) -> FixedOffset;
}

/// Wall clock and the operating system's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_offset(&self, at: DateTime<Utc>) -> FixedOffset {
        at.with_timezone(&Local).offset().fix()
    }
}

/// A clock pinned to one instant, observed from a fixed local offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    /// Pin the clock to `now`, with the caller in UTC
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            offset: Utc.fix(),
        }
    }

    /// Pin the clock to `now`, with the caller at `offset`
    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Pin the clock to a timestamp, taking the caller's offset from the timestamp itself
    pub fn from_local(at: DateTime<FixedOffset>) -> Self {
        Self {
            now: at.with_timezone(&Utc),
            offset: *at.offset(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn local_offset(&self, _at: DateTime<Utc>) -> FixedOffset {
        self.offset
    }
}

/// Clock implementation for Box<dyn Clock>
/// This enables choosing the clock at runtime
impl Clock for Box<dyn Clock> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn local_offset(&self, at: DateTime<Utc>) -> FixedOffset {
        (**self).local_offset(at)
    }
}
