// Source of "now" for due-date bucketing

use chrono::{DateTime, FixedOffset, Local};

/// Supplies the evaluation instant together with the caller's local offset
///
/// Calendar-day boundaries ("today", "this month") are computed in the offset
/// of the returned value.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the machine's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Parse an RFC 3339 timestamp, e.g. `2026-05-10T12:00:00+02:00`
    pub fn parse(rfc3339: &str) -> eyre::Result<Self> {
        Ok(Self(DateTime::parse_from_rfc3339(rfc3339)?))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}
