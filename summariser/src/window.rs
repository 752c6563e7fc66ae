use chrono::{DateTime, TimeDelta, Utc};

/// The time window samples must fall into to be summarised.
///
/// The window has an inclusive lower bound and no upper bound, every sample up to the time of
/// parsing is eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// A window reaching back `period` seconds from `now`.
    ///
    /// A `period` of zero or less means the window is unbounded.
    pub fn from_period(now: DateTime<Utc>, period: i64) -> Self {
        let start = if period > 0 {
            TimeDelta::try_seconds(period).and_then(|delta| now.checked_sub_signed(delta))
        } else {
            None
        };

        Self { start, end: now }
    }

    /// A window reaching back `period` seconds from now.
    pub fn last(period: i64) -> Self {
        Self::from_period(Utc::now(), period)
    }

    /// The inclusive lower bound, `None` for the beginning of time.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    /// The time the window was opened at.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether a sample taken at `timestamp` is in the window.
    pub fn in_window(&self, timestamp: DateTime<Utc>) -> bool {
        match self.start {
            Some(start) => timestamp >= start,
            None => true,
        }
    }
}

/// Convert a collectd `epoch` value, in fractional seconds, to an instant.
///
/// Returns `None` when the value is not finite or out of range.
pub fn timestamp_from_epoch(epoch: f64) -> Option<DateTime<Utc>> {
    if !epoch.is_finite() {
        return None;
    }

    let secs = epoch.floor();
    let nanos = ((epoch - secs) * 1_000_000_000.0).round() as u32;
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }

    // Rounding can carry the fraction into the next second
    if nanos >= 1_000_000_000 {
        DateTime::from_timestamp(secs as i64 + 1, 0)
    } else {
        DateTime::from_timestamp(secs as i64, nanos)
    }
}
