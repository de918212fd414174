/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Time source for SendingTime stamping.

use chrono::{DateTime, Utc};
use ferrofix_core::{TimePrecision, UtcTimestamp};

/// Supplies the current UTC time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current instant as a SendingTime value with millisecond precision.
    fn timestamp(&self) -> UtcTimestamp {
        UtcTimestamp::new(self.now(), TimePrecision::Millis)
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    #[must_use]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Clock pinned to `millis` since the Unix epoch; the epoch itself when
    /// out of range.
    #[must_use]
    pub fn from_epoch_millis(millis: i64) -> Self {
        Self(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_timestamp() {
        let clock = FixedClock::from_epoch_millis(1_231_352_116_000);
        assert_eq!(clock.timestamp().to_string(), "20090107-18:15:16.000");
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
