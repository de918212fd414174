/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! UTC temporal values used by FIX fields.
//!
//! - [`UtcTimestamp`]: `YYYYMMDD-HH:MM:SS[.fff[fff[fff]]]`
//! - [`UtcTimeOnly`]: `HH:MM:SS[.fff[fff[fff]]]`
//! - [`UtcDateOnly`]: `YYYYMMDD`
//!
//! Values remember the precision class of their source so they render back
//! at the same width. A source without fractional seconds renders with
//! milliseconds.

use arrayvec::ArrayString;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Width of the fractional-seconds part when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimePrecision {
    /// No fractional part.
    ///
    /// Output only: parsing never yields this class, so a value encoded at
    /// `Seconds` decodes at [`TimePrecision::Millis`] and re-renders with
    /// a `.000` fraction.
    Seconds,
    /// Three digits.
    #[default]
    Millis,
    /// Six digits.
    Micros,
    /// Nine digits.
    Nanos,
}

impl TimePrecision {
    /// Precision class for a source fraction of `digits` digits.
    ///
    /// A missing fraction maps to the default millisecond class.
    #[must_use]
    pub const fn from_fraction_digits(digits: usize) -> Option<Self> {
        match digits {
            0..=3 => Some(Self::Millis),
            4..=6 => Some(Self::Micros),
            7..=9 => Some(Self::Nanos),
            _ => None,
        }
    }

    /// Number of fractional digits rendered.
    #[must_use]
    pub const fn fraction_digits(self) -> u32 {
        match self {
            Self::Seconds => 0,
            Self::Millis => 3,
            Self::Micros => 6,
            Self::Nanos => 9,
        }
    }
}

/// Splits `HH:MM:SS.ffff` style input into the text before the point, the
/// fraction as nanoseconds and the precision class.
fn split_fraction(bytes: &[u8]) -> Option<(&str, u32, TimePrecision)> {
    let text = std::str::from_utf8(bytes).ok()?;
    let (base, fraction) = match text.split_once('.') {
        Some((base, fraction)) if !fraction.is_empty() => (base, fraction),
        Some(_) => return None,
        None => (text, ""),
    };
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let precision = TimePrecision::from_fraction_digits(fraction.len())?;
    let mut nanos: u32 = 0;
    for b in fraction.bytes().chain(std::iter::repeat(b'0')).take(9) {
        nanos = nanos * 10 + u32::from(b - b'0');
    }
    Some((base, nanos, precision))
}

/// Writes `.` plus the leading `precision` digits of `nanos`.
fn write_fraction<const N: usize>(buf: &mut ArrayString<N>, nanos: u32, precision: TimePrecision) {
    let digits = precision.fraction_digits();
    if digits == 0 {
        return;
    }
    // Leap-second nanos (>= 1e9) are clamped to the last representable value.
    let nanos = nanos.min(999_999_999);
    let value = nanos / 10u32.pow(9 - digits);
    let _ = write!(buf, ".{:0width$}", value, width = digits as usize);
}

/// UTC date and time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcTimestamp {
    value: NaiveDateTime,
    precision: TimePrecision,
}

impl UtcTimestamp {
    /// Creates a timestamp rendered at `precision`.
    #[must_use]
    pub fn new(value: DateTime<Utc>, precision: TimePrecision) -> Self {
        Self {
            value: value.naive_utc(),
            precision,
        }
    }

    /// Creates a millisecond timestamp from milliseconds since the Unix epoch.
    #[must_use]
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|dt| Self::new(dt, TimePrecision::Millis))
    }

    /// Parses the wire form `YYYYMMDD-HH:MM:SS[.f{1,9}]`.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (base, nanos, precision) = split_fraction(bytes)?;
        if base.len() != 17 {
            return None;
        }
        let value = NaiveDateTime::parse_from_str(base, "%Y%m%d-%H:%M:%S")
            .ok()?
            .with_nanosecond(nanos)?;
        Some(Self { value, precision })
    }

    /// Returns the instant as a chrono UTC datetime.
    #[must_use]
    pub fn datetime(&self) -> DateTime<Utc> {
        self.value.and_utc()
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn epoch_millis(&self) -> i64 {
        self.datetime().timestamp_millis()
    }

    /// Rendering precision.
    #[must_use]
    pub const fn precision(&self) -> TimePrecision {
        self.precision
    }

    /// Returns the same instant rendered at another precision.
    #[must_use]
    pub const fn with_precision(mut self, precision: TimePrecision) -> Self {
        self.precision = precision;
        self
    }

    /// Formats into a stack buffer.
    #[must_use]
    pub fn format(&self) -> ArrayString<32> {
        let mut buf = ArrayString::new();
        let _ = write!(buf, "{}", self.value.format("%Y%m%d-%H:%M:%S"));
        write_fraction(&mut buf, self.value.nanosecond(), self.precision);
        buf
    }

    /// Appends the wire form to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.format().as_bytes());
    }
}

impl From<DateTime<Utc>> for UtcTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::new(value, TimePrecision::default())
    }
}

impl fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// UTC time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcTimeOnly {
    value: NaiveTime,
    precision: TimePrecision,
}

impl UtcTimeOnly {
    /// Creates a time of day rendered at `precision`.
    #[must_use]
    pub const fn new(value: NaiveTime, precision: TimePrecision) -> Self {
        Self { value, precision }
    }

    /// Parses the wire form `HH:MM:SS[.f{1,9}]`.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (base, nanos, precision) = split_fraction(bytes)?;
        if base.len() != 8 {
            return None;
        }
        let value = NaiveTime::parse_from_str(base, "%H:%M:%S")
            .ok()?
            .with_nanosecond(nanos)?;
        Some(Self { value, precision })
    }

    /// Returns the time of day.
    #[must_use]
    pub const fn time(&self) -> NaiveTime {
        self.value
    }

    /// Milliseconds since midnight.
    #[must_use]
    pub fn millis_of_day(&self) -> u32 {
        self.value.num_seconds_from_midnight() * 1_000 + self.value.nanosecond() / 1_000_000
    }

    /// Rendering precision.
    #[must_use]
    pub const fn precision(&self) -> TimePrecision {
        self.precision
    }

    /// Appends the wire form to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        let mut out: ArrayString<24> = ArrayString::new();
        let _ = write!(out, "{}", self.value.format("%H:%M:%S"));
        write_fraction(&mut out, self.value.nanosecond(), self.precision);
        buf.extend_from_slice(out.as_bytes());
    }
}

impl fmt::Display for UtcTimeOnly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::with_capacity(18);
        self.write_to(&mut buf);
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

/// UTC calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtcDateOnly(NaiveDate);

impl UtcDateOnly {
    /// Wraps a calendar date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses the wire form `YYYYMMDD`.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 8 {
            return None;
        }
        let text = std::str::from_utf8(bytes).ok()?;
        NaiveDate::parse_from_str(text, "%Y%m%d").ok().map(Self)
    }

    /// Returns the calendar date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// Appends the wire form to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        let mut out: ArrayString<12> = ArrayString::new();
        let _ = write!(out, "{}", self.0.format("%Y%m%d"));
        buf.extend_from_slice(out.as_bytes());
    }
}

impl fmt::Display for UtcDateOnly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}
