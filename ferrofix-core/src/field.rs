/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Typed FIX fields.
//!
//! This module provides:
//! - [`Field`]: a tag plus its typed value
//! - [`FieldValue`]: the closed set of value kinds a field can carry
//! - [`parse_bool_lenient`]: relaxed boolean parsing for application input

use crate::fixed::FixedPointNumber;
use crate::time::{UtcDateOnly, UtcTimeOnly, UtcTimestamp};
use std::fmt;

/// Value carried by a [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// Free text, also used for every category without a dedicated kind.
    String(String),
    /// Single character.
    Char(char),
    /// Boolean, `Y` or `N` on the wire.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Exact decimal.
    Float(FixedPointNumber),
    /// UTC date and time.
    UtcTimestamp(UtcTimestamp),
    /// UTC calendar date.
    UtcDateOnly(UtcDateOnly),
    /// UTC time of day.
    UtcTimeOnly(UtcTimeOnly),
}

impl FieldValue {
    /// Appends the canonical ASCII form to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        match self {
            Self::String(s) => buf.extend_from_slice(s.as_bytes()),
            Self::Char(c) => {
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
            Self::Bool(v) => buf.push(if *v { b'Y' } else { b'N' }),
            Self::Int(v) => buf.extend_from_slice(itoa::Buffer::new().format(*v).as_bytes()),
            Self::Float(v) => v.write_to(buf),
            Self::UtcTimestamp(v) => v.write_to(buf),
            Self::UtcDateOnly(v) => v.write_to(buf),
            Self::UtcTimeOnly(v) => v.write_to(buf),
        }
    }

    /// Returns the canonical ASCII form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16);
        self.write_to(&mut buf);
        buf
    }

    /// Returns the text, if this is a `String` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the character, if this is a `Char` value.
    #[must_use]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a `Bool` value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the integer, if this is an `Int` value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the decimal, if this is a `Float` value.
    #[must_use]
    pub const fn as_float(&self) -> Option<FixedPointNumber> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the timestamp, if this is a `UtcTimestamp` value.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<UtcTimestamp> {
        match self {
            Self::UtcTimestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Short name of the value kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Char(_) => "Char",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::UtcTimestamp(_) => "UtcTimestamp",
            Self::UtcDateOnly(_) => "UtcDateOnly",
            Self::UtcTimeOnly(_) => "UtcTimeOnly",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Char(c) => write!(f, "{c}"),
            Self::Bool(v) => f.write_str(if *v { "Y" } else { "N" }),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::UtcTimestamp(v) => write!(f, "{v}"),
            Self::UtcDateOnly(v) => write!(f, "{v}"),
            Self::UtcTimeOnly(v) => write!(f, "{v}"),
        }
    }
}

/// A single `tag=value` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Tag number.
    pub tag: u32,
    /// Typed value.
    pub value: FieldValue,
}

impl Field {
    /// Creates a field.
    #[inline]
    #[must_use]
    pub const fn new(tag: u32, value: FieldValue) -> Self {
        Self { tag, value }
    }

    #[must_use]
    pub fn string(tag: u32, value: impl Into<String>) -> Self {
        Self::new(tag, FieldValue::String(value.into()))
    }

    #[must_use]
    pub const fn char(tag: u32, value: char) -> Self {
        Self::new(tag, FieldValue::Char(value))
    }

    #[must_use]
    pub const fn bool(tag: u32, value: bool) -> Self {
        Self::new(tag, FieldValue::Bool(value))
    }

    #[must_use]
    pub const fn int(tag: u32, value: i64) -> Self {
        Self::new(tag, FieldValue::Int(value))
    }

    #[must_use]
    pub const fn float(tag: u32, value: FixedPointNumber) -> Self {
        Self::new(tag, FieldValue::Float(value))
    }

    #[must_use]
    pub const fn timestamp(tag: u32, value: UtcTimestamp) -> Self {
        Self::new(tag, FieldValue::UtcTimestamp(value))
    }

    #[must_use]
    pub const fn date_only(tag: u32, value: UtcDateOnly) -> Self {
        Self::new(tag, FieldValue::UtcDateOnly(value))
    }

    #[must_use]
    pub const fn time_only(tag: u32, value: UtcTimeOnly) -> Self {
        Self::new(tag, FieldValue::UtcTimeOnly(value))
    }

    /// Appends `tag=value<SOH>` to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(itoa::Buffer::new().format(self.tag).as_bytes());
        buf.push(b'=');
        self.value.write_to(buf);
        buf.push(crate::SOH);
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.tag, self.value)
    }
}

/// Relaxed boolean parsing for values supplied by application code.
///
/// Accepts `Y`, `N`, `true` and `false` in any case. The wire decoder does
/// not use this; on the wire only `Y` and `N` are valid.
#[must_use]
pub fn parse_bool_lenient(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("y") || value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("n") || value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_renders_tag_value_soh() {
        let mut buf = Vec::new();
        Field::string(55, "EUR/USD").write_to(&mut buf);
        Field::bool(43, true).write_to(&mut buf);
        Field::int(34, -7).write_to(&mut buf);
        Field::char(54, '1').write_to(&mut buf);
        Field::float(44, FixedPointNumber::new(5, 2)).write_to(&mut buf);
        assert_eq!(buf, b"55=EUR/USD\x0143=Y\x0134=-7\x0154=1\x0144=0.05\x01");
    }

    #[test]
    fn test_temporal_values_render() {
        let ts = UtcTimestamp::parse(b"19980604-08:03:31").unwrap();
        assert_eq!(
            Field::timestamp(52, ts).value.to_bytes(),
            b"19980604-08:03:31.000"
        );
        let d = UtcDateOnly::parse(b"20240229").unwrap();
        assert_eq!(Field::date_only(75, d).to_string(), "75=20240229");
    }

    #[test]
    fn test_accessors_match_kind() {
        let v = FieldValue::Int(42);
        assert_eq!(v.as_int(), Some(42));
        assert_eq!(v.as_str(), None);
        assert_eq!(v.kind(), "Int");
        assert_eq!(FieldValue::Bool(false).to_string(), "N");
    }

    #[test]
    fn test_parse_bool_lenient() {
        assert_eq!(parse_bool_lenient("Y"), Some(true));
        assert_eq!(parse_bool_lenient("true"), Some(true));
        assert_eq!(parse_bool_lenient("FALSE"), Some(false));
        assert_eq!(parse_bool_lenient("n"), Some(false));
        assert_eq!(parse_bool_lenient("yes"), None);
    }
}
