/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Exact scaled-decimal numbers for FIX price, quantity and amount fields.
//!
//! A [`FixedPointNumber`] is the pair `(scaled_value, scale)` and stands for
//! `scaled_value × 10^-scale`. It is parsed straight from the ASCII digits on
//! the wire, so `1.50` keeps its trailing zero and renders back byte for byte.
//! Binary floating point never takes part in the wire path.

use crate::error::NumericError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exact decimal value as found on the wire.
///
/// Equality, hashing and ordering compare the raw `(scaled_value, scale)`
/// pair, so `1.5` and `1.50` are different values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FixedPointNumber {
    scaled_value: i64,
    scale: u8,
}

impl FixedPointNumber {
    /// Zero with scale 0.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a number from its raw parts.
    #[inline]
    #[must_use]
    pub const fn new(scaled_value: i64, scale: u8) -> Self {
        Self {
            scaled_value,
            scale,
        }
    }

    /// Creates an integral number (scale 0).
    #[inline]
    #[must_use]
    pub const fn from_i64(value: i64) -> Self {
        Self::new(value, 0)
    }

    /// Rounds `value` to `precision` decimal places (half away from zero).
    ///
    /// # Errors
    /// Returns [`NumericError::Overflow`] when the value is not finite or the
    /// scaled result does not fit an `i64`.
    pub fn from_f64(value: f64, precision: u8) -> Result<Self, NumericError> {
        let scaled = (value * 10f64.powi(i32::from(precision))).round();
        if !scaled.is_finite() || scaled >= i64::MAX as f64 || scaled < i64::MIN as f64 {
            return Err(NumericError::Overflow(value.to_string()));
        }
        Ok(Self::new(scaled as i64, precision))
    }

    /// Parses an ASCII decimal literal such as `-12.0500`.
    ///
    /// Accepts one optional leading sign, digits and at most one decimal
    /// point. The number of digits after the point becomes the scale.
    ///
    /// # Errors
    /// [`NumericError::InvalidNumericLiteral`] for any other byte or when no
    /// digit is present; [`NumericError::Overflow`] when the digits exceed
    /// the `i64` range.
    pub fn parse(bytes: &[u8]) -> Result<Self, NumericError> {
        let invalid = || NumericError::InvalidNumericLiteral(String::from_utf8_lossy(bytes).into());
        let overflow = || NumericError::Overflow(String::from_utf8_lossy(bytes).into());

        let (negative, digits) = match bytes.first() {
            Some(b'-') => (true, &bytes[1..]),
            Some(b'+') => (false, &bytes[1..]),
            _ => (false, bytes),
        };

        let mut scaled: i64 = 0;
        let mut scale: u8 = 0;
        let mut seen_point = false;
        let mut seen_digit = false;

        for &b in digits {
            match b {
                b'0'..=b'9' => {
                    let digit = i64::from(b - b'0');
                    let shifted = scaled.checked_mul(10).ok_or_else(overflow)?;
                    // Accumulate on the signed side so i64::MIN stays reachable.
                    scaled = if negative {
                        shifted.checked_sub(digit)
                    } else {
                        shifted.checked_add(digit)
                    }
                    .ok_or_else(overflow)?;
                    if seen_point {
                        scale = scale.checked_add(1).ok_or_else(overflow)?;
                    }
                    seen_digit = true;
                }
                b'.' if !seen_point => seen_point = true,
                _ => return Err(invalid()),
            }
        }

        if !seen_digit {
            return Err(invalid());
        }
        Ok(Self::new(scaled, scale))
    }

    /// Parses `length` bytes of `bytes` starting at `offset`.
    ///
    /// # Errors
    /// Same as [`FixedPointNumber::parse`]; an out-of-bounds range is an
    /// invalid literal.
    pub fn parse_range(bytes: &[u8], offset: usize, length: usize) -> Result<Self, NumericError> {
        let end = offset.checked_add(length);
        match end.and_then(|end| bytes.get(offset..end)) {
            Some(slice) => Self::parse(slice),
            None => Err(NumericError::InvalidNumericLiteral(format!(
                "range {offset}+{length} outside {} bytes",
                bytes.len()
            ))),
        }
    }

    /// Returns the scaled integer.
    #[inline]
    #[must_use]
    pub const fn scaled_value(&self) -> i64 {
        self.scaled_value
    }

    /// Returns the number of decimal places.
    #[inline]
    #[must_use]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Approximates the value as an `f64`. Not used on the wire path.
    #[must_use]
    pub fn double_value(&self) -> f64 {
        self.scaled_value as f64 / 10f64.powi(i32::from(self.scale))
    }

    /// Integral part, truncated toward zero.
    #[must_use]
    pub fn long_value(&self) -> i64 {
        match 10i64.checked_pow(u32::from(self.scale)) {
            Some(divisor) => self.scaled_value / divisor,
            // |scaled_value| < 10^19 always, so the integral part is zero.
            None => 0,
        }
    }

    /// Exact conversion to a [`Decimal`], if the scale is within its range.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        Decimal::try_from_i128_with_scale(i128::from(self.scaled_value), u32::from(self.scale))
            .ok()
    }

    /// Appends the canonical ASCII rendering to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        let mut itoa_buf = itoa::Buffer::new();
        let digits = itoa_buf.format(self.scaled_value.unsigned_abs()).as_bytes();
        let scale = usize::from(self.scale);

        if self.scaled_value < 0 {
            buf.push(b'-');
        }
        if scale == 0 {
            buf.extend_from_slice(digits);
        } else if digits.len() <= scale {
            buf.extend_from_slice(b"0.");
            buf.resize(buf.len() + scale - digits.len(), b'0');
            buf.extend_from_slice(digits);
        } else {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            buf.extend_from_slice(int_part);
            buf.push(b'.');
            buf.extend_from_slice(frac_part);
        }
    }

    /// Returns the canonical ASCII rendering.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(24);
        self.write_to(&mut buf);
        buf
    }
}

impl From<i64> for FixedPointNumber {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl TryFrom<Decimal> for FixedPointNumber {
    type Error = NumericError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let scaled = i64::try_from(value.mantissa())
            .map_err(|_| NumericError::Overflow(value.to_string()))?;
        let scale =
            u8::try_from(value.scale()).map_err(|_| NumericError::Overflow(value.to_string()))?;
        Ok(Self::new(scaled, scale))
    }
}

impl FromStr for FixedPointNumber {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

impl fmt::Display for FixedPointNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // write_to only emits ASCII.
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_keeps_every_fraction_digit() {
        let n = FixedPointNumber::parse(b"1.234567890").unwrap();
        assert_eq!(n.scaled_value(), 1_234_567_890);
        assert_eq!(n.scale(), 9);
        assert_eq!(n.to_string(), "1.234567890");
    }

    #[test]
    fn test_parse_signs() {
        assert_eq!(
            FixedPointNumber::parse(b"-12.50").unwrap(),
            FixedPointNumber::new(-1250, 2)
        );
        assert_eq!(
            FixedPointNumber::parse(b"+7").unwrap(),
            FixedPointNumber::new(7, 0)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let inputs: [&[u8]; 9] = [b"", b"-", b"+", b".", b"1.2.3", b"12a", b"--1", b"1-", b" 1"];
        for bad in inputs {
            assert!(
                matches!(
                    FixedPointNumber::parse(bad),
                    Err(NumericError::InvalidNumericLiteral(_))
                ),
                "{:?} should be rejected",
                String::from_utf8_lossy(bad)
            );
        }
    }

    #[test]
    fn test_parse_overflow() {
        assert!(matches!(
            FixedPointNumber::parse(b"99999999999999999999"),
            Err(NumericError::Overflow(_))
        ));
        assert_eq!(
            FixedPointNumber::parse(b"-9223372036854775808")
                .unwrap()
                .scaled_value(),
            i64::MIN
        );
    }

    #[test]
    fn test_parse_range() {
        let buf = b"44=101.25\x01";
        let n = FixedPointNumber::parse_range(buf, 3, 6).unwrap();
        assert_eq!(n, FixedPointNumber::new(10125, 2));
        assert!(FixedPointNumber::parse_range(buf, 8, 10).is_err());
    }

    #[test]
    fn test_render_pads_small_magnitudes() {
        assert_eq!(FixedPointNumber::new(5, 2).to_string(), "0.05");
        assert_eq!(FixedPointNumber::new(-5, 2).to_string(), "-0.05");
        assert_eq!(FixedPointNumber::new(42, 0).to_string(), "42");
        assert_eq!(FixedPointNumber::new(-42, 0).to_string(), "-42");
        assert_eq!(FixedPointNumber::new(100, 2).to_string(), "1.00");
        assert_eq!(FixedPointNumber::new(0, 3).to_string(), "0.000");
    }

    #[test]
    fn test_equality_is_not_normalized() {
        let a = FixedPointNumber::parse(b"1.5").unwrap();
        let b = FixedPointNumber::parse(b"1.50").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.double_value(), b.double_value());
    }

    #[test]
    fn test_long_value_truncates() {
        assert_eq!(FixedPointNumber::new(1999, 3).long_value(), 1);
        assert_eq!(FixedPointNumber::new(-1999, 3).long_value(), -1);
        assert_eq!(FixedPointNumber::new(1, 25).long_value(), 0);
    }

    #[test]
    fn test_from_f64_rounds_at_precision() {
        let n = FixedPointNumber::from_f64(1.23456, 3).unwrap();
        assert_eq!(n, FixedPointNumber::new(1235, 3));
        assert_eq!(n.to_string(), "1.235");
        assert!(FixedPointNumber::from_f64(f64::NAN, 2).is_err());
        assert!(FixedPointNumber::from_f64(1e30, 2).is_err());
    }

    #[test]
    fn test_decimal_interop() {
        let n = FixedPointNumber::parse(b"-3.1400").unwrap();
        let d = n.to_decimal().unwrap();
        assert_eq!(d.to_string(), "-3.1400");
        assert_eq!(FixedPointNumber::try_from(d).unwrap(), n);
    }

    proptest! {
        #[test]
        fn prop_rendering_parses_back(scaled in any::<i64>(), scale in 0u8..=18) {
            let n = FixedPointNumber::new(scaled, scale);
            prop_assert_eq!(FixedPointNumber::parse(&n.to_bytes()).unwrap(), n);
        }

        #[test]
        fn prop_long_value_matches_integer_part(scaled in -1_000_000_000i64..1_000_000_000, scale in 0u8..=6) {
            let n = FixedPointNumber::new(scaled, scale);
            prop_assert_eq!(n.long_value(), scaled / 10i64.pow(u32::from(scale)));
        }
    }
}
