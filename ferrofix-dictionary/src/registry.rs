/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Static tag → [`FieldType`] table and typed value decoding.
//!
//! The table is a compile-time `match`; tags it does not list are treated
//! as [`FieldType::String`].

use crate::schema::FieldType;
use ferrofix_core::{
    DecodeError, Field, FieldValue, FixedPointNumber, UtcDateOnly, UtcTimeOnly, UtcTimestamp,
};

/// Semantic category of a standard tag.
#[must_use]
pub const fn field_type(tag: u32) -> FieldType {
    match tag {
        7 | 16 | 34 | 36 | 45 | 369 | 789 => FieldType::SeqNum,
        9 | 90 | 93 | 95 | 212 | 354 | 356 => FieldType::Length,
        73 | 78 | 136 | 146 | 199 | 232 | 268 | 382 | 384 | 453 | 454 | 539 | 555 | 802 => {
            FieldType::NumInGroup
        }
        371 => FieldType::TagNum,
        205 => FieldType::DayOfMonth,
        98 | 102 | 103 | 108 | 290 | 346 | 373 | 380 | 452 | 803 | 1130 => FieldType::Int,
        14 | 32 | 38 | 53 | 80 | 110 | 111 | 151 | 271 => FieldType::Qty,
        6 | 31 | 44 | 99 | 132 | 133 | 270 => FieldType::Price,
        211 => FieldType::PriceOffset,
        118 | 119 | 381 => FieldType::Amt,
        194 => FieldType::Float,
        12 | 153 => FieldType::Percentage,
        4 | 20 | 21 | 39 | 40 | 54 | 59 | 150 | 269 | 279 | 385 | 447 | 661 => FieldType::Char,
        43 | 97 | 121 | 123 | 141 | 325 | 464 => FieldType::Boolean,
        18 => FieldType::MultipleValueString,
        15 | 120 => FieldType::Currency,
        30 | 100 | 207 => FieldType::Exchange,
        421 => FieldType::Country,
        200 => FieldType::MonthYear,
        52 | 60 | 122 | 126 => FieldType::UtcTimestamp,
        273 => FieldType::UtcTimeOnly,
        272 => FieldType::UtcDateOnly,
        64 | 75 | 432 => FieldType::LocalMktDate,
        89 | 91 | 96 | 213 => FieldType::Data,
        _ => FieldType::String,
    }
}

/// Standard header tags. The decoder routes these into the header.
#[must_use]
pub const fn is_header_tag(tag: u32) -> bool {
    matches!(
        tag,
        8 | 9
            | 34
            | 35
            | 43
            | 49
            | 50
            | 52
            | 56
            | 57
            | 90
            | 91
            | 97
            | 115
            | 116
            | 122
            | 128
            | 129
            | 142
            | 143
            | 144
            | 145
            | 212
            | 213
            | 347
            | 369
            | 1128
            | 1129
            | 1156
    )
}

/// Standard trailer tags.
#[must_use]
pub const fn is_trailer_tag(tag: u32) -> bool {
    matches!(tag, 10 | 89 | 93)
}

fn as_text(tag: u32, bytes: &[u8]) -> Result<&str, DecodeError> {
    std::str::from_utf8(bytes).map_err(|_| DecodeError::invalid_value(tag, "value is not valid UTF-8"))
}

/// Parses an integer field value.
///
/// # Errors
/// [`DecodeError::InvalidFieldValue`] when `bytes` is not a signed decimal
/// integer in `i64` range.
pub fn parse_int(tag: u32, bytes: &[u8]) -> Result<i64, DecodeError> {
    as_text(tag, bytes)?
        .parse::<i64>()
        .map_err(|e| DecodeError::invalid_value(tag, format!("expected integer: {e}")))
}

/// Builds the typed [`Field`] for `bytes` according to `field_type`.
///
/// Integer categories become `Int`, decimal categories `Float`, `Char` and
/// `Boolean` their own kinds, the three UTC categories temporal values, and
/// everything else `String`.
///
/// # Errors
/// [`DecodeError::InvalidFieldValue`] when the bytes do not fit the
/// category.
pub fn decode_value(tag: u32, field_type: FieldType, bytes: &[u8]) -> Result<Field, DecodeError> {
    let value = match field_type {
        t if t.is_integer() => FieldValue::Int(parse_int(tag, bytes)?),
        t if t.is_decimal() => FieldValue::Float(
            FixedPointNumber::parse(bytes).map_err(|e| DecodeError::invalid_value(tag, e.to_string()))?,
        ),
        FieldType::Char => {
            let text = as_text(tag, bytes)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => FieldValue::Char(c),
                _ => return Err(DecodeError::invalid_value(tag, "expected single character")),
            }
        }
        FieldType::Boolean => match bytes {
            b"Y" => FieldValue::Bool(true),
            b"N" => FieldValue::Bool(false),
            _ => return Err(DecodeError::invalid_value(tag, "expected 'Y' or 'N'")),
        },
        FieldType::UtcTimestamp => FieldValue::UtcTimestamp(UtcTimestamp::parse(bytes).ok_or_else(
            || DecodeError::invalid_value(tag, "expected YYYYMMDD-HH:MM:SS[.sss]"),
        )?),
        FieldType::UtcTimeOnly => FieldValue::UtcTimeOnly(
            UtcTimeOnly::parse(bytes)
                .ok_or_else(|| DecodeError::invalid_value(tag, "expected HH:MM:SS[.sss]"))?,
        ),
        FieldType::UtcDateOnly => FieldValue::UtcDateOnly(
            UtcDateOnly::parse(bytes)
                .ok_or_else(|| DecodeError::invalid_value(tag, "expected YYYYMMDD"))?,
        ),
        FieldType::Data => FieldValue::String(String::from_utf8_lossy(bytes).into_owned()),
        _ => FieldValue::String(as_text(tag, bytes)?.to_owned()),
    };
    Ok(Field::new(tag, value))
}
