/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # ferrofix core
//!
//! Core types and error definitions shared by every ferrofix crate:
//! - **Error types**: per-layer `thiserror` enums unified under [`FixError`]
//! - **Numbers**: [`FixedPointNumber`], exact decimals parsed from ASCII
//! - **Fields**: [`Field`], [`FieldValue`] and the UTC temporal types
//! - **Groups**: [`Group`], [`GroupField`] and the [`Fragment`] sum type
//! - **Messages**: [`Message`] with [`Header`], ordered body and [`Trailer`]
//! - **Tags**: constants for the session-level tag numbers

pub mod error;
pub mod field;
pub mod fixed;
pub mod group;
pub mod message;
pub mod tags;
pub mod time;

pub use error::{DecodeError, EncodeError, FixError, NumericError, Result, SessionError};
pub use field::{Field, FieldValue, parse_bool_lenient};
pub use fixed::FixedPointNumber;
pub use group::{Fragment, Group, GroupField};
pub use message::{Header, Message, MsgType, Trailer};
pub use time::{TimePrecision, UtcDateOnly, UtcTimeOnly, UtcTimestamp};

/// Field delimiter on the wire.
pub const SOH: u8 = 0x01;
