/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX message model.
//!
//! This module provides:
//! - [`MsgType`]: Enumeration of FIX message types
//! - [`Header`]: Standard header with typed slots and custom header fields
//! - [`Trailer`]: Checksum and signature fields
//! - [`Message`]: Header, ordered body fragments and trailer

use crate::field::{Field, FieldValue};
use crate::fixed::FixedPointNumber;
use crate::group::{Fragment, GroupField};
use crate::tags;
use crate::time::UtcTimestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// FIX message types.
///
/// Session-level types plus the application types the engine itself needs
/// to recognise. Everything else is carried as `Custom(String)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Resend Request (2) - Session level.
    ResendRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Sequence Reset (4) - Session level.
    SequenceReset,
    /// Logout (5) - Session level.
    Logout,
    /// Logon (A) - Session level.
    Logon,
    /// Execution Report (8).
    ExecutionReport,
    /// News (B).
    News,
    /// New Order Single (D).
    NewOrderSingle,
    /// Order Cancel Request (F).
    OrderCancelRequest,
    /// Order Cancel/Replace Request (G).
    OrderCancelReplaceRequest,
    /// Market Data Request (V).
    MarketDataRequest,
    /// Market Data Snapshot/Full Refresh (W).
    MarketDataSnapshotFullRefresh,
    /// Market Data Incremental Refresh (X).
    MarketDataIncrementalRefresh,
    /// Business Message Reject (j).
    BusinessMessageReject,
    /// Custom or unknown message type.
    Custom(String),
}

impl std::str::FromStr for MsgType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "2" => Self::ResendRequest,
            "3" => Self::Reject,
            "4" => Self::SequenceReset,
            "5" => Self::Logout,
            "A" => Self::Logon,
            "8" => Self::ExecutionReport,
            "B" => Self::News,
            "D" => Self::NewOrderSingle,
            "F" => Self::OrderCancelRequest,
            "G" => Self::OrderCancelReplaceRequest,
            "V" => Self::MarketDataRequest,
            "W" => Self::MarketDataSnapshotFullRefresh,
            "X" => Self::MarketDataIncrementalRefresh,
            "j" => Self::BusinessMessageReject,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl MsgType {
    /// Returns the wire value of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::Logon => "A",
            Self::ExecutionReport => "8",
            Self::News => "B",
            Self::NewOrderSingle => "D",
            Self::OrderCancelRequest => "F",
            Self::OrderCancelReplaceRequest => "G",
            Self::MarketDataRequest => "V",
            Self::MarketDataSnapshotFullRefresh => "W",
            Self::MarketDataIncrementalRefresh => "X",
            Self::BusinessMessageReject => "j",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns true if this is an administrative message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::TestRequest
                | Self::ResendRequest
                | Self::Reject
                | Self::SequenceReset
                | Self::Logout
                | Self::Logon
        )
    }

    /// Returns true if this is an application message.
    #[must_use]
    pub fn is_app(&self) -> bool {
        !self.is_admin()
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard message header.
///
/// Tags 8, 9, 35, 34, 49, 56, 50, 57, 142, 143 and 52 have typed slots;
/// every other header tag is kept in [`Header::fields`] in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// BeginString (8).
    pub begin_string: String,
    /// BodyLength (9) as received. Never used for validation or encoding.
    pub body_length: Option<u32>,
    /// MsgType (35).
    pub msg_type: Option<MsgType>,
    /// SenderCompID (49).
    pub sender_comp_id: String,
    /// TargetCompID (56).
    pub target_comp_id: String,
    /// SenderSubID (50).
    pub sender_sub_id: Option<String>,
    /// TargetSubID (57).
    pub target_sub_id: Option<String>,
    /// SenderLocationID (142).
    pub sender_location_id: Option<String>,
    /// TargetLocationID (143).
    pub target_location_id: Option<String>,
    /// MsgSeqNum (34).
    pub msg_seq_num: Option<u32>,
    /// SendingTime (52).
    pub sending_time: Option<UtcTimestamp>,
    /// Remaining header fields, in order.
    pub fields: Vec<Field>,
}

impl Header {
    /// First custom header field with `tag`.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&Field> {
        self.fields.iter().find(|field| field.tag == tag)
    }

    /// Replaces the first custom header field with the same tag, or appends.
    pub fn set(&mut self, field: Field) {
        match self.fields.iter_mut().find(|f| f.tag == field.tag) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// PossDupFlag (43), `false` when absent.
    #[must_use]
    pub fn poss_dup(&self) -> bool {
        self.get(tags::POSS_DUP_FLAG)
            .and_then(|field| field.value.as_bool())
            .unwrap_or(false)
    }
}

/// Standard message trailer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trailer {
    /// CheckSum (10) as received. Recomputed on encode.
    pub check_sum: Option<u8>,
    /// SignatureLength (93) and Signature (89), in order.
    pub fields: Vec<Field>,
}

/// A FIX message: header, ordered body and trailer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    header: Header,
    body: Vec<Fragment>,
    trailer: Trailer,
}

impl Message {
    /// Creates an empty message of the given type.
    #[must_use]
    pub fn new(msg_type: MsgType) -> Self {
        Self {
            header: Header {
                msg_type: Some(msg_type),
                ..Header::default()
            },
            ..Self::default()
        }
    }

    /// Assembles a message from its parts.
    #[must_use]
    pub fn from_parts(header: Header, body: Vec<Fragment>, trailer: Trailer) -> Self {
        Self {
            header,
            body,
            trailer,
        }
    }

    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    #[must_use]
    pub const fn trailer(&self) -> &Trailer {
        &self.trailer
    }

    pub fn trailer_mut(&mut self) -> &mut Trailer {
        &mut self.trailer
    }

    /// Body fragments in insertion order.
    #[must_use]
    pub fn body(&self) -> &[Fragment] {
        &self.body
    }

    /// MsgType (35), if set.
    #[must_use]
    pub fn msg_type(&self) -> Option<&MsgType> {
        self.header.msg_type.as_ref()
    }

    /// Returns true for session-level messages.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.msg_type().is_some_and(MsgType::is_admin)
    }

    /// MsgSeqNum (34), if set.
    #[must_use]
    pub const fn msg_seq_num(&self) -> Option<u32> {
        self.header.msg_seq_num
    }

    /// Appends a body fragment.
    pub fn push(&mut self, fragment: impl Into<Fragment>) -> &mut Self {
        self.body.push(fragment.into());
        self
    }

    /// Builder-style [`Message::push`].
    #[must_use]
    pub fn with(mut self, fragment: impl Into<Fragment>) -> Self {
        self.body.push(fragment.into());
        self
    }

    pub fn add_str(&mut self, tag: u32, value: impl Into<String>) -> &mut Self {
        self.push(Field::string(tag, value))
    }

    pub fn add_char(&mut self, tag: u32, value: char) -> &mut Self {
        self.push(Field::char(tag, value))
    }

    pub fn add_bool(&mut self, tag: u32, value: bool) -> &mut Self {
        self.push(Field::bool(tag, value))
    }

    pub fn add_int(&mut self, tag: u32, value: i64) -> &mut Self {
        self.push(Field::int(tag, value))
    }

    pub fn add_float(&mut self, tag: u32, value: FixedPointNumber) -> &mut Self {
        self.push(Field::float(tag, value))
    }

    pub fn add_timestamp(&mut self, tag: u32, value: UtcTimestamp) -> &mut Self {
        self.push(Field::timestamp(tag, value))
    }

    pub fn add_group(&mut self, group: GroupField) -> &mut Self {
        self.push(group)
    }

    /// First top-level body field with `tag`.
    ///
    /// Later duplicates of the same tag are not reachable through lookup.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&Field> {
        self.body.iter().find_map(|fragment| match fragment {
            Fragment::Field(field) if field.tag == tag => Some(field),
            _ => None,
        })
    }

    /// Returns true if a body field or group with `tag` is present.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.body.iter().any(|fragment| fragment.tag() == tag)
    }

    fn value(&self, tag: u32) -> Option<&FieldValue> {
        self.get(tag).map(|field| &field.value)
    }

    #[must_use]
    pub fn get_str(&self, tag: u32) -> Option<&str> {
        self.value(tag).and_then(FieldValue::as_str)
    }

    #[must_use]
    pub fn get_int(&self, tag: u32) -> Option<i64> {
        self.value(tag).and_then(FieldValue::as_int)
    }

    #[must_use]
    pub fn get_char(&self, tag: u32) -> Option<char> {
        self.value(tag).and_then(FieldValue::as_char)
    }

    #[must_use]
    pub fn get_bool(&self, tag: u32) -> Option<bool> {
        self.value(tag).and_then(FieldValue::as_bool)
    }

    #[must_use]
    pub fn get_float(&self, tag: u32) -> Option<FixedPointNumber> {
        self.value(tag).and_then(FieldValue::as_float)
    }

    #[must_use]
    pub fn get_timestamp(&self, tag: u32) -> Option<UtcTimestamp> {
        self.value(tag).and_then(FieldValue::as_timestamp)
    }

    /// First top-level group with `count_tag`.
    #[must_use]
    pub fn get_group(&self, count_tag: u32) -> Option<&GroupField> {
        self.body.iter().find_map(|fragment| match fragment {
            Fragment::Group(group) if group.count_tag == count_tag => Some(group),
            _ => None,
        })
    }

    /// PossDupFlag (43) from the header, or from the body when a sender put
    /// it there.
    #[must_use]
    pub fn poss_dup(&self) -> bool {
        self.header.poss_dup() || self.get_bool(tags::POSS_DUP_FLAG).unwrap_or(false)
    }

    /// Flattened `(tag, rendered value)` sequence of the body, groups
    /// expanded to their count field followed by each instance.
    #[must_use]
    pub fn fields_in_order(&self) -> Vec<(u32, Vec<u8>)> {
        let mut out = Vec::with_capacity(self.body.len());
        for fragment in &self.body {
            fragment.flatten_into(&mut out);
        }
        out
    }
}

impl fmt::Display for Message {
    /// Human-readable form with `|` in place of SOH, body only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}->{} #{})",
            self.msg_type().map_or("?", MsgType::as_str),
            self.header.sender_comp_id,
            self.header.target_comp_id,
            self.header.msg_seq_num.unwrap_or(0)
        )?;
        for (tag, value) in self.fields_in_order() {
            write!(f, "|{}={}", tag, String::from_utf8_lossy(&value))?;
        }
        Ok(())
    }
}
