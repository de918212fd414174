/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX message encoder.
//!
//! Renders a [`Message`] in the standard tag=value format. BeginString,
//! BodyLength and CheckSum are always computed here; any values the
//! message carries for them are ignored.

use crate::checksum::{calculate_checksum, format_checksum};
use bytes::{BufMut, BytesMut};
use ferrofix_core::error::EncodeError;
use ferrofix_core::{Field, FieldValue, Fragment, Message, SOH, tags};
use tracing::warn;

/// Tags the encoder owns. They may not appear among custom fields.
const FRAMING_TAGS: [u32; 3] = [tags::BEGIN_STRING, tags::BODY_LENGTH, tags::CHECK_SUM];

/// Header tags rendered from the typed [`Header`](ferrofix_core::Header)
/// slots. A second copy among custom fields would shadow the slot on decode.
const TYPED_HEADER_TAGS: [u32; 9] = [
    tags::MSG_TYPE,
    tags::SENDER_COMP_ID,
    tags::TARGET_COMP_ID,
    tags::MSG_SEQ_NUM,
    tags::SENDER_SUB_ID,
    tags::TARGET_SUB_ID,
    tags::SENDER_LOCATION_ID,
    tags::TARGET_LOCATION_ID,
    tags::SENDING_TIME,
];

/// Stateless FIX message encoder.
///
/// Holds no buffers, so one instance can be shared by every connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder;

impl Encoder {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Encodes `message` into a fresh buffer.
    ///
    /// # Errors
    /// See [`Encoder::encode_into`].
    pub fn encode(&self, message: &Message) -> Result<BytesMut, EncodeError> {
        let mut dst = BytesMut::with_capacity(256);
        self.encode_into(message, &mut dst)?;
        Ok(dst)
    }

    /// Appends the wire form of `message` to `dst`.
    ///
    /// Body order: MsgType, SenderCompID, TargetCompID, MsgSeqNum, the
    /// optional sub and location ids, SendingTime, custom header fields,
    /// body fragments, then trailer signature fields.
    ///
    /// # Errors
    /// [`EncodeError::MissingRequiredField`] when BeginString, MsgType,
    /// SenderCompID or TargetCompID is missing;
    /// [`EncodeError::InvalidFieldValue`] when a value is empty or would
    /// break framing, or a custom field reuses a framing or typed header tag.
    /// `dst` is left untouched on error.
    pub fn encode_into(&self, message: &Message, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let header = message.header();
        let msg_type = header
            .msg_type
            .as_ref()
            .ok_or(EncodeError::MissingRequiredField { tag: tags::MSG_TYPE })?;
        require(tags::BEGIN_STRING, &header.begin_string)?;
        require(tags::MSG_TYPE, msg_type.as_str())?;
        require(tags::SENDER_COMP_ID, &header.sender_comp_id)?;
        require(tags::TARGET_COMP_ID, &header.target_comp_id)?;

        let mut body: Vec<u8> = Vec::with_capacity(192);
        put_raw(&mut body, tags::MSG_TYPE, msg_type.as_str().as_bytes());
        put_raw(&mut body, tags::SENDER_COMP_ID, header.sender_comp_id.as_bytes());
        put_raw(&mut body, tags::TARGET_COMP_ID, header.target_comp_id.as_bytes());
        if let Some(seq) = header.msg_seq_num {
            put_raw(&mut body, tags::MSG_SEQ_NUM, itoa::Buffer::new().format(seq).as_bytes());
        }
        let optional = [
            (tags::SENDER_SUB_ID, &header.sender_sub_id),
            (tags::TARGET_SUB_ID, &header.target_sub_id),
            (tags::SENDER_LOCATION_ID, &header.sender_location_id),
            (tags::TARGET_LOCATION_ID, &header.target_location_id),
        ];
        for (tag, value) in optional {
            if let Some(value) = value {
                check_text(tag, value)?;
                put_raw(&mut body, tag, value.as_bytes());
            }
        }
        if let Some(sending_time) = &header.sending_time {
            put_raw(&mut body, tags::SENDING_TIME, sending_time.format().as_bytes());
        }
        for field in &header.fields {
            check_field(field)?;
            field.write_to(&mut body);
        }
        for fragment in message.body() {
            check_fragment(fragment)?;
            fragment.write_to(&mut body);
        }
        for field in &message.trailer().fields {
            check_field(field)?;
            field.write_to(&mut body);
        }

        let start = dst.len();
        dst.reserve(header.begin_string.len() + body.len() + 24);
        dst.put_slice(b"8=");
        dst.put_slice(header.begin_string.as_bytes());
        dst.put_u8(SOH);
        dst.put_slice(b"9=");
        dst.put_slice(itoa::Buffer::new().format(body.len()).as_bytes());
        dst.put_u8(SOH);
        dst.put_slice(&body);

        let checksum = calculate_checksum(&dst[start..]);
        dst.put_slice(b"10=");
        dst.put_slice(&format_checksum(checksum));
        dst.put_u8(SOH);
        Ok(())
    }
}

/// Appends `tag=value<SOH>`.
#[inline]
fn put_raw(buf: &mut Vec<u8>, tag: u32, value: &[u8]) {
    buf.extend_from_slice(itoa::Buffer::new().format(tag).as_bytes());
    buf.push(b'=');
    buf.extend_from_slice(value);
    buf.push(SOH);
}

fn require(tag: u32, value: &str) -> Result<(), EncodeError> {
    if value.is_empty() {
        warn!(tag, "cannot encode message without required field");
        return Err(EncodeError::MissingRequiredField { tag });
    }
    check_text(tag, value)
}

fn check_text(tag: u32, value: &str) -> Result<(), EncodeError> {
    if value.is_empty() {
        return Err(EncodeError::InvalidFieldValue {
            tag,
            reason: "empty value".to_string(),
        });
    }
    if value.as_bytes().contains(&SOH) {
        return Err(EncodeError::InvalidFieldValue {
            tag,
            reason: "value contains the SOH delimiter".to_string(),
        });
    }
    Ok(())
}

fn check_reserved(tag: u32) -> Result<(), EncodeError> {
    if FRAMING_TAGS.contains(&tag) {
        return Err(EncodeError::InvalidFieldValue {
            tag,
            reason: "framing tag is computed by the encoder".to_string(),
        });
    }
    if TYPED_HEADER_TAGS.contains(&tag) {
        return Err(EncodeError::InvalidFieldValue {
            tag,
            reason: "header tag has a typed slot".to_string(),
        });
    }
    Ok(())
}

fn check_field(field: &Field) -> Result<(), EncodeError> {
    check_reserved(field.tag)?;
    match &field.value {
        FieldValue::String(s) => check_text(field.tag, s),
        FieldValue::Char(c) => check_text(field.tag, c.encode_utf8(&mut [0u8; 4])),
        _ => Ok(()),
    }
}

fn check_fragment(fragment: &Fragment) -> Result<(), EncodeError> {
    match fragment {
        Fragment::Field(field) => check_field(field),
        Fragment::Group(group) => {
            check_reserved(group.count_tag)?;
            group
                .groups
                .iter()
                .flat_map(|g| g.fragments())
                .try_for_each(check_fragment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrofix_core::{Group, GroupField, MsgType, UtcTimestamp};

    fn heartbeat() -> Message {
        let mut msg = Message::new(MsgType::Heartbeat);
        let header = msg.header_mut();
        header.begin_string = "FIX.4.1".to_string();
        header.sender_comp_id = "INVMGR".to_string();
        header.target_comp_id = "BRKR".to_string();
        header.msg_seq_num = Some(240);
        header.sending_time = UtcTimestamp::parse(b"19980604-08:03:31")
            .map(|t| t.with_precision(ferrofix_core::TimePrecision::Seconds));
        msg
    }

    #[test]
    fn test_encode_sample_heartbeat() {
        let bytes = Encoder::new().encode(&heartbeat()).unwrap();
        assert_eq!(
            &bytes[..],
            b"8=FIX.4.1\x019=51\x0135=0\x0149=INVMGR\x0156=BRKR\x0134=240\x0152=19980604-08:03:31\x0110=126\x01"
        );
    }

    #[test]
    fn test_encode_logon_sample() {
        let mut msg = Message::new(MsgType::Logon);
        let header = msg.header_mut();
        header.begin_string = "FIX.4.2".to_string();
        header.sender_comp_id = "SERVER".to_string();
        header.target_comp_id = "CLIENT".to_string();
        header.msg_seq_num = Some(177);
        header.sending_time = UtcTimestamp::parse(b"20090107-18:15:16")
            .map(|t| t.with_precision(ferrofix_core::TimePrecision::Seconds));
        msg.add_int(tags::ENCRYPT_METHOD, 0).add_int(tags::HEART_BT_INT, 30);

        let bytes = Encoder::new().encode(&msg).unwrap();
        assert_eq!(
            String::from_utf8_lossy(&bytes).replace('\x01', "|"),
            "8=FIX.4.2|9=65|35=A|49=SERVER|56=CLIENT|34=177|52=20090107-18:15:16|98=0|108=30|10=062|"
        );
    }

    #[test]
    fn test_encode_requires_header_fields() {
        let mut msg = heartbeat();
        msg.header_mut().begin_string.clear();
        assert_eq!(
            Encoder::new().encode(&msg),
            Err(EncodeError::MissingRequiredField { tag: 8 })
        );

        let mut msg = heartbeat();
        msg.header_mut().msg_type = None;
        assert_eq!(
            Encoder::new().encode(&msg),
            Err(EncodeError::MissingRequiredField { tag: 35 })
        );

        let mut msg = heartbeat();
        msg.header_mut().sender_comp_id.clear();
        assert_eq!(
            Encoder::new().encode(&msg),
            Err(EncodeError::MissingRequiredField { tag: 49 })
        );

        let mut msg = heartbeat();
        msg.header_mut().target_comp_id.clear();
        assert_eq!(
            Encoder::new().encode(&msg),
            Err(EncodeError::MissingRequiredField { tag: 56 })
        );
    }

    #[test]
    fn test_encode_rejects_framing_breakers() {
        let mut msg = heartbeat();
        msg.add_str(tags::TEXT, "a\x01b");
        assert!(matches!(
            Encoder::new().encode(&msg),
            Err(EncodeError::InvalidFieldValue { tag: 58, .. })
        ));

        let mut msg = heartbeat();
        msg.add_int(tags::CHECK_SUM, 1);
        assert!(matches!(
            Encoder::new().encode(&msg),
            Err(EncodeError::InvalidFieldValue { tag: 10, .. })
        ));
    }

    #[test]
    fn test_encode_rejects_empty_value() {
        let mut msg = heartbeat();
        msg.add_str(tags::TEXT, "");
        assert_eq!(
            Encoder::new().encode(&msg),
            Err(EncodeError::InvalidFieldValue {
                tag: 58,
                reason: "empty value".to_string(),
            })
        );

        let mut msg = heartbeat();
        msg.header_mut().sender_sub_id = Some(String::new());
        assert!(matches!(
            Encoder::new().encode(&msg),
            Err(EncodeError::InvalidFieldValue { tag: 50, .. })
        ));

        let mut msg = heartbeat();
        msg.add_group(GroupField::new(1002).with(Group::new().with(Field::string(1003, ""))));
        assert!(matches!(
            Encoder::new().encode(&msg),
            Err(EncodeError::InvalidFieldValue { tag: 1003, .. })
        ));
    }

    #[test]
    fn test_encode_rejects_typed_header_tag_in_body() {
        let mut msg = heartbeat();
        msg.add_int(tags::MSG_SEQ_NUM, 5);
        assert_eq!(
            Encoder::new().encode(&msg),
            Err(EncodeError::InvalidFieldValue {
                tag: 34,
                reason: "header tag has a typed slot".to_string(),
            })
        );

        for tag in TYPED_HEADER_TAGS {
            let mut msg = heartbeat();
            msg.add_str(tag, "X");
            assert!(matches!(
                Encoder::new().encode(&msg),
                Err(EncodeError::InvalidFieldValue { tag: t, .. }) if t == tag
            ));
        }

        let mut msg = heartbeat();
        msg.add_group(GroupField::new(tags::SENDING_TIME));
        assert!(matches!(
            Encoder::new().encode(&msg),
            Err(EncodeError::InvalidFieldValue { tag: 52, .. })
        ));
    }

    #[test]
    fn test_encode_group_layout() {
        let mut msg = heartbeat();
        msg.add_group(
            GroupField::new(1002)
                .with(
                    Group::new()
                        .with(Field::string(1003, "g1-1"))
                        .with(Field::string(1004, "g1-2")),
                )
                .with(
                    Group::new()
                        .with(Field::string(1003, "g2-1"))
                        .with(Field::string(1004, "g2-2")),
                ),
        );
        let bytes = Encoder::new().encode(&msg).unwrap();
        let text = String::from_utf8_lossy(&bytes).replace('\x01', "|");
        assert!(text.contains("|1002=2|1003=g1-1|1004=g1-2|1003=g2-1|1004=g2-2|10="));
    }

    #[test]
    fn test_encode_into_appends() {
        let mut dst = BytesMut::from(&b"prefix"[..]);
        Encoder::new().encode_into(&heartbeat(), &mut dst).unwrap();
        assert!(dst.starts_with(b"prefix8=FIX.4.1\x01"));
        let tail = &dst[dst.len() - 7..];
        assert_eq!(tail, b"10=126\x01");
    }
}
