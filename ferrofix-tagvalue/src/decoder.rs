/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Streaming FIX message decoder.
//!
//! The decoder is fed one `tag=value` record at a time and assembles a
//! [`Message`] as the records arrive. The checksum is accumulated in the
//! same pass, so tag 10 can be verified without re-reading the message.
//!
//! One decoder serves one connection; it holds the partial message between
//! calls and is driven through `&mut self`.

use crate::checksum::{RunningChecksum, parse_checksum};
use ferrofix_core::error::DecodeError;
use ferrofix_core::{Field, Fragment, Group, GroupField, Header, Message, MsgType, SOH, Trailer, tags};
use ferrofix_dictionary::{Dictionary, GroupDef, registry};
use memchr::memchr;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, warn};

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// Repeating group being filled.
#[derive(Debug)]
struct GroupFrame {
    def: GroupDef,
    declared: usize,
    field: GroupField,
}

impl GroupFrame {
    fn current(&mut self) -> Option<&mut Group> {
        self.field.groups.last_mut()
    }
}

/// Message under construction.
#[derive(Debug, Default)]
struct Partial {
    header: Header,
    body: Vec<Fragment>,
    trailer: Trailer,
    checksum: RunningChecksum,
    frames: SmallVec<[GroupFrame; 4]>,
}

impl Partial {
    fn start(begin_string: String, record: &[u8]) -> Self {
        let mut partial = Self::default();
        partial.header.begin_string = begin_string;
        partial.checksum.update(record);
        partial.checksum.update_byte(SOH);
        partial
    }

    /// Closes the innermost open group and attaches it to its parent.
    fn close_frame(&mut self) -> Result<(), DecodeError> {
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        let actual = frame.field.groups.len();
        if actual != frame.declared {
            return Err(DecodeError::GroupCountMismatch {
                count_tag: frame.def.count_tag,
                expected: frame.declared,
                actual,
            });
        }
        let fragment = Fragment::Group(frame.field);
        match self.frames.last_mut().and_then(GroupFrame::current) {
            Some(parent) => {
                parent.push(fragment);
            }
            None => self.body.push(fragment),
        }
        Ok(())
    }

    fn close_all_frames(&mut self) -> Result<(), DecodeError> {
        while !self.frames.is_empty() {
            self.close_frame()?;
        }
        Ok(())
    }

    fn open_frame(&mut self, def: GroupDef, value: &[u8]) -> Result<(), DecodeError> {
        let count_tag = def.count_tag;
        let declared = usize::try_from(registry::parse_int(count_tag, value)?)
            .map_err(|_| DecodeError::invalid_value(count_tag, "negative group count"))?;
        self.frames.push(GroupFrame {
            def,
            declared,
            field: GroupField::new(count_tag),
        });
        Ok(())
    }

    /// Places a body record: into an open group, as a new group, or at the
    /// top level.
    fn push_body(&mut self, dictionary: &Dictionary, tag: u32, value: &[u8]) -> Result<(), DecodeError> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                if let Some(def) = dictionary.group(tag) {
                    return self.open_frame(def.clone(), value);
                }
                self.body.push(Fragment::Field(dictionary.decode_value(tag, value)?));
                return Ok(());
            };

            if tag == frame.def.delimiter_tag {
                let field = dictionary.decode_value(tag, value)?;
                frame.field.push(Group::new().with(field));
                return Ok(());
            }
            if frame.current().is_some() {
                if frame.def.is_member(tag) {
                    let field = dictionary.decode_value(tag, value)?;
                    if let Some(instance) = frame.current() {
                        instance.push(field);
                    }
                    return Ok(());
                }
                if let Some(nested) = frame.def.nested(tag) {
                    let nested = nested.clone();
                    return self.open_frame(nested, value);
                }
            }
            self.close_frame()?;
        }
    }

    fn into_message(self) -> Message {
        Message::from_parts(self.header, self.body, self.trailer)
    }
}

fn text(tag: u32, value: &[u8]) -> Result<String, DecodeError> {
    std::str::from_utf8(value)
        .map(str::to_owned)
        .map_err(|_| DecodeError::invalid_value(tag, "value is not valid UTF-8"))
}

fn unsigned(tag: u32, value: &[u8]) -> Result<u32, DecodeError> {
    u32::try_from(registry::parse_int(tag, value)?)
        .map_err(|_| DecodeError::invalid_value(tag, "expected unsigned 32-bit integer"))
}

/// Parses a tag number from ASCII bytes.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }

    (result > 0).then_some(result)
}

/// Splits one raw record into tag and value. The trailing SOH is optional.
fn split_record(raw: &[u8]) -> Result<(&[u8], u32, &[u8]), DecodeError> {
    let record = raw.strip_suffix(&[SOH]).unwrap_or(raw);
    let eq_pos = memchr(EQUALS, record).ok_or_else(|| {
        DecodeError::MalformedField(String::from_utf8_lossy(record).into_owned())
    })?;
    let tag = parse_tag(&record[..eq_pos])
        .ok_or_else(|| DecodeError::InvalidTag(String::from_utf8_lossy(&record[..eq_pos]).into_owned()))?;
    let value = &record[eq_pos + 1..];
    if value.is_empty() {
        return Err(DecodeError::invalid_value(tag, "empty value"));
    }
    Ok((record, tag, value))
}

/// Streaming FIX message decoder.
#[derive(Debug)]
pub struct Decoder {
    dictionary: Arc<Dictionary>,
    partial: Option<Partial>,
    /// Set after an error dropped a message mid-stream. The rest of that
    /// message is skipped silently up to its tag 10 or the next tag 8.
    discarding: bool,
}

impl Decoder {
    /// Creates a decoder that resolves types and groups with `dictionary`.
    #[must_use]
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            dictionary,
            partial: None,
            discarding: false,
        }
    }

    /// Returns the dictionary in use.
    #[must_use]
    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    /// Returns true when no message is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.partial.is_none()
    }

    /// Drops any message in progress.
    pub fn reset(&mut self) {
        self.partial = None;
        self.discarding = false;
    }

    /// Feeds one `tag=value` record, with or without its trailing SOH.
    ///
    /// # Returns
    /// `Some(message)` when the record was a valid tag 10 closing a message.
    ///
    /// # Errors
    /// Any error discards the message in progress, except
    /// [`DecodeError::UnexpectedBeginString`], after which the offending
    /// tag 8 has already started a fresh message. The remaining records
    /// of a discarded message yield `Ok(None)` rather than one
    /// [`DecodeError::MissingBeginString`] each.
    pub fn decode_field(&mut self, raw: &[u8]) -> Result<Option<Message>, DecodeError> {
        let (record, tag, value) = match split_record(raw) {
            Ok(parts) => parts,
            Err(err) => {
                if self.partial.take().is_some() {
                    warn!(error = %err, "malformed record, discarding message in progress");
                    self.discarding = true;
                } else if self.discarding {
                    debug!(error = %err, "malformed record inside a discarded message");
                    return Ok(None);
                }
                return Err(err);
            }
        };

        if tag == tags::BEGIN_STRING {
            self.discarding = false;
            let begin_string = text(tag, value);
            let previous = self.partial.take();
            let begin_string = begin_string.inspect_err(|_| self.discarding = true)?;
            self.partial = Some(Partial::start(begin_string, record));
            if previous.is_some() {
                warn!("begin string inside an open message, restarting");
                return Err(DecodeError::UnexpectedBeginString);
            }
            return Ok(None);
        }

        if self.partial.is_none() {
            if self.discarding {
                if tag == tags::CHECK_SUM {
                    self.discarding = false;
                }
                debug!(tag, "skipping record of a discarded message");
                return Ok(None);
            }
            debug!(tag, "record outside a message, waiting for begin string");
            return Err(DecodeError::MissingBeginString { tag });
        }

        let result = if tag == tags::CHECK_SUM {
            self.finish(value).map(Some)
        } else {
            self.apply(record, tag, value).map(|()| None)
        };
        if result.is_err() && self.partial.take().is_some() {
            self.discarding = true;
        }
        result
    }

    fn apply(&mut self, record: &[u8], tag: u32, value: &[u8]) -> Result<(), DecodeError> {
        let dictionary = &self.dictionary;
        let Some(partial) = self.partial.as_mut() else {
            return Err(DecodeError::MissingBeginString { tag });
        };
        partial.checksum.update(record);
        partial.checksum.update_byte(SOH);

        let header = &mut partial.header;
        match tag {
            tags::BODY_LENGTH => header.body_length = Some(unsigned(tag, value)?),
            tags::MSG_TYPE => {
                let msg_type: MsgType = text(tag, value)?
                    .parse()
                    .unwrap_or_else(|never| match never {});
                header.msg_type = Some(msg_type);
            }
            tags::SENDER_COMP_ID => header.sender_comp_id = text(tag, value)?,
            tags::TARGET_COMP_ID => header.target_comp_id = text(tag, value)?,
            tags::MSG_SEQ_NUM => header.msg_seq_num = Some(unsigned(tag, value)?),
            tags::SENDER_SUB_ID => header.sender_sub_id = Some(text(tag, value)?),
            tags::TARGET_SUB_ID => header.target_sub_id = Some(text(tag, value)?),
            tags::SENDER_LOCATION_ID => header.sender_location_id = Some(text(tag, value)?),
            tags::TARGET_LOCATION_ID => header.target_location_id = Some(text(tag, value)?),
            tags::SENDING_TIME => {
                let field = dictionary.decode_value(tag, value)?;
                header.sending_time = field.value.as_timestamp();
            }
            t if dictionary.is_header_tag(t) => header.fields.push(dictionary.decode_value(tag, value)?),
            t if dictionary.is_trailer_tag(t) => {
                partial.close_all_frames()?;
                let field: Field = dictionary.decode_value(tag, value)?;
                partial.trailer.fields.push(field);
            }
            _ => partial.push_body(dictionary, tag, value)?,
        }
        Ok(())
    }

    fn finish(&mut self, value: &[u8]) -> Result<Message, DecodeError> {
        let Some(mut partial) = self.partial.take() else {
            return Err(DecodeError::MissingBeginString {
                tag: tags::CHECK_SUM,
            });
        };
        partial.close_all_frames()?;

        let declared = parse_checksum(value)
            .ok_or_else(|| DecodeError::invalid_value(tags::CHECK_SUM, "invalid checksum format"))?;
        let actual = partial.checksum.value();
        if declared != actual {
            warn!(
                declared,
                calculated = actual,
                msg_type = ?partial.header.msg_type,
                seq = ?partial.header.msg_seq_num,
                "checksum mismatch, discarding message"
            );
            return Err(DecodeError::ChecksumMismatch {
                expected: declared,
                actual,
            });
        }
        partial.trailer.check_sum = Some(declared);
        Ok(partial.into_message())
    }

    /// Splits `buffer` on SOH and feeds every record.
    ///
    /// Returns each completed message or error in arrival order. A final
    /// record without its SOH is fed as well.
    pub fn decode_buffer(&mut self, buffer: &[u8]) -> Vec<Result<Message, DecodeError>> {
        let mut out = Vec::new();
        let mut rest = buffer;
        while !rest.is_empty() {
            let end = memchr(SOH, rest).map_or(rest.len(), |pos| pos + 1);
            let (record, tail) = rest.split_at(end);
            rest = tail;
            match self.decode_field(record) {
                Ok(Some(message)) => out.push(Ok(message)),
                Ok(None) => {}
                Err(err) => out.push(Err(err)),
            }
        }
        out
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(Arc::new(Dictionary::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrofix_core::FixedPointNumber;
    use ferrofix_dictionary::Version;

    fn wire(s: &str) -> Vec<u8> {
        s.replace('|', "\x01").into_bytes()
    }

    const HEARTBEAT: &str = "8=FIX.4.1|9=90|35=0|49=INVMGR|56=BRKR|34=240|52=19980604-08:03:31|10=129|";

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag(b"8"), Some(8));
        assert_eq!(parse_tag(b"12345"), Some(12345));
        assert_eq!(parse_tag(b""), None);
        assert_eq!(parse_tag(b"0"), None);
        assert_eq!(parse_tag(b"12a"), None);
        assert_eq!(parse_tag(b"99999999999"), None);
    }

    #[test]
    fn test_decode_sample_heartbeat() {
        let mut decoder = Decoder::default();
        let mut results = decoder.decode_buffer(&wire(HEARTBEAT));
        assert_eq!(results.len(), 1);
        let msg = results.remove(0).unwrap();

        let header = msg.header();
        assert_eq!(header.begin_string, "FIX.4.1");
        assert_eq!(header.body_length, Some(90));
        assert_eq!(msg.msg_type(), Some(&MsgType::Heartbeat));
        assert_eq!(header.sender_comp_id, "INVMGR");
        assert_eq!(header.target_comp_id, "BRKR");
        assert_eq!(msg.msg_seq_num(), Some(240));
        assert_eq!(
            header.sending_time.map(|t| t.to_string()).as_deref(),
            Some("19980604-08:03:31.000")
        );
        assert_eq!(msg.trailer().check_sum, Some(129));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_records_without_trailing_soh() {
        let mut decoder = Decoder::default();
        let records = HEARTBEAT.trim_end_matches('|').split('|');
        let mut emitted = None;
        for record in records {
            if let Some(msg) = decoder.decode_field(record.as_bytes()).unwrap() {
                emitted = Some(msg);
            }
        }
        assert_eq!(emitted.unwrap().msg_seq_num(), Some(240));
    }

    #[test]
    fn test_checksum_mismatch_discards_message() {
        let mutated = HEARTBEAT.replace("49=INVMGR", "49=INVMGS");
        let mut decoder = Decoder::default();
        let results = decoder.decode_buffer(&wire(&mutated));
        assert_eq!(
            results,
            vec![Err(DecodeError::ChecksumMismatch {
                expected: 129,
                actual: 130
            })]
        );
        assert!(decoder.is_idle());

        let results = decoder.decode_buffer(&wire(HEARTBEAT));
        assert!(matches!(results.as_slice(), [Ok(_)]));
    }

    #[test]
    fn test_missing_begin_string() {
        let mut decoder = Decoder::default();
        assert_eq!(
            decoder.decode_field(b"35=0\x01"),
            Err(DecodeError::MissingBeginString { tag: 35 })
        );
        assert!(decoder.is_idle());
        assert_eq!(decoder.decode_field(b"8=FIX.4.2\x01"), Ok(None));
        assert!(!decoder.is_idle());
    }

    #[test]
    fn test_unexpected_begin_string_restarts() {
        let mut decoder = Decoder::default();
        let input = format!("8=FIX.4.2|35=0|{HEARTBEAT}");
        let results = decoder.decode_buffer(&wire(&input));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Err(DecodeError::UnexpectedBeginString));
        assert_eq!(
            results[1].as_ref().map(|m| m.header().begin_string.clone()),
            Ok("FIX.4.1".to_string())
        );
    }

    #[test]
    fn test_malformed_record_discards_partial() {
        let mut decoder = Decoder::default();
        decoder.decode_field(b"8=FIX.4.2\x01").unwrap();
        assert!(matches!(
            decoder.decode_field(b"garbage\x01"),
            Err(DecodeError::MalformedField(_))
        ));
        assert!(decoder.is_idle());

        decoder.decode_field(b"8=FIX.4.2\x01").unwrap();
        assert!(matches!(
            decoder.decode_field(b"4x=1\x01"),
            Err(DecodeError::InvalidTag(_))
        ));
        assert!(decoder.is_idle());

        decoder.decode_field(b"8=FIX.4.2\x01").unwrap();
        assert!(matches!(
            decoder.decode_field(b"34=abc\x01"),
            Err(DecodeError::InvalidFieldValue { tag: 34, .. })
        ));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_discarded_message_tail_is_silent() {
        let mut decoder = Decoder::default();
        let input = format!("8=FIX.4.4|35=0|49=A|58=|56=B|34=1|10=000|{HEARTBEAT}");
        let results = decoder.decode_buffer(&wire(&input));
        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0],
            Err(DecodeError::InvalidFieldValue { tag: 58, .. })
        ));
        assert_eq!(results[1].as_ref().map(Message::msg_seq_num), Ok(Some(240)));

        // tag 10 ends the skipped message, later strays are reported again
        let input = "8=FIX.4.4|34=abc|49=A|10=000|35=0|";
        let results = decoder.decode_buffer(&wire(input));
        assert_eq!(
            results[1..],
            [Err(DecodeError::MissingBeginString { tag: 35 })]
        );

        decoder.decode_field(b"8=FIX.4.4\x01").unwrap();
        decoder.decode_field(b"34=abc\x01").unwrap_err();
        decoder.reset();
        assert_eq!(
            decoder.decode_field(b"35=0\x01"),
            Err(DecodeError::MissingBeginString { tag: 35 })
        );
    }

    #[test]
    fn test_header_body_and_trailer_routing() {
        let mut decoder = Decoder::default();
        let mut body = wire(
            "8=FIX.4.4|9=0|35=D|49=A|56=B|34=2|50=DESK|142=NY|43=Y|122=20240101-00:00:00|55=MSFT|44=10.50|54=1|93=3|89=abc|",
        );
        let sum = crate::calculate_checksum(&body);
        body.extend_from_slice(format!("10={sum:03}\x01").as_bytes());

        let msg = decoder.decode_buffer(&body).remove(0).unwrap();
        let header = msg.header();
        assert_eq!(header.sender_sub_id.as_deref(), Some("DESK"));
        assert_eq!(header.sender_location_id.as_deref(), Some("NY"));
        assert!(header.poss_dup());
        assert!(header.get(tags::ORIG_SENDING_TIME).is_some());
        assert_eq!(msg.get_str(tags::SYMBOL), Some("MSFT"));
        assert_eq!(msg.get_float(tags::PRICE), Some(FixedPointNumber::new(1050, 2)));
        assert_eq!(msg.get_char(tags::SIDE), Some('1'));
        assert_eq!(msg.body().len(), 3);
        assert_eq!(msg.trailer().fields.len(), 2);
    }

    fn custom_dictionary() -> Arc<Dictionary> {
        Arc::new(
            Dictionary::new(Version::Fix44).with_group(
                GroupDef::new(1002, "Custom", 1003)
                    .with_members(&[1004])
                    .with_group(GroupDef::new(1010, "Inner", 1011)),
            ),
        )
    }

    fn with_checksum(s: &str) -> Vec<u8> {
        let mut bytes = wire(s);
        let sum = crate::calculate_checksum(&bytes);
        bytes.extend_from_slice(format!("10={sum:03}\x01").as_bytes());
        bytes
    }

    #[test]
    fn test_group_decoding_with_nesting() {
        let mut decoder = Decoder::new(custom_dictionary());
        let bytes = with_checksum(
            "8=FIX.4.4|35=U1|49=A|56=B|1002=2|1003=g1-1|1004=g1-2|1010=1|1011=in|1003=g2-1|1004=g2-2|58=tail|",
        );
        let msg = decoder.decode_buffer(&bytes).remove(0).unwrap();

        let group = msg.get_group(1002).unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.groups[0].get_str(1004), Some("g1-2"));
        assert_eq!(
            group.groups[0].get_group(1010).map(|g| g.groups[0].get_str(1011)),
            Some(Some("in"))
        );
        assert_eq!(group.groups[1].get_str(1003), Some("g2-1"));
        assert_eq!(msg.get_str(tags::TEXT), Some("tail"));
    }

    #[test]
    fn test_group_count_mismatch() {
        let mut decoder = Decoder::new(custom_dictionary());
        let bytes = with_checksum("8=FIX.4.4|35=U1|49=A|56=B|1002=3|1003=a|1003=b|58=x|");
        let results = decoder.decode_buffer(&bytes);
        assert_eq!(
            results,
            vec![Err(DecodeError::GroupCountMismatch {
                count_tag: 1002,
                expected: 3,
                actual: 2
            })]
        );
    }

    #[test]
    fn test_group_at_end_of_message_closes_on_checksum() {
        let mut decoder = Decoder::new(custom_dictionary());
        let bytes = with_checksum("8=FIX.4.4|35=U1|49=A|56=B|1002=1|1003=only|");
        let msg = decoder.decode_buffer(&bytes).remove(0).unwrap();
        assert_eq!(msg.get_group(1002).map(GroupField::len), Some(1));
    }
}
