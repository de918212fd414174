/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Encode/decode round trips through the public tag-value API.
//!
//! Byte-exact re-encoding holds for timestamps at Millis precision or
//! finer. A SendingTime encoded at `TimePrecision::Seconds` decodes at
//! Millis and comes back with a `.000` fraction.

use ferrofix_core::{
    DecodeError, Field, FixedPointNumber, Group, GroupField, Message, MsgType, TimePrecision,
    UtcTimestamp, tags,
};
use ferrofix_dictionary::{Dictionary, GroupDef, Version};
use ferrofix_tagvalue::{Decoder, Encoder, calculate_checksum};
use proptest::prelude::*;
use std::sync::Arc;

fn wire(s: &str) -> Vec<u8> {
    s.replace('|', "\x01").into_bytes()
}

fn dictionary() -> Arc<Dictionary> {
    Arc::new(
        Dictionary::standard(Version::Fix44).with_group(
            GroupDef::new(1002, "TestGroup", 1003)
                .with_members(&[1004])
                .with_group(GroupDef::new(1005, "TestInner", 1006).with_members(&[1007])),
        ),
    )
}

fn header(msg: &mut Message) {
    let header = msg.header_mut();
    header.begin_string = "FIX.4.4".to_string();
    header.sender_comp_id = "CLIENT".to_string();
    header.target_comp_id = "SERVER".to_string();
    header.sender_sub_id = Some("DESK1".to_string());
    header.msg_seq_num = Some(17);
    header.sending_time = UtcTimestamp::parse(b"20240301-09:30:00.123456");
}

#[test]
fn checksum_sample_is_deterministic() {
    let sample = wire("8=FIX.4.1|9=90|35=0|49=INVMGR|56=BRKR|34=240|52=19980604-08:03:31|");
    assert_eq!(calculate_checksum(&sample), 129);
    assert_eq!(calculate_checksum(&sample), 129);

    let mut decoder = Decoder::default();
    let mut full = sample.clone();
    full.extend_from_slice(b"10=129\x01");
    assert!(matches!(decoder.decode_buffer(&full).as_slice(), [Ok(_)]));

    let mutated = wire(
        "8=FIX.4.1|9=90|35=0|49=INVMGR|56=BRKR|34=241|52=19980604-08:03:31|10=129|",
    );
    let results = decoder.decode_buffer(&mutated);
    assert!(matches!(
        results.as_slice(),
        [Err(DecodeError::ChecksumMismatch { expected: 129, actual: 130 })]
    ));
}

#[test]
fn group_encodes_and_decodes_back_to_two_instances() {
    let mut msg = Message::new(MsgType::Custom("U7".to_string()));
    header(&mut msg);
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
    assert!(text.contains("1002=2|1003=g1-1|1004=g1-2|1003=g2-1|1004=g2-2|"));

    let mut decoder = Decoder::new(dictionary());
    let decoded = decoder.decode_buffer(&bytes).remove(0).unwrap();
    let group = decoded.get_group(1002).unwrap();
    assert_eq!(group.len(), 2);
    assert_eq!(group.groups[0].get_str(1003), Some("g1-1"));
    assert_eq!(group.groups[1].get_str(1004), Some("g2-2"));
}

#[test]
fn nested_groups_round_trip() {
    let mut msg = Message::new(MsgType::NewOrderSingle);
    header(&mut msg);
    msg.add_str(tags::CL_ORD_ID, "ORD-1")
        .add_group(
            GroupField::new(1002).with(
                Group::new()
                    .with(Field::string(1003, "outer"))
                    .with(
                        GroupField::new(1005)
                            .with(
                                Group::new()
                                    .with(Field::string(1006, "a"))
                                    .with(Field::string(1007, "b")),
                            )
                            .with(Group::new().with(Field::string(1006, "c"))),
                    )
                    .with(Field::string(1004, "after-nested")),
            ),
        )
        .add_group(
            GroupField::new(tags::NO_PARTY_IDS).with(
                Group::new()
                    .with(Field::string(tags::PARTY_ID, "BROKER"))
                    .with(Field::char(tags::PARTY_ID_SOURCE, 'D'))
                    .with(Field::int(tags::PARTY_ROLE, 1)),
            ),
        )
        .add_float(tags::PRICE, FixedPointNumber::parse(b"101.2500").unwrap());

    let bytes = Encoder::new().encode(&msg).unwrap();
    let mut decoder = Decoder::new(dictionary());
    let decoded = decoder.decode_buffer(&bytes).remove(0).unwrap();

    assert_eq!(decoded.body(), msg.body());
    assert_eq!(decoded.fields_in_order(), msg.fields_in_order());
    assert_eq!(decoded.header().sender_sub_id.as_deref(), Some("DESK1"));
    assert_eq!(
        decoded.header().sending_time.map(|t| t.precision()),
        Some(TimePrecision::Micros)
    );

    let reencoded = Encoder::new().encode(&decoded).unwrap();
    assert_eq!(reencoded, bytes);
}

#[test]
fn seconds_sending_time_reencodes_with_millis() {
    let mut msg = Message::new(MsgType::Heartbeat);
    header(&mut msg);
    msg.header_mut().sending_time = UtcTimestamp::parse(b"20240301-09:30:00")
        .map(|t| t.with_precision(TimePrecision::Seconds));

    let bytes = Encoder::new().encode(&msg).unwrap();
    let decoded = Decoder::default().decode_buffer(&bytes).remove(0).unwrap();
    assert_eq!(
        decoded.header().sending_time.map(|t| t.precision()),
        Some(TimePrecision::Millis)
    );

    let reencoded = Encoder::new().encode(&decoded).unwrap();
    assert_ne!(reencoded, bytes);
    assert!(
        String::from_utf8_lossy(&reencoded).contains("\x0152=20240301-09:30:00.000\x01")
    );
}

#[test]
fn body_length_is_informational() {
    let mut decoder = Decoder::default();
    let mut bytes = wire("8=FIX.4.2|9=9999|35=0|49=A|56=B|34=1|");
    let sum = calculate_checksum(&bytes);
    bytes.extend_from_slice(format!("10={sum:03}\x01").as_bytes());
    let msg = decoder.decode_buffer(&bytes).remove(0).unwrap();
    assert_eq!(msg.header().body_length, Some(9999));

    let reencoded = Encoder::new().encode(&msg).unwrap();
    assert!(reencoded.starts_with(b"8=FIX.4.2\x019=20\x01"));
}

proptest! {
    #[test]
    fn prop_text_and_numbers_round_trip(
        text in "[A-Za-z0-9 ./-]{1,24}",
        qty in any::<i64>(),
        scaled in any::<i64>(),
        scale in 0u8..=12,
        seq in 1u32..,
    ) {
        let mut msg = Message::new(MsgType::NewOrderSingle);
        header(&mut msg);
        msg.header_mut().msg_seq_num = Some(seq);
        msg.add_str(tags::TEXT, text.clone())
            .add_int(5001, qty)
            .add_float(tags::PRICE, FixedPointNumber::new(scaled, scale));

        let bytes = Encoder::new().encode(&msg).unwrap();
        let mut decoder = Decoder::default();
        let decoded = decoder.decode_buffer(&bytes).remove(0).unwrap();

        prop_assert_eq!(decoded.get_str(tags::TEXT), Some(text.as_str()));
        let qty_str = qty.to_string();
        prop_assert_eq!(decoded.get_str(5001), Some(qty_str.as_str()));
        prop_assert_eq!(decoded.get_float(tags::PRICE), Some(FixedPointNumber::new(scaled, scale)));
        prop_assert_eq!(decoded.msg_seq_num(), Some(seq));
    }
}
