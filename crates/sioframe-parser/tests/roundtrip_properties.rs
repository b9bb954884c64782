//! Property-based tests for the packet codec.
//!
//! - Packets survive encode then decode unchanged, buffers included
//! - The id and the attachment count are never confused on the wire
//! - Garbage TEXT frames produce errors, not panics

use proptest::prelude::*;
use sioframe_parser::{Buffer, Decoder, Encoder, Header, Map, Packet, PacketType, Value};
use sioframe_transport::FrameQueue;

fn namespace_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "/[a-z0-9_]{1,8}"]
}

fn ack_strategy() -> impl Strategy<Value = Option<u64>> {
    prop_oneof![Just(None), Just(Some(0)), any::<u64>().prop_map(Some)]
}

fn buffer_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec(any::<u8>(), 0..16).prop_map(|data| Value::from(Buffer::new(data)))
}

// Keys are prefixed so an object can never look like a serialized buffer.
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::from),
        buffer_strategy(),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::vec(("k[a-z]{0,5}", inner), 0..4)
                .prop_map(|entries| Value::from(entries.into_iter().collect::<Map>())),
        ]
    })
}

fn header(packet_type: PacketType, namespace: &str, ack: Option<u64>) -> Header {
    let header = Header::new(packet_type).with_namespace(namespace);
    match ack {
        Some(id) => header.with_ack(id),
        None => header,
    }
}

#[test]
fn prop_event_round_trip() {
    proptest!(|(
        namespace in namespace_strategy(),
        ack in ack_strategy(),
        event in "\\PC{0,10}",
        args in prop::collection::vec(value_strategy(), 0..5),
    )| {
        let packet = Packet {
            header: header(PacketType::Event, &namespace, ack),
            event: Some(event),
            args,
        };

        let mut wire = FrameQueue::new();
        Encoder::new(&mut wire).write_packet(&packet).unwrap();
        let decoded = Decoder::new(&mut wire).decode().unwrap();

        prop_assert_eq!(decoded, packet);
        prop_assert!(wire.is_empty());
    });
}

#[test]
fn prop_ack_round_trip() {
    proptest!(|(
        namespace in namespace_strategy(),
        id in any::<u64>(),
        args in prop::collection::vec(value_strategy(), 1..5),
    )| {
        let packet = Packet::ack(namespace, id, args);

        let mut wire = FrameQueue::new();
        Encoder::new(&mut wire).write_packet(&packet).unwrap();
        let decoded = Decoder::new(&mut wire).decode().unwrap();

        prop_assert_eq!(decoded, packet);
    });
}

#[test]
fn prop_id_and_attachment_count_disambiguated() {
    let packet_type = prop::sample::select(PacketType::ALL.to_vec());
    proptest!(|(
        packet_type in packet_type,
        namespace in namespace_strategy(),
        ack in ack_strategy(),
        attachments in 0usize..4,
    )| {
        let header = header(packet_type, &namespace, ack);
        let buffers: Vec<Value> = (0..attachments)
            .map(|i| Value::from(Buffer::new(vec![i as u8; i + 1])))
            .collect();

        let mut wire = FrameQueue::new();
        {
            let mut encoder = Encoder::new(&mut wire);
            match (packet_type, buffers.is_empty()) {
                (_, true) => encoder.encode(&header, None).unwrap(),
                (PacketType::Event, false) => encoder.encode_event(&header, "e", &buffers).unwrap(),
                (_, false) => encoder.encode(&header, Some(&buffers)).unwrap(),
            }
        }

        let expected = if packet_type.carries_attachments() { attachments } else { 0 };
        prop_assert_eq!(wire.len(), 1 + expected);

        let mut decoder = Decoder::new(&mut wire);
        let head = decoder.decode_header().unwrap();
        prop_assert_eq!(&head.header, &header);
        prop_assert_eq!(head.header.ack_id(), ack);
        prop_assert_eq!(decoder.pending_attachments(), Some(expected));

        let args = decoder.decode_args().unwrap();
        prop_assert_eq!(args, buffers);
    });
}

#[test]
fn prop_arbitrary_text_never_panics() {
    proptest!(|(text in prop::collection::vec(any::<u8>(), 0..48))| {
        let mut wire = FrameQueue::new();
        wire.push_text(text);
        let _ = Decoder::new(&mut wire).decode();
    });
}

#[test]
fn prop_header_like_text_never_panics() {
    proptest!(|(text in "[0-6][0-9-]{0,4}(/[a-z,\\[]{0,6})?[0-9]{0,3}(\\[.{0,8})?")| {
        let mut wire = FrameQueue::new();
        wire.push_text(text.into_bytes());
        for _ in 0..4 {
            wire.push_binary(vec![0u8]);
        }
        let _ = Decoder::new(&mut wire).decode();
    });
}
