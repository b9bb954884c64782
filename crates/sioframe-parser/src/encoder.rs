use std::borrow::Cow;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use sioframe_transport::{FrameKind, FrameSink};

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::packet::{Header, Packet, PacketType, WireType};
use crate::value::Value;
use crate::walk;

const INITIAL_TEXT_CAPACITY: usize = 1024;

/// Writes packets as one TEXT frame plus one BINARY frame per attachment.
///
/// The encoder owns no connection state between calls; the only thing it
/// keeps is a scratch buffer for the TEXT payload.
pub struct Encoder<S> {
    sink: S,
    buf: BytesMut,
    config: CodecConfig,
}

impl<S: FrameSink> Encoder<S> {
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, CodecConfig::default())
    }

    pub fn with_config(sink: S, config: CodecConfig) -> Self {
        Self {
            sink,
            buf: BytesMut::with_capacity(INITIAL_TEXT_CAPACITY),
            config,
        }
    }

    /// Encode a packet whose argument array is given verbatim.
    ///
    /// For event packets a body must start with the event name as a
    /// string, or the packet is rejected with `MissingEventName`.
    /// `None` writes no JSON body at all, which differs from an empty array.
    pub fn encode(&mut self, header: &Header, args: Option<&[Value]>) -> Result<()> {
        if header.packet_type == PacketType::Event {
            if let Some(args) = args {
                if !matches!(args.first(), Some(Value::String(_))) {
                    return Err(CodecError::MissingEventName);
                }
            }
        }
        self.encode_parts(header, None, args)
    }

    /// Encode an event packet, prefixing `event` to the arguments.
    pub fn encode_event(&mut self, header: &Header, event: &str, args: &[Value]) -> Result<()> {
        if header.packet_type != PacketType::Event {
            return Err(CodecError::UnexpectedEventName(header.packet_type));
        }
        self.encode_parts(header, Some(event), Some(args))
    }

    /// Encode a [`Packet`].
    ///
    /// Packets with no arguments are written without a JSON body. Only
    /// event packets may carry an event name, and an event packet with
    /// arguments must have one.
    pub fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        let header = &packet.header;
        let args = (!packet.args.is_empty()).then_some(packet.args.as_slice());

        match (header.packet_type, packet.event.as_deref()) {
            (PacketType::Event, Some(event)) => self.encode_event(header, event, &packet.args),
            (PacketType::Event, None) if args.is_some() => Err(CodecError::MissingEventName),
            (packet_type, Some(_)) => Err(CodecError::UnexpectedEventName(packet_type)),
            _ => self.encode(header, args),
        }
    }

    fn encode_parts(
        &mut self,
        header: &Header,
        event: Option<&str>,
        args: Option<&[Value]>,
    ) -> Result<()> {
        let namespace = header.wire_namespace();
        validate_namespace(namespace)?;

        let (wire_type, body, buffers) = self.prepare(header.packet_type, args)?;

        self.buf.clear();
        self.buf.put_u8(wire_type.as_ascii());
        if wire_type.is_binary() {
            self.buf.put_slice(buffers.len().to_string().as_bytes());
            self.buf.put_u8(b'-');
        }
        if !namespace.is_empty() {
            self.buf.put_slice(namespace.as_bytes());
            if header.need_ack || body.is_some() {
                self.buf.put_u8(b',');
            }
        }
        if header.need_ack {
            self.buf.put_slice(header.id.to_string().as_bytes());
        }
        if let Some(values) = &body {
            self.write_body(event, values)?;
        }

        self.sink.send_frame(FrameKind::Text, &self.buf)?;
        for buffer in &buffers {
            self.sink.send_frame(FrameKind::Binary, buffer)?;
        }

        debug!(
            packet_type = %header.packet_type,
            namespace,
            id = ?header.ack_id(),
            attachments = buffers.len(),
            "encoded packet"
        );
        Ok(())
    }

    /// Pick the wire type and pull buffers out of the arguments.
    fn prepare<'a>(
        &self,
        packet_type: PacketType,
        args: Option<&'a [Value]>,
    ) -> Result<(WireType, Option<Cow<'a, [Value]>>, Vec<Bytes>)> {
        let Some(args) = args else {
            return Ok((WireType::Plain(packet_type), None, Vec::new()));
        };
        if !args.iter().any(Value::contains_binary) {
            return Ok((WireType::Plain(packet_type), Some(Cow::Borrowed(args)), Vec::new()));
        }
        if !packet_type.carries_attachments() {
            return Ok((WireType::Plain(packet_type), Some(Cow::Owned(walk::inline(args))), Vec::new()));
        }

        let attached = walk::attach(args);
        if attached.buffers.len() > self.config.max_attachments {
            return Err(CodecError::TooManyAttachments {
                count: attached.buffers.len() as u64,
                max: self.config.max_attachments,
            });
        }
        Ok((
            WireType::with_attachments(packet_type),
            Some(Cow::Owned(attached.values)),
            attached.buffers,
        ))
    }

    fn write_body(&mut self, event: Option<&str>, values: &[Value]) -> Result<()> {
        self.buf.put_u8(b'[');
        let mut first = true;
        if let Some(event) = event {
            serde_json::to_writer((&mut self.buf).writer(), event)?;
            first = false;
        }
        for value in values {
            if !first {
                self.buf.put_u8(b',');
            }
            serde_json::to_writer((&mut self.buf).writer(), value)?;
            first = false;
        }
        self.buf.put_slice(b"]\n");
        Ok(())
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &S {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

// The decoder reads a namespace up to the first `,` and rejects one that
// runs into `[`, so neither may appear inside it.
fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Ok(());
    }
    if !namespace.starts_with('/') {
        return Err(CodecError::InvalidNamespace("must start with '/'"));
    }
    if namespace.contains(',') {
        return Err(CodecError::InvalidNamespace("must not contain ','"));
    }
    if namespace.contains('[') {
        return Err(CodecError::InvalidNamespace("must not contain '['"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use serde_json::json;
    use sioframe_transport::{Frame, FrameQueue, TransportError};

    /// Accepts `limit` frames, then fails every send.
    struct FailingSink {
        sent: Vec<Frame>,
        attempts: usize,
        limit: usize,
    }

    impl FailingSink {
        fn new(limit: usize) -> Self {
            Self {
                sent: Vec::new(),
                attempts: 0,
                limit,
            }
        }
    }

    impl FrameSink for FailingSink {
        fn send_frame(&mut self, kind: FrameKind, payload: &[u8]) -> sioframe_transport::Result<()> {
            self.attempts += 1;
            if self.sent.len() == self.limit {
                return Err(TransportError::ConnectionClosed);
            }
            self.sent.push(Frame::new(kind, payload.to_vec()));
            Ok(())
        }
    }

    fn text(s: &str) -> Frame {
        Frame::text(s.as_bytes().to_vec())
    }

    fn frames(queue: FrameQueue) -> Vec<Frame> {
        queue.iter().cloned().collect()
    }

    fn encode(header: Header, args: Option<Vec<Value>>) -> Vec<Frame> {
        let mut encoder = Encoder::new(FrameQueue::new());
        encoder.encode(&header, args.as_deref()).unwrap();
        frames(encoder.into_inner())
    }

    fn encode_event(header: Header, event: &str, args: Vec<Value>) -> Vec<Frame> {
        let mut encoder = Encoder::new(FrameQueue::new());
        encoder.encode_event(&header, event, &args).unwrap();
        frames(encoder.into_inner())
    }

    #[test]
    fn connect_without_args() {
        assert_eq!(encode(Header::new(PacketType::Connect), None), vec![text("0")]);
    }

    #[test]
    fn error_with_args() {
        assert_eq!(
            encode(Header::new(PacketType::Error), Some(vec![Value::from("error")])),
            vec![text("4[\"error\"]\n")]
        );
    }

    #[test]
    fn event_with_buffer_attachment() {
        let frames = encode_event(
            Header::new(PacketType::Event),
            "msg",
            vec![Value::from(Buffer::new(vec![1, 2, 3]))],
        );
        assert_eq!(
            frames,
            vec![
                text("51-[\"msg\",{\"_placeholder\":true,\"num\":0}]\n"),
                Frame::binary(vec![1, 2, 3]),
            ]
        );
    }

    #[test]
    fn connect_with_zero_ack_id() {
        assert_eq!(
            encode(Header::new(PacketType::Connect).with_ack(0), None),
            vec![text("00")]
        );
    }

    #[test]
    fn ack_with_id_and_args() {
        assert_eq!(
            encode(
                Header::new(PacketType::Ack).with_ack(13),
                Some(vec![Value::from("error")])
            ),
            vec![text("313[\"error\"]\n")]
        );
    }

    #[test]
    fn namespace_without_trailing_content() {
        assert_eq!(
            encode(Header::new(PacketType::Disconnect).with_namespace("/woot"), None),
            vec![text("1/woot")]
        );
    }

    #[test]
    fn namespace_then_event() {
        assert_eq!(
            encode_event(
                Header::new(PacketType::Event).with_namespace("/woot"),
                "msg",
                vec![Value::from(1)]
            ),
            vec![text("2/woot,[\"msg\",1]\n")]
        );
    }

    #[test]
    fn namespace_then_id() {
        assert_eq!(
            encode(
                Header::new(PacketType::Disconnect)
                    .with_namespace("/woot")
                    .with_ack(1),
                None
            ),
            vec![text("1/woot,1")]
        );
    }

    #[test]
    fn namespace_id_and_event() {
        assert_eq!(
            encode_event(
                Header::new(PacketType::Event)
                    .with_namespace("/woot")
                    .with_ack(1),
                "msg",
                vec![Value::from(1)]
            ),
            vec![text("2/woot,1[\"msg\",1]\n")]
        );
    }

    #[test]
    fn slash_namespace_is_not_written() {
        assert_eq!(
            encode(Header::new(PacketType::Connect).with_namespace("/"), None),
            vec![text("0")]
        );
    }

    #[test]
    fn binary_ack_with_namespace_and_id() {
        let frames = encode(
            Header::new(PacketType::Ack).with_namespace("/files").with_ack(4),
            Some(vec![
                Value::from(Buffer::new(&b"x"[..])),
                Value::from(Buffer::new(&b"yz"[..])),
            ]),
        );
        assert_eq!(frames.len(), 3);
        assert_eq!(
            frames[0],
            text("62-/files,4[{\"_placeholder\":true,\"num\":0},{\"_placeholder\":true,\"num\":1}]\n")
        );
        assert_eq!(frames[1], Frame::binary(&b"x"[..]));
        assert_eq!(frames[2], Frame::binary(&b"yz"[..]));
    }

    #[test]
    fn empty_args_still_write_a_body() {
        assert_eq!(
            encode(Header::new(PacketType::Connect), Some(Vec::new())),
            vec![text("0[]\n")]
        );
    }

    #[test]
    fn buffers_are_inlined_for_packets_without_attachments() {
        let frames = encode(
            Header::new(PacketType::Error),
            Some(vec![Value::from(Buffer::new(vec![7u8]))]),
        );
        assert_eq!(frames, vec![text("4[{\"type\":\"Buffer\",\"data\":[7]}]\n")]);
    }

    #[test]
    fn caller_buffers_keep_their_state() {
        let args = vec![Value::from(Buffer::new(vec![1u8]))];
        let mut encoder = Encoder::new(FrameQueue::new());
        let header = Header::new(PacketType::Event);
        encoder.encode_event(&header, "a", &args).unwrap();
        encoder.encode_event(&header, "a", &args).unwrap();

        assert!(!args[0].as_buffer().unwrap().is_placeholder());
        let frames = frames(encoder.into_inner());
        assert_eq!(frames[0], frames[2]);
    }

    #[test]
    fn rejects_attachments_over_limit() {
        let config = CodecConfig { max_attachments: 1 };
        let mut encoder = Encoder::with_config(FrameQueue::new(), config);
        let args = vec![
            Value::from(Buffer::new(vec![1u8])),
            Value::from(Buffer::new(vec![2u8])),
        ];
        let err = encoder
            .encode_event(&Header::new(PacketType::Event), "msg", &args)
            .unwrap_err();
        assert!(matches!(err, CodecError::TooManyAttachments { count: 2, max: 1 }));
        assert!(encoder.get_ref().is_empty());
    }

    #[test]
    fn rejects_bad_namespaces() {
        let mut encoder = Encoder::new(FrameQueue::new());
        for namespace in ["woot", "/a,b", "/a[b"] {
            let header = Header::new(PacketType::Connect).with_namespace(namespace);
            assert!(matches!(
                encoder.encode(&header, None),
                Err(CodecError::InvalidNamespace(_))
            ));
        }
        assert!(encoder.get_ref().is_empty());
    }

    #[test]
    fn write_packet_rules() {
        let mut encoder = Encoder::new(FrameQueue::new());

        let mut nameless = Packet::new(Header::new(PacketType::Event));
        nameless.args.push(Value::from(1));
        assert!(matches!(
            encoder.write_packet(&nameless),
            Err(CodecError::MissingEventName)
        ));

        let mut named_ack = Packet::ack("", 1, Vec::new());
        named_ack.event = Some("msg".to_owned());
        assert!(matches!(
            encoder.write_packet(&named_ack),
            Err(CodecError::UnexpectedEventName(PacketType::Ack))
        ));

        encoder.write_packet(&Packet::connect("/woot")).unwrap();
        encoder
            .write_packet(&Packet::event("", "ping", Vec::new()))
            .unwrap();
        encoder
            .write_packet(&Packet::error("", vec![Value::from(json!({"message": "no"}))]))
            .unwrap();

        assert_eq!(
            frames(encoder.into_inner()),
            vec![
                text("0/woot"),
                text("2[\"ping\"]\n"),
                text("4[{\"message\":\"no\"}]\n"),
            ]
        );
    }

    #[test]
    fn event_names_are_json_escaped() {
        assert_eq!(
            encode_event(Header::new(PacketType::Event), "a\"b", Vec::new()),
            vec![text("2[\"a\\\"b\"]\n")]
        );
    }

    #[test]
    fn attachment_send_failure_stops_the_packet() {
        let mut encoder = Encoder::new(FailingSink::new(1));
        let args = vec![
            Value::from(Buffer::new(&b"one"[..])),
            Value::from(Buffer::new(&b"two"[..])),
        ];
        let err = encoder
            .encode_event(&Header::new(PacketType::Event), "msg", &args)
            .unwrap_err();

        assert!(matches!(
            err,
            CodecError::Transport(TransportError::ConnectionClosed)
        ));
        let sink = encoder.into_inner();
        assert_eq!(sink.attempts, 2);
        assert_eq!(
            sink.sent,
            vec![text("52-[\"msg\",{\"_placeholder\":true,\"num\":0},{\"_placeholder\":true,\"num\":1}]\n")]
        );
    }

    #[test]
    fn text_send_failure_sends_no_attachments() {
        let mut encoder = Encoder::new(FailingSink::new(0));
        let args = vec![Value::from(Buffer::new(&b"one"[..]))];
        let err = encoder
            .encode_event(&Header::new(PacketType::Event), "msg", &args)
            .unwrap_err();

        assert!(err.is_fatal_to_connection());
        assert_eq!(encoder.get_ref().attempts, 1);
        assert!(encoder.get_ref().sent.is_empty());
    }

    #[test]
    fn event_body_must_start_with_a_name() {
        let mut encoder = Encoder::new(FrameQueue::new());
        let header = Header::new(PacketType::Event);
        assert!(matches!(
            encoder.encode(&header, Some(&[][..])),
            Err(CodecError::MissingEventName)
        ));
        assert!(matches!(
            encoder.encode(&header, Some(&[Value::from(1)][..])),
            Err(CodecError::MissingEventName)
        ));
        assert!(encoder.get_ref().is_empty());

        encoder.encode(&header, None).unwrap();
        encoder
            .encode(&header, Some(&[Value::from("msg"), Value::from(1)][..]))
            .unwrap();
        assert_eq!(
            frames(encoder.into_inner()),
            vec![text("2"), text("2[\"msg\",1]\n")]
        );
    }

    #[test]
    fn event_name_only_on_event_packets() {
        let mut encoder = Encoder::new(FrameQueue::new());
        assert!(matches!(
            encoder.encode_event(&Header::new(PacketType::Ack).with_ack(1), "msg", &[]),
            Err(CodecError::UnexpectedEventName(PacketType::Ack))
        ));
    }
}
