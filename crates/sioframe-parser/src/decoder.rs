use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, warn};

use sioframe_transport::{Frame, FrameSource};

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::grammar::{split_event_name, HeaderParser};
use crate::packet::{Packet, PacketHead, PacketType};
use crate::value::Value;
use crate::walk;

/// Header decoded, arguments and attachments not yet consumed.
#[derive(Debug)]
struct Pending {
    args: Bytes,
    attachments: usize,
}

/// Reads packets back from a frame source.
///
/// Decoding is split in two so a caller can route on the header before
/// materializing arguments: [`Decoder::decode_header`] reads the TEXT
/// frame, [`Decoder::decode_args`] parses the JSON body and consumes the
/// BINARY attachment frames. [`Decoder::decode`] does both.
///
/// Every error except a transport error leaves the decoder positioned at
/// the start of the next packet. A TEXT frame that cuts a packet's
/// attachments short is held back and read as the next header.
pub struct Decoder<S> {
    source: S,
    config: CodecConfig,
    pending: Option<Pending>,
    held: Option<Frame>,
}

impl<S: FrameSource> Decoder<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, CodecConfig::default())
    }

    pub fn with_config(source: S, config: CodecConfig) -> Self {
        Self {
            source,
            config,
            pending: None,
            held: None,
        }
    }

    /// Read the next TEXT frame and decode its header.
    ///
    /// For event packets the event name is split off here. A packet still
    /// pending from an earlier call is discarded first.
    pub fn decode_header(&mut self) -> Result<PacketHead> {
        if let Some(count) = self.pending_attachments() {
            warn!(attachments = count, "discarding undecoded packet");
            self.discard_last()?;
        }

        let frame = self.next_frame()?;
        if !frame.is_text() {
            return Err(CodecError::ExpectedTextFrame);
        }
        let payload = frame.payload;

        let mut parser = HeaderParser::new(&payload);
        let fields = match parser.parse() {
            Ok(fields) => fields,
            Err(err) => {
                let declared = parser.declared_attachments();
                return self.fail(declared, err);
            }
        };

        let attachments = match usize::try_from(fields.attachments) {
            Ok(count) if count <= self.config.max_attachments => count,
            _ => {
                return Err(CodecError::TooManyAttachments {
                    count: fields.attachments,
                    max: self.config.max_attachments,
                })
            }
        };

        let body = &payload[fields.body_offset..];
        let (event, args) = if fields.header.packet_type == PacketType::Event && !body.is_empty() {
            match split_event_name(body) {
                Ok((event, args)) => (Some(event), Bytes::from(args)),
                Err(err) => return self.fail(fields.attachments, err),
            }
        } else {
            (None, payload.slice(fields.body_offset..))
        };

        debug!(
            packet_type = %fields.header.packet_type,
            namespace = fields.header.wire_namespace(),
            id = ?fields.header.ack_id(),
            attachments,
            "decoded packet header"
        );

        self.pending = Some(Pending { args, attachments });
        Ok(PacketHead {
            header: fields.header,
            event,
        })
    }

    /// Parse the pending packet's arguments and read its attachments.
    ///
    /// Placeholders are replaced with the bytes of the matching BINARY
    /// frame, so no placeholder reaches the caller.
    pub fn decode_args(&mut self) -> Result<Vec<Value>> {
        let pending = self.pending.take().ok_or(CodecError::NoPendingPacket)?;

        let mut values = match parse_args(&pending.args) {
            Ok(values) => values,
            Err(err) => return self.fail(pending.attachments as u64, err),
        };

        let buffers = self.read_attachments(pending.attachments)?;
        walk::detach(&mut values, &buffers)?;
        Ok(values)
    }

    /// Decode one complete packet.
    pub fn decode(&mut self) -> Result<Packet> {
        let head = self.decode_header()?;
        let args = self.decode_args()?;
        Ok(Packet {
            header: head.header,
            event: head.event,
            args,
        })
    }

    /// Drop the pending packet and skip its attachment frames.
    pub fn discard_last(&mut self) -> Result<()> {
        match self.pending.take() {
            Some(pending) => self.read_attachments(pending.attachments).map(drop),
            None => Ok(()),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Attachment count of the pending packet, if there is one.
    pub fn pending_attachments(&self) -> Option<usize> {
        self.pending.as_ref().map(|pending| pending.attachments)
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    fn next_frame(&mut self) -> Result<Frame> {
        match self.held.take() {
            Some(frame) => Ok(frame),
            None => Ok(self.source.next_frame()?),
        }
    }

    fn read_attachments(&mut self, count: usize) -> Result<Vec<Bytes>> {
        let mut buffers = Vec::with_capacity(count);
        for index in 0..count {
            let frame = self.next_frame()?;
            if frame.is_text() {
                self.held = Some(frame);
                return Err(CodecError::ExpectedBinaryFrame { index });
            }
            buffers.push(frame.payload);
        }
        Ok(buffers)
    }

    /// Skip the declared attachments, then report `err`.
    fn fail<T>(&mut self, declared: u64, err: CodecError) -> Result<T> {
        let count = match usize::try_from(declared) {
            Ok(count) if count <= self.config.max_attachments => count,
            _ => return Err(err),
        };
        if let Err(drain_err) = self.read_attachments(count) {
            warn!(error = %drain_err, cause = %err, "failed to skip attachments");
            return Err(drain_err);
        }
        Err(err)
    }
}

fn parse_args(body: &[u8]) -> Result<Vec<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let mut de = serde_json::Deserializer::from_slice(body);
    let values = Vec::<Value>::deserialize(&mut de)?;
    de.end()?;
    Ok(values)
}
