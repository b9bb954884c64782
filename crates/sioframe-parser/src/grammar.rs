//! Header grammar of the TEXT frame.
//!
//! ```text
//! packet    := TYPE [ COUNT "-" ] [ NAMESPACE ] [ ID ] [ JSON ]
//! TYPE      := "0".."6"
//! COUNT     := DIGIT+
//! NAMESPACE := "/" NSCHARS* ","?
//! ID        := DIGIT+
//! JSON      := "[" ... "]" "\n"
//! ```
//!
//! A digit run right after TYPE is ambiguous: it is the attachment count
//! when a `-` follows, otherwise it is kept as a candidate id. The
//! candidate wins only if no digit run follows the (optional) namespace,
//! which is how `00` reads as CONNECT with id 0 and `313[..]` as ACK 13.

use crate::error::{CodecError, Result};
use crate::packet::{Header, WireType};

/// Header fields parsed from a TEXT frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    /// Caller-visible header; binary wire types are already collapsed.
    pub header: Header,
    /// Number of BINARY frames that follow this TEXT frame.
    pub attachments: u64,
    /// Offset of the JSON body (equal to the input length if absent).
    pub body_offset: usize,
}

/// Parse the header at the start of a TEXT frame payload.
pub fn parse_header(input: &[u8]) -> Result<HeaderFields> {
    HeaderParser::new(input).parse()
}

/// Cursor over one TEXT payload.
///
/// Remembers the attachment count as soon as it has been read so a caller
/// can still drain the attachments when a later step fails.
pub(crate) struct HeaderParser<'a> {
    input: &'a [u8],
    pos: usize,
    attachments: u64,
}

impl<'a> HeaderParser<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            attachments: 0,
        }
    }

    /// Attachment count read so far (0 until the count marker is seen).
    pub(crate) fn declared_attachments(&self) -> u64 {
        self.attachments
    }

    pub(crate) fn parse(&mut self) -> Result<HeaderFields> {
        let wire_type = self.packet_type()?;

        let leading = self.digits()?;
        let candidate_id = if self.peek() == Some(b'-') {
            let offset = self.pos;
            self.pos += 1;
            if !wire_type.is_binary() {
                return Err(CodecError::UnexpectedAttachmentCount(wire_type.packet_type()));
            }
            self.attachments = leading.ok_or(CodecError::MissingAttachmentCount { offset })?;
            None
        } else {
            leading
        };

        let namespace = if self.peek() == Some(b'/') {
            self.namespace()?
        } else {
            String::new()
        };

        let (id, need_ack) = match self.digits()?.or(candidate_id) {
            Some(id) => (id, true),
            None => (0, false),
        };

        match self.peek() {
            None | Some(b'[') => {}
            Some(byte) => {
                return Err(CodecError::UnexpectedByte {
                    byte,
                    offset: self.pos,
                })
            }
        }

        Ok(HeaderFields {
            header: Header {
                packet_type: wire_type.packet_type(),
                namespace,
                id,
                need_ack,
            },
            attachments: self.attachments,
            body_offset: self.pos,
        })
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn packet_type(&mut self) -> Result<WireType> {
        let byte = self.peek().ok_or(CodecError::EmptyFrame)?;
        let wire_type = WireType::from_ascii(byte).ok_or(CodecError::InvalidPacketType(byte))?;
        self.pos += 1;
        Ok(wire_type)
    }

    /// Greedy decimal run; `None` if the next byte is not a digit.
    fn digits(&mut self) -> Result<Option<u64>> {
        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(byte @ b'0'..=b'9') = self.peek() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(byte - b'0')))
                .ok_or(CodecError::NumberOverflow { offset: start })?;
            self.pos += 1;
        }
        Ok((self.pos > start).then_some(value))
    }

    /// Namespace from `/` up to and including `,`, or to the end.
    fn namespace(&mut self) -> Result<String> {
        let rest = &self.input[self.pos..];
        let (raw, consumed) = match rest.iter().position(|&b| b == b',') {
            Some(comma) => (&rest[..comma], comma + 1),
            None => (rest, rest.len()),
        };
        if raw.contains(&b'[') {
            return Err(CodecError::UnterminatedNamespace);
        }
        let namespace = std::str::from_utf8(raw)
            .map_err(|_| CodecError::InvalidNamespace("not valid UTF-8"))?;
        self.pos += consumed;

        if namespace == "/" {
            Ok(String::new())
        } else {
            Ok(namespace.to_owned())
        }
    }
}

/// Split the event name off an event body.
///
/// `body` is `[` NAME ( `,` ARGS... )? `]` … ; the name is scanned as a whole
/// JSON string token so names containing `,` or `]` are safe. Returns the
/// name and the remaining arguments re-wrapped as a JSON array.
pub(crate) fn split_event_name(body: &[u8]) -> Result<(String, Vec<u8>)> {
    let mut pos = skip_whitespace(body, 1);
    if body.get(pos) != Some(&b'"') {
        return Err(CodecError::InvalidEventName(
            "first array element must be a string",
        ));
    }

    let start = pos;
    pos += 1;
    loop {
        match body.get(pos) {
            None => return Err(CodecError::InvalidEventName("unterminated string")),
            Some(b'\\') => pos += 2,
            Some(b'"') => {
                pos += 1;
                break;
            }
            Some(_) => pos += 1,
        }
    }
    let name: String = serde_json::from_slice(&body[start..pos])?;

    let pos = skip_whitespace(body, pos);
    let rest = match body.get(pos) {
        Some(b',') => &body[pos + 1..],
        Some(b']') => &body[pos..],
        _ => {
            return Err(CodecError::InvalidEventName(
                "event name must be followed by ',' or ']'",
            ))
        }
    };

    let mut args = Vec::with_capacity(rest.len() + 1);
    args.push(b'[');
    args.extend_from_slice(rest);
    Ok((name, args))
}

fn skip_whitespace(input: &[u8], mut pos: usize) -> usize {
    while input.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}
