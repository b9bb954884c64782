use sioframe_transport::TransportError;

use crate::packet::PacketType;

/// Broad error classes. Only transport errors end the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Frame open/read/write failures from the transport.
    Transport,
    /// Malformed header, namespace, event name or JSON body.
    Grammar,
    /// Attachment bookkeeping disagrees with what arrived.
    Consistency,
}

/// Errors that can occur while encoding or decoding packets.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The TEXT frame carried no bytes at all.
    #[error("empty text frame")]
    EmptyFrame,

    /// The first byte is not a known packet type digit.
    #[error("invalid packet type byte {0:#04x}")]
    InvalidPacketType(u8),

    /// A decimal field does not fit into 64 bits.
    #[error("numeric field at offset {offset} overflows u64")]
    NumberOverflow { offset: usize },

    /// A `-` count marker with no digits in front of it.
    #[error("attachment count marker at offset {offset} has no digits")]
    MissingAttachmentCount { offset: usize },

    /// A `-` count marker after a type that cannot carry attachments.
    #[error("attachment count on non-binary packet type {0}")]
    UnexpectedAttachmentCount(PacketType),

    /// The namespace is malformed.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(&'static str),

    /// The namespace ran into the JSON body without a `,` separator.
    #[error("unterminated namespace")]
    UnterminatedNamespace,

    /// A byte that fits no grammar rule at this position.
    #[error("unexpected byte {byte:#04x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },

    /// The JSON body of an event does not start with a string event name.
    #[error("invalid event name: {0}")]
    InvalidEventName(&'static str),

    /// An event packet with arguments but no event name.
    #[error("event packet has arguments but no event name")]
    MissingEventName,

    /// An event name supplied for a packet type that has none.
    #[error("{0} packets carry no event name")]
    UnexpectedEventName(PacketType),

    /// The JSON body could not be parsed or rendered.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A packet must start with a TEXT frame.
    #[error("packet must start with a TEXT frame, got BINARY")]
    ExpectedTextFrame,

    /// A TEXT frame arrived where attachment `index` was due.
    #[error("expected BINARY frame for attachment {index}, got TEXT")]
    ExpectedBinaryFrame { index: usize },

    /// A placeholder points past the declared attachments.
    #[error("placeholder references attachment {num} but packet declares {count}")]
    AttachmentOutOfRange { num: u64, count: usize },

    /// More attachments than the configured limit.
    #[error("too many attachments ({count}, max {max})")]
    TooManyAttachments { count: u64, max: usize },

    /// `decode_args` was called without a decoded header.
    #[error("no packet header pending")]
    NoPendingPacket,
}

impl CodecError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CodecError::Transport(_) => ErrorClass::Transport,
            CodecError::ExpectedBinaryFrame { .. }
            | CodecError::AttachmentOutOfRange { .. }
            | CodecError::TooManyAttachments { .. }
            | CodecError::NoPendingPacket => ErrorClass::Consistency,
            _ => ErrorClass::Grammar,
        }
    }

    /// True when the connection cannot continue with the next packet.
    pub fn is_fatal_to_connection(&self) -> bool {
        self.class() == ErrorClass::Transport
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_are_fatal() {
        let closed = CodecError::from(TransportError::ConnectionClosed);
        assert_eq!(closed.class(), ErrorClass::Transport);
        assert!(closed.is_fatal_to_connection());

        let grammar = CodecError::InvalidPacketType(b'9');
        assert_eq!(grammar.class(), ErrorClass::Grammar);
        assert!(!grammar.is_fatal_to_connection());

        let mismatch = CodecError::AttachmentOutOfRange { num: 3, count: 1 };
        assert_eq!(mismatch.class(), ErrorClass::Consistency);
        assert!(!mismatch.is_fatal_to_connection());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = CodecError::UnexpectedAttachmentCount(PacketType::Connect);
        assert_eq!(err.to_string(), "attachment count on non-binary packet type CONNECT");

        let err = CodecError::TooManyAttachments { count: 9000, max: 256 };
        assert_eq!(err.to_string(), "too many attachments (9000, max 256)");
    }
}
