use std::fmt;

use bytes::Bytes;

/// The two frame kinds a transport can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// UTF-8 text: a packet header plus optional JSON body.
    Text,
    /// Raw bytes: one packet attachment.
    Binary,
}

impl FrameKind {
    /// Byte used for this kind by the stream framing.
    pub fn as_byte(self) -> u8 {
        match self {
            FrameKind::Text => 0,
            FrameKind::Binary => 1,
        }
    }

    /// Inverse of [`FrameKind::as_byte`].
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(FrameKind::Text),
            1 => Some(FrameKind::Binary),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FrameKind::Text => "TEXT",
            FrameKind::Binary => "BINARY",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One complete frame as delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame of the given kind.
    pub fn new(kind: FrameKind, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Create a TEXT frame.
    pub fn text(payload: impl Into<Bytes>) -> Self {
        Self::new(FrameKind::Text, payload)
    }

    /// Create a BINARY frame.
    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self::new(FrameKind::Binary, payload)
    }

    pub fn is_text(&self) -> bool {
        self.kind == FrameKind::Text
    }

    pub fn is_binary(&self) -> bool {
        self.kind == FrameKind::Binary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_byte_mapping() {
        assert_eq!(FrameKind::from_byte(FrameKind::Text.as_byte()), Some(FrameKind::Text));
        assert_eq!(
            FrameKind::from_byte(FrameKind::Binary.as_byte()),
            Some(FrameKind::Binary)
        );
        assert_eq!(FrameKind::from_byte(7), None);
    }

    #[test]
    fn constructors_set_kind() {
        assert!(Frame::text("0").is_text());
        assert!(Frame::binary(vec![1, 2, 3]).is_binary());
        assert_eq!(FrameKind::Binary.to_string(), "BINARY");
    }
}
