use std::fmt;

use crate::value::Value;

/// Caller-visible packet types.
///
/// The wire also knows `BINARY_EVENT` (5) and `BINARY_ACK` (6); those only
/// announce attachments and are folded back into [`PacketType::Event`] and
/// [`PacketType::Ack`] by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PacketType {
    #[default]
    Connect,
    Disconnect,
    Event,
    Ack,
    Error,
}

impl PacketType {
    pub const ALL: [PacketType; 5] = [
        PacketType::Connect,
        PacketType::Disconnect,
        PacketType::Event,
        PacketType::Ack,
        PacketType::Error,
    ];

    /// Numeric wire value (0-4).
    pub fn as_u8(self) -> u8 {
        match self {
            PacketType::Connect => 0,
            PacketType::Disconnect => 1,
            PacketType::Event => 2,
            PacketType::Ack => 3,
            PacketType::Error => 4,
        }
    }

    /// Inverse of [`PacketType::as_u8`].
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            PacketType::Connect => "CONNECT",
            PacketType::Disconnect => "DISCONNECT",
            PacketType::Event => "EVENT",
            PacketType::Ack => "ACK",
            PacketType::Error => "ERROR",
        }
    }

    /// Whether packets of this type may announce BINARY attachments.
    pub fn carries_attachments(self) -> bool {
        matches!(self, PacketType::Event | PacketType::Ack)
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Packet type as written in the first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WireType {
    Plain(PacketType),
    BinaryEvent,
    BinaryAck,
}

impl WireType {
    pub(crate) fn from_ascii(byte: u8) -> Option<Self> {
        match byte {
            b'5' => Some(WireType::BinaryEvent),
            b'6' => Some(WireType::BinaryAck),
            b'0'..=b'4' => PacketType::from_u8(byte - b'0').map(WireType::Plain),
            _ => None,
        }
    }

    pub(crate) fn as_ascii(self) -> u8 {
        match self {
            WireType::Plain(packet_type) => b'0' + packet_type.as_u8(),
            WireType::BinaryEvent => b'5',
            WireType::BinaryAck => b'6',
        }
    }

    pub(crate) fn is_binary(self) -> bool {
        !matches!(self, WireType::Plain(_))
    }

    /// The type a caller sees once attachments are accounted for.
    pub(crate) fn packet_type(self) -> PacketType {
        match self {
            WireType::Plain(packet_type) => packet_type,
            WireType::BinaryEvent => PacketType::Event,
            WireType::BinaryAck => PacketType::Ack,
        }
    }

    /// Upgrade to the binary variant when attachments follow.
    pub(crate) fn with_attachments(packet_type: PacketType) -> Self {
        match packet_type {
            PacketType::Event => WireType::BinaryEvent,
            PacketType::Ack => WireType::BinaryAck,
            other => WireType::Plain(other),
        }
    }
}

/// Packet header: type, namespace and optional acknowledgement id.
///
/// An empty namespace is the default namespace `/`. `id` only has
/// meaning when `need_ack` is set; equality ignores it otherwise.
#[derive(Debug, Clone, Default)]
pub struct Header {
    pub packet_type: PacketType,
    pub namespace: String,
    pub id: u64,
    pub need_ack: bool,
}

impl Header {
    pub fn new(packet_type: PacketType) -> Self {
        Self {
            packet_type,
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Attach an acknowledgement id. `0` is a valid id.
    pub fn with_ack(mut self, id: u64) -> Self {
        self.id = id;
        self.need_ack = true;
        self
    }

    /// The acknowledgement id, if one is present on the wire.
    pub fn ack_id(&self) -> Option<u64> {
        self.need_ack.then_some(self.id)
    }

    /// Namespace as written on the wire: `""` for the default namespace.
    pub fn wire_namespace(&self) -> &str {
        if self.namespace == "/" {
            ""
        } else {
            &self.namespace
        }
    }

    pub fn is_default_namespace(&self) -> bool {
        self.wire_namespace().is_empty()
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.packet_type == other.packet_type
            && self.wire_namespace() == other.wire_namespace()
            && self.ack_id() == other.ack_id()
    }
}

impl Eq for Header {}

/// Result of [`Decoder::decode_header`](crate::Decoder::decode_header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketHead {
    pub header: Header,
    /// Event name, present for [`PacketType::Event`] packets with a body.
    pub event: Option<String>,
}

/// A fully decoded packet.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub header: Header,
    pub event: Option<String>,
    pub args: Vec<Value>,
}

impl Packet {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            event: None,
            args: Vec::new(),
        }
    }

    pub fn connect(namespace: impl Into<String>) -> Self {
        Self::new(Header::new(PacketType::Connect).with_namespace(namespace))
    }

    pub fn disconnect(namespace: impl Into<String>) -> Self {
        Self::new(Header::new(PacketType::Disconnect).with_namespace(namespace))
    }

    pub fn event(namespace: impl Into<String>, event: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            header: Header::new(PacketType::Event).with_namespace(namespace),
            event: Some(event.into()),
            args,
        }
    }

    pub fn ack(namespace: impl Into<String>, id: u64, args: Vec<Value>) -> Self {
        Self {
            header: Header::new(PacketType::Ack).with_namespace(namespace).with_ack(id),
            event: None,
            args,
        }
    }

    pub fn error(namespace: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            header: Header::new(PacketType::Error).with_namespace(namespace),
            event: None,
            args,
        }
    }

    /// Request an acknowledgement with `id`.
    pub fn with_ack(mut self, id: u64) -> Self {
        self.header = self.header.with_ack(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_types_cover_digits_zero_to_six() {
        for byte in b'0'..=b'6' {
            let wire = WireType::from_ascii(byte).unwrap();
            assert_eq!(wire.as_ascii(), byte);
        }
        assert_eq!(WireType::from_ascii(b'7'), None);
        assert_eq!(WireType::from_ascii(b'a'), None);
    }

    #[test]
    fn binary_variants_collapse() {
        assert_eq!(WireType::BinaryEvent.packet_type(), PacketType::Event);
        assert_eq!(WireType::BinaryAck.packet_type(), PacketType::Ack);
        assert_eq!(
            WireType::with_attachments(PacketType::Event),
            WireType::BinaryEvent
        );
        assert_eq!(
            WireType::with_attachments(PacketType::Error),
            WireType::Plain(PacketType::Error)
        );
    }

    #[test]
    fn header_equality_ignores_absent_id() {
        let a = Header {
            packet_type: PacketType::Event,
            namespace: String::new(),
            id: 42,
            need_ack: false,
        };
        let b = Header::new(PacketType::Event);
        assert_eq!(a, b);
        assert_ne!(a.clone().with_ack(0), b);
    }

    #[test]
    fn slash_is_the_default_namespace() {
        let root = Header::new(PacketType::Connect).with_namespace("/");
        assert!(root.is_default_namespace());
        assert_eq!(root, Header::new(PacketType::Connect));
        assert_eq!(Header::new(PacketType::Connect).with_namespace("/woot").wire_namespace(), "/woot");
    }

    #[test]
    fn zero_is_a_present_ack_id() {
        let header = Header::new(PacketType::Connect).with_ack(0);
        assert_eq!(header.ack_id(), Some(0));
        assert_eq!(Header::new(PacketType::Connect).ack_id(), None);
    }
}
