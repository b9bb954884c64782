//! Packet codec for a multiplexed, namespace-aware event protocol.
//!
//! One packet travels as one TEXT frame followed by zero or more BINARY
//! frames. The TEXT frame holds a compact header and a JSON argument
//! array; every [`Buffer`] found in the arguments is pulled out into its own
//! BINARY frame and replaced by a `{"_placeholder":true,"num":N}` marker.
//!
//! ```text
//! packet   := TYPE [ COUNT "-" ] [ NAMESPACE "," ] [ ID ] [ JSON "\n" ]
//! ```
//!
//! - [`Encoder`] writes packets to any [`FrameSink`]
//! - [`Decoder`] reads them back from any [`FrameSource`]
//! - [`Value`] is the argument tree, with [`Value::Binary`] for payloads
//!
//! ```
//! use sioframe_parser::{Buffer, Decoder, Encoder, Header, PacketType, Value};
//! use sioframe_transport::FrameQueue;
//!
//! let mut wire = FrameQueue::new();
//! let header = Header::new(PacketType::Event).with_namespace("/chat");
//! Encoder::new(&mut wire)
//!     .encode_event(&header, "upload", &[Value::from(Buffer::new(vec![1, 2, 3]))])
//!     .unwrap();
//! assert_eq!(wire.len(), 2);
//!
//! let packet = Decoder::new(&mut wire).decode().unwrap();
//! assert_eq!(packet.event.as_deref(), Some("upload"));
//! assert_eq!(&packet.args[0].as_buffer().unwrap().data()[..], &[1u8, 2, 3][..]);
//! ```
//!
//! Encoders and decoders hold per-packet state and are not meant to be
//! shared between threads; give each connection its own pair.

pub mod buffer;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod grammar;
pub mod packet;
pub mod value;
pub mod walk;

pub use buffer::Buffer;
pub use config::{CodecConfig, DEFAULT_MAX_ATTACHMENTS};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{CodecError, ErrorClass, Result};
pub use grammar::{parse_header, HeaderFields};
pub use packet::{Header, Packet, PacketHead, PacketType};
pub use value::{Map, Value};

pub use sioframe_transport::{FrameKind, FrameSink, FrameSource};
