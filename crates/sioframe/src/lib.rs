//! Packet codec for a multiplexed, namespace-aware event protocol.
//!
//! A packet is one TEXT frame with a compact header and a JSON argument
//! array, followed by one BINARY frame for every byte buffer found in the
//! arguments.
//!
//! # Crate Structure
//!
//! - [`transport`]: the TEXT/BINARY frame contract plus in-memory and
//!   byte-stream adapters
//! - [`parser`]: header grammar, [`Encoder`](parser::Encoder) and
//!   [`Decoder`](parser::Decoder)
//!
//! The `cli` feature builds the `sioframe` binary for encoding and
//! inspecting packets from the command line.

/// Re-export transport types.
pub mod transport {
    pub use sioframe_transport::*;
}

/// Re-export codec types.
pub mod parser {
    pub use sioframe_parser::*;
}

pub use sioframe_parser::{
    Buffer, CodecConfig, CodecError, Decoder, Encoder, Header, Map, Packet, PacketType, Value,
};
