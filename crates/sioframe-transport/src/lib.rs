//! Frame transport contract for the sioframe packet codec.
//!
//! The codec never touches sockets. It consumes and produces discrete,
//! typed frames:
//! - [`FrameKind::Text`] carries the packet header and JSON body
//! - [`FrameKind::Binary`] carries one out-of-band attachment
//!
//! Anything that can move whole frames in order (a WebSocket, a polling
//! session, a test queue) implements [`FrameSource`] and [`FrameSink`].
//! Two implementations ship here: [`FrameQueue`] for in-process use and
//! length-prefixed [`FrameReader`]/[`FrameWriter`] for byte streams.

pub mod error;
pub mod frame;
pub mod queue;
pub mod reader;
pub mod stream;
pub mod traits;
pub mod writer;

pub use error::{Result, TransportError};
pub use frame::{Frame, FrameKind};
pub use queue::FrameQueue;
pub use reader::FrameReader;
pub use stream::{FrameConfig, StreamHeader, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use traits::{FrameSink, FrameSource};
pub use writer::FrameWriter;
