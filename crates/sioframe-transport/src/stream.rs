//! Frame layout on a byte stream.
//!
//! ```text
//! ┌────────────┬────────────┬──────────┬──────────────────┐
//! │ "SF" (2B)  │ len u32 LE │ kind 1B  │ payload (len B)  │
//! │ 0x53 0x46  │            │ 0=TEXT   │                  │
//! │            │            │ 1=BINARY │                  │
//! └────────────┴────────────┴──────────┴──────────────────┘
//! ```

use crate::error::{Result, TransportError};
use crate::frame::FrameKind;

/// Size of [`StreamHeader`] on the wire.
pub const HEADER_SIZE: usize = 7;

pub const MAGIC: [u8; 2] = *b"SF";

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Limits for [`FrameReader`](crate::FrameReader) and
/// [`FrameWriter`](crate::FrameWriter).
#[derive(Debug, Clone)]
pub struct FrameConfig {
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// The fixed prefix in front of every frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub kind: FrameKind,
    pub len: usize,
}

impl StreamHeader {
    /// Header for a payload of `len` bytes, checked against `max`.
    pub fn new(kind: FrameKind, len: usize, max: usize) -> Result<Self> {
        if len > max || u32::try_from(len).is_err() {
            return Err(TransportError::PayloadTooLarge {
                size: len,
                max: max.min(u32::MAX as usize),
            });
        }
        Ok(Self { kind, len })
    }

    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        // `new` bounds len to u32.
        let len = (self.len as u32).to_le_bytes();
        [
            MAGIC[0],
            MAGIC[1],
            len[0],
            len[1],
            len[2],
            len[3],
            self.kind.as_byte(),
        ]
    }

    pub fn parse(bytes: &[u8; HEADER_SIZE], max: usize) -> Result<Self> {
        if bytes[..2] != MAGIC {
            return Err(TransportError::InvalidMagic);
        }
        let kind = FrameKind::from_byte(bytes[6]).ok_or(TransportError::InvalidFrameKind(bytes[6]))?;
        let len = u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]) as usize;
        Self::new(kind, len, max)
    }
}
