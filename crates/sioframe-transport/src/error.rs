/// Errors raised while moving frames between the codec and a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the transport between frames.
    #[error("connection closed")]
    ConnectionClosed,

    /// The stream ended inside a frame.
    #[error("stream ended inside a frame ({received} of {expected} bytes)")]
    TruncatedFrame { expected: usize, received: usize },

    /// The stream header does not start with the frame magic.
    #[error("invalid frame magic (expected 0x5346 \"SF\")")]
    InvalidMagic,

    /// The stream header names a frame kind other than TEXT or BINARY.
    #[error("invalid frame kind byte {0:#04x}")]
    InvalidFrameKind(u8),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, TransportError>;
