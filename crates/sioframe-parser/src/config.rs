/// Default cap on attachments per packet.
pub const DEFAULT_MAX_ATTACHMENTS: usize = 256;

/// Limits shared by [`Encoder`](crate::Encoder) and [`Decoder`](crate::Decoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum number of BINARY attachments one packet may declare.
    ///
    /// The decoder checks the count announced in the header before it
    /// reads any attachment frame.
    pub max_attachments: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_attachments: DEFAULT_MAX_ATTACHMENTS,
        }
    }
}
