use std::io::{ErrorKind, Read};

use bytes::Bytes;
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::frame::Frame;
use crate::stream::{FrameConfig, StreamHeader, HEADER_SIZE};
use crate::traits::FrameSource;

/// [`FrameSource`] over a byte stream.
///
/// End of stream between frames is [`TransportError::ConnectionClosed`];
/// end of stream inside a frame is [`TransportError::TruncatedFrame`].
/// Wrap unbuffered readers in a `BufReader`: each frame takes two reads.
pub struct FrameReader<R> {
    inner: R,
    config: FrameConfig,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: R, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fill `buf`, returning how many bytes arrived before end of stream.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> FrameSource for FrameReader<R> {
    fn next_frame(&mut self) -> Result<Frame> {
        let mut raw = [0u8; HEADER_SIZE];
        match self.fill(&mut raw)? {
            0 => return Err(TransportError::ConnectionClosed),
            HEADER_SIZE => {}
            received => {
                return Err(TransportError::TruncatedFrame {
                    expected: HEADER_SIZE,
                    received,
                })
            }
        }
        let header = StreamHeader::parse(&raw, self.config.max_payload_size)?;

        let mut payload = vec![0u8; header.len];
        let received = self.fill(&mut payload)?;
        if received < header.len {
            return Err(TransportError::TruncatedFrame {
                expected: HEADER_SIZE + header.len,
                received: HEADER_SIZE + received,
            });
        }

        trace!(kind = %header.kind, size = header.len, "read frame");
        Ok(Frame::new(header.kind, Bytes::from(payload)))
    }
}
