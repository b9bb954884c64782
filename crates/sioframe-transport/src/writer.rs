use std::io::{ErrorKind, Write};

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::frame::FrameKind;
use crate::stream::{FrameConfig, StreamHeader};
use crate::traits::FrameSink;

/// [`FrameSink`] over a byte stream. Flushes after every frame.
pub struct FrameWriter<W> {
    inner: W,
    config: FrameConfig,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: W, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> FrameSink for FrameWriter<W> {
    fn send_frame(&mut self, kind: FrameKind, payload: &[u8]) -> Result<()> {
        let header = StreamHeader::new(kind, payload.len(), self.config.max_payload_size)?;
        self.inner
            .write_all(&header.to_bytes())
            .and_then(|()| self.inner.write_all(payload))
            .and_then(|()| self.inner.flush())
            .map_err(|err| match err.kind() {
                ErrorKind::WriteZero => TransportError::ConnectionClosed,
                _ => TransportError::Io(err),
            })?;
        trace!(%kind, size = payload.len(), "wrote frame");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::frame::Frame;
    use crate::reader::FrameReader;
    use crate::traits::FrameSource;

    #[test]
    fn frames_read_back_in_order() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());
        writer.send_frame(FrameKind::Text, b"51-[]").unwrap();
        writer.send_frame(FrameKind::Binary, &[7, 8]).unwrap();

        let mut reader = FrameReader::new(Cursor::new(writer.into_inner()));
        assert_eq!(reader.next_frame().unwrap(), Frame::text("51-[]"));
        assert_eq!(reader.next_frame().unwrap(), Frame::binary(vec![7, 8]));
    }

    #[test]
    fn oversized_payload_writes_nothing() {
        let config = FrameConfig {
            max_payload_size: 4,
        };
        let mut writer = FrameWriter::with_config(Vec::<u8>::new(), config);

        let err = writer.send_frame(FrameKind::Binary, b"oversized").unwrap_err();
        assert!(matches!(err, TransportError::PayloadTooLarge { size: 9, max: 4 }));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn every_frame_is_flushed() {
        let mut writer = FrameWriter::new(CountingWriter::default());
        writer.send_frame(FrameKind::Text, b"0").unwrap();
        writer.send_frame(FrameKind::Text, b"1").unwrap();
        assert_eq!(writer.get_ref().flushes, 2);
    }

    #[test]
    fn closed_stream_is_connection_closed() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send_frame(FrameKind::Text, b"x").unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed));
    }

    #[derive(Default)]
    struct CountingWriter {
        flushes: usize,
    }

    impl Write for CountingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
