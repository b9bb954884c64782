use std::collections::VecDeque;

use bytes::Bytes;
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::frame::{Frame, FrameKind};
use crate::traits::{FrameSink, FrameSource};

/// In-memory FIFO transport.
///
/// Frames sent into the queue come back out of [`FrameSource::next_frame`]
/// in the same order. An empty queue reports
/// [`TransportError::ConnectionClosed`], the same way a stream at EOF does.
#[derive(Debug, Default, Clone)]
pub struct FrameQueue {
    frames: VecDeque<Frame>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame to the back of the queue.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(frame);
    }

    /// Append a TEXT frame.
    pub fn push_text(&mut self, payload: impl Into<Bytes>) {
        self.push(Frame::text(payload));
    }

    /// Append a BINARY frame.
    pub fn push_binary(&mut self, payload: impl Into<Bytes>) {
        self.push(Frame::binary(payload));
    }

    /// Remove and return the front frame, if any.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate queued frames front to back without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Drain every queued frame in order.
    pub fn drain(&mut self) -> impl Iterator<Item = Frame> + '_ {
        self.frames.drain(..)
    }
}

impl FrameSource for FrameQueue {
    fn next_frame(&mut self) -> Result<Frame> {
        let frame = self.frames.pop_front().ok_or(TransportError::ConnectionClosed)?;
        trace!(kind = %frame.kind, size = frame.payload.len(), "dequeued frame");
        Ok(frame)
    }
}

impl FrameSink for FrameQueue {
    fn send_frame(&mut self, kind: FrameKind, payload: &[u8]) -> Result<()> {
        trace!(%kind, size = payload.len(), "queued frame");
        self.frames
            .push_back(Frame::new(kind, Bytes::copy_from_slice(payload)));
        Ok(())
    }
}

impl FromIterator<Frame> for FrameQueue {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}
