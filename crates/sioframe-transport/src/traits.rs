use crate::error::Result;
use crate::frame::{Frame, FrameKind};

/// Ordered source of frames (the receiving half of a transport).
///
/// Each call yields exactly one complete frame. Implementations must
/// preserve the order frames were sent in. Blocking, timeouts and
/// cancellation are the implementation's business; the codec passes
/// them through unchanged.
pub trait FrameSource {
    /// Receive the next frame.
    fn next_frame(&mut self) -> Result<Frame>;
}

/// Ordered sink of frames (the sending half of a transport).
///
/// A call opens, writes and closes one frame. When it returns `Ok`
/// the frame has been handed to the transport in full.
pub trait FrameSink {
    /// Send one frame of `kind` carrying `payload`.
    fn send_frame(&mut self, kind: FrameKind, payload: &[u8]) -> Result<()>;
}

impl<T: FrameSource + ?Sized> FrameSource for &mut T {
    fn next_frame(&mut self) -> Result<Frame> {
        (**self).next_frame()
    }
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn send_frame(&mut self, kind: FrameKind, payload: &[u8]) -> Result<()> {
        (**self).send_frame(kind, payload)
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> Result<Frame> {
        (**self).next_frame()
    }
}

impl<T: FrameSink + ?Sized> FrameSink for Box<T> {
    fn send_frame(&mut self, kind: FrameKind, payload: &[u8]) -> Result<()> {
        (**self).send_frame(kind, payload)
    }
}
