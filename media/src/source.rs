//! Sequential frame streaming.

use crate::error::MediaError;
use crate::frame::Frame;

/// A strictly sequential source of decoded frames.
///
/// Decoding frame N+1 depends on decoder state after frame N, so there is no
/// random access. Extractors drive the source under a hard frame cap; a
/// truncated or malformed stream surfaces as an `Err` or early `None`, never
/// unbounded work.
pub trait FrameSource {
    /// Decode and return the next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, MediaError>;
}

/// An in-memory frame source backed by a `Vec<Frame>`.
///
/// The standard source for tests and for media already decoded upstream.
pub struct FrameBuffer {
    frames: std::vec::IntoIter<Frame>,
}

impl FrameBuffer {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl FrameSource for FrameBuffer {
    fn next_frame(&mut self) -> Result<Option<Frame>, MediaError> {
        Ok(self.frames.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_yields_in_order_then_none() {
        let frames = vec![Frame::filled(2, 2, 1), Frame::filled(2, 2, 2)];
        let mut source = FrameBuffer::new(frames);
        assert_eq!(source.next_frame().unwrap().unwrap().get(0, 0), 1);
        assert_eq!(source.next_frame().unwrap().unwrap().get(0, 0), 2);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn empty_buffer_is_immediately_exhausted() {
        let mut source = FrameBuffer::new(vec![]);
        assert!(source.next_frame().unwrap().is_none());
    }
}
