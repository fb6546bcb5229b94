//! Container decoding seam and the built-in raw-luma codec.

use crate::error::MediaError;
use crate::frame::Frame;
use crate::source::{FrameBuffer, FrameSource};

/// Turns stored media bytes into decoded frames.
///
/// Codec selection is a deployment concern; the pipeline only needs one
/// still image per document and a sequential frame stream per video.
pub trait MediaDecoder: Send + Sync {
    /// Decode a still image.
    fn decode_image(&self, bytes: &[u8]) -> Result<Frame, MediaError>;

    /// Open a video container as a sequential frame source.
    fn open_video(&self, bytes: &[u8]) -> Result<Box<dyn FrameSource + Send>, MediaError>;
}

/// The built-in codec for pre-decoded grayscale media.
///
/// Container layout: a 4-byte header (`width: u16 LE`, `height: u16 LE`)
/// followed by consecutive `width * height`-byte luma frames. An image is a
/// container with exactly one frame. A trailing partial frame means the
/// stream was cut off mid-transfer.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawLumaDecoder;

impl RawLumaDecoder {
    fn parse(bytes: &[u8]) -> Result<Vec<Frame>, MediaError> {
        if bytes.len() < 4 {
            return Err(MediaError::Unreadable("missing container header".into()));
        }
        let width = u16::from_le_bytes([bytes[0], bytes[1]]) as usize;
        let height = u16::from_le_bytes([bytes[2], bytes[3]]) as usize;
        if width == 0 || height == 0 {
            return Err(MediaError::InvalidDimensions { width, height });
        }

        let frame_len = width * height;
        let body = &bytes[4..];
        let mut frames = Vec::with_capacity(body.len() / frame_len);
        for chunk in body.chunks(frame_len) {
            if chunk.len() < frame_len {
                return Err(MediaError::Truncated {
                    frames: frames.len(),
                });
            }
            frames.push(Frame::from_luma(width, height, chunk.to_vec())?);
        }
        Ok(frames)
    }

    /// Encode frames into the raw-luma container. All frames must share the
    /// first frame's dimensions.
    pub fn encode(frames: &[Frame]) -> Result<Vec<u8>, MediaError> {
        let Some(first) = frames.first() else {
            return Err(MediaError::Unreadable("no frames to encode".into()));
        };
        let mut bytes = Vec::with_capacity(4 + frames.len() * first.width() * first.height());
        bytes.extend_from_slice(&(first.width() as u16).to_le_bytes());
        bytes.extend_from_slice(&(first.height() as u16).to_le_bytes());
        for frame in frames {
            if frame.width() != first.width() || frame.height() != first.height() {
                return Err(MediaError::InvalidDimensions {
                    width: frame.width(),
                    height: frame.height(),
                });
            }
            bytes.extend_from_slice(frame.as_bytes());
        }
        Ok(bytes)
    }
}

impl MediaDecoder for RawLumaDecoder {
    fn decode_image(&self, bytes: &[u8]) -> Result<Frame, MediaError> {
        let mut frames = Self::parse(bytes)?;
        match frames.len() {
            1 => Ok(frames.remove(0)),
            n => Err(MediaError::Decode(format!(
                "expected a single-frame image, found {n} frames"
            ))),
        }
    }

    fn open_video(&self, bytes: &[u8]) -> Result<Box<dyn FrameSource + Send>, MediaError> {
        let frames = Self::parse(bytes)?;
        if frames.is_empty() {
            return Err(MediaError::Decode("video container holds no frames".into()));
        }
        Ok(Box::new(FrameBuffer::new(frames)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_round_trips() {
        let frame = Frame::from_fn(3, 2, |x, y| (x + y * 3) as u8);
        let bytes = RawLumaDecoder::encode(std::slice::from_ref(&frame)).unwrap();
        let decoded = RawLumaDecoder.decode_image(&bytes).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn video_yields_frames_in_order() {
        let frames = vec![Frame::filled(2, 2, 1), Frame::filled(2, 2, 9)];
        let bytes = RawLumaDecoder::encode(&frames).unwrap();
        let mut source = RawLumaDecoder.open_video(&bytes).unwrap();
        assert_eq!(source.next_frame().unwrap().unwrap().get(0, 0), 1);
        assert_eq!(source.next_frame().unwrap().unwrap().get(0, 0), 9);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn partial_trailing_frame_is_truncated() {
        let frames = vec![Frame::filled(2, 2, 1)];
        let mut bytes = RawLumaDecoder::encode(&frames).unwrap();
        bytes.extend_from_slice(&[7, 7]); // half a frame
        assert!(matches!(
            RawLumaDecoder::parse(&bytes),
            Err(MediaError::Truncated { frames: 1 })
        ));
    }

    #[test]
    fn missing_header_is_unreadable() {
        assert!(matches!(
            RawLumaDecoder.decode_image(&[1, 2]),
            Err(MediaError::Unreadable(_))
        ));
    }

    #[test]
    fn zero_dimensions_rejected() {
        let bytes = [0u8, 0, 2, 0];
        assert!(matches!(
            RawLumaDecoder.decode_image(&bytes),
            Err(MediaError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn multi_frame_image_rejected() {
        let frames = vec![Frame::filled(2, 2, 1), Frame::filled(2, 2, 2)];
        let bytes = RawLumaDecoder::encode(&frames).unwrap();
        assert!(matches!(
            RawLumaDecoder.decode_image(&bytes),
            Err(MediaError::Decode(_))
        ));
    }
}
