use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media could not be read: {0}")]
    Unreadable(String),

    #[error("frame decode failed: {0}")]
    Decode(String),

    #[error("media stream truncated after {frames} frames")]
    Truncated { frames: usize },

    #[error("frame dimensions invalid: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
}
