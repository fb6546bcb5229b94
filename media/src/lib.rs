//! Media primitives for the attest pipeline.
//!
//! Decoded video and document images are represented as owned 8-bit
//! grayscale [`Frame`] buffers. The pixel ops in [`ops`] are the building
//! blocks of the liveness and face heuristics; decoding containers into
//! frames happens behind the [`FrameSource`] trait so malformed media stays
//! contained at the boundary.

pub mod decode;
pub mod error;
pub mod frame;
pub mod ops;
pub mod source;

pub use decode::{MediaDecoder, RawLumaDecoder};
pub use error::MediaError;
pub use frame::{Frame, Region};
pub use source::{FrameBuffer, FrameSource};
