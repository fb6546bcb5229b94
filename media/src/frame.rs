//! Owned grayscale frame buffer.

use crate::error::MediaError;

/// A rectangular sub-area of a frame, in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    /// Center of the region as `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// The upper half of the region (where eyes sit in a face box).
    pub fn upper_half(&self) -> Region {
        Region {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height / 2,
        }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// An owned 8-bit grayscale image.
///
/// Row-major, `data.len() == width * height`. Constructed from a decoder or
/// synthetically via [`Frame::from_fn`] in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Create a frame from raw luma bytes.
    pub fn from_luma(width: usize, height: usize, data: Vec<u8>) -> Result<Self, MediaError> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(MediaError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// A frame filled with a single luma value.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Width / height; the document classifier keys off this.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Luma at `(x, y)`. Panics on out-of-bounds in debug builds only.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The full frame as a region.
    pub fn full_region(&self) -> Region {
        Region {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }

    /// Clip a region to the frame bounds.
    pub fn clip(&self, region: Region) -> Region {
        let x = region.x.min(self.width);
        let y = region.y.min(self.height);
        Region {
            x,
            y,
            width: region.width.min(self.width - x),
            height: region.height.min(self.height - y),
        }
    }
}
