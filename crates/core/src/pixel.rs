//! RGBA8 pixel buffers.
//!
//! A [`PixelBuffer`] stores `width * height` straight-alpha RGBA pixels in
//! row-major order. It serves both as the per-tick sampling buffer (a copy of
//! the source frame) and as the backing store of the software surface.

use crate::error::TileError;

/// One straight-alpha RGBA pixel.
pub type Rgba = [u8; 4];

/// Fully transparent black, the cleared state of a surface.
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Row-major RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a transparent buffer of the given dimensions.
    ///
    /// Returns `TileError::InvalidDimensions` if either dimension is zero
    /// or if `width * height * 4` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, TileError> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Creates a buffer filled with a single color.
    pub fn filled(width: usize, height: usize, color: Rgba) -> Result<Self, TileError> {
        let len = byte_len(width, height)?;
        let data = color.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wraps an existing RGBA byte vector, validating its length.
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Result<Self, TileError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(TileError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len() / 4,
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Read-only access to the raw RGBA bytes.
    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    /// Changes the dimensions, discarding content when they differ.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), TileError> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        let len = byte_len(width, height)?;
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(len, 0);
        Ok(())
    }

    /// Copies `bytes` (RGBA, same dimensions) into the buffer.
    pub fn copy_from_rgba(&mut self, bytes: &[u8]) -> Result<(), TileError> {
        if bytes.len() != self.data.len() {
            return Err(TileError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: bytes.len() / 4,
                rhs_h: 1,
            });
        }
        self.data.copy_from_slice(bytes);
        Ok(())
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: isize, y: isize) -> Option<Rgba> {
        let i = self.offset(x, y)?;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Overwrites the pixel at `(x, y)`; out-of-range writes are ignored.
    pub fn put(&mut self, x: isize, y: isize, color: Rgba) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&color);
        }
    }

    /// Composites `color` over the pixel at `(x, y)` with an extra coverage
    /// factor in [0, 1] (source-over, straight alpha).
    pub fn blend_over(&mut self, x: isize, y: isize, color: Rgba, coverage: f64) {
        let Some(i) = self.offset(x, y) else {
            return;
        };
        let sa = f64::from(color[3]) / 255.0 * coverage.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let da = f64::from(self.data[i + 3]) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let s = f64::from(color[c]);
            let d = f64::from(self.data[i + c]);
            let v = (s * sa + d * da * (1.0 - sa)) / out_a;
            self.data[i + c] = v.round().clamp(0.0, 255.0) as u8;
        }
        self.data[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    fn offset(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) * 4)
    }
}

fn byte_len(width: usize, height: usize) -> Result<usize, TileError> {
    if width == 0 || height == 0 {
        return Err(TileError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or(TileError::InvalidDimensions)
}
