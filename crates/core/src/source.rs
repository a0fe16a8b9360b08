//! The video source the renderer samples from.
//!
//! The renderer polls the source once per tick. Sources that are not ready
//! yet (a stream still negotiating, a decoder without metadata) report no
//! dimensions, and the renderer skips grid construction until they do.

use crate::error::TileError;
use crate::pixel::PixelBuffer;

/// A live frame provider.
pub trait VideoSource {
    /// Current frame width and height, or `None` before the stream is ready.
    fn dimensions(&self) -> Option<(usize, usize)>;

    /// Copies the current frame into `buffer`, which the caller has already
    /// sized to [`dimensions`](Self::dimensions).
    fn snapshot_into(&mut self, buffer: &mut PixelBuffer) -> Result<(), TileError>;
}

/// A frame handed over by a host as a borrowed RGBA slice.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    width: usize,
    height: usize,
    rgba: &'a [u8],
}

impl<'a> RawFrame<'a> {
    /// Wraps `rgba`, which must hold exactly `width * height * 4` bytes.
    ///
    /// A zero dimension is accepted and reported as "not ready".
    pub fn new(width: usize, height: usize, rgba: &'a [u8]) -> Result<Self, TileError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(TileError::InvalidDimensions)?;
        if rgba.len() != expected {
            return Err(TileError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: rgba.len() / 4,
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

impl VideoSource for RawFrame<'_> {
    fn dimensions(&self) -> Option<(usize, usize)> {
        (self.width > 0 && self.height > 0).then_some((self.width, self.height))
    }

    fn snapshot_into(&mut self, buffer: &mut PixelBuffer) -> Result<(), TileError> {
        buffer.copy_from_rgba(self.rgba)
    }
}

impl VideoSource for PixelBuffer {
    fn dimensions(&self) -> Option<(usize, usize)> {
        Some((self.width(), self.height()))
    }

    fn snapshot_into(&mut self, buffer: &mut PixelBuffer) -> Result<(), TileError> {
        buffer.copy_from_rgba(self.as_rgba())
    }
}
