//! PNG output of a rendered surface.
//!
//! Feature-gated behind `png` (default on) so WASM builds can depend on this
//! crate without pulling in `image`.

use std::path::Path;

use tileburst_core::error::TileError;
use tileburst_core::pixel::PixelBuffer;

/// Writes an RGBA buffer as a PNG file.
///
/// Returns `TileError::InvalidDimensions` if the buffer does not fit `u32`
/// dimensions, or `TileError::Io` on write failure.
pub fn write_png(pixels: &PixelBuffer, path: &Path) -> Result<(), TileError> {
    let w = u32::try_from(pixels.width()).map_err(|_| TileError::InvalidDimensions)?;
    let h = u32::try_from(pixels.height()).map_err(|_| TileError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, pixels.as_rgba().to_vec())
        .ok_or_else(|| TileError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| TileError::Io(format!("{}: {e}", path.display())))
}
