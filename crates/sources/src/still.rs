//! Still images decoded from disk, used as a frozen feed.

use std::path::Path;

use tileburst_core::error::TileError;
use tileburst_core::pixel::PixelBuffer;

/// Decodes a PNG or JPEG file into an RGBA buffer.
///
/// Returns `TileError::Io` if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> Result<PixelBuffer, TileError> {
    let img = image::open(path)
        .map_err(|e| TileError::Io(format!("{}: {e}", path.display())))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    PixelBuffer::from_rgba(w as usize, h as usize, img.into_raw())
}
