use std::path::Path;

use anyhow::Context;

use crate::assets::image::{PreparedImage, SourceImage};
use crate::foundation::error::{ReelError, ReelResult};

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ReelResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PreparedImage::from_straight_rgba8(width, height, rgba.into_raw()))
}

/// Read and decode an image file into a [`SourceImage`].
#[tracing::instrument]
pub fn load_image(path: &Path) -> ReelResult<SourceImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        ReelError::validation(format!("failed to read image '{}': {e}", path.display()))
    })?;
    let prepared = decode_image(&bytes)?;
    tracing::debug!(width = prepared.width, height = prepared.height, "decoded image");
    SourceImage::new(prepared)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
