use std::sync::Arc;

use crate::foundation::error::ReelResult;
use crate::render::paint::{premultiply_rgba8_in_place, rgba_premul_to_image};

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap straight-alpha RGBA8 bytes.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> Self {
        premultiply_rgba8_in_place(&mut rgba);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        }
    }

    /// Build an opaque image from a per-pixel color function (handy for fixtures and swatches).
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> Self {
        let mut bytes = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for y in 0..height {
            for x in 0..width {
                let [r, g, b] = f(x, y);
                bytes.extend_from_slice(&[r, g, b, 255]);
            }
        }
        Self {
            width,
            height,
            rgba8_premul: Arc::new(bytes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A chapter image ready to be sampled by the renderer.
///
/// Zero-sized images are representable (the decoder of an unfinished load may report them); they
/// carry no paint and tessellate to an empty piece set.
#[derive(Clone)]
pub struct SourceImage {
    prepared: PreparedImage,
    paint: Option<vello_cpu::Image>,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.prepared.width)
            .field("height", &self.prepared.height)
            .field("has_paint", &self.paint.is_some())
            .finish()
    }
}

impl SourceImage {
    pub fn new(prepared: PreparedImage) -> ReelResult<Self> {
        let paint = if prepared.is_empty() {
            None
        } else {
            Some(rgba_premul_to_image(
                &prepared.rgba8_premul,
                prepared.width,
                prepared.height,
            )?)
        };
        Ok(Self { prepared, paint })
    }

    /// Image with the given natural size and no pixels.
    pub fn unloaded(width: u32, height: u32) -> Self {
        Self {
            prepared: PreparedImage {
                width,
                height,
                rgba8_premul: Arc::new(Vec::new()),
            },
            paint: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.prepared.width
    }

    pub fn height(&self) -> u32 {
        self.prepared.height
    }

    /// False for zero-sized or unloaded images.
    pub fn is_ready(&self) -> bool {
        self.paint.is_some()
    }

    pub fn prepared(&self) -> &PreparedImage {
        &self.prepared
    }

    pub(crate) fn paint(&self) -> Option<&vello_cpu::Image> {
        self.paint.as_ref()
    }
}
