use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::{Affine, Canvas};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::paint::{image_from_pixmap, size_u16, unpremultiply_rgba8_in_place};

/// A rendered frame in CPU memory.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixels, ready for PNG encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(i..i + 4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Frozen copy of a surface, replayed by the finale slideshow.
#[derive(Clone)]
pub struct Snapshot {
    pub(crate) image: vello_cpu::Image,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Drawable target the compositor renders into every frame.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
    view: Affine,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation("surface width and height must be > 0"));
        }
        let (w, h) = size_u16(width, height)?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
            ctx: None,
            view: Affine::IDENTITY,
        })
    }

    /// Surface showing `canvas` at `output_scale` output pixels per canvas pixel.
    pub fn for_canvas(canvas: Canvas, output_scale: f64) -> ReelResult<Self> {
        let w = (canvas.w() * output_scale).round().max(1.0) as u32;
        let h = (canvas.h() * output_scale).round().max(1.0) as u32;
        let mut s = Self::new(w, h)?;
        s.view = Affine::scale(output_scale);
        Ok(s)
    }

    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Canvas → output pixel transform.
    pub fn view(&self) -> Affine {
        self.view
    }

    /// Run `f` against a reset render context and rasterize the result into the surface.
    pub(crate) fn draw(
        &mut self,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> ReelResult<()>,
    ) -> ReelResult<()> {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        f(&mut ctx)?;
        ctx.flush();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut self.pixmap);
        // Release paints (piece bitmaps) held by the recorded commands.
        ctx.reset();
        self.ctx = Some(ctx);
        Ok(())
    }

    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    /// Independent copy of the current pixels, usable as a paint.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            image: image_from_pixmap(Arc::new(self.pixmap.clone())),
            width: self.width(),
            height: self.height(),
        }
    }

    /// Write the current pixels as a PNG.
    pub fn save_png(&self, path: &Path) -> ReelResult<()> {
        let frame = self.to_frame();
        let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())
            .ok_or_else(|| ReelError::render("invalid rgba buffer size"))?;
        img.save(path)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
