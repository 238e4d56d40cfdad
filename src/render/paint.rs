//! Conversions between crate geometry/pixels and `vello_cpu` types.

use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rect};
use crate::foundation::error::{ReelError, ReelResult};

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

pub(crate) fn rgba(r: u8, g: u8, b: u8, a: u8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Outline of `path` as a fillable path, `width` px wide.
pub(crate) fn stroke_outline(path: &BezPath, width: f64) -> vello_cpu::kurbo::BezPath {
    let stroked = kurbo::stroke(
        path.elements().iter().copied(),
        &kurbo::Stroke::new(width),
        &kurbo::StrokeOpts::default(),
        0.25,
    );
    bezpath_to_cpu(&stroked)
}

pub(crate) fn rounded_rect_path(r: Rect, radius: f64) -> vello_cpu::kurbo::BezPath {
    use kurbo::Shape as _;
    bezpath_to_cpu(&kurbo::RoundedRect::from_rect(r, radius).to_path(0.1))
}

pub(crate) fn size_u16(width: u32, height: u32) -> ReelResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::render("pixmap height exceeds u16"))?;
    Ok((w, h))
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let (w, h) = size_u16(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ReelError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

pub(crate) fn image_from_pixmap(pixmap: Arc<vello_cpu::Pixmap>) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(pixmap),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

pub(crate) fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(image_from_pixmap(Arc::new(pixmap)))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
