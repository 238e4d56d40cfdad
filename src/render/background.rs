use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::image::SourceImage;
use crate::config::chapter::Background;
use crate::foundation::core::{Affine, Canvas, Point};
use crate::foundation::error::ReelResult;
use crate::foundation::math::{hash_u32, lerp};
use crate::render::paint::{affine_to_cpu, rgba_premul_to_image};

/// Baked backgrounds are this many times smaller than the canvas and upsampled when drawn.
const BAKE_DIVISOR: f64 = 8.0;
const BLUR_RADIUS: usize = 2;
const BLUR_PASSES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct BackgroundKey {
    background: Background,
    w: u32,
    h: u32,
    /// Address of the source pixels for image backgrounds, 0 otherwise.
    source: usize,
}

/// Low-resolution background paints, keyed by kind, bake size and source image.
#[derive(Default)]
pub struct BackgroundCache {
    images: HashMap<BackgroundKey, (vello_cpu::Image, u32, u32)>,
    built: u64,
}

impl BackgroundCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn built_count(&self) -> u64 {
        self.built
    }

    /// Drop baked image backgrounds; procedural ones stay.
    pub fn forget_images(&mut self) {
        self.images.retain(|k, _| k.source == 0);
    }

    fn paint(
        &mut self,
        background: Background,
        canvas: Canvas,
        image: Option<&SourceImage>,
    ) -> ReelResult<(vello_cpu::Image, u32, u32)> {
        let bw = (canvas.w() / BAKE_DIVISOR).ceil().max(1.0) as u32;
        let bh = (canvas.h() / BAKE_DIVISOR).ceil().max(1.0) as u32;
        let source = match (background, image) {
            (Background::BlurredImage, Some(img)) if img.is_ready() => Some(img),
            _ => None,
        };
        let effective = match (background, source) {
            (Background::BlurredImage, None) => Background::Midnight,
            (b, _) => b,
        };
        let key = BackgroundKey {
            background: effective,
            w: bw,
            h: bh,
            source: source.map_or(0, |img| Arc::as_ptr(&img.prepared().rgba8_premul) as usize),
        };
        if let Some(hit) = self.images.get(&key) {
            return Ok(hit.clone());
        }
        let bytes = match source {
            Some(img) => blurred_cover(img, canvas, bw, bh),
            None => bake(effective, bw, bh),
        };
        let paint = rgba_premul_to_image(&bytes, bw, bh)?;
        self.images.insert(key, (paint.clone(), bw, bh));
        self.built = self.built.saturating_add(1);
        Ok((paint, bw, bh))
    }
}

/// Fill the canvas with `background`. `BlurredImage` without a ready image falls back to
/// `Midnight`.
pub(crate) fn draw_background(
    ctx: &mut vello_cpu::RenderContext,
    view: Affine,
    canvas: Canvas,
    background: Background,
    image: Option<&SourceImage>,
    cache: &mut BackgroundCache,
) -> ReelResult<()> {
    let (paint, bw, bh) = cache.paint(background, canvas, image)?;
    let stretch = Affine::scale_non_uniform(
        canvas.w() / f64::from(bw),
        canvas.h() / f64::from(bh),
    );
    ctx.set_transform(affine_to_cpu(view * stretch));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(bw),
        f64::from(bh),
    ));
    Ok(())
}

fn bake(background: Background, w: u32, h: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    let seed = background as u64;
    let (fw, fh) = (f64::from(w.max(1)), f64::from(h.max(1)));
    for y in 0..h {
        for x in 0..w {
            let u = (f64::from(x) + 0.5) / fw;
            let v = (f64::from(y) + 0.5) / fh;
            let noise = f64::from(hash_u32(seed, x, y) & 0xFF) / 255.0;
            let rgb = match background {
                Background::Midnight | Background::BlurredImage => {
                    let d = ((u - 0.5).powi(2) + (v - 0.45).powi(2)).sqrt();
                    let glow = (1.0 - d * 1.6).max(0.0);
                    [
                        lerp(4.0, 22.0, glow),
                        lerp(5.0, 26.0, glow),
                        lerp(14.0, 58.0, glow),
                    ]
                }
                Background::Gradient => {
                    let t = (u + v) * 0.5;
                    [lerp(36.0, 196.0, t), lerp(28.0, 74.0, t), lerp(92.0, 118.0, t)]
                }
                Background::WoodTable => {
                    let grain = ((v * 90.0 + noise * 3.0).sin() * 0.5 + 0.5) * 28.0;
                    [92.0 + grain, 58.0 + grain * 0.6, 32.0 + grain * 0.3]
                }
                Background::Felt => {
                    let shade = (noise - 0.5) * 14.0;
                    let d = ((u - 0.5).powi(2) + (v - 0.5).powi(2)).sqrt();
                    let vignette = 1.0 - d * 0.5;
                    [
                        (18.0 + shade) * vignette,
                        (84.0 + shade) * vignette,
                        (48.0 + shade) * vignette,
                    ]
                }
            };
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            bytes[idx] = rgb[0].round().clamp(0.0, 255.0) as u8;
            bytes[idx + 1] = rgb[1].round().clamp(0.0, 255.0) as u8;
            bytes[idx + 2] = rgb[2].round().clamp(0.0, 255.0) as u8;
            bytes[idx + 3] = 255;
        }
    }
    bytes
}

/// Cover-fit `image` into `w`×`h`, box-blur it and darken it so pieces stand out.
fn blurred_cover(image: &SourceImage, canvas: Canvas, w: u32, h: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    let src = image.prepared();
    let Some(fit) = canvas.cover_fit(src.width, src.height) else {
        return bake(Background::Midnight, w, h);
    };
    let sx = canvas.w() / f64::from(w);
    let sy = canvas.h() / f64::from(h);
    for y in 0..h {
        for x in 0..w {
            let p = fit.to_source(Point::new(
                (f64::from(x) + 0.5) * sx,
                (f64::from(y) + 0.5) * sy,
            ));
            let px = (p.x.max(0.0) as u32).min(src.width - 1) as usize;
            let py = (p.y.max(0.0) as u32).min(src.height - 1) as usize;
            let s = (py * src.width as usize + px) * 4;
            let d = ((y as usize) * (w as usize) + (x as usize)) * 4;
            if let Some(pixel) = src.rgba8_premul.get(s..s + 4) {
                bytes[d..d + 4].copy_from_slice(pixel);
            }
        }
    }
    for _ in 0..BLUR_PASSES {
        box_blur(&mut bytes, w as usize, h as usize, BLUR_RADIUS);
    }
    for px in bytes.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 140) / 255) as u8;
        }
        px[3] = 255;
    }
    bytes
}

fn box_blur(bytes: &mut [u8], w: usize, h: usize, r: usize) {
    let mut scratch = vec![0u8; bytes.len()];
    blur_axis(bytes, &mut scratch, w, h, r, true);
    blur_axis(&scratch, bytes, w, h, r, false);
}

fn blur_axis(src: &[u8], dst: &mut [u8], w: usize, h: usize, r: usize, horizontal: bool) {
    let (outer, inner) = if horizontal { (h, w) } else { (w, h) };
    for o in 0..outer {
        for i in 0..inner {
            let lo = i.saturating_sub(r);
            let hi = (i + r).min(inner - 1);
            let mut acc = [0u32; 4];
            for k in lo..=hi {
                let idx = (if horizontal { o * w + k } else { k * w + o }) * 4;
                for (a, v) in acc.iter_mut().zip(&src[idx..idx + 4]) {
                    *a += u32::from(*v);
                }
            }
            let n = (hi - lo + 1) as u32;
            let idx = (if horizontal { o * w + i } else { i * w + o }) * 4;
            for (c, a) in dst[idx..idx + 4].iter_mut().zip(acc) {
                *c = ((a + n / 2) / n) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
