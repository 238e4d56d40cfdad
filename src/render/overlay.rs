//! Text and full-screen overlays drawn above the puzzle: the narrative panel, the finale
//! slideshow and the outro card.

use crate::assets::image::SourceImage;
use crate::assets::text::{TextBlock, TextCache};
use crate::foundation::core::{Affine, Canvas, Rect};
use crate::foundation::error::ReelResult;
use crate::foundation::math::clamp01;
use crate::render::paint::{affine_to_cpu, rect_to_cpu, rgba, rounded_rect_path};
use crate::render::surface::Snapshot;

/// Share of each slide spent crossfading into the next one.
const CROSSFADE: f64 = 0.2;
/// Ken Burns zoom reached at the end of a slide.
const KEN_BURNS_ZOOM: f64 = 0.08;

fn draw_glyphs(ctx: &mut vello_cpu::RenderContext, block: &TextBlock, transform: Affine) {
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    for line in block.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(rgba(brush.r, brush.g, brush.b, brush.a));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&block.font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

/// Opacity ramp at both ends of a `[lo, hi)` progress window.
pub(crate) fn window_fade(progress: f64, window: [f64; 2]) -> f32 {
    let [lo, hi] = window;
    let edge = ((hi - lo) * 0.15).max(1e-6);
    let a = clamp01((progress - lo) / edge).min(clamp01((hi - progress) / edge));
    a as f32
}

/// Rounded translucent panel with wrapped narrative text, anchored in the lower third.
pub(crate) fn draw_narrative(
    ctx: &mut vello_cpu::RenderContext,
    view: Affine,
    canvas: Canvas,
    text: &str,
    opacity: f32,
    cache: &mut TextCache,
) -> ReelResult<()> {
    if text.trim().is_empty() || opacity <= 0.0 {
        return Ok(());
    }
    let size_px = (canvas.w() * 0.045) as f32;
    let max_width = (canvas.w() * 0.78) as f32;
    let Some(block) = cache.block(text, size_px, max_width, true)? else {
        return Ok(());
    };
    let pad = canvas.w() * 0.035;
    let text_h = f64::from(block.layout.height());
    let left = (canvas.w() - f64::from(max_width)) * 0.5;
    let top = canvas.h() * 0.74 - text_h * 0.5;
    let right = left + f64::from(max_width);
    let panel = Rect::new(left - pad, top - pad, right + pad, top + text_h + pad);

    let layered = opacity < 1.0;
    if layered {
        ctx.push_opacity_layer(opacity);
    }
    ctx.set_transform(affine_to_cpu(view));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(rgba(0, 0, 0, 150));
    ctx.fill_path(&rounded_rect_path(panel, pad * 0.8));
    draw_glyphs(ctx, &block, view * Affine::translate((left, top)));
    if layered {
        ctx.pop_layer();
    }
    Ok(())
}

fn draw_snapshot(
    ctx: &mut vello_cpu::RenderContext,
    view: Affine,
    canvas: Canvas,
    snap: &Snapshot,
    index: usize,
    t: f64,
    opacity: f32,
) {
    if opacity <= 0.0 || snap.width == 0 || snap.height == 0 {
        return;
    }
    let zoom = 1.0 + KEN_BURNS_ZOOM * clamp01(t);
    let sign = if index % 2 == 0 { 1.0 } else { -1.0 };
    let drift = sign * canvas.w() * 0.02 * clamp01(t);
    let fit = Affine::scale_non_uniform(
        canvas.w() / f64::from(snap.width),
        canvas.h() / f64::from(snap.height),
    );
    let c = canvas.center();
    let camera = Affine::translate((c.x + drift, c.y))
        * Affine::scale(zoom)
        * Affine::translate((-c.x, -c.y));

    let layered = opacity < 1.0;
    if layered {
        ctx.push_opacity_layer(opacity);
    }
    ctx.set_transform(affine_to_cpu(view * camera * fit));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(snap.image.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(snap.width),
        f64::from(snap.height),
    ));
    if layered {
        ctx.pop_layer();
    }
}

/// Slide `index` at progress `t`, crossfading into the next slide near its end.
pub(crate) fn draw_slideshow(
    ctx: &mut vello_cpu::RenderContext,
    view: Affine,
    canvas: Canvas,
    snapshots: &[Snapshot],
    index: usize,
    t: f64,
) {
    let Some(current) = snapshots.get(index) else {
        return;
    };
    ctx.set_transform(affine_to_cpu(view));
    ctx.set_paint(rgba(0, 0, 0, 255));
    ctx.fill_rect(&rect_to_cpu(canvas.rect()));
    draw_snapshot(ctx, view, canvas, current, index, t, 1.0);

    let fade_start = 1.0 - CROSSFADE;
    if t > fade_start {
        if let Some(next) = snapshots.get(index + 1) {
            let a = ((t - fade_start) / CROSSFADE) as f32;
            draw_snapshot(ctx, view, canvas, next, index + 1, 0.0, a.clamp(0.0, 1.0));
        }
    }
}

/// Closing card: darkened backdrop, logo, optional call-to-action line.
pub(crate) fn draw_outro(
    ctx: &mut vello_cpu::RenderContext,
    view: Affine,
    canvas: Canvas,
    logo: Option<&SourceImage>,
    call_to_action: Option<&str>,
    t: f64,
    cache: &mut TextCache,
) -> ReelResult<()> {
    let fade_in = clamp01(t / 0.15) as f32;
    if fade_in <= 0.0 {
        return Ok(());
    }
    ctx.push_opacity_layer(fade_in);
    ctx.set_transform(affine_to_cpu(view));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(rgba(6, 6, 12, 235));
    ctx.fill_rect(&rect_to_cpu(canvas.rect()));

    if let Some((img, paint)) = logo.and_then(|l| l.paint().map(|p| (l, p))) {
        let (iw, ih) = (f64::from(img.width()), f64::from(img.height()));
        let box_w = canvas.w() * 0.45;
        let box_h = canvas.h() * 0.25;
        let s = (box_w / iw).min(box_h / ih);
        let x = (canvas.w() - iw * s) * 0.5;
        let y = canvas.h() * 0.40 - ih * s * 0.5;
        ctx.set_transform(affine_to_cpu(
            view * Affine::translate((x, y)) * Affine::scale(s),
        ));
        ctx.set_paint(paint.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
    }

    if let Some(cta) = call_to_action.filter(|c| !c.trim().is_empty()) {
        let max_width = (canvas.w() * 0.8) as f32;
        if let Some(block) = cache.block(cta, (canvas.w() * 0.06) as f32, max_width, true)? {
            let left = (canvas.w() - f64::from(max_width)) * 0.5;
            let top = canvas.h() * 0.62;
            draw_glyphs(ctx, &block, view * Affine::translate((left, top)));
        }
    }
    ctx.pop_layer();
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
