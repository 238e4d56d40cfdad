//! Per-frame drawing of one puzzle: classification of every piece, then layered drawing.
//!
//! Nothing here is cached across frames except the z-order sort, which only depends on the
//! piece set identity.

use crate::animation::kinetic::{PieceTransform, transform, wave_offset};
use crate::assets::image::SourceImage;
use crate::assets::text::active_third;
use crate::config::chapter::{Background, Movement};
use crate::config::engine::EngineConfig;
use crate::finale::FinalePhase;
use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::foundation::error::ReelResult;
use crate::foundation::math::clamp01;
use crate::physics::PhysicsPoses;
use crate::render::RenderCaches;
use crate::render::background::draw_background;
use crate::render::overlay::{draw_narrative, draw_outro, draw_slideshow, window_fade};
use crate::render::paint::{affine_to_cpu, bezpath_to_cpu, image_from_pixmap, rect_to_cpu, rgba};
use crate::render::surface::{Snapshot, Surface};
use crate::tessellation::generator::diagonal;
use crate::tessellation::piece::{Piece, PieceSet, PieceSetId};

/// `local_t` at or above which a piece counts as placed.
pub const COMPLETE_AT: f64 = 0.9999;

const SHADOW_OFFSET: Vec2 = Vec2::new(6.0, 12.0);
const TRAIL: [(f64, f32); 2] = [(0.05, 0.22), (0.10, 0.10)];

/// Where a piece is in its own flight at a given frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PieceStage {
    /// Not launched yet.
    Hidden,
    InFlight(f64),
    Completed,
}

/// Stage of `piece` in a set of `n` pieces at `elapsed_ms` into a `total_ms` assembly.
pub fn stage(
    piece: &Piece,
    n: usize,
    elapsed_ms: f64,
    total_ms: f64,
    flight_ms: f64,
) -> PieceStage {
    let n = n.max(1) as f64;
    let delay = piece.order as f64 / n * (total_ms - flight_ms).max(0.0);
    let t = clamp01((elapsed_ms - delay) / flight_ms.max(1.0));
    if t >= COMPLETE_AT {
        PieceStage::Completed
    } else if t > 0.0 {
        PieceStage::InFlight(t)
    } else {
        PieceStage::Hidden
    }
}

/// Mark every piece that has landed by `elapsed_ms`. Returns how many landed for the first time.
pub fn advance_completion(
    set: &mut PieceSet,
    elapsed_ms: f64,
    total_ms: f64,
    cfg: &EngineConfig,
) -> usize {
    let flight = cfg.flight_ms(total_ms);
    let n = set.len();
    let landed: Vec<usize> = set
        .pieces()
        .iter()
        .enumerate()
        .filter(|(_, p)| stage(p, n, elapsed_ms, total_ms, flight) == PieceStage::Completed)
        .map(|(i, _)| i)
        .collect();
    landed.into_iter().filter(|&i| set.mark_completed(i)).count()
}

/// Completed share in percent; 0 for an empty set.
pub fn progress_percent(set: &PieceSet) -> f64 {
    if set.is_empty() {
        return 0.0;
    }
    set.completed_count() as f64 / set.len() as f64 * 100.0
}

/// Piece indices sorted by z, remembered for the last piece set seen.
#[derive(Debug, Default)]
pub struct DrawOrderCache {
    set: Option<PieceSetId>,
    order: Vec<usize>,
    rebuilds: u64,
}

impl DrawOrderCache {
    pub fn order(&mut self, set: &PieceSet) -> &[usize] {
        if self.set != Some(set.id()) {
            let mut order: Vec<usize> = (0..set.len()).collect();
            let pieces = set.pieces();
            order.sort_by(|&a, &b| pieces[a].z.total_cmp(&pieces[b].z).then(a.cmp(&b)));
            self.order = order;
            self.set = Some(set.id());
            self.rebuilds = self.rebuilds.saturating_add(1);
        }
        &self.order
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

/// Everything the compositor needs to draw one frame of one puzzle.
pub struct FrameInput<'a> {
    pub pieces: &'a mut PieceSet,
    pub image: Option<&'a SourceImage>,
    pub elapsed_ms: f64,
    pub total_ms: f64,
    pub movement: Movement,
    /// `None` leaves whatever is underneath (grid panels).
    pub background: Option<Background>,
    /// Pieces driven by rigid bodies this frame.
    pub poses: Option<&'a PhysicsPoses>,
    pub narrative: Option<&'a [String; 3]>,
    pub logo: Option<&'a SourceImage>,
    pub call_to_action: Option<&'a str>,
    pub snapshots: &'a [Snapshot],
    pub finale: FinalePhase,
    /// False once a transition has carried the pieces off screen.
    pub pieces_visible: bool,
    pub shadows: bool,
}

impl<'a> FrameInput<'a> {
    pub fn new(pieces: &'a mut PieceSet, elapsed_ms: f64, total_ms: f64) -> Self {
        Self {
            pieces,
            image: None,
            elapsed_ms,
            total_ms,
            movement: Movement::Standard,
            background: None,
            poses: None,
            narrative: None,
            logo: None,
            call_to_action: None,
            snapshots: &[],
            finale: FinalePhase::Idle,
            pieces_visible: true,
            shadows: true,
        }
    }
}

/// Draw one frame into `surface` and return the assembly progress in percent.
pub fn render_frame(
    surface: &mut Surface,
    input: FrameInput<'_>,
    caches: &mut RenderCaches,
    cfg: &EngineConfig,
) -> ReelResult<f64> {
    let view = surface.view();
    let mut progress = 0.0;
    surface.draw(|ctx| {
        progress = draw_puzzle(ctx, view, input, caches, cfg)?;
        Ok(())
    })?;
    Ok(progress)
}

/// Faint full-image preview of the assembled result.
pub(crate) fn draw_image_cover(
    ctx: &mut vello_cpu::RenderContext,
    view: Affine,
    canvas: Canvas,
    image: &SourceImage,
    opacity: f32,
) {
    let (Some(paint), Some(fit)) = (image.paint(), canvas.cover_fit(image.width(), image.height()))
    else {
        return;
    };
    if opacity <= 0.0 {
        return;
    }
    let layered = opacity < 1.0;
    if layered {
        ctx.push_opacity_layer(opacity);
    }
    ctx.set_transform(affine_to_cpu(view));
    ctx.set_paint_transform(affine_to_cpu(fit.affine()));
    ctx.set_paint(paint.clone());
    ctx.fill_rect(&rect_to_cpu(canvas.rect()));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    if layered {
        ctx.pop_layer();
    }
}

fn piece_frame(piece: &Piece, tr: &PieceTransform) -> Affine {
    Affine::translate((tr.x, tr.y))
        * Affine::rotate(tr.rotation)
        * Affine::scale(tr.scale)
        * Affine::translate((-piece.width * 0.5, -piece.height * 0.5))
}

fn draw_piece(
    ctx: &mut vello_cpu::RenderContext,
    view: Affine,
    piece: &Piece,
    bitmap_scale: f64,
    frame: Affine,
    opacity: f32,
) {
    let Some(bitmap) = piece.bitmap.as_ref() else {
        return;
    };
    if opacity <= 0.0 {
        return;
    }
    let (bw, bh) = (f64::from(bitmap.width()), f64::from(bitmap.height()));
    let to_bitmap = Affine::translate((-piece.padding, -piece.padding))
        * Affine::scale(1.0 / bitmap_scale.max(1e-6));
    let layered = opacity < 1.0;
    if layered {
        ctx.push_opacity_layer(opacity);
    }
    ctx.set_transform(affine_to_cpu(view * frame * to_bitmap));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(image_from_pixmap(bitmap.clone()));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, bw, bh));
    if layered {
        ctx.pop_layer();
    }
}

fn draw_shadow(ctx: &mut vello_cpu::RenderContext, view: Affine, piece: &Piece, frame: Affine) {
    ctx.set_transform(affine_to_cpu(view * Affine::translate(SHADOW_OFFSET) * frame));
    ctx.set_paint(rgba(0, 0, 0, 70));
    ctx.fill_path(&bezpath_to_cpu(&piece.outline));
}

/// Completed-piece offset and opacity for the current finale phase.
fn finale_style(
    piece: &Piece,
    canvas: Canvas,
    finale: FinalePhase,
    cfg: &EngineConfig,
) -> (Vec2, f32) {
    match finale {
        FinalePhase::Wave { since_ms } => (
            wave_offset(
                diagonal(piece, canvas),
                since_ms,
                cfg.finale.wave_ms,
                cfg.piece_wave_ms,
                cfg.wave_amplitude_px,
            ),
            1.0,
        ),
        FinalePhase::Settle { since_ms } => {
            let a = 1.0 - clamp01(since_ms / cfg.fade_ms.max(1.0));
            (Vec2::ZERO, a as f32)
        }
        FinalePhase::Slideshow { .. } | FinalePhase::Outro { .. } | FinalePhase::Done => {
            (Vec2::ZERO, 0.0)
        }
        FinalePhase::Idle | FinalePhase::Pause { .. } => (Vec2::ZERO, 1.0),
    }
}

/// Draw one puzzle with `view` mapping its canvas to device pixels.
pub(crate) fn draw_puzzle(
    ctx: &mut vello_cpu::RenderContext,
    view: Affine,
    input: FrameInput<'_>,
    caches: &mut RenderCaches,
    cfg: &EngineConfig,
) -> ReelResult<f64> {
    let FrameInput {
        pieces: set,
        image,
        elapsed_ms,
        total_ms,
        movement,
        background,
        poses,
        narrative,
        logo,
        call_to_action,
        snapshots,
        finale,
        pieces_visible,
        shadows,
    } = input;
    let canvas = set.canvas();

    if let Some(bg) = background {
        draw_background(ctx, view, canvas, bg, image, &mut caches.backgrounds)?;
    }

    let flight = cfg.flight_ms(total_ms);
    let n = set.len();
    let order = caches.draw_order.order(set).to_vec();

    let mut completed = Vec::new();
    let mut in_flight = Vec::new();
    let mut physical = Vec::new();
    for &i in &order {
        let piece = &set.pieces()[i];
        if let Some(pose) = poses.and_then(|p| p.get(piece.id)) {
            physical.push((i, pose));
            continue;
        }
        match stage(piece, n, elapsed_ms, total_ms, flight) {
            PieceStage::Completed => {
                set.mark_completed(i);
                completed.push(i);
            }
            _ if set.is_completed(i) => completed.push(i),
            PieceStage::InFlight(t) => in_flight.push((i, t)),
            PieceStage::Hidden => {}
        }
    }
    let progress = progress_percent(set);

    if pieces_visible {
        if let Some(img) = image.filter(|_| progress < 100.0) {
            draw_image_cover(ctx, view, canvas, img, cfg.ghost_alpha);
        }
        let scale = set.bitmap_scale();
        let pieces = set.pieces();

        for &i in &completed {
            let piece = &pieces[i];
            let (offset, opacity) = finale_style(piece, canvas, finale, cfg);
            let rest = PieceTransform::at_rest(piece.target_center() + offset);
            let frame = piece_frame(piece, &rest);
            draw_piece(ctx, view, piece, scale, frame, opacity);
        }

        for (k, &(i, t)) in in_flight.iter().take(cfg.max_in_flight_draws).enumerate() {
            let piece = &pieces[i];
            let tr = transform(piece, t, movement);
            let frame = piece_frame(piece, &tr);
            if k % cfg.trail_stride.max(1) == 0 {
                for (dt, alpha) in TRAIL {
                    if t - dt <= 0.0 {
                        continue;
                    }
                    let past = transform(piece, t - dt, movement);
                    draw_piece(ctx, view, piece, scale, piece_frame(piece, &past), alpha);
                }
            }
            if shadows {
                draw_shadow(ctx, view, piece, frame);
            }
            draw_piece(ctx, view, piece, scale, frame, 1.0);
        }

        for &(i, pose) in &physical {
            let piece = &pieces[i];
            let tr = PieceTransform {
                rotation: pose.angle,
                ..PieceTransform::at_rest(pose.position)
            };
            let frame = piece_frame(piece, &tr);
            draw_piece(ctx, view, piece, scale, frame, 1.0);
        }
    }

    if finale == FinalePhase::Idle {
        if let Some(thirds) = narrative {
            if let Some(k) = active_third(progress, &cfg.narrative_windows) {
                let fade = window_fade(progress, cfg.narrative_windows[k]);
                draw_narrative(ctx, view, canvas, &thirds[k], fade, &mut caches.text)?;
            }
        }
    }

    match finale {
        FinalePhase::Slideshow { index, t } => {
            draw_slideshow(ctx, view, canvas, snapshots, index, t);
        }
        FinalePhase::Outro { t } => {
            draw_outro(ctx, view, canvas, logo, call_to_action, t, &mut caches.text)?;
        }
        _ => {}
    }

    Ok(progress)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
