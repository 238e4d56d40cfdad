use crate::assets::image::SourceImage;
use crate::config::chapter::{Background, ChapterParams};
use crate::config::engine::EngineConfig;
use crate::finale::{FinalePhase, FinalePlan, finale_phase};
use crate::foundation::core::{Affine, Canvas, Rect};
use crate::foundation::error::ReelResult;
use crate::grid::camera::{CameraShot, GridLayout, GridSchedule, PANELS};
use crate::render::background::draw_background;
use crate::render::compositor::{
    FrameInput, advance_completion, draw_image_cover, draw_puzzle, progress_percent, render_frame,
};
use crate::render::overlay::{draw_outro, draw_slideshow};
use crate::render::paint::{affine_to_cpu, rgba, rounded_rect_path, stroke_outline};
use crate::render::{RenderCaches, Snapshot, Surface};
use crate::session::observer::{AudioCue, SessionObserver};
use crate::tessellation::generator::{JobStep, TessellationJob};
use crate::tessellation::piece::PieceSet;

/// Future panels show the image this much stronger than the in-puzzle ghost.
const FUTURE_GHOST_BOOST: f32 = 6.0;

struct Panel {
    image: SourceImage,
    params: ChapterParams,
    job: Option<TessellationJob>,
    pieces: Option<PieceSet>,
    last_snap_ms: f64,
    done: bool,
}

/// Why a grid cannot run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridStatus {
    /// Waiting for [`GridSession::load`].
    Empty,
    /// Exactly nine chapters are needed.
    WrongChapterCount { got: usize },
    Running,
    Finished,
}

/// Nine chapters played one after another in a 3×3 layout, followed by a slideshow finale.
pub struct GridSession {
    cfg: EngineConfig,
    screen: Canvas,
    layout: GridLayout,
    caches: RenderCaches,
    surface: Surface,
    scratch: Option<Surface>,
    panels: Vec<Panel>,
    schedule: GridSchedule,
    plan: FinalePlan,
    status: GridStatus,
    background: Background,
    logo: Option<SourceImage>,
    call_to_action: Option<String>,
    clock_origin: Option<f64>,
    elapsed_ms: f64,
    announced: usize,
    snapshots: Vec<Snapshot>,
    panel_draws: [u64; PANELS],
}

impl std::fmt::Debug for GridSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSession")
            .field("status", &self.status)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("announced", &self.announced)
            .finish()
    }
}

impl GridSession {
    /// Each panel uses `cfg.canvas`; the screen shows the whole grid or one panel at a time.
    pub fn new(cfg: EngineConfig, font: Option<Vec<u8>>) -> ReelResult<Self> {
        cfg.validate()?;
        let screen = cfg.canvas;
        let timings = cfg.finale;
        Ok(Self {
            layout: GridLayout::new(screen),
            caches: RenderCaches::new(font),
            surface: Surface::for_canvas(screen, cfg.output_scale)?,
            scratch: None,
            panels: Vec::new(),
            schedule: GridSchedule::new(&[], cfg.grid),
            plan: grid_plan(&cfg, 0),
            status: GridStatus::Empty,
            background: Background::Midnight,
            logo: None,
            call_to_action: None,
            clock_origin: None,
            elapsed_ms: 0.0,
            announced: 0,
            snapshots: Vec::with_capacity(timings.max_slides),
            panel_draws: [0; PANELS],
            screen,
            cfg,
        })
    }

    /// Queue the nine chapters. Any other count leaves the session in its not-ready state and
    /// returns false.
    #[tracing::instrument(skip(self, chapters), fields(n = chapters.len()))]
    pub fn load(&mut self, chapters: Vec<(SourceImage, ChapterParams)>) -> ReelResult<bool> {
        for (_, params) in &chapters {
            params.validate()?;
        }
        for mut panel in self.panels.drain(..) {
            if let Some(set) = panel.pieces.as_mut() {
                self.caches.retire(set);
            }
        }
        self.caches.text.clear();
        self.snapshots.clear();
        self.clock_origin = None;
        self.elapsed_ms = 0.0;
        self.announced = 0;
        self.panel_draws = [0; PANELS];

        if chapters.len() != PANELS {
            tracing::warn!(got = chapters.len(), "grid needs exactly nine chapters");
            self.status = GridStatus::WrongChapterCount {
                got: chapters.len(),
            };
            self.schedule = GridSchedule::new(&[], self.cfg.grid);
            return Ok(false);
        }

        let durations: Vec<f64> = chapters.iter().map(|(_, p)| p.total_ms()).collect();
        self.schedule = GridSchedule::new(&durations, self.cfg.grid);
        self.plan = grid_plan(&self.cfg, PANELS);
        self.background = chapters[0].1.background;
        self.logo = chapters.iter().rev().find_map(|(_, p)| p.logo.clone());
        self.call_to_action = chapters
            .iter()
            .rev()
            .find_map(|(_, p)| p.call_to_action.clone());
        self.panels = chapters
            .into_iter()
            .map(|(image, params)| Panel {
                job: Some(TessellationJob::new(
                    image.clone(),
                    &params,
                    &self.cfg,
                    self.cfg.canvas,
                )),
                image,
                params,
                pieces: None,
                last_snap_ms: f64::NEG_INFINITY,
                done: false,
            })
            .collect();
        self.status = GridStatus::Running;
        tracing::info!(finale_at_ms = self.schedule.finale_start_ms(), "grid loaded");
        Ok(true)
    }

    pub fn status(&self) -> GridStatus {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, GridStatus::Running | GridStatus::Finished)
    }

    pub fn is_finished(&self) -> bool {
        self.status == GridStatus::Finished
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn schedule(&self) -> &GridSchedule {
        &self.schedule
    }

    pub fn camera_shot(&self) -> CameraShot {
        self.schedule.shot(self.elapsed_ms)
    }

    /// Panel whose puzzle is assembling, if any.
    pub fn active_panel(&self) -> Option<usize> {
        self.panels.iter().position(|p| !p.done).filter(|&k| k < self.announced)
    }

    /// How often each panel has been drawn by the compositor or as an image.
    pub fn panel_draw_counts(&self) -> [u64; PANELS] {
        self.panel_draws
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn finale_phase(&self) -> FinalePhase {
        if !self.is_ready() {
            return FinalePhase::Idle;
        }
        finale_phase(self.elapsed_ms - self.schedule.finale_start_ms(), &self.plan)
    }

    /// Pump generation, advance the grid clock and fire callbacks.
    pub fn tick(&mut self, now_ms: f64, observer: &mut dyn SessionObserver) -> ReelResult<()> {
        if self.status != GridStatus::Running {
            return Ok(());
        }
        if let Some(panel) = self.panels.iter_mut().find(|p| p.pieces.is_none()) {
            if let Some(job) = panel.job.as_mut() {
                if let JobStep::Done(set) = job.step(&mut self.caches)? {
                    tracing::debug!(pieces = set.len(), "grid panel ready");
                    panel.job = None;
                    panel.pieces = Some(set);
                }
            }
        }
        if self.clock_origin.is_none() {
            if self.panels.first().is_some_and(|p| p.pieces.is_some()) {
                self.clock_origin = Some(now_ms);
            } else {
                return Ok(());
            }
        }
        let origin = self.clock_origin.unwrap_or(now_ms);
        self.elapsed_ms = (now_ms - origin).max(0.0);

        while self.announced < PANELS && self.elapsed_ms >= self.schedule.start_ms(self.announced) {
            self.announced += 1;
            tracing::info!(chapter = self.announced, "grid chapter change");
            observer.on_chapter_change(self.announced);
            observer.on_audio_cue(AudioCue::Move);
        }

        let mut captures = Vec::new();
        for k in 0..self.announced {
            let local = self.elapsed_ms - self.schedule.start_ms(k);
            let panel = &mut self.panels[k];
            if panel.done {
                continue;
            }
            let total = panel.params.total_ms();
            if let Some(set) = panel.pieces.as_mut() {
                let landed = advance_completion(set, local, total, &self.cfg);
                if landed > 0 && local - panel.last_snap_ms >= self.cfg.snap_cue_interval_ms {
                    panel.last_snap_ms = local;
                    observer.on_audio_cue(AudioCue::Snap);
                }
            }
            // Panels still generating when their slot ends are shown assembled anyway.
            if local >= total {
                panel.done = true;
                captures.push(k);
            }
        }
        for k in captures {
            self.capture_panel(k)?;
        }
        observer.on_progress(self.progress());

        if self.elapsed_ms >= self.schedule.finale_start_ms() && self.finale_phase().is_done() {
            self.status = GridStatus::Finished;
            tracing::info!("grid finished");
            observer.on_finished();
        }
        Ok(())
    }

    /// Mean panel progress in percent; completed panels count fully.
    pub fn progress(&self) -> f64 {
        if self.panels.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .panels
            .iter()
            .map(|p| {
                if p.done {
                    100.0
                } else {
                    p.pieces.as_ref().map_or(0.0, progress_percent)
                }
            })
            .sum();
        sum / self.panels.len() as f64
    }

    /// Render panel `k` assembled on its own and keep it for the slideshow.
    fn capture_panel(&mut self, k: usize) -> ReelResult<()> {
        let mut scratch = match self.scratch.take() {
            Some(s) => s,
            None => Surface::for_canvas(self.cfg.canvas, self.cfg.output_scale)?,
        };
        let panel = &mut self.panels[k];
        let total = panel.params.total_ms();
        match panel.pieces.as_mut().filter(|set| !set.is_empty()) {
            Some(set) => {
                let mut input = FrameInput::new(set, total, total);
                input.image = Some(&panel.image);
                input.background = Some(panel.params.background);
                render_frame(&mut scratch, input, &mut self.caches, &self.cfg)?;
            }
            None => {
                let view = scratch.view();
                let (canvas, bg, image) = (self.cfg.canvas, panel.params.background, &panel.image);
                let caches = &mut self.caches;
                scratch.draw(|ctx| {
                    draw_background(ctx, view, canvas, bg, Some(image), &mut caches.backgrounds)?;
                    draw_image_cover(ctx, view, canvas, image, 1.0);
                    Ok(())
                })?;
            }
        }
        self.snapshots.push(scratch.snapshot());
        self.scratch = Some(scratch);
        tracing::debug!(panel = k, "grid panel captured");
        Ok(())
    }

    /// Draw the current frame.
    pub fn render(&mut self) -> ReelResult<&Surface> {
        let view = self.surface.view();
        let screen = self.screen;
        let Self {
            cfg,
            layout,
            caches,
            surface,
            panels,
            schedule,
            plan,
            status,
            background,
            logo,
            call_to_action,
            elapsed_ms,
            announced,
            snapshots,
            panel_draws,
            ..
        } = self;

        surface.draw(|ctx| {
            let first_image = panels.first().map(|p| &p.image);
            draw_background(ctx, view, screen, *background, first_image, &mut caches.backgrounds)?;

            if !matches!(status, GridStatus::Running | GridStatus::Finished) {
                draw_not_ready(ctx, view, layout, screen);
                return Ok(());
            }

            let shot = schedule.shot(*elapsed_ms);
            let camera = view * layout.camera(shot, screen).affine(screen);
            let shadows = matches!(shot, CameraShot::Focus { .. });
            for (k, panel) in panels.iter_mut().enumerate().take(PANELS) {
                let panel_view = camera * Affine::translate(layout.panel_origin(k).to_vec2());
                draw_panel_frame(ctx, panel_view, layout.panel);
                panel_draws[k] += 1;
                if panel.done {
                    draw_image_cover(ctx, panel_view, layout.panel, &panel.image, 1.0);
                    continue;
                }
                let Some(set) = panel.pieces.as_mut().filter(|_| k < *announced) else {
                    let alpha = (cfg.ghost_alpha * FUTURE_GHOST_BOOST).min(1.0);
                    draw_image_cover(ctx, panel_view, layout.panel, &panel.image, alpha);
                    continue;
                };
                let mut input = FrameInput::new(
                    set,
                    *elapsed_ms - schedule.start_ms(k),
                    panel.params.total_ms(),
                );
                input.image = Some(&panel.image);
                input.movement = panel.params.movement;
                input.shadows = shadows;
                draw_puzzle(ctx, panel_view, input, caches, cfg)?;
            }

            match finale_phase(*elapsed_ms - schedule.finale_start_ms(), plan) {
                FinalePhase::Slideshow { index, t } => {
                    draw_slideshow(ctx, view, screen, snapshots, index, t);
                }
                FinalePhase::Outro { t } => {
                    let cta = call_to_action.as_deref();
                    draw_outro(ctx, view, screen, logo.as_ref(), cta, t, &mut caches.text)?;
                }
                FinalePhase::Done if plan.outro_ms > 0.0 => {
                    let cta = call_to_action.as_deref();
                    draw_outro(ctx, view, screen, logo.as_ref(), cta, 1.0, &mut caches.text)?;
                }
                _ => {}
            }
            Ok(())
        })?;
        Ok(&self.surface)
    }
}

/// Grid finale: overview hold, then the panel slideshow and the outro. No wave or collapse.
fn grid_plan(cfg: &EngineConfig, snapshots: usize) -> FinalePlan {
    let base = FinalePlan::new(&cfg.finale, true, snapshots);
    FinalePlan {
        pause_ms: cfg.grid.overview_hold_ms,
        wave_ms: 0.0,
        collapse_delay_ms: 0.0,
        settle_ms: 0.0,
        ..base
    }
}

fn draw_panel_frame(ctx: &mut vello_cpu::RenderContext, view: Affine, panel: Canvas) {
    let r = panel.rect();
    ctx.set_transform(affine_to_cpu(view));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(rgba(255, 255, 255, 14));
    ctx.fill_path(&rounded_rect_path(r, panel.w() * 0.02));
}

/// Dim placeholders with a warning outline for grids that cannot run.
fn draw_not_ready(
    ctx: &mut vello_cpu::RenderContext,
    view: Affine,
    layout: &GridLayout,
    screen: Canvas,
) {
    let camera = view * layout.overview(screen).affine(screen);
    for k in 0..PANELS {
        let panel_view = camera * Affine::translate(layout.panel_origin(k).to_vec2());
        draw_panel_frame(ctx, panel_view, layout.panel);
        let mut outline = crate::foundation::core::BezPath::new();
        let r: Rect = layout.panel.rect();
        outline.move_to((r.x0, r.y0));
        outline.line_to((r.x1, r.y0));
        outline.line_to((r.x1, r.y1));
        outline.line_to((r.x0, r.y1));
        outline.close_path();
        ctx.set_transform(affine_to_cpu(panel_view));
        ctx.set_paint(rgba(220, 80, 60, 160));
        ctx.fill_path(&stroke_outline(&outline, layout.panel.w() * 0.015));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/session.rs"]
mod tests;
