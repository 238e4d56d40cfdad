use crate::assets::image::SourceImage;
use crate::assets::text::narrative_thirds;
use crate::config::chapter::{ChapterParams, TransitionMode};
use crate::config::engine::EngineConfig;
use crate::finale::{FinalePhase, FinalePlan, collapse, finale_phase};
use crate::foundation::error::ReelResult;
use crate::foundation::math::Rng64;
use crate::physics::PhysicsWorld;
use crate::render::background::draw_background;
use crate::render::compositor::{FrameInput, advance_completion, progress_percent, render_frame};
use crate::render::{RenderCaches, Snapshot, Surface};
use crate::session::observer::{AudioCue, SessionObserver};
use crate::tessellation::generator::{JobStep, TessellationJob};
use crate::tessellation::piece::PieceSet;
use crate::transitions::{TransitionEffect, TransitionEngine, TransitionStatus};

/// Identity of one [`ChapterSession::begin_chapter`] call.
///
/// Piece sets generated outside the session are only accepted with the ticket of the chapter
/// that is still current.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GenerationTicket(u64);

impl GenerationTicket {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Ending {
    Finale,
    /// `None` picks a random effect.
    Transition(Option<TransitionEffect>),
}

struct Chapter {
    ticket: GenerationTicket,
    params: ChapterParams,
    image: SourceImage,
    narrative: [String; 3],
    ending: Ending,
    job: Option<TessellationJob>,
    pieces: Option<PieceSet>,
    clock_origin: Option<f64>,
    last_now_ms: Option<f64>,
    elapsed_ms: f64,
    last_snap_ms: f64,
    plan: Option<FinalePlan>,
    rng: Rng64,
    moved: bool,
    waved: bool,
    collapsed: bool,
    transition_started: bool,
    finished: bool,
}

impl Chapter {
    fn finale_view(&self) -> FinalePhase {
        let (Ending::Finale, Some(plan)) = (self.ending, self.plan) else {
            return FinalePhase::Idle;
        };
        match finale_phase(self.elapsed_ms - self.params.total_ms(), &plan) {
            // Hold the closing card once the outro has played.
            FinalePhase::Done if plan.outro_ms > 0.0 => FinalePhase::Outro { t: 1.0 },
            phase => phase,
        }
    }
}

/// Per-frame driver for one chapter at a time.
///
/// The host calls [`tick`](Self::tick) and [`render`](Self::render) once per display refresh.
/// Generation, assembly, the finale or transition, and all callbacks happen inside `tick`.
pub struct ChapterSession {
    cfg: EngineConfig,
    caches: RenderCaches,
    world: Box<dyn PhysicsWorld>,
    transitions: TransitionEngine,
    surface: Surface,
    generation: u64,
    chapter: Option<Chapter>,
    snapshots: Vec<Snapshot>,
}

impl std::fmt::Debug for ChapterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChapterSession")
            .field("generation", &self.generation)
            .field("ready", &self.is_ready())
            .field("finished", &self.is_finished())
            .field("snapshots", &self.snapshots.len())
            .finish()
    }
}

impl ChapterSession {
    /// Session with its own caches, physics world and output surface.
    pub fn new(cfg: EngineConfig, font: Option<Vec<u8>>) -> ReelResult<Self> {
        cfg.validate()?;
        let canvas = cfg.canvas;
        Ok(Self {
            caches: RenderCaches::new(font),
            world: cfg.physics.create(canvas.rect()),
            transitions: TransitionEngine::new(canvas, cfg.transition_wait_ms, 0),
            surface: Surface::for_canvas(canvas, cfg.output_scale)?,
            generation: 0,
            chapter: None,
            snapshots: Vec::new(),
            cfg,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Tear down the current chapter and start generating pieces for `image`.
    #[tracing::instrument(
        skip(self, image, params),
        fields(shape = ?params.shape, n = params.piece_count)
    )]
    pub fn begin_chapter(
        &mut self,
        image: SourceImage,
        params: ChapterParams,
    ) -> ReelResult<GenerationTicket> {
        params.validate()?;
        self.transitions.cancel(self.world.as_mut());
        if let Some(mut old) = self.chapter.take() {
            if let Some(set) = old.pieces.as_mut() {
                self.caches.retire(set);
            }
        }
        self.caches.backgrounds.forget_images();
        self.caches.text.clear();

        self.generation += 1;
        let ticket = GenerationTicket(self.generation);
        let ending = if params.runs_finale() {
            Ending::Finale
        } else {
            match params.transition {
                TransitionMode::Pinned(effect) => Ending::Transition(Some(effect)),
                TransitionMode::Random | TransitionMode::Off => Ending::Transition(None),
            }
        };
        self.transitions = TransitionEngine::new(
            self.cfg.canvas,
            self.cfg.transition_wait_ms,
            params.seed ^ 0x7472_616e,
        );
        let job = TessellationJob::new(image.clone(), &params, &self.cfg, self.cfg.canvas);
        tracing::info!(generation = ticket.0, pieces = job.len(), ?ending, "chapter begins");
        self.chapter = Some(Chapter {
            ticket,
            narrative: narrative_thirds(&params.narrative),
            rng: Rng64::new(params.seed).fork(0xC011),
            params,
            image,
            ending,
            job: Some(job),
            pieces: None,
            clock_origin: None,
            last_now_ms: None,
            elapsed_ms: 0.0,
            last_snap_ms: f64::NEG_INFINITY,
            plan: None,
            moved: false,
            waved: false,
            collapsed: false,
            transition_started: false,
            finished: false,
        });
        Ok(ticket)
    }

    /// Install a piece set generated elsewhere. Returns false (and drops the set) when `ticket`
    /// is stale, the chapter already has its pieces, or the set is empty for an image that has
    /// no pixels.
    pub fn install_pieces(&mut self, ticket: GenerationTicket, mut set: PieceSet) -> bool {
        match self.chapter.as_mut() {
            Some(ch)
                if ch.ticket == ticket
                    && ch.pieces.is_none()
                    && (ch.image.is_ready() || !set.is_empty()) =>
            {
                ch.job = None;
                tracing::debug!(pieces = set.len(), "external piece set installed");
                ch.pieces = Some(set);
                true
            }
            _ => {
                tracing::debug!(ticket = ticket.0, "piece set rejected");
                self.caches.retire(&mut set);
                false
            }
        }
    }

    /// Advance the current chapter to `now_ms` (host clock, any origin).
    pub fn tick(&mut self, now_ms: f64, observer: &mut dyn SessionObserver) -> ReelResult<()> {
        let Some(ch) = self.chapter.as_mut() else {
            return Ok(());
        };
        if ch.finished {
            return Ok(());
        }
        if ch.pieces.is_none() {
            if let Some(job) = ch.job.as_mut() {
                if let JobStep::Done(set) = job.step(&mut self.caches)? {
                    ch.job = None;
                    if set.is_empty() && !ch.image.is_ready() {
                        tracing::warn!("image has no pixels; chapter stays not ready");
                    } else {
                        tracing::info!(pieces = set.len(), "chapter ready");
                        ch.pieces = Some(set);
                    }
                }
            }
            return Ok(());
        }

        let origin = *ch.clock_origin.get_or_insert(now_ms);
        let dt = ch.last_now_ms.map_or(0.0, |last| (now_ms - last).max(0.0));
        ch.last_now_ms = Some(now_ms);
        ch.elapsed_ms = (now_ms - origin).max(0.0);
        let total = ch.params.total_ms();

        if !ch.moved {
            ch.moved = true;
            observer.on_audio_cue(AudioCue::Move);
        }
        let Some(set) = ch.pieces.as_mut() else {
            return Ok(());
        };
        let landed = advance_completion(set, ch.elapsed_ms, total, &self.cfg);
        if landed > 0 && ch.elapsed_ms - ch.last_snap_ms >= self.cfg.snap_cue_interval_ms {
            ch.last_snap_ms = ch.elapsed_ms;
            observer.on_audio_cue(AudioCue::Snap);
        }
        observer.on_progress(progress_percent(set));

        if ch.elapsed_ms < total {
            return Ok(());
        }
        if ch.plan.is_none() {
            self.capture_snapshot()?;
        }

        let Some(ch) = self.chapter.as_mut() else {
            return Ok(());
        };
        let Some(set) = ch.pieces.as_ref() else {
            return Ok(());
        };
        let done = match ch.ending {
            Ending::Finale => {
                let Some(plan) = ch.plan else {
                    return Ok(());
                };
                let after = ch.elapsed_ms - total;
                let phase = finale_phase(after, &plan);
                if phase.after_wave_start() && !ch.waved {
                    ch.waved = true;
                    observer.on_audio_cue(AudioCue::Wave);
                }
                if after >= plan.collapse_at_ms() && !ch.collapsed {
                    ch.collapsed = true;
                    let bodies = collapse(
                        set.pieces(),
                        self.world.as_mut(),
                        self.cfg.canvas,
                        self.cfg.collapse_fraction,
                        &mut ch.rng,
                    );
                    if bodies > 0 {
                        observer.on_audio_cue(AudioCue::Destruct);
                    }
                } else if ch.collapsed && dt > 0.0 {
                    self.world.step(dt);
                }
                phase.is_done()
            }
            Ending::Transition(effect) => {
                if !ch.transition_started {
                    ch.transition_started = true;
                    self.transitions
                        .start(set.pieces(), self.world.as_mut(), effect, now_ms);
                }
                matches!(
                    self.transitions.tick(now_ms, self.world.as_mut()),
                    TransitionStatus::Finished { .. }
                )
            }
        };
        if done {
            ch.finished = true;
            tracing::info!(generation = ch.ticket.0, "chapter finished");
            observer.on_finished();
        }
        Ok(())
    }

    /// Freeze the assembled frame for the slideshow and resolve the finale plan.
    fn capture_snapshot(&mut self) -> ReelResult<()> {
        let has_pieces = self
            .chapter
            .as_ref()
            .and_then(|ch| ch.pieces.as_ref())
            .is_some_and(|set| !set.is_empty());
        if has_pieces {
            self.draw_frame()?;
            self.snapshots.push(self.surface.snapshot());
        }
        let slides = self.snapshots.len();
        let timings = self.cfg.finale;
        if let Some(ch) = self.chapter.as_mut() {
            ch.plan = Some(FinalePlan::new(&timings, ch.params.is_last, slides));
            tracing::debug!(snapshots = slides, "assembly complete");
        }
        Ok(())
    }

    fn draw_frame(&mut self) -> ReelResult<f64> {
        let Self {
            cfg,
            caches,
            world,
            transitions,
            surface,
            chapter,
            snapshots,
            ..
        } = self;
        let Some(ch) = chapter.as_mut() else {
            surface.draw(|_| Ok(()))?;
            return Ok(0.0);
        };
        let finale = ch.finale_view();
        let view = surface.view();
        let Some(set) = ch.pieces.as_mut() else {
            let (canvas, bg, image) = (cfg.canvas, ch.params.background, &ch.image);
            surface.draw(|ctx| {
                draw_background(ctx, view, canvas, bg, Some(image), &mut caches.backgrounds)
            })?;
            return Ok(0.0);
        };

        let poses = (world.body_count() > 0).then(|| world.poses());
        let slides = match ch.plan {
            Some(plan) => &snapshots[snapshots.len().saturating_sub(plan.slides)..],
            None => &[][..],
        };
        let is_last = ch.params.is_last;
        let mut input = FrameInput::new(set, ch.elapsed_ms, ch.params.total_ms());
        input.image = Some(&ch.image);
        input.movement = ch.params.movement;
        input.background = Some(ch.params.background);
        input.poses = poses.as_ref();
        input.narrative = Some(&ch.narrative);
        input.logo = ch.params.logo.as_ref().filter(|_| is_last);
        input.call_to_action = ch.params.call_to_action.as_deref().filter(|_| is_last);
        input.snapshots = slides;
        input.finale = finale;
        input.pieces_visible = !transitions.is_finished();
        render_frame(surface, input, caches, cfg)
    }

    /// Draw the current frame.
    pub fn render(&mut self) -> ReelResult<&Surface> {
        self.draw_frame()?;
        Ok(&self.surface)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn ticket(&self) -> Option<GenerationTicket> {
        self.chapter.as_ref().map(|ch| ch.ticket)
    }

    /// Pieces generated and installed. Stays false for an image without pixels.
    pub fn is_ready(&self) -> bool {
        self.chapter.as_ref().is_some_and(|ch| ch.pieces.is_some())
    }

    pub fn is_finished(&self) -> bool {
        self.chapter.as_ref().is_some_and(|ch| ch.finished)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.chapter.as_ref().map_or(0.0, |ch| ch.elapsed_ms)
    }

    pub fn progress(&self) -> f64 {
        self.pieces().map_or(0.0, progress_percent)
    }

    pub fn pieces(&self) -> Option<&PieceSet> {
        self.chapter.as_ref().and_then(|ch| ch.pieces.as_ref())
    }

    pub fn finale_phase(&self) -> FinalePhase {
        self.chapter
            .as_ref()
            .map_or(FinalePhase::Idle, |ch| ch.finale_view())
    }

    pub fn transition_effect(&self) -> Option<TransitionEffect> {
        self.transitions.effect()
    }

    /// Snapshots of every chapter assembled so far, oldest first.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn world(&self) -> &dyn PhysicsWorld {
        self.world.as_ref()
    }

    pub fn caches(&self) -> &RenderCaches {
        &self.caches
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/chapter.rs"]
mod tests;
