use crate::foundation::core::Canvas;
use crate::foundation::math::Rng64;
use crate::physics::world::PhysicsWorld;
use crate::tessellation::piece::Piece;
use crate::transitions::effects::{EffectState, PieceBody, TransitionEffect};

/// Observable state of a [`TransitionEngine`] after a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionStatus {
    Idle,
    /// Holding before the effect is applied.
    Waiting { effect: TransitionEffect },
    Running {
        effect: TransitionEffect,
        since_apply_ms: f64,
    },
    /// The effect ran its full duration; the world has been cleared.
    Finished { effect: TransitionEffect },
}

#[derive(Debug)]
enum Phase {
    Idle,
    Waiting {
        effect: TransitionEffect,
        apply_at: f64,
        pieces: Vec<PieceBody>,
    },
    Running {
        effect: TransitionEffect,
        applied_at: f64,
        ends_at: f64,
        last_tick: f64,
        state: EffectState,
    },
    Finished {
        effect: TransitionEffect,
    },
}

/// Deadline-driven runner for one transition at a time.
///
/// All timing is relative to the `now_ms` values passed in; nothing is scheduled on the host.
#[derive(Debug)]
pub struct TransitionEngine {
    phase: Phase,
    canvas: Canvas,
    wait_ms: f64,
    rng: Rng64,
    warned_unavailable: bool,
}

impl TransitionEngine {
    pub fn new(canvas: Canvas, wait_ms: f64, seed: u64) -> Self {
        Self {
            phase: Phase::Idle,
            canvas,
            wait_ms: wait_ms.max(0.0),
            rng: Rng64::new(seed),
            warned_unavailable: false,
        }
    }

    /// Schedule a transition for `pieces`. Returns false (and does nothing) while one is active.
    ///
    /// `effect == None` picks one uniformly at random.
    pub fn start(
        &mut self,
        pieces: &[Piece],
        world: &mut dyn PhysicsWorld,
        effect: Option<TransitionEffect>,
        now_ms: f64,
    ) -> bool {
        if self.is_active() {
            tracing::debug!("transition already in progress; start ignored");
            return false;
        }
        let effect = effect.unwrap_or_else(|| TransitionEffect::random(&mut self.rng));
        world.clear();
        tracing::debug!(?effect, wait_ms = self.wait_ms, "transition scheduled");
        self.phase = Phase::Waiting {
            effect,
            apply_at: now_ms + self.wait_ms,
            pieces: pieces.iter().map(PieceBody::of).collect(),
        };
        true
    }

    /// Advance deadlines, apply or step the effect, and step the world.
    pub fn tick(&mut self, now_ms: f64, world: &mut dyn PhysicsWorld) -> TransitionStatus {
        if let Phase::Waiting {
            effect, apply_at, ..
        } = &self.phase
            && now_ms >= *apply_at
        {
            let (effect, applied_at) = (*effect, *apply_at);
            let Phase::Waiting { pieces, .. } = std::mem::replace(&mut self.phase, Phase::Idle)
            else {
                return TransitionStatus::Idle;
            };
            if !world.is_available() && !self.warned_unavailable {
                tracing::warn!(?effect, "no physics backend; transition pieces stay static");
                self.warned_unavailable = true;
            }
            let state = effect.apply(&pieces, world, self.canvas, &mut self.rng);
            self.phase = Phase::Running {
                effect,
                applied_at,
                ends_at: applied_at + effect.duration_ms(),
                last_tick: applied_at,
                state,
            };
        }

        let canvas = self.canvas;
        let mut finished = None;
        let status = match &mut self.phase {
            Phase::Idle => TransitionStatus::Idle,
            Phase::Waiting { effect, .. } => TransitionStatus::Waiting { effect: *effect },
            Phase::Running {
                effect,
                applied_at,
                ends_at,
                last_tick,
                state,
            } => {
                let end = now_ms.min(*ends_at);
                let since = end - *applied_at;
                if effect.has_step() {
                    effect.step(world, state, since, canvas);
                }
                let dt = end - *last_tick;
                if dt > 0.0 {
                    world.step(dt);
                    *last_tick = end;
                }
                if now_ms >= *ends_at {
                    finished = Some(*effect);
                }
                TransitionStatus::Running {
                    effect: *effect,
                    since_apply_ms: since,
                }
            }
            Phase::Finished { effect } => TransitionStatus::Finished { effect: *effect },
        };

        match finished {
            Some(effect) => {
                world.clear();
                tracing::debug!(?effect, "transition finished");
                self.phase = Phase::Finished { effect };
                TransitionStatus::Finished { effect }
            }
            None => status,
        }
    }

    /// Drop pending deadlines and empty the world. Safe to call any number of times.
    pub fn cancel(&mut self, world: &mut dyn PhysicsWorld) {
        if !matches!(self.phase, Phase::Idle) {
            tracing::debug!("transition cancelled");
        }
        self.phase = Phase::Idle;
        world.clear();
    }

    /// Waiting or running.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Waiting { .. } | Phase::Running { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    /// Effect that is scheduled, running, or just finished.
    pub fn effect(&self) -> Option<TransitionEffect> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Waiting { effect, .. }
            | Phase::Running { effect, .. }
            | Phase::Finished { effect } => Some(*effect),
        }
    }

    /// True once the effect has taken the pieces over (applied, not yet finished).
    pub fn controls_pieces(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn wait_ms(&self) -> f64 {
        self.wait_ms
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/engine.rs"]
mod tests;
