//! Registry of physics-driven departure effects.
//!
//! Every effect turns the assembled pieces into bodies in [`PhysicsWorld`] once (`apply`);
//! force-field effects also push bodies every frame (`step`) for as long as they run.

use std::f64::consts::{PI, TAU};

use crate::foundation::core::{Canvas, Point, Vec2};
use crate::foundation::math::Rng64;
use crate::physics::world::{BodyDesc, BodyHandle, BodyKind, CollisionFilter, PhysicsWorld};
use crate::tessellation::piece::Piece;

/// Inter-chapter transition effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEffect {
    Wind,
    /// Page turn hinged on the left edge.
    Collapse,
    Explosion,
    Spiral,
    Wave,
    Gravity,
    Magnet,
    Tornado,
    Implosion,
    Scatter,
    Sweep,
    WreckingBall,
    WallCollapse,
    UfoBeam,
}

impl TransitionEffect {
    pub const ALL: [TransitionEffect; 14] = [
        TransitionEffect::Wind,
        TransitionEffect::Collapse,
        TransitionEffect::Explosion,
        TransitionEffect::Spiral,
        TransitionEffect::Wave,
        TransitionEffect::Gravity,
        TransitionEffect::Magnet,
        TransitionEffect::Tornado,
        TransitionEffect::Implosion,
        TransitionEffect::Scatter,
        TransitionEffect::Sweep,
        TransitionEffect::WreckingBall,
        TransitionEffect::WallCollapse,
        TransitionEffect::UfoBeam,
    ];

    /// Uniformly random effect.
    pub fn random(rng: &mut Rng64) -> Self {
        Self::ALL[rng.below(Self::ALL.len())]
    }

    /// Time from apply to completion.
    pub fn duration_ms(self) -> f64 {
        match self {
            Self::Explosion | Self::Gravity | Self::Magnet | Self::Scatter => 3500.0,
            Self::Wind | Self::Spiral | Self::Wave | Self::Implosion => 4000.0,
            Self::Collapse | Self::Tornado | Self::Sweep | Self::WreckingBall => 4500.0,
            Self::WallCollapse | Self::UfoBeam => 5000.0,
        }
    }

    /// Whether the effect applies forces every frame after `apply`.
    pub fn has_step(self) -> bool {
        matches!(self, Self::Wave | Self::Sweep | Self::WallCollapse | Self::UfoBeam)
    }

    /// Create bodies for `pieces` and give them their initial kick.
    pub fn apply(
        self,
        pieces: &[PieceBody],
        world: &mut dyn PhysicsWorld,
        canvas: Canvas,
        rng: &mut Rng64,
    ) -> EffectState {
        let w = canvas.w();
        let h = canvas.h();
        let center = canvas.center();
        let ghost = CollisionFilter::ghost_piece();
        let mut state = EffectState::default();

        match self {
            Self::Wind => {
                world.set_gravity(Vec2::new(0.0, 350.0));
                state.bodies = spawn(pieces, world, BodyKind::Dynamic, ghost);
                for b in &state.bodies {
                    let gust = rng.range_f64(900.0, 1500.0) * (0.6 + 0.4 * (1.0 - b.rest.y / h));
                    world.set_velocity(b.handle, Vec2::new(gust, rng.range_f64(-260.0, 60.0)));
                    world.set_angular_velocity(b.handle, rng.range_f64(-4.0, 4.0));
                }
            }
            Self::Collapse => {
                world.set_gravity(Vec2::new(0.0, 1800.0));
                state.bodies = spawn(pieces, world, BodyKind::Dynamic, ghost);
                let hinge = Point::new(0.0, h * 0.5);
                let omega = -1.8;
                for b in &state.bodies {
                    let r = b.rest - hinge;
                    world.set_velocity(b.handle, Vec2::new(-omega * r.y, omega * r.x));
                    world.set_angular_velocity(b.handle, omega);
                }
            }
            Self::Explosion => {
                world.set_gravity(Vec2::new(0.0, 1400.0));
                state.bodies = spawn(pieces, world, BodyKind::Dynamic, ghost);
                let jitter = Vec2::new(rng.range_f64(-0.1, 0.1) * w, rng.range_f64(-0.1, 0.1) * h);
                let blast = center + jitter;
                let reach = w.hypot(h) * 0.5;
                for b in &state.bodies {
                    let d = b.rest - blast;
                    let dir = unit_or_random(d, rng);
                    let falloff = (1.0 - d.hypot() / reach).max(0.0);
                    world.set_velocity(b.handle, dir * (500.0 + 1800.0 * falloff));
                    world.set_angular_velocity(b.handle, rng.range_f64(-9.0, 9.0));
                }
            }
            Self::Spiral => {
                state.bodies = spawn(pieces, world, BodyKind::Dynamic, ghost);
                for b in &state.bodies {
                    let r = b.rest - center;
                    let radial = unit_or_random(r, rng);
                    let tangent = Vec2::new(-radial.y, radial.x);
                    let v = tangent * (300.0 + r.hypot() * 1.2) + radial * 260.0;
                    world.set_velocity(b.handle, v);
                    world.set_angular_velocity(b.handle, 5.0);
                }
            }
            Self::Wave => {
                world.set_gravity(Vec2::new(0.0, 2200.0));
                state.bodies = spawn(pieces, world, BodyKind::Frozen, ghost);
                for b in &mut state.bodies {
                    b.trigger = (b.rest.x / w).clamp(0.0, 1.0);
                }
            }
            Self::Gravity => {
                world.set_gravity(Vec2::new(0.0, 2600.0));
                state.bodies = spawn(pieces, world, BodyKind::Dynamic, ghost);
                for b in &state.bodies {
                    world.set_velocity(
                        b.handle,
                        Vec2::new(rng.range_f64(-90.0, 90.0), rng.range_f64(-120.0, 0.0)),
                    );
                    world.set_angular_velocity(b.handle, rng.range_f64(-1.6, 1.6));
                }
            }
            Self::Magnet => {
                state.bodies = spawn(pieces, world, BodyKind::Dynamic, ghost);
                let magnet = Point::new(w * (0.5 + rng.range_f64(-0.3, 0.3)), -0.15 * h);
                for b in &state.bodies {
                    let dir = unit_or_random(magnet - b.rest, rng);
                    world.set_velocity(b.handle, dir * rng.range_f64(1100.0, 1600.0));
                    world.set_angular_velocity(b.handle, rng.range_f64(-3.0, 3.0));
                }
            }
            Self::Tornado => {
                world.set_gravity(Vec2::new(0.0, -250.0));
                state.bodies = spawn(pieces, world, BodyKind::Dynamic, ghost);
                let spin = f64::from(rng.sign());
                for b in &state.bodies {
                    let dx = b.rest.x - w * 0.5;
                    let swirl = -dx.signum() * spin * rng.range_f64(200.0, 500.0);
                    world.set_velocity(
                        b.handle,
                        Vec2::new(swirl - dx * 0.8, -rng.range_f64(600.0, 1200.0)),
                    );
                    world.set_angular_velocity(b.handle, 10.0 * spin);
                }
            }
            Self::Implosion => {
                world.set_gravity(Vec2::new(0.0, 40.0));
                state.bodies = spawn(pieces, world, BodyKind::Dynamic, ghost);
                let spin = f64::from(rng.sign());
                for b in &state.bodies {
                    let pull = center - b.rest;
                    let swirl = Vec2::new(-pull.y, pull.x) * (1.1 * spin);
                    world.set_velocity(b.handle, pull * 1.9 + swirl);
                    world.set_angular_velocity(b.handle, spin * rng.range_f64(3.0, 7.0));
                }
            }
            Self::Scatter => {
                world.set_gravity(Vec2::new(0.0, 500.0));
                state.bodies = spawn(pieces, world, BodyKind::Dynamic, ghost);
                for b in &state.bodies {
                    let a = rng.range_f64(0.0, TAU);
                    let speed = rng.range_f64(600.0, 1400.0);
                    world.set_velocity(b.handle, Vec2::new(a.cos(), a.sin()) * speed);
                    world.set_angular_velocity(b.handle, rng.range_f64(-5.0, 5.0));
                }
            }
            Self::Sweep => {
                world.set_gravity(Vec2::new(0.0, 1600.0));
                state.bodies = spawn(pieces, world, BodyKind::Frozen, ghost);
                for b in &mut state.bodies {
                    b.trigger = (b.rest.x / w).clamp(0.0, 1.0);
                }
            }
            Self::WreckingBall => {
                world.set_gravity(Vec2::new(0.0, 900.0));
                state.bodies = spawn(pieces, world, BodyKind::Dynamic, ghost);
                let radius = 0.14 * w;
                let start = Point::new(-0.2 * w, h * rng.range_f64(0.35, 0.65));
                let ball = BodyDesc::fixed(start, Vec2::new(radius, radius))
                    .with_kind(BodyKind::Dynamic)
                    .with_filter(CollisionFilter::tool())
                    .with_mass(60.0)
                    .with_restitution(0.1);
                state.tool = world.add_body(ball);
                if let Some(tool) = state.tool {
                    world.set_velocity(tool, Vec2::new(2200.0, -150.0));
                }
            }
            Self::WallCollapse => {
                world.set_gravity(Vec2::new(0.0, 2200.0));
                let ground = BodyDesc::fixed(
                    Point::new(w * 0.5, h + 50.0),
                    Vec2::new(w * 1.5, 50.0),
                );
                state.tool = world.add_body(ground);
                let solid = CollisionFilter::solid_piece();
                state.bodies = spawn(pieces, world, BodyKind::Frozen, solid);
                for b in &mut state.bodies {
                    let from_bottom = 1.0 - (b.rest.y / h).clamp(0.0, 1.0);
                    b.trigger = from_bottom * 0.6 + rng.range_f64(0.0, 0.1);
                }
            }
            Self::UfoBeam => {
                world.set_gravity(Vec2::new(0.0, 1200.0));
                state.bodies = spawn(pieces, world, BodyKind::Frozen, ghost);
                state.phase = rng.range_f64(0.0, TAU);
            }
        }
        state
    }

    /// Per-frame force field. No-op for one-shot effects.
    pub fn step(
        self,
        world: &mut dyn PhysicsWorld,
        state: &mut EffectState,
        since_apply_ms: f64,
        canvas: Canvas,
    ) {
        let w = canvas.w();
        let h = canvas.h();
        match self {
            Self::Wave => {
                let front = since_apply_ms / 1500.0;
                for b in state.bodies.iter_mut().filter(|b| !b.woken && front >= b.trigger) {
                    b.woken = true;
                    world.wake(b.handle);
                    let lift = 1000.0 + 400.0 * (b.trigger * PI).sin();
                    world.set_velocity(b.handle, Vec2::new(220.0, -lift));
                    world.set_angular_velocity(b.handle, 2.0);
                }
            }
            Self::Sweep => {
                let bar = since_apply_ms / 1600.0;
                let fade = (1.0 - since_apply_ms / self.duration_ms()).max(0.0);
                for b in state.bodies.iter_mut() {
                    if !b.woken && bar >= b.trigger {
                        b.woken = true;
                        world.wake(b.handle);
                        let up = b.rest.y / h;
                        world.set_velocity(
                            b.handle,
                            Vec2::new(1100.0 + 300.0 * up, -300.0 - 400.0 * (1.0 - up)),
                        );
                    }
                    if b.woken && (bar - b.trigger) < 0.15 {
                        world.apply_force(b.handle, Vec2::new(1800.0, -400.0) * (b.mass * fade));
                    }
                }
            }
            Self::WallCollapse => {
                let progress = since_apply_ms / 2000.0;
                let fade = (1.0 - since_apply_ms / self.duration_ms()).max(0.0);
                for b in state.bodies.iter_mut() {
                    if !b.woken && progress >= b.trigger {
                        b.woken = true;
                        world.wake(b.handle);
                    }
                    if b.woken {
                        let spread = (b.rest.x - w * 0.5) / w;
                        let push = spread * 900.0 * b.mass * fade;
                        world.apply_force(b.handle, Vec2::new(push, 0.0));
                    }
                }
            }
            Self::UfoBeam => {
                let beam_x = w * 0.5 + 0.35 * w * (since_apply_ms / 900.0 + state.phase).sin();
                let half_width = 0.11 * w;
                let release_all = since_apply_ms >= 0.7 * self.duration_ms();
                let g = world.gravity();
                for b in state.bodies.iter_mut() {
                    let x = world
                        .body(b.handle)
                        .map(|s| s.position.x)
                        .unwrap_or(b.rest.x);
                    let in_beam = (x - beam_x).abs() <= half_width;
                    if !b.woken && (in_beam || release_all) {
                        b.woken = true;
                        world.wake(b.handle);
                    }
                    if b.woken && in_beam && !release_all {
                        let pull = (beam_x - x) * 6.0;
                        world.apply_force(b.handle, Vec2::new(pull, -(g.y + 1800.0)) * b.mass);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Geometry of one piece at the moment a transition takes it over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceBody {
    pub piece: usize,
    pub center: Point,
    pub half_extents: Vec2,
}

impl PieceBody {
    pub fn of(piece: &Piece) -> Self {
        Self {
            piece: piece.id,
            center: piece.target_center(),
            half_extents: Vec2::new(piece.width * 0.5, piece.height * 0.5),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct EffectBody {
    pub(crate) handle: BodyHandle,
    pub(crate) rest: Point,
    pub(crate) mass: f64,
    /// Normalized activation threshold for staggered effects.
    pub(crate) trigger: f64,
    pub(crate) woken: bool,
}

/// Bodies and auxiliary state created by [`TransitionEffect::apply`].
#[derive(Clone, Debug, Default)]
pub struct EffectState {
    pub(crate) bodies: Vec<EffectBody>,
    /// Ball, ground or other non-piece collider.
    pub(crate) tool: Option<BodyHandle>,
    pub(crate) phase: f64,
}

impl EffectState {
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn woken_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.woken).count()
    }

    pub fn has_tool(&self) -> bool {
        self.tool.is_some()
    }
}

fn spawn(
    pieces: &[PieceBody],
    world: &mut dyn PhysicsWorld,
    kind: BodyKind,
    filter: CollisionFilter,
) -> Vec<EffectBody> {
    let mut out = Vec::with_capacity(pieces.len());
    for p in pieces {
        let desc = BodyDesc::piece(p.piece, p.center, 0.0, p.half_extents)
            .with_kind(kind)
            .with_filter(filter);
        if let Some(handle) = world.add_body(desc) {
            out.push(EffectBody {
                handle,
                rest: p.center,
                mass: desc.mass,
                trigger: 0.0,
                woken: kind != BodyKind::Frozen,
            });
        }
    }
    out
}

fn unit_or_random(v: Vec2, rng: &mut Rng64) -> Vec2 {
    let len = v.hypot();
    if len > 1e-6 {
        v / len
    } else {
        let a = rng.range_f64(0.0, TAU);
        Vec2::new(a.cos(), a.sin())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/effects.rs"]
mod tests;
