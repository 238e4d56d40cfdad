//! Pure per-piece motion from scatter origin to assembled target.
//!
//! Every movement lands exactly on the target center with zero rotation and unit scale at
//! `t = 1`; callers freeze completed pieces there.

use std::f64::consts::PI;

use crate::animation::ease::Ease;
use crate::config::chapter::Movement;
use crate::foundation::core::{Point, Vec2};
use crate::foundation::math::{clamp01, lerp};
use crate::tessellation::piece::Piece;

/// Placement of a piece center on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceTransform {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
}

impl PieceTransform {
    pub fn at_rest(target: Point) -> Self {
        Self {
            x: target.x,
            y: target.y,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

const ELASTIC_LAND: f64 = 0.82;

/// Transform of `piece` at its own normalized flight progress `t`.
pub fn transform(piece: &Piece, t: f64, movement: Movement) -> PieceTransform {
    let t = clamp01(t);
    let from = piece.origin;
    let to = piece.target_center();
    let delta = to - from;
    let dist = delta.hypot();
    let r0 = piece.rotation;

    match movement {
        Movement::Standard => {
            let e = Ease::InOutQuint.apply(t);
            let p = from.lerp(to, e);
            PieceTransform {
                x: p.x,
                y: p.y,
                rotation: r0 * (1.0 - e),
                scale: 1.0 + (t * PI).sin() * 0.15,
            }
        }
        Movement::Flight => {
            let e = Ease::InOutQuint.apply(t);
            let p = from.lerp(to, e);
            let arc = (t * PI).sin();
            PieceTransform {
                x: p.x,
                y: p.y - arc * 0.35 * dist,
                rotation: r0 * (1.0 - e) + (2.0 * PI * t).sin() * 0.35,
                scale: 1.0 + 0.3 * arc,
            }
        }
        Movement::Vortex => {
            let e = Ease::OutCubic.apply(t);
            let spin = if piece.id % 2 == 0 { 1.0 } else { -1.0 };
            let start_angle = (-delta).atan2();
            let angle = start_angle + spin * 4.0 * PI * (1.0 - e);
            let radius = dist * (1.0 - e);
            PieceTransform {
                x: to.x + radius * angle.cos(),
                y: to.y + radius * angle.sin(),
                rotation: r0 * (1.0 - e),
                scale: 0.6 + 0.4 * e,
            }
        }
        Movement::Wave => {
            let e = Ease::InOutCubic.apply(t);
            let p = from.lerp(to, e);
            let amp = (dist * 0.15).min(180.0);
            let decay = 1.0 - t;
            PieceTransform {
                x: p.x + amp * (5.0 * PI * t).sin() * decay,
                y: p.y + 0.6 * amp * (10.0 * PI * t).sin() * decay,
                rotation: r0 * decay * decay * (5.0 * PI * t).cos(),
                scale: 1.0,
            }
        }
        Movement::Playful => {
            let e = Ease::OutCubic.apply(t);
            let p = from.lerp(to, e);
            let decay = 1.0 - t;
            let bounce = (dist * 0.25).min(260.0);
            PieceTransform {
                x: p.x,
                y: p.y - (4.0 * PI * t).sin().abs() * decay * bounce,
                rotation: r0 * (1.0 - e),
                scale: 1.0 + 0.12 * (8.0 * PI * t).sin() * decay,
            }
        }
        Movement::Elastic => {
            if t < ELASTIC_LAND {
                let e = Ease::OutQuart.apply(t / ELASTIC_LAND);
                let p = from.lerp(to, e);
                PieceTransform {
                    x: p.x,
                    y: p.y,
                    rotation: r0 * (1.0 - e),
                    scale: 1.0,
                }
            } else {
                let u = (t - ELASTIC_LAND) / (1.0 - ELASTIC_LAND);
                let wobble = (3.0 * PI * u).sin() * (1.0 - u);
                let p = to + delta * (0.08 * wobble);
                PieceTransform {
                    x: p.x,
                    y: p.y,
                    rotation: lerp(0.0, r0 * 0.05, wobble),
                    scale: 1.0,
                }
            }
        }
    }
}

/// Offset of a completed piece during the finale ripple.
///
/// `since_wave_ms` is measured from the start of the wave phase; each piece starts its ripple
/// at a delay proportional to its normalized diagonal position.
pub fn wave_offset(
    diag: f64,
    since_wave_ms: f64,
    wave_ms: f64,
    piece_wave_ms: f64,
    amplitude: f64,
) -> Vec2 {
    let spread = (wave_ms - piece_wave_ms).max(0.0);
    let local = (since_wave_ms - clamp01(diag) * spread) / piece_wave_ms.max(1.0);
    if !(0.0..1.0).contains(&local) {
        return Vec2::ZERO;
    }
    let lift = (local * PI).sin();
    Vec2::new(0.0, -amplitude * lift)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/kinetic.rs"]
mod tests;
