use std::f64::consts::PI;

use crate::foundation::core::{Canvas, Point, Vec2};
use crate::foundation::math::Rng64;
use crate::physics::world::{BodyDesc, CollisionFilter, PhysicsWorld};
use crate::tessellation::piece::Piece;

const GRAVITY: f64 = 1800.0;

/// Turn a random share of the assembled pieces into falling rigid bodies.
///
/// Pieces are sampled without replacement in shuffled order, kicked outward in proportion to
/// their distance from the canvas center, and land on a static ground below the canvas.
/// Returns the number of piece bodies created (0 without a physics backend).
pub fn collapse(
    pieces: &[Piece],
    world: &mut dyn PhysicsWorld,
    canvas: Canvas,
    fraction: f64,
    rng: &mut Rng64,
) -> usize {
    if pieces.is_empty() {
        return 0;
    }
    if !world.is_available() {
        tracing::warn!("no physics backend; finale collapse skipped");
        return 0;
    }

    let take = ((pieces.len() as f64) * fraction.clamp(0.0, 1.0)).round() as usize;
    let mut picks = rng.permutation(pieces.len());
    picks.truncate(take);

    world.set_gravity(Vec2::new(0.0, GRAVITY));
    world.add_body(BodyDesc::fixed(
        Point::new(canvas.w() * 0.5, canvas.h() + 40.0),
        Vec2::new(canvas.w() * 1.5, 40.0),
    ));

    let center = canvas.center();
    let reach = canvas.w().hypot(canvas.h()) * 0.5;
    let mut created = 0;
    for i in picks {
        let p = &pieces[i];
        let rest = p.target_center();
        let desc = BodyDesc::piece(
            p.id,
            rest,
            0.0,
            Vec2::new(p.width * 0.5, p.height * 0.5),
        )
        .with_filter(CollisionFilter::solid_piece());
        let Some(handle) = world.add_body(desc) else {
            continue;
        };
        let d = rest - center;
        let dir = if d.hypot() > 1e-6 {
            d / d.hypot()
        } else {
            let a = rng.range_f64(0.0, 2.0 * PI);
            Vec2::new(a.cos(), a.sin())
        };
        let push = 200.0 + 900.0 * (d.hypot() / reach).min(1.0);
        world.set_velocity(handle, dir * push + Vec2::new(0.0, -300.0));
        world.set_angular_velocity(handle, rng.range_f64(-4.0, 4.0));
        created += 1;
    }
    tracing::debug!(bodies = created, "finale collapse");
    created
}

#[cfg(test)]
#[path = "../../tests/unit/finale/collapse.rs"]
mod tests;
