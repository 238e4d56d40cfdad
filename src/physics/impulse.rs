//! Small built-in rigid-body integrator.
//!
//! Dynamic bodies are circles for contact purposes (radius = mean half extent); static bodies are
//! axis-aligned boxes. Integration is semi-implicit Euler at a fixed 60 Hz substep.

use std::collections::HashMap;

use crate::foundation::core::{Point, Rect, Vec2};
use crate::physics::world::{
    BodyDesc, BodyHandle, BodyKind, BodyState, PhysicsPoses, PhysicsWorld, Pose,
};

const SUBSTEP_S: f64 = 1.0 / 60.0;
const MAX_SUBSTEPS: u32 = 8;
const LINEAR_DAMPING: f64 = 0.08;
const ANGULAR_DAMPING: f64 = 0.6;
const CONTACT_SPIN_DAMPING: f64 = 0.92;

#[derive(Clone, Debug)]
struct Body {
    desc: BodyDesc,
    position: Point,
    angle: f64,
    velocity: Vec2,
    omega: f64,
    force: Vec2,
    radius: f64,
    inv_mass: f64,
    inv_inertia: f64,
    sleeping: bool,
}

impl Body {
    fn new(desc: BodyDesc) -> Self {
        let radius = ((desc.half_extents.x + desc.half_extents.y) * 0.5).max(0.5);
        let (inv_mass, inv_inertia) = if desc.kind == BodyKind::Static || desc.mass <= 0.0 {
            (0.0, 0.0)
        } else {
            let i = 0.5 * desc.mass * radius * radius;
            (1.0 / desc.mass, 1.0 / i.max(1e-9))
        };
        Self {
            desc,
            position: desc.position,
            angle: desc.angle,
            velocity: Vec2::ZERO,
            omega: 0.0,
            force: Vec2::ZERO,
            radius,
            inv_mass,
            inv_inertia,
            sleeping: false,
        }
    }

    fn is_simulated(&self) -> bool {
        self.desc.kind == BodyKind::Dynamic && !self.sleeping && self.inv_mass > 0.0
    }

    fn aabb(&self) -> Rect {
        let h = self.desc.half_extents;
        Rect::new(
            self.position.x - h.x,
            self.position.y - h.y,
            self.position.x + h.x,
            self.position.y + h.y,
        )
    }
}

/// Built-in physics backend.
#[derive(Clone, Debug)]
pub struct ImpulseWorld {
    bounds: Rect,
    gravity: Vec2,
    bodies: Vec<Body>,
    epoch: u32,
    accum_s: f64,
    dynamic_contacts: bool,
}

impl ImpulseWorld {
    /// World covering `bounds`; bodies drifting one bounds-size beyond it go to sleep.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            gravity: Vec2::ZERO,
            bodies: Vec::new(),
            epoch: 0,
            accum_s: 0.0,
            dynamic_contacts: true,
        }
    }

    /// Toggle dynamic-dynamic contacts (static contacts always run).
    pub fn set_dynamic_contacts(&mut self, on: bool) {
        self.dynamic_contacts = on;
    }

    fn get(&self, h: BodyHandle) -> Option<&Body> {
        if h.epoch != self.epoch {
            return None;
        }
        self.bodies.get(h.index as usize)
    }

    fn get_mut(&mut self, h: BodyHandle) -> Option<&mut Body> {
        if h.epoch != self.epoch {
            return None;
        }
        self.bodies.get_mut(h.index as usize)
    }

    fn substep(&mut self, dt: f64) {
        let g = self.gravity;
        for b in self.bodies.iter_mut().filter(|b| b.is_simulated()) {
            b.velocity += (g + b.force * b.inv_mass) * dt;
            b.velocity *= (1.0 - LINEAR_DAMPING * dt).max(0.0);
            b.omega *= (1.0 - ANGULAR_DAMPING * dt).max(0.0);
            b.position += b.velocity * dt;
            b.angle += b.omega * dt;
        }

        self.static_contacts();
        if self.dynamic_contacts {
            self.dynamic_pairs();
        }

        let margin = self.bounds.width().max(self.bounds.height());
        let outer = self.bounds.inflate(margin, margin);
        for b in self.bodies.iter_mut().filter(|b| b.is_simulated()) {
            if !outer.contains(b.position) {
                b.sleeping = true;
                b.velocity = Vec2::ZERO;
                b.omega = 0.0;
            }
        }
    }

    fn static_contacts(&mut self) {
        let statics: Vec<(Rect, BodyDesc)> = self
            .bodies
            .iter()
            .filter(|b| b.desc.kind == BodyKind::Static)
            .map(|b| (b.aabb(), b.desc))
            .collect();
        if statics.is_empty() {
            return;
        }
        for b in self.bodies.iter_mut().filter(|b| b.is_simulated()) {
            for (rect, sdesc) in &statics {
                if !b.desc.filter.collides_with(sdesc.filter) {
                    continue;
                }
                let Some((normal, penetration)) = box_contact(b.position, b.radius, *rect)
                else {
                    continue;
                };
                b.position += normal * penetration;
                let vn = b.velocity.dot(normal);
                if vn < 0.0 {
                    let e = b.desc.restitution.max(sdesc.restitution);
                    b.velocity -= normal * ((1.0 + e) * vn);
                    let tangent = b.velocity - normal * b.velocity.dot(normal);
                    let mu = ((b.desc.friction + sdesc.friction) * 0.5).clamp(0.0, 1.0);
                    b.velocity -= tangent * (mu * 0.5);
                    b.omega = b.omega * CONTACT_SPIN_DAMPING
                        + tangent.cross(normal) / b.radius * (1.0 - CONTACT_SPIN_DAMPING);
                }
            }
        }
    }

    fn dynamic_pairs(&mut self) {
        let max_r = self
            .bodies
            .iter()
            .filter(|b| b.is_simulated())
            .map(|b| b.radius)
            .fold(0.0_f64, f64::max);
        if max_r <= 0.0 {
            return;
        }
        let cell = 2.0 * max_r;
        let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (i, b) in self.bodies.iter().enumerate() {
            if !b.is_simulated() {
                continue;
            }
            let key = (
                (b.position.x / cell).floor() as i64,
                (b.position.y / cell).floor() as i64,
            );
            grid.entry(key).or_default().push(i);
        }

        let mut pairs = Vec::new();
        for (&(cx, cy), members) in &grid {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let Some(others) = grid.get(&(cx + dx, cy + dy)) else {
                        continue;
                    };
                    for &i in members {
                        for &j in others {
                            if i < j {
                                pairs.push((i, j));
                            }
                        }
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();

        for (i, j) in pairs {
            let (a, b) = {
                let (lo, hi) = self.bodies.split_at_mut(j);
                (&mut lo[i], &mut hi[0])
            };
            if !a.desc.filter.collides_with(b.desc.filter) {
                continue;
            }
            let d = b.position - a.position;
            let dist = d.hypot();
            let overlap = a.radius + b.radius - dist;
            if overlap <= 0.0 || dist <= 1e-9 {
                continue;
            }
            let n = d / dist;
            let total = a.inv_mass + b.inv_mass;
            a.position -= n * (overlap * a.inv_mass / total);
            b.position += n * (overlap * b.inv_mass / total);
            let rel = (b.velocity - a.velocity).dot(n);
            if rel < 0.0 {
                let e = a.desc.restitution.min(b.desc.restitution);
                let j_imp = -(1.0 + e) * rel / total;
                a.velocity -= n * (j_imp * a.inv_mass);
                b.velocity += n * (j_imp * b.inv_mass);
            }
        }
    }
}

/// Push-out normal and depth of a circle overlapping `rect`.
fn box_contact(center: Point, radius: f64, rect: Rect) -> Option<(Vec2, f64)> {
    let closest = Point::new(center.x.clamp(rect.x0, rect.x1), center.y.clamp(rect.y0, rect.y1));
    let d = center - closest;
    let dist = d.hypot();
    if dist > 1e-9 {
        let depth = radius - dist;
        return (depth > 0.0).then(|| (d / dist, depth));
    }
    // Center inside the box: leave through the nearest face.
    let faces = [
        (center.y - rect.y0, Vec2::new(0.0, -1.0)),
        (rect.y1 - center.y, Vec2::new(0.0, 1.0)),
        (center.x - rect.x0, Vec2::new(-1.0, 0.0)),
        (rect.x1 - center.x, Vec2::new(1.0, 0.0)),
    ];
    let (depth, normal) = faces
        .into_iter()
        .fold((f64::INFINITY, Vec2::ZERO), |best, f| if f.0 < best.0 { f } else { best });
    Some((normal, depth + radius))
}

impl PhysicsWorld for ImpulseWorld {
    fn is_available(&self) -> bool {
        true
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn add_body(&mut self, desc: BodyDesc) -> Option<BodyHandle> {
        let index = u32::try_from(self.bodies.len()).ok()?;
        self.bodies.push(Body::new(desc));
        Some(BodyHandle {
            index,
            epoch: self.epoch,
        })
    }

    fn body(&self, handle: BodyHandle) -> Option<BodyState> {
        self.get(handle).map(|b| BodyState {
            piece: b.desc.piece,
            position: b.position,
            angle: b.angle,
            velocity: b.velocity,
            angular_velocity: b.omega,
            kind: b.desc.kind,
            sleeping: b.sleeping,
        })
    }

    fn handles(&self) -> Vec<BodyHandle> {
        (0..self.bodies.len() as u32)
            .map(|index| BodyHandle {
                index,
                epoch: self.epoch,
            })
            .collect()
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(b) = self.get_mut(handle)
            && b.desc.kind != BodyKind::Static
        {
            b.velocity = velocity;
        }
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, omega: f64) {
        if let Some(b) = self.get_mut(handle)
            && b.desc.kind != BodyKind::Static
        {
            b.omega = omega;
        }
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) {
        if let Some(b) = self.get_mut(handle) {
            b.velocity += impulse * b.inv_mass;
        }
    }

    fn apply_angular_impulse(&mut self, handle: BodyHandle, impulse: f64) {
        if let Some(b) = self.get_mut(handle) {
            b.omega += impulse * b.inv_inertia;
        }
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) {
        if let Some(b) = self.get_mut(handle) {
            b.force += force;
        }
    }

    fn wake(&mut self, handle: BodyHandle) {
        if let Some(b) = self.get_mut(handle)
            && b.desc.kind == BodyKind::Frozen
        {
            b.desc.kind = BodyKind::Dynamic;
        }
    }

    fn step(&mut self, dt_ms: f64) {
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return;
        }
        self.accum_s += dt_ms / 1000.0;
        let mut n = 0;
        while self.accum_s >= SUBSTEP_S && n < MAX_SUBSTEPS {
            self.substep(SUBSTEP_S);
            self.accum_s -= SUBSTEP_S;
            n += 1;
        }
        if n == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral.
            self.accum_s = 0.0;
        }
        if n > 0 {
            for b in &mut self.bodies {
                b.force = Vec2::ZERO;
            }
        }
    }

    fn poses(&self) -> PhysicsPoses {
        let mut out = PhysicsPoses::default();
        for b in &self.bodies {
            if let Some(piece) = b.desc.piece {
                out.insert(
                    piece,
                    Pose {
                        position: b.position,
                        angle: b.angle,
                    },
                );
            }
        }
        out
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.gravity = Vec2::ZERO;
        self.accum_s = 0.0;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/physics/impulse.rs"]
mod tests;
