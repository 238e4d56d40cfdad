use std::collections::HashMap;

use crate::foundation::core::{Point, Vec2};

/// Handle to a body inside one world. Handles from before a [`PhysicsWorld::clear`] are stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) epoch: u32,
}

/// How a body takes part in the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    /// Immovable collider (ground, walls).
    Static,
    /// Dynamic body held in place until [`PhysicsWorld::wake`].
    Frozen,
}

/// Bit groups deciding which pairs of bodies collide.
///
/// Two bodies collide when each one's `group` intersects the other's `mask`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    pub group: u32,
    pub mask: u32,
}

impl CollisionFilter {
    pub const PIECE: u32 = 1;
    pub const SCENERY: u32 = 1 << 1;
    pub const TOOL: u32 = 1 << 2;

    /// Pieces that only hit scenery, never each other.
    pub const fn ghost_piece() -> Self {
        Self {
            group: Self::PIECE,
            mask: Self::SCENERY | Self::TOOL,
        }
    }

    /// Pieces that also stack on each other.
    pub const fn solid_piece() -> Self {
        Self {
            group: Self::PIECE,
            mask: Self::PIECE | Self::SCENERY | Self::TOOL,
        }
    }

    pub const fn scenery() -> Self {
        Self {
            group: Self::SCENERY,
            mask: Self::PIECE | Self::TOOL,
        }
    }

    pub const fn tool() -> Self {
        Self {
            group: Self::TOOL,
            mask: Self::PIECE | Self::SCENERY,
        }
    }

    pub fn collides_with(self, other: CollisionFilter) -> bool {
        (self.group & other.mask) != 0 && (other.group & self.mask) != 0
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::ghost_piece()
    }
}

/// Body creation parameters. Positions are canvas pixels, angles radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDesc {
    pub piece: Option<usize>,
    pub position: Point,
    pub angle: f64,
    pub half_extents: Vec2,
    pub mass: f64,
    pub restitution: f64,
    pub friction: f64,
    pub filter: CollisionFilter,
    pub kind: BodyKind,
}

impl BodyDesc {
    /// Dynamic body for piece `piece` resting at `position`.
    pub fn piece(piece: usize, position: Point, angle: f64, half_extents: Vec2) -> Self {
        Self {
            piece: Some(piece),
            position,
            angle,
            half_extents,
            mass: (half_extents.x * half_extents.y * 4.0 / 1000.0).max(0.05),
            restitution: 0.35,
            friction: 0.4,
            filter: CollisionFilter::ghost_piece(),
            kind: BodyKind::Dynamic,
        }
    }

    /// Static box centered at `position`.
    pub fn fixed(position: Point, half_extents: Vec2) -> Self {
        Self {
            piece: None,
            position,
            angle: 0.0,
            half_extents,
            mass: 0.0,
            restitution: 0.2,
            friction: 0.6,
            filter: CollisionFilter::scenery(),
            kind: BodyKind::Static,
        }
    }

    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }
}

/// Snapshot of one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub piece: Option<usize>,
    pub position: Point,
    pub angle: f64,
    pub velocity: Vec2,
    pub angular_velocity: f64,
    pub kind: BodyKind,
    pub sleeping: bool,
}

/// Placement of a physics-controlled piece.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Point,
    pub angle: f64,
}

/// Piece id → pose for every piece a world currently controls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhysicsPoses {
    poses: HashMap<usize, Pose>,
}

impl PhysicsPoses {
    pub fn insert(&mut self, piece: usize, pose: Pose) {
        self.poses.insert(piece, pose);
    }

    pub fn get(&self, piece: usize) -> Option<Pose> {
        self.poses.get(&piece).copied()
    }

    pub fn contains(&self, piece: usize) -> bool {
        self.poses.contains_key(&piece)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Pose)> + '_ {
        self.poses.iter().map(|(k, v)| (*k, *v))
    }
}

/// Rigid-body capability consumed by the finale collapse and the transition effects.
///
/// Velocities are pixels per second, time steps milliseconds.
pub trait PhysicsWorld {
    /// False for backends that simulate nothing.
    fn is_available(&self) -> bool;

    fn gravity(&self) -> Vec2;
    fn set_gravity(&mut self, gravity: Vec2);

    fn add_body(&mut self, desc: BodyDesc) -> Option<BodyHandle>;
    fn body(&self, handle: BodyHandle) -> Option<BodyState>;
    fn handles(&self) -> Vec<BodyHandle>;

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);
    fn set_angular_velocity(&mut self, handle: BodyHandle, omega: f64);
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2);
    fn apply_angular_impulse(&mut self, handle: BodyHandle, impulse: f64);
    /// Force accumulated until the next [`PhysicsWorld::step`].
    fn apply_force(&mut self, handle: BodyHandle, force: Vec2);
    /// Turn a frozen body dynamic.
    fn wake(&mut self, handle: BodyHandle);

    fn step(&mut self, dt_ms: f64);
    fn poses(&self) -> PhysicsPoses;
    fn body_count(&self) -> usize;
    fn clear(&mut self);
}

#[cfg(test)]
#[path = "../../tests/unit/physics/world.rs"]
mod tests;
