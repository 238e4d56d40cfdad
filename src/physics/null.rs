use crate::foundation::core::Vec2;
use crate::physics::world::{BodyDesc, BodyHandle, BodyState, PhysicsPoses, PhysicsWorld};

/// Backend for hosts without physics. Every call is a no-op and no body is ever created.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullWorld;

impl PhysicsWorld for NullWorld {
    fn is_available(&self) -> bool {
        false
    }

    fn gravity(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn set_gravity(&mut self, _gravity: Vec2) {}

    fn add_body(&mut self, _desc: BodyDesc) -> Option<BodyHandle> {
        None
    }

    fn body(&self, _handle: BodyHandle) -> Option<BodyState> {
        None
    }

    fn handles(&self) -> Vec<BodyHandle> {
        Vec::new()
    }

    fn set_velocity(&mut self, _handle: BodyHandle, _velocity: Vec2) {}

    fn set_angular_velocity(&mut self, _handle: BodyHandle, _omega: f64) {}

    fn apply_impulse(&mut self, _handle: BodyHandle, _impulse: Vec2) {}

    fn apply_angular_impulse(&mut self, _handle: BodyHandle, _impulse: f64) {}

    fn apply_force(&mut self, _handle: BodyHandle, _force: Vec2) {}

    fn wake(&mut self, _handle: BodyHandle) {}

    fn step(&mut self, _dt_ms: f64) {}

    fn poses(&self) -> PhysicsPoses {
        PhysicsPoses::default()
    }

    fn body_count(&self) -> usize {
        0
    }

    fn clear(&mut self) {}
}
