//! Rigid-body capability used by the finale collapse and transition effects.

pub mod impulse;
pub mod null;
pub mod world;

use crate::foundation::core::Rect;

pub use impulse::ImpulseWorld;
pub use null::NullWorld;
pub use world::{
    BodyDesc, BodyHandle, BodyKind, BodyState, CollisionFilter, PhysicsPoses, PhysicsWorld, Pose,
};

/// Which physics backend a session creates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicsBackend {
    #[default]
    Impulse,
    /// No simulation; effects degrade to static pieces.
    Null,
}

impl PhysicsBackend {
    pub fn create(self, bounds: Rect) -> Box<dyn PhysicsWorld> {
        match self {
            Self::Impulse => Box::new(ImpulseWorld::new(bounds)),
            Self::Null => Box::new(NullWorld),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/physics/backend.rs"]
mod tests;
