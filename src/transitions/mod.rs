pub mod effects;
pub mod engine;

pub use effects::TransitionEffect;
pub use engine::{TransitionEngine, TransitionStatus};
