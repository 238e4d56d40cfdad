pub mod collapse;
pub mod timeline;

pub use collapse::collapse;
pub use timeline::{FinalePhase, FinalePlan, finale_phase};
