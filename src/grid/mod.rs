pub mod camera;
pub mod session;

pub use camera::{Camera, CameraShot, GridLayout, GridSchedule, PANELS};
pub use session::{GridSession, GridStatus};
