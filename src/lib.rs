//! Puzzle reel engine: cuts images into pieces, flies them into place frame by frame and
//! composites each frame on the CPU.
//!
//! [`ChapterSession`] plays one chapter at a time; [`GridSession`] plays nine chapters in a 3×3
//! layout. Both are driven by `tick(now_ms, observer)` and `render()`.
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod config;
pub mod finale;
pub mod foundation;
pub mod grid;
pub mod physics;
pub mod render;
pub mod session;
pub mod tessellation;
pub mod transitions;

pub use assets::image::{PreparedImage, SourceImage};
pub use config::chapter::{Background, ChapterParams, Material, Movement, Shape, TransitionMode};
pub use config::engine::EngineConfig;
pub use config::project::{ChapterDef, ProjectDef};
pub use finale::FinalePhase;
pub use foundation::core::Canvas;
pub use foundation::error::{ReelError, ReelResult};
pub use grid::{GridSession, GridStatus};
pub use physics::{PhysicsBackend, PhysicsWorld};
pub use render::{FrameRGBA, Snapshot, Surface};
pub use session::{AudioCue, ChapterSession, NoopObserver, RecordingObserver, SessionObserver};
pub use transitions::TransitionEffect;
