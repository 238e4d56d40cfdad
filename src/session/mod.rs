pub mod chapter;
pub mod observer;

pub use chapter::{ChapterSession, GenerationTicket};
pub use observer::{AudioCue, NoopObserver, RecordingObserver, SessionObserver};
