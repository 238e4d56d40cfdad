/// Discrete sound triggers. The host owns playback; the engine only says when.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Pieces start flying.
    Move,
    /// A piece landed (throttled).
    Snap,
    Wave,
    Destruct,
}

impl AudioCue {
    /// Suggested playback gain in `[0, 1]`.
    pub fn gain(self) -> f32 {
        match self {
            Self::Move => 0.5,
            Self::Snap => 0.3,
            Self::Wave => 0.6,
            Self::Destruct => 0.8,
        }
    }
}

/// Callbacks a host receives while a session runs. Every method defaults to a no-op.
pub trait SessionObserver {
    /// Assembly progress in percent, once per ready frame.
    fn on_progress(&mut self, _percent: f64) {}
    /// Fired exactly once per chapter.
    fn on_finished(&mut self) {}
    /// Grid mode: the 1-based chapter now in focus.
    fn on_chapter_change(&mut self, _chapter: usize) {}
    fn on_audio_cue(&mut self, _cue: AudioCue) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Observer that keeps every callback, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingObserver {
    pub progress: Vec<f64>,
    pub finished: usize,
    pub chapters: Vec<usize>,
    pub cues: Vec<AudioCue>,
}

impl RecordingObserver {
    pub fn cue_count(&self, cue: AudioCue) -> usize {
        self.cues.iter().filter(|c| **c == cue).count()
    }

    pub fn last_progress(&self) -> Option<f64> {
        self.progress.last().copied()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_progress(&mut self, percent: f64) {
        self.progress.push(percent);
    }

    fn on_finished(&mut self) {
        self.finished += 1;
    }

    fn on_chapter_change(&mut self, chapter: usize) {
        self.chapters.push(chapter);
    }

    fn on_audio_cue(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }
}
