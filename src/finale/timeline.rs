use crate::config::engine::FinaleTimings;

/// Resolved finale timings for one chapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FinalePlan {
    pub pause_ms: f64,
    pub wave_ms: f64,
    pub collapse_delay_ms: f64,
    pub settle_ms: f64,
    pub slide_ms: f64,
    pub slides: usize,
    pub outro_ms: f64,
}

impl FinalePlan {
    /// Plan for a chapter. Slideshow and outro only run on the last chapter; the slideshow
    /// additionally needs more than one snapshot.
    pub fn new(timings: &FinaleTimings, is_last: bool, snapshots: usize) -> Self {
        let slides = if is_last && snapshots > 1 {
            snapshots.min(timings.max_slides)
        } else {
            0
        };
        Self {
            pause_ms: timings.pause_ms,
            wave_ms: timings.wave_ms,
            collapse_delay_ms: timings.collapse_delay_ms,
            settle_ms: timings.settle_ms,
            slide_ms: timings.slide_ms,
            slides,
            outro_ms: if is_last { timings.outro_ms } else { 0.0 },
        }
    }

    pub fn wave_start_ms(&self) -> f64 {
        self.pause_ms
    }

    pub fn wave_end_ms(&self) -> f64 {
        self.pause_ms + self.wave_ms
    }

    /// Time after assembly at which the collapse fires.
    pub fn collapse_at_ms(&self) -> f64 {
        self.wave_end_ms() + self.collapse_delay_ms
    }

    pub fn slideshow_start_ms(&self) -> f64 {
        self.wave_end_ms() + self.settle_ms
    }

    pub fn outro_start_ms(&self) -> f64 {
        self.slideshow_start_ms() + self.slides as f64 * self.slide_ms
    }

    pub fn total_ms(&self) -> f64 {
        self.outro_start_ms() + self.outro_ms
    }
}

/// Where the finale is at a given time after assembly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FinalePhase {
    /// Assembly still running.
    Idle,
    Pause { since_ms: f64 },
    Wave { since_ms: f64 },
    /// Collapse plays out; completed pieces fade.
    Settle { since_ms: f64 },
    Slideshow { index: usize, t: f64 },
    Outro { t: f64 },
    Done,
}

impl FinalePhase {
    /// True from the wave on: completed pieces carry wave offsets or fade.
    pub fn after_wave_start(&self) -> bool {
        !matches!(self, Self::Idle | Self::Pause { .. })
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Pure phase lookup for `after_ms = elapsed - total`.
pub fn finale_phase(after_ms: f64, plan: &FinalePlan) -> FinalePhase {
    if after_ms.is_nan() || after_ms <= 0.0 {
        return FinalePhase::Idle;
    }
    if after_ms <= plan.pause_ms {
        return FinalePhase::Pause { since_ms: after_ms };
    }
    if after_ms < plan.wave_end_ms() {
        return FinalePhase::Wave {
            since_ms: after_ms - plan.wave_start_ms(),
        };
    }
    if after_ms < plan.slideshow_start_ms() {
        return FinalePhase::Settle {
            since_ms: after_ms - plan.wave_end_ms(),
        };
    }
    if after_ms < plan.outro_start_ms() {
        let into = after_ms - plan.slideshow_start_ms();
        let slide = plan.slide_ms.max(1.0);
        let index = ((into / slide) as usize).min(plan.slides.saturating_sub(1));
        return FinalePhase::Slideshow {
            index,
            t: ((into - index as f64 * slide) / slide).clamp(0.0, 1.0),
        };
    }
    if after_ms < plan.total_ms() {
        return FinalePhase::Outro {
            t: ((after_ms - plan.outro_start_ms()) / plan.outro_ms.max(1.0)).clamp(0.0, 1.0),
        };
    }
    FinalePhase::Done
}

#[cfg(test)]
#[path = "../../tests/unit/finale/timeline.rs"]
mod tests;
