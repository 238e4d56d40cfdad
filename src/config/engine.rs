use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::physics::PhysicsBackend;

/// Post-assembly finale timings, all in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FinaleTimings {
    pub pause_ms: f64,
    pub wave_ms: f64,
    /// Delay after the wave ends before pieces collapse into rigid bodies.
    pub collapse_delay_ms: f64,
    /// Hold after the wave during which the collapse plays out.
    pub settle_ms: f64,
    pub slide_ms: f64,
    pub max_slides: usize,
    pub outro_ms: f64,
}

impl Default for FinaleTimings {
    fn default() -> Self {
        Self {
            pause_ms: 1500.0,
            wave_ms: 2500.0,
            collapse_delay_ms: 500.0,
            settle_ms: 3000.0,
            slide_ms: 3000.0,
            max_slides: 9,
            outro_ms: 4000.0,
        }
    }
}

/// Camera timings for the 3×3 grid variant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridTimings {
    /// Overview hold between two panel chapters.
    pub panel_gap_ms: f64,
    pub zoom_in_ms: f64,
    pub zoom_out_ms: f64,
    /// Overview hold after the ninth panel before the finale starts.
    pub overview_hold_ms: f64,
}

impl Default for GridTimings {
    fn default() -> Self {
        Self {
            panel_gap_ms: 800.0,
            zoom_in_ms: 1200.0,
            zoom_out_ms: 1200.0,
            overview_hold_ms: 2000.0,
        }
    }
}

/// Engine-wide tunables. Every field has a default, so a partial JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Virtual canvas for single-chapter reels (and each grid panel).
    pub canvas: Canvas,
    /// Output surface pixels per canvas pixel.
    pub output_scale: f64,
    /// Pieces rendered per generation step.
    pub batch_size: usize,
    /// Padding around each piece bitmap, as a fraction of `max(piece_w, piece_h)`.
    pub padding_ratio: f64,
    /// Per-piece flight duration as a fraction of the chapter duration.
    pub flight_fraction: f64,
    pub flight_min_ms: f64,
    pub flight_max_ms: f64,
    /// In-flight pieces drawn per frame at most. Detail-vs-framerate tradeoff.
    pub max_in_flight_draws: usize,
    /// Every n-th in-flight piece gets a motion trail.
    pub trail_stride: usize,
    pub ghost_alpha: f32,
    /// Progress windows (percent) for the three narrative thirds.
    pub narrative_windows: [[f64; 2]; 3],
    pub wave_amplitude_px: f64,
    /// Duration of the ripple on a single piece.
    pub piece_wave_ms: f64,
    /// Fade of completed, non-physics pieces after the wave.
    pub fade_ms: f64,
    pub finale: FinaleTimings,
    /// Share of pieces turned into rigid bodies by the finale collapse.
    pub collapse_fraction: f64,
    /// Hold between assembly end and transition apply.
    pub transition_wait_ms: f64,
    /// Minimum spacing between two `Snap` cues.
    pub snap_cue_interval_ms: f64,
    pub grid: GridTimings,
    pub physics: PhysicsBackend,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::VERTICAL,
            output_scale: 0.5,
            batch_size: 25,
            padding_ratio: 0.6,
            flight_fraction: 0.18,
            flight_min_ms: 600.0,
            flight_max_ms: 4000.0,
            max_in_flight_draws: 50,
            trail_stride: 3,
            ghost_alpha: 0.015,
            narrative_windows: [[15.0, 35.0], [40.0, 60.0], [65.0, 85.0]],
            wave_amplitude_px: 65.0,
            piece_wave_ms: 800.0,
            fade_ms: 1200.0,
            finale: FinaleTimings::default(),
            collapse_fraction: 0.7,
            transition_wait_ms: 800.0,
            snap_cue_interval_ms: 120.0,
            grid: GridTimings::default(),
            physics: PhysicsBackend::Impulse,
        }
    }
}

impl EngineConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let cfg: EngineConfig = serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open engine config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReelError::validation("canvas width and height must be > 0"));
        }
        if !self.output_scale.is_finite() || self.output_scale <= 0.0 {
            return Err(ReelError::validation("output_scale must be finite and > 0"));
        }
        let out_w = self.canvas.w() * self.output_scale;
        let out_h = self.canvas.h() * self.output_scale;
        if out_w.max(out_h) > f64::from(u16::MAX) {
            return Err(ReelError::validation(
                "output surface exceeds the 65535 px raster limit",
            ));
        }
        if self.batch_size == 0 {
            return Err(ReelError::validation("batch_size must be > 0"));
        }
        if !(0.0..=2.0).contains(&self.padding_ratio) {
            return Err(ReelError::validation("padding_ratio must be within [0, 2]"));
        }
        if !(0.0..1.0).contains(&self.flight_fraction) {
            return Err(ReelError::validation("flight_fraction must be within [0, 1)"));
        }
        if self.flight_min_ms <= 0.0 || self.flight_max_ms < self.flight_min_ms {
            return Err(ReelError::validation(
                "flight_min_ms must be > 0 and <= flight_max_ms",
            ));
        }
        if self.trail_stride == 0 {
            return Err(ReelError::validation("trail_stride must be > 0"));
        }
        for [lo, hi] in self.narrative_windows {
            if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo >= hi {
                return Err(ReelError::validation(
                    "narrative windows must be ordered percentages",
                ));
            }
        }
        let w = self.narrative_windows;
        if w[0][1] > w[1][0] || w[1][1] > w[2][0] {
            return Err(ReelError::validation("narrative windows must be disjoint"));
        }
        if !(0.0..=1.0).contains(&self.collapse_fraction) {
            return Err(ReelError::validation("collapse_fraction must be within [0, 1]"));
        }
        let f = self.finale;
        let timings = [
            f.pause_ms,
            f.wave_ms,
            f.collapse_delay_ms,
            f.settle_ms,
            f.slide_ms,
            f.outro_ms,
            self.transition_wait_ms,
            self.grid.panel_gap_ms,
            self.grid.zoom_in_ms,
            self.grid.zoom_out_ms,
            self.grid.overview_hold_ms,
        ];
        if timings.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(ReelError::validation("timings must be finite and >= 0"));
        }
        if self.piece_wave_ms <= 0.0 || self.piece_wave_ms > f.wave_ms.max(1.0) {
            return Err(ReelError::validation(
                "piece_wave_ms must be > 0 and fit inside the wave phase",
            ));
        }
        Ok(())
    }

    /// Per-piece flight duration for a chapter of `total_ms`.
    pub fn flight_ms(&self, total_ms: f64) -> f64 {
        (total_ms * self.flight_fraction)
            .clamp(self.flight_min_ms, self.flight_max_ms)
            .min(total_ms.max(1.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/engine.rs"]
mod tests;
