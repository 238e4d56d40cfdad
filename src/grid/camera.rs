//! Timeline and camera for the 3×3 grid: which panel is live, and where the camera looks.

use crate::animation::ease::Ease;
use crate::config::engine::GridTimings;
use crate::foundation::core::{Affine, Canvas, Point, Vec2};
use crate::foundation::math::{clamp01, lerp};

pub const PANELS: usize = 9;
const COLS: usize = 3;

/// Nine panels of `panel` size separated by a gutter, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub panel: Canvas,
    pub gutter: f64,
}

impl GridLayout {
    pub fn new(panel: Canvas) -> Self {
        Self {
            panel,
            gutter: panel.w() * 0.04,
        }
    }

    /// Top-left corner of panel `i` (row-major).
    pub fn panel_origin(&self, i: usize) -> Point {
        let (row, col) = ((i / COLS) as f64, (i % COLS) as f64);
        Point::new(
            self.gutter + col * (self.panel.w() + self.gutter),
            self.gutter + row * (self.panel.h() + self.gutter),
        )
    }

    pub fn world_size(&self) -> Vec2 {
        let n = COLS as f64;
        Vec2::new(
            n * self.panel.w() + (n + 1.0) * self.gutter,
            n * self.panel.h() + (n + 1.0) * self.gutter,
        )
    }

    /// Camera showing the whole grid inside `screen`.
    pub fn overview(&self, screen: Canvas) -> Camera {
        let size = self.world_size();
        Camera {
            center: Point::new(size.x * 0.5, size.y * 0.5),
            zoom: (screen.w() / size.x).min(screen.h() / size.y),
        }
    }

    /// Camera filling `screen` with panel `i`.
    pub fn focus(&self, i: usize, screen: Canvas) -> Camera {
        let o = self.panel_origin(i);
        Camera {
            center: Point::new(o.x + self.panel.w() * 0.5, o.y + self.panel.h() * 0.5),
            zoom: (screen.w() / self.panel.w()).min(screen.h() / self.panel.h()),
        }
    }

    pub fn camera(&self, shot: CameraShot, screen: Canvas) -> Camera {
        let overview = self.overview(screen);
        match shot {
            CameraShot::Overview | CameraShot::Gap { .. } => overview,
            CameraShot::Focus { panel } => self.focus(panel, screen),
            CameraShot::ZoomIn { panel, t } => {
                Camera::lerp(overview, self.focus(panel, screen), Ease::InOutCubic.apply(t))
            }
            CameraShot::ZoomOut { panel, t } => {
                Camera::lerp(self.focus(panel, screen), overview, Ease::InOutCubic.apply(t))
            }
        }
    }
}

/// World point shown at the screen center, and world → screen scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub center: Point,
    pub zoom: f64,
}

impl Camera {
    /// Zoom interpolates geometrically so the apparent speed stays even.
    pub fn lerp(a: Camera, b: Camera, t: f64) -> Camera {
        let t = clamp01(t);
        Camera {
            center: a.center.lerp(b.center, t),
            zoom: lerp(a.zoom.max(1e-9).ln(), b.zoom.max(1e-9).ln(), t).exp(),
        }
    }

    /// World → screen transform for `screen`.
    pub fn affine(self, screen: Canvas) -> Affine {
        Affine::translate(screen.center().to_vec2())
            * Affine::scale(self.zoom)
            * Affine::translate(-self.center.to_vec2())
    }
}

/// What the camera does at a point of the grid timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraShot {
    /// Before the first chapter and after the last one.
    Overview,
    ZoomIn { panel: usize, t: f64 },
    Focus { panel: usize },
    ZoomOut { panel: usize, t: f64 },
    /// Overview hold before chapter `next` starts.
    Gap { next: usize },
}

/// Start and end of every chapter on the grid clock.
///
/// Chapter `k + 1` starts after chapter `k` has played, the camera has zoomed out and the gap
/// has elapsed. Zoom-in overlaps the start of the assembly.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSchedule {
    starts: Vec<f64>,
    durations: Vec<f64>,
    timings: GridTimings,
}

impl GridSchedule {
    pub fn new(durations_ms: &[f64], timings: GridTimings) -> Self {
        let mut starts = Vec::with_capacity(durations_ms.len());
        let mut t = 0.0;
        for d in durations_ms {
            starts.push(t);
            t += d.max(0.0) + timings.zoom_out_ms + timings.panel_gap_ms;
        }
        Self {
            starts,
            durations: durations_ms.iter().map(|d| d.max(0.0)).collect(),
            timings,
        }
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn start_ms(&self, k: usize) -> f64 {
        self.starts.get(k).copied().unwrap_or(f64::INFINITY)
    }

    pub fn duration_ms(&self, k: usize) -> f64 {
        self.durations.get(k).copied().unwrap_or(0.0)
    }

    pub fn end_ms(&self, k: usize) -> f64 {
        self.start_ms(k) + self.duration_ms(k)
    }

    /// End of the last zoom-out; the finale clock starts here.
    pub fn finale_start_ms(&self) -> f64 {
        match self.len() {
            0 => 0.0,
            n => self.end_ms(n - 1) + self.timings.zoom_out_ms,
        }
    }

    /// Chapters started by `elapsed_ms`.
    pub fn started(&self, elapsed_ms: f64) -> usize {
        self.starts.iter().take_while(|s| elapsed_ms >= **s).count()
    }

    pub fn shot(&self, elapsed_ms: f64) -> CameraShot {
        for k in 0..self.len() {
            let start = self.start_ms(k);
            let end = self.end_ms(k);
            if elapsed_ms < start {
                return if k == 0 {
                    CameraShot::Overview
                } else {
                    CameraShot::Gap { next: k }
                };
            }
            let zoomed_in = (start + self.timings.zoom_in_ms).min(end);
            if elapsed_ms < zoomed_in {
                return CameraShot::ZoomIn {
                    panel: k,
                    t: (elapsed_ms - start) / self.timings.zoom_in_ms.max(1.0),
                };
            }
            if elapsed_ms < end {
                return CameraShot::Focus { panel: k };
            }
            if elapsed_ms < end + self.timings.zoom_out_ms {
                return CameraShot::ZoomOut {
                    panel: k,
                    t: (elapsed_ms - end) / self.timings.zoom_out_ms.max(1.0),
                };
            }
        }
        CameraShot::Overview
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/camera.rs"]
mod tests;
