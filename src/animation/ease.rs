/// Progress curves for flights, camera moves and slides. Input is clamped to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
    OutCubic,
    InOutCubic,
    /// Long settle; landing pieces.
    OutQuart,
    /// Camera pans: slow start, fast middle, slow stop.
    InOutQuint,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let mirror = |p: i32| 1.0 - (2.0 - 2.0 * t).powi(p) / 2.0;
        match self {
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutCubic if t < 0.5 => 4.0 * t.powi(3),
            Self::InOutCubic => mirror(3),
            Self::InOutQuint if t < 0.5 => 16.0 * t.powi(5),
            Self::InOutQuint => mirror(5),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
