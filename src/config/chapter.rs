use crate::assets::image::SourceImage;
use crate::foundation::error::{ReelError, ReelResult};
use crate::transitions::effects::TransitionEffect;

/// Tiling scheme used to cut the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Square,
    Triangle,
    Hexagon,
    Brick,
    Diamond,
    Jigsaw,
}

impl Shape {
    pub const ALL: [Shape; 6] = [
        Shape::Square,
        Shape::Triangle,
        Shape::Hexagon,
        Shape::Brick,
        Shape::Diamond,
        Shape::Jigsaw,
    ];
}

/// Procedural overlay baked into every piece bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Plain,
    Cardboard,
    Wood,
    Glass,
    Carbon,
}

/// Flight style from scatter origin to target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    Standard,
    Flight,
    Vortex,
    Wave,
    Playful,
    Elastic,
}

impl Movement {
    pub const ALL: [Movement; 6] = [
        Movement::Standard,
        Movement::Flight,
        Movement::Vortex,
        Movement::Wave,
        Movement::Playful,
        Movement::Elastic,
    ];
}

/// Environment drawn behind the puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    Midnight,
    Gradient,
    WoodTable,
    Felt,
    BlurredImage,
}

/// How the chapter leaves the screen when it is not the last one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "effect")]
pub enum TransitionMode {
    /// Uniformly random effect from the registry.
    #[default]
    Random,
    /// Always the same effect.
    Pinned(TransitionEffect),
    /// No transition; the chapter runs the finale collapse instead.
    Off,
}

/// Inputs for one chapter.
#[derive(Clone, Debug)]
pub struct ChapterParams {
    pub piece_count: u32,
    pub shape: Shape,
    pub material: Material,
    pub movement: Movement,
    pub background: Background,
    pub duration_secs: f64,
    pub narrative: String,
    pub logo: Option<SourceImage>,
    pub call_to_action: Option<String>,
    pub is_last: bool,
    pub transition: TransitionMode,
    pub seed: u64,
}

impl Default for ChapterParams {
    fn default() -> Self {
        Self {
            piece_count: 100,
            shape: Shape::Jigsaw,
            material: Material::Cardboard,
            movement: Movement::Standard,
            background: Background::Midnight,
            duration_secs: 30.0,
            narrative: String::new(),
            logo: None,
            call_to_action: None,
            is_last: true,
            transition: TransitionMode::Random,
            seed: 0x5EED,
        }
    }
}

impl ChapterParams {
    pub fn validate(&self) -> ReelResult<()> {
        if self.piece_count == 0 {
            return Err(ReelError::validation("piece_count must be > 0"));
        }
        if self.piece_count > 10_000 {
            return Err(ReelError::validation("piece_count must be <= 10000"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(ReelError::validation("duration_secs must be finite and > 0"));
        }
        Ok(())
    }

    pub fn total_ms(&self) -> f64 {
        self.duration_secs * 1000.0
    }

    /// True when the finale (not a transition) follows the assembly.
    pub fn runs_finale(&self) -> bool {
        self.is_last || self.transition == TransitionMode::Off
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/chapter.rs"]
mod tests;
