use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::assets::image::SourceImage;
use crate::config::chapter::{
    Background, ChapterParams, Material, Movement, Shape, TransitionMode,
};
use crate::config::engine::EngineConfig;
use crate::foundation::error::{ReelError, ReelResult};

/// One chapter as written in a project file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChapterDef {
    /// Image path, relative to the project file.
    pub image: String,
    #[serde(default = "default_piece_count")]
    pub piece_count: u32,
    #[serde(default = "default_shape")]
    pub shape: Shape,
    #[serde(default = "default_material")]
    pub material: Material,
    #[serde(default = "default_movement")]
    pub movement: Movement,
    #[serde(default = "default_background")]
    pub background: Background,
    pub duration_secs: f64,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub transition: TransitionMode,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_piece_count() -> u32 {
    100
}

fn default_shape() -> Shape {
    Shape::Jigsaw
}

fn default_material() -> Material {
    Material::Cardboard
}

fn default_movement() -> Movement {
    Movement::Standard
}

fn default_background() -> Background {
    Background::Midnight
}

/// JSON project consumed by the command line renderer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectDef {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Composite all chapters into the 3×3 grid variant.
    #[serde(default)]
    pub grid: bool,
    pub chapters: Vec<ChapterDef>,
    #[serde(default)]
    pub logo: Option<String>,
    /// Font file used for narrative and outro text.
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub call_to_action: Option<String>,
}

fn default_fps() -> u32 {
    30
}

impl ProjectDef {
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let def: ProjectDef = serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse project JSON: {e}")))?;
        def.validate()?;
        Ok(def)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open project '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> ReelResult<()> {
        self.engine.validate()?;
        if self.fps == 0 || self.fps > 240 {
            return Err(ReelError::validation("fps must be within 1..=240"));
        }
        if self.chapters.is_empty() {
            return Err(ReelError::validation("project must contain at least one chapter"));
        }
        for (i, ch) in self.chapters.iter().enumerate() {
            if ch.image.trim().is_empty() {
                return Err(ReelError::validation(format!("chapter {i}: image must be set")));
            }
            if !ch.duration_secs.is_finite() || ch.duration_secs <= 0.0 {
                return Err(ReelError::validation(format!(
                    "chapter {i}: duration_secs must be finite and > 0"
                )));
            }
            if ch.piece_count == 0 {
                return Err(ReelError::validation(format!(
                    "chapter {i}: piece_count must be > 0"
                )));
            }
        }
        // Grid projects with a wrong chapter count are still accepted; the grid session shows its
        // not-ready state for them.
        Ok(())
    }

    /// Runtime parameters for chapter `index`. The last chapter gets the finale; chapters without
    /// an explicit seed derive one from their position.
    pub fn chapter_params(&self, index: usize, logo: Option<SourceImage>) -> Option<ChapterParams> {
        let ch = self.chapters.get(index)?;
        Some(ChapterParams {
            piece_count: ch.piece_count,
            shape: ch.shape,
            material: ch.material,
            movement: ch.movement,
            background: ch.background,
            duration_secs: ch.duration_secs,
            narrative: ch.narrative.clone(),
            logo,
            call_to_action: self.call_to_action.clone(),
            is_last: index + 1 == self.chapters.len(),
            transition: ch.transition,
            seed: ch
                .seed
                .unwrap_or(0x5EED ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        })
    }

    /// Resolve a project-relative path.
    pub fn resolve(root: &Path, rel: &str) -> PathBuf {
        let p = Path::new(rel);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            root.join(p)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/project.rs"]
mod tests;
