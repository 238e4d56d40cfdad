use std::collections::HashMap;

use crate::config::chapter::Material;
use crate::foundation::error::ReelResult;
use crate::foundation::math::{hash_u32, mul_div255_u8};
use crate::render::paint::rgba_premul_to_image;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct MaterialKey {
    material: Material,
    w: u32,
    h: u32,
}

/// Lazily built overlay textures, shared by every piece in the same size bucket.
///
/// The key space is bounded (a handful of materials × the piece sizes of one tessellation), so
/// entries are never evicted.
#[derive(Default)]
pub struct MaterialCache {
    textures: HashMap<MaterialKey, vello_cpu::Image>,
    built: u64,
}

impl MaterialCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay for `material` at `w`×`h`, or `None` for [`Material::Plain`].
    pub fn texture(
        &mut self,
        material: Material,
        w: f64,
        h: f64,
    ) -> ReelResult<Option<vello_cpu::Image>> {
        if material == Material::Plain {
            return Ok(None);
        }
        let key = MaterialKey {
            material,
            w: w.round().max(1.0) as u32,
            h: h.round().max(1.0) as u32,
        };
        if let Some(img) = self.textures.get(&key) {
            return Ok(Some(img.clone()));
        }
        let bytes = texture_bytes(material, key.w, key.h);
        let img = rgba_premul_to_image(&bytes, key.w, key.h)?;
        self.textures.insert(key, img.clone());
        self.built = self.built.saturating_add(1);
        Ok(Some(img))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Number of textures generated so far (cache misses).
    pub fn built_count(&self) -> u64 {
        self.built
    }
}

fn texture_bytes(material: Material, w: u32, h: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    let seed = material as u64;
    for y in 0..h {
        for x in 0..w {
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            let px = match material {
                Material::Plain => [0, 0, 0, 0],
                Material::Cardboard => {
                    let n = (hash_u32(seed, x, y) & 0xFF) as u8;
                    let a = 18 + n / 8;
                    premul([120, 96, 64], a)
                }
                Material::Wood => {
                    let n = f64::from(hash_u32(seed, x / 3, y) & 0xFF) / 255.0;
                    let grain = ((f64::from(y) * 0.35 + n * 2.0).sin() * 0.5 + 0.5) * 60.0;
                    premul([110, 70, 35], 20 + grain as u8)
                }
                Material::Glass => {
                    let fx = f64::from(x) / f64::from(w.max(1));
                    let fy = f64::from(y) / f64::from(h.max(1));
                    let t = (fx + fy) * 0.5;
                    let a = ((1.0 - t).powi(2) * 110.0) as u8;
                    premul([255, 255, 255], a)
                }
                Material::Carbon => {
                    let cell = ((x / 4) + (y / 4)) % 2 == 0;
                    if cell {
                        premul([20, 20, 24], 90)
                    } else {
                        premul([45, 45, 52], 70)
                    }
                }
            };
            bytes[idx..idx + 4].copy_from_slice(&px);
        }
    }
    bytes
}

fn premul(rgb: [u8; 3], a: u8) -> [u8; 4] {
    let p = |c: u8| mul_div255_u8(u16::from(c), u16::from(a));
    [p(rgb[0]), p(rgb[1]), p(rgb[2]), a]
}

#[cfg(test)]
#[path = "../../tests/unit/assets/material.rs"]
mod tests;
