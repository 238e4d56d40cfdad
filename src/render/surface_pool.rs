use std::collections::HashMap;

use crate::foundation::error::ReelResult;
use crate::render::paint::size_u16;

/// Pool configuration for cached piece bitmaps.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained pixmaps per `(w, h)` bucket.
    pub max_surfaces_per_bucket: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 256 * 1024 * 1024,
            // One tessellation shares a single bitmap size for most shapes.
            max_surfaces_per_bucket: 2048,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SurfaceKey {
    w: u32,
    h: u32,
}

impl SurfaceKey {
    fn byte_len(self) -> usize {
        (self.w as usize)
            .saturating_mul(self.h as usize)
            .saturating_mul(4)
    }
}

#[derive(Debug, Default, Clone)]
pub struct SurfacePoolStats {
    pub retained_surfaces: usize,
    pub retained_bytes: usize,
    pub alloc_surfaces: u64,
    pub alloc_bytes: u64,
    pub reused_surfaces: u64,
    pub dropped_on_release: u64,
}

struct Bucket {
    surfaces: Vec<vello_cpu::Pixmap>,
}

/// Bounded pooled allocator for piece bitmaps.
///
/// Bitmaps of a retired piece set come back here so the next chapter's tessellation can reuse
/// them instead of allocating.
pub struct SurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,

    bucket_idx_by_key: HashMap<SurfaceKey, usize>,
    buckets: Vec<Bucket>,
}

impl Default for SurfacePool {
    fn default() -> Self {
        Self::new(SurfacePoolOpts::default())
    }
}

impl SurfacePool {
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            bucket_idx_by_key: HashMap::new(),
            buckets: Vec::new(),
        }
    }

    pub fn stats(&self) -> SurfacePoolStats {
        self.stats.clone()
    }

    /// A cleared `width`×`height` pixmap, reused when one is retained.
    pub fn borrow(&mut self, width: u32, height: u32) -> ReelResult<vello_cpu::Pixmap> {
        let key = SurfaceKey {
            w: width,
            h: height,
        };
        if let Some(&bi) = self.bucket_idx_by_key.get(&key)
            && let Some(mut p) = self.buckets[bi].surfaces.pop()
        {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(key.byte_len());
            self.stats.reused_surfaces = self.stats.reused_surfaces.saturating_add(1);
            p.data_as_u8_slice_mut().fill(0);
            return Ok(p);
        }

        let (w, h) = size_u16(width, height)?;
        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(key.byte_len() as u64);
        Ok(vello_cpu::Pixmap::new(w, h))
    }

    pub fn release(&mut self, pixmap: vello_cpu::Pixmap) {
        if self.opts.max_pool_bytes == 0 || self.opts.max_surfaces_per_bucket == 0 {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let key = SurfaceKey {
            w: u32::from(pixmap.width()),
            h: u32::from(pixmap.height()),
        };
        let bytes = key.byte_len();

        if self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bi = match self.bucket_idx_by_key.get(&key).copied() {
            Some(i) => i,
            None => {
                let i = self.buckets.len();
                self.buckets.push(Bucket {
                    surfaces: Vec::new(),
                });
                self.bucket_idx_by_key.insert(key, i);
                i
            }
        };

        let bucket = &mut self.buckets[bi];
        if bucket.surfaces.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.surfaces.push(pixmap);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }

    pub fn release_all(&mut self, pixmaps: impl IntoIterator<Item = vello_cpu::Pixmap>) {
        for p in pixmaps {
            self.release(p);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
