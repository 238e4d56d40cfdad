pub mod background;
pub mod compositor;
pub mod overlay;
pub(crate) mod paint;
pub mod surface;
pub mod surface_pool;

use crate::assets::material::MaterialCache;
use crate::assets::text::TextCache;

pub use background::BackgroundCache;
pub use compositor::{DrawOrderCache, FrameInput, render_frame};
pub use surface::{FrameRGBA, Snapshot, Surface};
pub use surface_pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};

/// Every render-side cache, owned by one session.
///
/// Nothing here is global: two sessions never share textures, layouts or pooled pixmaps.
#[derive(Default)]
pub struct RenderCaches {
    pub materials: MaterialCache,
    pub pool: SurfacePool,
    pub text: TextCache,
    pub backgrounds: BackgroundCache,
    pub draw_order: DrawOrderCache,
}

impl RenderCaches {
    pub fn new(font: Option<Vec<u8>>) -> Self {
        Self {
            text: TextCache::new(font),
            ..Self::default()
        }
    }

    /// Return the bitmaps of a retired piece set to the pool.
    pub fn retire(&mut self, set: &mut crate::tessellation::piece::PieceSet) {
        let bitmaps = set.take_bitmaps();
        let n = bitmaps.len();
        self.pool.release_all(bitmaps);
        tracing::debug!(bitmaps = n, "retired piece set");
    }
}
