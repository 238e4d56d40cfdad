use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::chapter::Shape;
use crate::foundation::core::{BezPath, Canvas, Point, Rect};

/// Tab direction of each edge of a jigsaw piece: `+1` out, `-1` in, `0` flat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TabEdges {
    pub top: i8,
    pub right: i8,
    pub bottom: i8,
    pub left: i8,
}

/// Identity of one generated [`PieceSet`]. Never reused within a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceSetId(u64);

impl PieceSetId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// One tessellation cell.
#[derive(Clone, Debug)]
pub struct Piece {
    /// Index of the piece within its set.
    pub id: usize,
    pub row: i32,
    pub col: i32,
    /// Which half of a split cell (triangles); 0 otherwise.
    pub sub: u8,
    /// Final assembled bounds in canvas space.
    pub target: Rect,
    /// Target expanded by the padding margin, in source image pixels.
    pub sample: Rect,
    pub width: f64,
    pub height: f64,
    /// Scatter origin (piece center) in canvas space.
    pub origin: Point,
    pub rotation: f64,
    /// Layering key in `[0, 1)`; only affects draw order.
    pub z: f64,
    /// Position in the assembly permutation.
    pub order: usize,
    pub tabs: Option<TabEdges>,
    /// Outline in piece-local coordinates (`(0, 0)` is the target's top-left corner).
    pub outline: BezPath,
    pub bitmap: Option<Arc<vello_cpu::Pixmap>>,
    pub padding: f64,
}

impl Piece {
    pub fn target_center(&self) -> Point {
        self.target.center()
    }
}

/// A generated batch of pieces plus per-piece sticky completion flags.
pub struct PieceSet {
    id: PieceSetId,
    canvas: Canvas,
    shape: Shape,
    pieces: Vec<Piece>,
    completed: Vec<bool>,
    completed_count: usize,
    padding: f64,
    bitmap_scale: f64,
}

impl std::fmt::Debug for PieceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PieceSet")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("len", &self.pieces.len())
            .field("completed", &self.completed_count)
            .finish()
    }
}

impl PieceSet {
    pub(crate) fn new(
        canvas: Canvas,
        shape: Shape,
        pieces: Vec<Piece>,
        padding: f64,
        bitmap_scale: f64,
    ) -> Self {
        let n = pieces.len();
        Self {
            id: PieceSetId::next(),
            canvas,
            shape,
            pieces,
            completed: vec![false; n],
            completed_count: 0,
            padding,
            bitmap_scale,
        }
    }

    /// Set with no pieces, used for images that are not ready.
    pub fn empty(canvas: Canvas, shape: Shape) -> Self {
        Self::new(canvas, shape, Vec::new(), 0.0, 1.0)
    }

    pub fn id(&self) -> PieceSetId {
        self.id
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Bitmap pixels per canvas pixel.
    pub fn bitmap_scale(&self) -> f64 {
        self.bitmap_scale
    }

    /// Mark piece `i` completed. Returns true the first time only.
    pub fn mark_completed(&mut self, i: usize) -> bool {
        match self.completed.get_mut(i) {
            Some(done) if !*done => {
                *done = true;
                self.completed_count += 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_completed(&self, i: usize) -> bool {
        self.completed.get(i).copied().unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    pub fn all_completed(&self) -> bool {
        !self.pieces.is_empty() && self.completed_count == self.pieces.len()
    }

    /// Detach every bitmap that no one else holds, for return to a pool.
    pub(crate) fn take_bitmaps(&mut self) -> Vec<vello_cpu::Pixmap> {
        self.pieces
            .iter_mut()
            .filter_map(|p| p.bitmap.take())
            .filter_map(|a| Arc::try_unwrap(a).ok())
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tessellation/piece.rs"]
mod tests;
