use crate::foundation::math::Rng64;
use crate::tessellation::piece::TabEdges;

/// Tab directions for every cell of a jigsaw grid.
///
/// Each shared edge is decided once and mirrored onto the neighbor, so adjacent pieces always
/// interlock. Border edges are flat.
#[derive(Clone, Debug)]
pub struct ConnectivityGrid {
    rows: usize,
    cols: usize,
    edges: Vec<TabEdges>,
}

impl ConnectivityGrid {
    pub fn generate(rows: usize, cols: usize, rng: &mut Rng64) -> Self {
        let mut edges = vec![TabEdges::default(); rows.saturating_mul(cols)];
        for r in 0..rows {
            for c in 0..cols {
                let top = if r == 0 { 0 } else { -edges[(r - 1) * cols + c].bottom };
                let left = if c == 0 { 0 } else { -edges[r * cols + c - 1].right };
                let right = if c + 1 == cols { 0 } else { rng.sign() };
                let bottom = if r + 1 == rows { 0 } else { rng.sign() };
                edges[r * cols + c] = TabEdges {
                    top,
                    right,
                    bottom,
                    left,
                };
            }
        }
        Self { rows, cols, edges }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Edges of cell `(row, col)`; flat edges outside the grid.
    pub fn get(&self, row: usize, col: usize) -> TabEdges {
        if row >= self.rows || col >= self.cols {
            return TabEdges::default();
        }
        self.edges[row * self.cols + col]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tessellation/connectivity.rs"]
mod tests;
