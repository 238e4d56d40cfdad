//! Cell placement for every tiling scheme.
//!
//! Each layout targets roughly `piece_count` cells of equal area over the canvas. Schemes whose
//! rows interlock (brick, hexagon, diamond) over-generate around the border and drop cells that
//! do not touch the canvas.

use crate::config::chapter::Shape;
use crate::foundation::core::{Canvas, Rect};

/// Outline family of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CellKind {
    Rect,
    /// Half of a square cell; `flip` selects the anti-diagonal.
    Triangle { flip: bool },
    Hexagon,
    Diamond,
    Jigsaw,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Cell {
    pub(crate) row: i32,
    pub(crate) col: i32,
    pub(crate) sub: u8,
    pub(crate) target: Rect,
    pub(crate) kind: CellKind,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CellLayout {
    pub(crate) cells: Vec<Cell>,
    /// Grid dimensions (square and jigsaw only).
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) piece_w: f64,
    pub(crate) piece_h: f64,
}

pub(crate) fn layout(shape: Shape, canvas: Canvas, piece_count: u32) -> CellLayout {
    if piece_count == 0 {
        return CellLayout::default();
    }
    let area = canvas.area() / f64::from(piece_count);
    match shape {
        Shape::Square => square_grid(canvas, area, CellKind::Rect),
        Shape::Jigsaw => square_grid(canvas, area, CellKind::Jigsaw),
        Shape::Triangle => triangles(canvas, piece_count),
        Shape::Brick => bricks(canvas, area),
        Shape::Hexagon => hexagons(canvas, area),
        Shape::Diamond => diamonds(canvas, area),
    }
}

fn grid_dims(canvas: Canvas, side: f64) -> (usize, usize) {
    // Tolerate float noise so an exact fit does not add an empty column.
    let cols = (canvas.w() / side - 1e-9).ceil().max(1.0) as usize;
    let rows = (canvas.h() / side - 1e-9).ceil().max(1.0) as usize;
    (rows, cols)
}

fn square_grid(canvas: Canvas, area: f64, kind: CellKind) -> CellLayout {
    let side = area.sqrt();
    let (rows, cols) = grid_dims(canvas, side);
    let ox = (canvas.w() - cols as f64 * side) * 0.5;
    let oy = (canvas.h() - rows as f64 * side) * 0.5;
    let mut cells = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let x = ox + c as f64 * side;
            let y = oy + r as f64 * side;
            cells.push(Cell {
                row: r as i32,
                col: c as i32,
                sub: 0,
                target: Rect::new(x, y, x + side, y + side),
                kind,
            });
        }
    }
    CellLayout {
        cells,
        rows,
        cols,
        piece_w: side,
        piece_h: side,
    }
}

fn triangles(canvas: Canvas, piece_count: u32) -> CellLayout {
    let cell_count = piece_count.div_ceil(2);
    let side = (canvas.area() / f64::from(cell_count)).sqrt();
    let (rows, cols) = grid_dims(canvas, side);
    let ox = (canvas.w() - cols as f64 * side) * 0.5;
    let oy = (canvas.h() - rows as f64 * side) * 0.5;
    let mut cells = Vec::with_capacity(rows * cols * 2);
    for r in 0..rows {
        for c in 0..cols {
            let x = ox + c as f64 * side;
            let y = oy + r as f64 * side;
            let flip = (r + c) % 2 == 1;
            for sub in 0..2 {
                cells.push(Cell {
                    row: r as i32,
                    col: c as i32,
                    sub,
                    target: Rect::new(x, y, x + side, y + side),
                    kind: CellKind::Triangle { flip },
                });
            }
        }
    }
    CellLayout {
        cells,
        rows,
        cols,
        piece_w: side,
        piece_h: side,
    }
}

/// Cells overlapping the canvas by less than half a pixel are dropped.
fn touches(canvas: Canvas, r: Rect) -> bool {
    r.intersect(canvas.rect()).area() > 0.5
}

fn bricks(canvas: Canvas, area: f64) -> CellLayout {
    let w = (2.0 * area).sqrt();
    let h = (area / 2.0).sqrt();
    let cols = (canvas.w() / w).ceil() as i32;
    let rows = (canvas.h() / h).ceil() as i32;
    let mut cells = Vec::new();
    for r in -1..=rows {
        let shift = if r.rem_euclid(2) == 1 { w * 0.5 } else { 0.0 };
        for c in -1..=cols {
            let x = c as f64 * w - shift;
            let y = r as f64 * h;
            let target = Rect::new(x, y, x + w, y + h);
            if touches(canvas, target) {
                cells.push(Cell {
                    row: r,
                    col: c,
                    sub: 0,
                    target,
                    kind: CellKind::Rect,
                });
            }
        }
    }
    CellLayout {
        cells,
        rows: 0,
        cols: 0,
        piece_w: w,
        piece_h: h,
    }
}

fn hexagons(canvas: Canvas, area: f64) -> CellLayout {
    let radius = (area / (3.0 * 3f64.sqrt() / 2.0)).sqrt();
    let w = 3f64.sqrt() * radius;
    let h = 2.0 * radius;
    let step_y = 1.5 * radius;
    let cols = (canvas.w() / w).ceil() as i32;
    let rows = (canvas.h() / step_y).ceil() as i32;
    let mut cells = Vec::new();
    for r in -2..rows + 2 {
        let shift = if r.rem_euclid(2) == 1 { w * 0.5 } else { 0.0 };
        for c in -1..cols + 2 {
            let cx = c as f64 * w + shift;
            let cy = r as f64 * step_y;
            let target = Rect::new(cx - w * 0.5, cy - radius, cx + w * 0.5, cy + radius);
            if touches(canvas, target) {
                cells.push(Cell {
                    row: r,
                    col: c,
                    sub: 0,
                    target,
                    kind: CellKind::Hexagon,
                });
            }
        }
    }
    CellLayout {
        cells,
        rows: 0,
        cols: 0,
        piece_w: w,
        piece_h: h,
    }
}

fn diamonds(canvas: Canvas, area: f64) -> CellLayout {
    let d = (2.0 * area).sqrt();
    let half = d * 0.5;
    let cols = (canvas.w() / d).ceil() as i32;
    let rows = (canvas.h() / half).ceil() as i32;
    let mut cells = Vec::new();
    for r in -3..rows + 3 {
        let shift = if r.rem_euclid(2) == 1 { half } else { 0.0 };
        for c in -2..cols + 2 {
            let cx = c as f64 * d + shift;
            let cy = r as f64 * half;
            let target = Rect::new(cx - half, cy - half, cx + half, cy + half);
            if touches(canvas, target) {
                cells.push(Cell {
                    row: r,
                    col: c,
                    sub: 0,
                    target,
                    kind: CellKind::Diamond,
                });
            }
        }
    }
    CellLayout {
        cells,
        rows: 0,
        cols: 0,
        piece_w: d,
        piece_h: d,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tessellation/layout.rs"]
mod tests;
