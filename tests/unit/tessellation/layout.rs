use super::*;

fn covered(cells: &[Cell], x: f64, y: f64) -> bool {
    cells
        .iter()
        .any(|c| c.target.x0 <= x && x <= c.target.x1 && c.target.y0 <= y && y <= c.target.y1)
}

#[test]
fn every_shape_covers_the_canvas() {
    let canvas = Canvas::new(540, 1140).unwrap();
    for shape in Shape::ALL {
        for n in [50, 333, 2000] {
            let l = layout(shape, canvas, n);
            assert!(!l.cells.is_empty(), "{shape:?} {n}");
            let step = 7.0;
            let mut y = 0.0;
            while y <= canvas.h() {
                let mut x = 0.0;
                while x <= canvas.w() {
                    assert!(covered(&l.cells, x, y), "{shape:?} n={n} gap at ({x}, {y})");
                    x += step;
                }
                y += step;
            }
        }
    }
}

#[test]
fn cell_counts_track_the_request() {
    let canvas = Canvas::VERTICAL;
    for shape in Shape::ALL {
        let l = layout(shape, canvas, 200);
        let n = l.cells.len() as f64;
        assert!(n >= 150.0 && n <= 320.0, "{shape:?} produced {n} cells");
    }
}

#[test]
fn triangles_split_each_cell_in_two() {
    let l = layout(Shape::Triangle, Canvas::VERTICAL, 100);
    assert_eq!(l.cells.len(), l.rows * l.cols * 2);
    assert_eq!(l.cells[0].sub, 0);
    assert_eq!(l.cells[1].sub, 1);
    assert_eq!(l.cells[0].kind, CellKind::Triangle { flip: false });
}

#[test]
fn square_grid_is_centered() {
    let canvas = Canvas::new(1000, 1000).unwrap();
    let l = layout(Shape::Square, canvas, 9);
    assert_eq!((l.rows, l.cols), (3, 3));
    let first = l.cells[0].target;
    let last = l.cells[8].target;
    assert!((first.x0 + (last.x1 - canvas.w())).abs() < 1e-9);
}

#[test]
fn zero_pieces_yield_no_cells() {
    assert!(layout(Shape::Jigsaw, Canvas::VERTICAL, 0).cells.is_empty());
}
