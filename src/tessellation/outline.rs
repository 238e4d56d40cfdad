use crate::foundation::core::{BezPath, Point, Vec2};
use crate::tessellation::layout::CellKind;
use crate::tessellation::piece::TabEdges;

/// Knob height as a fraction of the edge length.
const TAB_HEIGHT: f64 = 0.22;

/// Outline of a `w`×`h` cell in local coordinates.
pub(crate) fn outline(kind: CellKind, sub: u8, w: f64, h: f64, tabs: TabEdges) -> BezPath {
    match kind {
        CellKind::Rect => polygon(&[(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]),
        CellKind::Triangle { flip } => match (flip, sub) {
            (false, 0) => polygon(&[(0.0, 0.0), (w, 0.0), (w, h)]),
            (false, _) => polygon(&[(0.0, 0.0), (w, h), (0.0, h)]),
            (true, 0) => polygon(&[(0.0, 0.0), (w, 0.0), (0.0, h)]),
            (true, _) => polygon(&[(w, 0.0), (w, h), (0.0, h)]),
        },
        CellKind::Hexagon => {
            let r = h * 0.5;
            polygon(&[
                (w * 0.5, 0.0),
                (w, r * 0.5),
                (w, r * 1.5),
                (w * 0.5, h),
                (0.0, r * 1.5),
                (0.0, r * 0.5),
            ])
        }
        CellKind::Diamond => polygon(&[
            (w * 0.5, 0.0),
            (w, h * 0.5),
            (w * 0.5, h),
            (0.0, h * 0.5),
        ]),
        CellKind::Jigsaw => jigsaw(w, h, tabs),
    }
}

fn polygon(pts: &[(f64, f64)]) -> BezPath {
    let mut path = BezPath::new();
    for (i, &(x, y)) in pts.iter().enumerate() {
        if i == 0 {
            path.move_to((x, y));
        } else {
            path.line_to((x, y));
        }
    }
    path.close_path();
    path
}

fn jigsaw(w: f64, h: f64, tabs: TabEdges) -> BezPath {
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];
    let normals = [
        Vec2::new(0.0, -1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(-1.0, 0.0),
    ];
    let dirs = [tabs.top, tabs.right, tabs.bottom, tabs.left];

    let mut path = BezPath::new();
    path.move_to(corners[0]);
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        tab_edge(&mut path, a, b, normals[i], dirs[i]);
    }
    path.close_path();
    path
}

/// Append the edge `a → b`. A knob pointing along `normal` for `+1`, against it for `-1`.
fn tab_edge(path: &mut BezPath, a: Point, b: Point, normal: Vec2, dir: i8) {
    if dir == 0 {
        path.line_to(b);
        return;
    }
    let along = b - a;
    let len = along.hypot();
    let lift = normal * (len * TAB_HEIGHT * f64::from(dir));
    let at = |u: f64, v: f64| a + along * u + lift * v;

    path.line_to(at(0.38, 0.0));
    path.curve_to(at(0.42, 0.0), at(0.30, 1.0), at(0.50, 1.0));
    path.curve_to(at(0.70, 1.0), at(0.58, 0.0), at(0.62, 0.0));
    path.line_to(b);
}

#[cfg(test)]
#[path = "../../tests/unit/tessellation/outline.rs"]
mod tests;
