use super::*;
use crate::foundation::core::{BezPath, Rect};

fn piece(id: usize) -> Piece {
    Piece {
        id,
        row: 0,
        col: 0,
        sub: 0,
        target: Rect::new(400.0, 900.0, 500.0, 1000.0),
        sample: Rect::new(0.0, 0.0, 1.0, 1.0),
        width: 100.0,
        height: 100.0,
        origin: Point::new(-300.0, 2600.0),
        rotation: 2.1,
        z: 0.3,
        order: 0,
        tabs: None,
        outline: BezPath::new(),
        bitmap: None,
        padding: 60.0,
    }
}

#[test]
fn every_movement_lands_on_target() {
    for id in [0, 1] {
        let p = piece(id);
        for m in Movement::ALL {
            let tr = transform(&p, 1.0, m);
            assert!((tr.x - 450.0).abs() < 1e-6, "{m:?} x={}", tr.x);
            assert!((tr.y - 950.0).abs() < 1e-6, "{m:?} y={}", tr.y);
            assert!(tr.rotation.abs() < 1e-6, "{m:?} rot={}", tr.rotation);
            assert!((tr.scale - 1.0).abs() < 1e-6, "{m:?} scale={}", tr.scale);
        }
    }
}

#[test]
fn standard_flight_and_elastic_start_at_origin() {
    let p = piece(0);
    for m in [Movement::Standard, Movement::Flight, Movement::Elastic, Movement::Vortex] {
        let tr = transform(&p, 0.0, m);
        assert!((tr.x + 300.0).abs() < 1e-6, "{m:?}");
        assert!((tr.y - 2600.0).abs() < 1e-6, "{m:?}");
    }
}

#[test]
fn transform_is_bit_identical_across_calls() {
    let p = piece(3);
    for m in Movement::ALL {
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let a = transform(&p, t, m);
            let b = transform(&p, t, m);
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.rotation.to_bits(), b.rotation.to_bits());
            assert_eq!(a.scale.to_bits(), b.scale.to_bits());
        }
    }
}

#[test]
fn vortex_shrinks_toward_target() {
    let p = piece(0);
    let early = transform(&p, 0.0, Movement::Vortex);
    let late = transform(&p, 0.9, Movement::Vortex);
    assert!((early.scale - 0.6).abs() < 1e-9);
    let d_early = early.center().distance(p.target_center());
    let d_late = late.center().distance(p.target_center());
    assert!(d_late < d_early);
}

#[test]
fn elastic_overshoots_after_landing() {
    let p = piece(0);
    let landed = transform(&p, ELASTIC_LAND, Movement::Elastic);
    assert!(landed.center().distance(p.target_center()) < 1e-6);
    let wobble = transform(&p, 0.87, Movement::Elastic);
    assert!(wobble.center().distance(p.target_center()) > 1.0);
}

#[test]
fn wave_offset_is_zero_outside_the_local_window() {
    assert_eq!(wave_offset(0.0, -1.0, 2500.0, 800.0, 65.0), Vec2::ZERO);
    assert_eq!(wave_offset(1.0, 100.0, 2500.0, 800.0, 65.0), Vec2::ZERO);
    let peak = wave_offset(0.0, 400.0, 2500.0, 800.0, 65.0);
    assert!((peak.y + 65.0).abs() < 1e-9);
    assert_eq!(wave_offset(1.0, 2500.0, 2500.0, 800.0, 65.0), Vec2::ZERO);
}
