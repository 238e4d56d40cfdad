use super::*;
use crate::foundation::core::{Point, Vec2};

#[test]
fn backends_report_availability() {
    let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert!(PhysicsBackend::Impulse.create(bounds).is_available());
    assert!(!PhysicsBackend::Null.create(bounds).is_available());
}

#[test]
fn null_world_ignores_everything() {
    let mut w = PhysicsBackend::Null.create(Rect::new(0.0, 0.0, 10.0, 10.0));
    let desc = BodyDesc::piece(0, Point::new(1.0, 1.0), 0.0, Vec2::new(1.0, 1.0));
    assert!(w.add_body(desc).is_none());
    w.set_gravity(Vec2::new(0.0, 10.0));
    w.step(16.0);
    assert_eq!(w.gravity(), Vec2::ZERO);
    assert_eq!(w.body_count(), 0);
    assert!(w.poses().is_empty());
    w.clear();
}

#[test]
fn backend_names_are_snake_case() {
    let s = serde_json::to_string(&PhysicsBackend::Null).unwrap();
    assert_eq!(s, "\"null\"");
    let b: PhysicsBackend = serde_json::from_str("\"impulse\"").unwrap();
    assert_eq!(b, PhysicsBackend::Impulse);
}
