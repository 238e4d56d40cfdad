use super::*;
use crate::physics::world::CollisionFilter;

fn world() -> ImpulseWorld {
    ImpulseWorld::new(Rect::new(0.0, 0.0, 400.0, 800.0))
}

fn piece_at(i: usize, x: f64, y: f64) -> BodyDesc {
    BodyDesc::piece(i, Point::new(x, y), 0.0, Vec2::new(10.0, 10.0))
}

#[test]
fn gravity_accelerates_dynamic_bodies() {
    let mut w = world();
    w.set_gravity(Vec2::new(0.0, 1000.0));
    let h = w.add_body(piece_at(0, 100.0, 100.0)).unwrap();
    for _ in 0..30 {
        w.step(1000.0 / 60.0);
    }
    let s = w.body(h).unwrap();
    assert!(s.position.y > 150.0);
    assert!(s.velocity.y > 0.0);
}

#[test]
fn frozen_bodies_wait_for_wake() {
    let mut w = world();
    w.set_gravity(Vec2::new(0.0, 1000.0));
    let h = w
        .add_body(piece_at(0, 100.0, 100.0).with_kind(BodyKind::Frozen))
        .unwrap();
    w.step(100.0);
    assert_eq!(w.body(h).unwrap().position, Point::new(100.0, 100.0));
    w.wake(h);
    w.step(100.0);
    assert!(w.body(h).unwrap().position.y > 100.0);
}

#[test]
fn ground_stops_falling_bodies() {
    let mut w = world();
    w.set_gravity(Vec2::new(0.0, 2000.0));
    w.add_body(BodyDesc::fixed(Point::new(200.0, 820.0), Vec2::new(400.0, 20.0)))
        .unwrap();
    let h = w.add_body(piece_at(0, 200.0, 700.0)).unwrap();
    for _ in 0..300 {
        w.step(1000.0 / 60.0);
    }
    let s = w.body(h).unwrap();
    assert!(s.position.y <= 800.0, "fell through: {}", s.position.y);
    assert!(s.position.y > 760.0);
}

#[test]
fn impulses_scale_with_inverse_mass() {
    let mut w = world();
    let light = w.add_body(piece_at(0, 50.0, 50.0).with_mass(1.0)).unwrap();
    let heavy = w.add_body(piece_at(1, 300.0, 50.0).with_mass(4.0)).unwrap();
    w.apply_impulse(light, Vec2::new(100.0, 0.0));
    w.apply_impulse(heavy, Vec2::new(100.0, 0.0));
    assert_eq!(w.body(light).unwrap().velocity.x, 100.0);
    assert_eq!(w.body(heavy).unwrap().velocity.x, 25.0);
}

#[test]
fn solid_pieces_push_each_other_apart() {
    let mut w = world();
    let filter = crate::physics::world::CollisionFilter::solid_piece();
    let a = w.add_body(piece_at(0, 100.0, 100.0).with_filter(filter)).unwrap();
    let b = w.add_body(piece_at(1, 105.0, 100.0).with_filter(filter)).unwrap();
    w.step(1000.0 / 60.0);
    let pa = w.body(a).unwrap().position;
    let pb = w.body(b).unwrap().position;
    assert!(pb.x - pa.x >= 19.9);
}

#[test]
fn ghost_pieces_overlap_freely() {
    let mut w = world();
    let a = w.add_body(piece_at(0, 100.0, 100.0)).unwrap();
    let b = w.add_body(piece_at(1, 105.0, 100.0)).unwrap();
    w.step(1000.0 / 60.0);
    assert_eq!(w.body(a).unwrap().position, Point::new(100.0, 100.0));
    assert_eq!(w.body(b).unwrap().position, Point::new(105.0, 100.0));
}

#[test]
fn far_away_bodies_fall_asleep() {
    let mut w = world();
    let h = w.add_body(piece_at(0, 200.0, 400.0)).unwrap();
    w.set_velocity(h, Vec2::new(50_000.0, 0.0));
    w.step(200.0);
    let s = w.body(h).unwrap();
    assert!(s.sleeping);
    assert_eq!(s.velocity, Vec2::ZERO);
}

#[test]
fn clear_invalidates_handles() {
    let mut w = world();
    let h = w.add_body(piece_at(0, 1.0, 1.0)).unwrap();
    assert_eq!(w.poses().len(), 1);
    w.clear();
    assert_eq!(w.body_count(), 0);
    assert!(w.body(h).is_none());
    assert!(w.poses().is_empty());
    w.clear();
    assert_eq!(w.body_count(), 0);
}

#[test]
fn static_bodies_ignore_velocity() {
    let mut w = world();
    let h = w
        .add_body(BodyDesc::fixed(Point::new(10.0, 10.0), Vec2::new(5.0, 5.0)))
        .unwrap();
    w.set_velocity(h, Vec2::new(10.0, 0.0));
    w.apply_impulse(h, Vec2::new(10.0, 0.0));
    w.step(100.0);
    assert_eq!(w.body(h).unwrap().position, Point::new(10.0, 10.0));
    assert!(w.poses().is_empty());
}

#[test]
fn dynamic_contacts_can_be_switched_off() {
    let solid = |i: usize, x: f64| {
        piece_at(i, x, 100.0).with_filter(CollisionFilter::solid_piece())
    };
    let mut on = world();
    let a = on.add_body(solid(0, 100.0)).unwrap();
    let b = on.add_body(solid(1, 105.0)).unwrap();
    on.step(1000.0 / 60.0);
    let gap_on = on.body(b).unwrap().position.x - on.body(a).unwrap().position.x;
    assert!(gap_on > 5.0, "{gap_on}");

    let mut off = world();
    off.set_dynamic_contacts(false);
    let a = off.add_body(solid(0, 100.0)).unwrap();
    let b = off.add_body(solid(1, 105.0)).unwrap();
    off.step(1000.0 / 60.0);
    let gap_off = off.body(b).unwrap().position.x - off.body(a).unwrap().position.x;
    assert!((gap_off - 5.0).abs() < 1e-9, "{gap_off}");
}
