use super::*;

#[test]
fn filters_are_symmetric() {
    let ghost = CollisionFilter::ghost_piece();
    let solid = CollisionFilter::solid_piece();
    let scenery = CollisionFilter::scenery();
    assert!(!ghost.collides_with(ghost));
    assert!(!ghost.collides_with(solid));
    assert!(solid.collides_with(solid));
    assert!(ghost.collides_with(scenery) && scenery.collides_with(ghost));
    assert!(!scenery.collides_with(scenery));
    assert!(CollisionFilter::tool().collides_with(ghost));
}

#[test]
fn piece_desc_defaults() {
    let d = BodyDesc::piece(4, Point::new(1.0, 2.0), 0.5, Vec2::new(10.0, 20.0));
    assert_eq!(d.piece, Some(4));
    assert_eq!(d.kind, BodyKind::Dynamic);
    assert!(d.mass > 0.0);
    let f = BodyDesc::fixed(Point::ORIGIN, Vec2::new(5.0, 5.0)).with_kind(BodyKind::Static);
    assert_eq!(f.piece, None);
    assert_eq!(f.filter, CollisionFilter::scenery());
}

#[test]
fn poses_map_piece_ids() {
    let mut p = PhysicsPoses::default();
    assert!(p.is_empty());
    p.insert(
        3,
        Pose {
            position: Point::new(1.0, 1.0),
            angle: 0.2,
        },
    );
    assert!(p.contains(3));
    assert_eq!(p.get(3).unwrap().angle, 0.2);
    assert_eq!(p.get(4), None);
    assert_eq!(p.iter().count(), 1);
}
