use super::*;
use crate::foundation::core::{BezPath, Point, Rect};
use crate::physics::{ImpulseWorld, NullWorld};

fn pieces() -> Vec<Piece> {
    (0..20)
        .map(|i| {
            let x = (i % 5) as f64 * 40.0;
            let y = (i / 5) as f64 * 40.0;
            Piece {
                id: i,
                row: (i / 5) as i32,
                col: (i % 5) as i32,
                sub: 0,
                target: Rect::new(x, y, x + 40.0, y + 40.0),
                sample: Rect::new(0.0, 0.0, 1.0, 1.0),
                width: 40.0,
                height: 40.0,
                origin: Point::ORIGIN,
                rotation: 0.0,
                z: 0.0,
                order: i,
                tabs: None,
                outline: BezPath::new(),
                bitmap: None,
                padding: 24.0,
            }
        })
        .collect()
}

fn canvas() -> Canvas {
    Canvas::new(200, 160).unwrap()
}

#[test]
fn runs_wait_then_effect_then_finishes() {
    let mut world = ImpulseWorld::new(canvas().rect());
    let mut eng = TransitionEngine::new(canvas(), 800.0, 3);
    assert!(eng.start(&pieces(), &mut world, Some(TransitionEffect::Explosion), 1000.0));
    assert!(matches!(eng.tick(1500.0, &mut world), TransitionStatus::Waiting { .. }));
    assert_eq!(world.body_count(), 0);

    let st = eng.tick(1800.0, &mut world);
    assert!(matches!(st, TransitionStatus::Running { .. }));
    assert!(eng.controls_pieces());
    assert_eq!(world.body_count(), 20);

    let end = 1800.0 + TransitionEffect::Explosion.duration_ms();
    assert!(matches!(eng.tick(end - 1.0, &mut world), TransitionStatus::Running { .. }));
    assert_eq!(
        eng.tick(end, &mut world),
        TransitionStatus::Finished {
            effect: TransitionEffect::Explosion
        }
    );
    assert!(eng.is_finished());
    assert!(!eng.is_active());
    assert_eq!(world.body_count(), 0);
}

#[test]
fn second_start_while_active_is_ignored() {
    let mut world = ImpulseWorld::new(canvas().rect());
    let mut eng = TransitionEngine::new(canvas(), 0.0, 3);
    assert!(eng.start(&pieces(), &mut world, Some(TransitionEffect::Wind), 0.0));
    assert!(!eng.start(&pieces(), &mut world, Some(TransitionEffect::Gravity), 0.0));
    assert_eq!(eng.effect(), Some(TransitionEffect::Wind));
    eng.tick(10.0, &mut world);
    assert!(!eng.start(&pieces(), &mut world, Some(TransitionEffect::Gravity), 10.0));
    assert_eq!(world.body_count(), 20);
}

#[test]
fn cancel_is_idempotent() {
    let mut world = ImpulseWorld::new(canvas().rect());
    let mut eng = TransitionEngine::new(canvas(), 0.0, 3);
    eng.start(&pieces(), &mut world, Some(TransitionEffect::Sweep), 0.0);
    eng.tick(100.0, &mut world);
    assert!(world.body_count() > 0);

    eng.cancel(&mut world);
    assert_eq!(world.body_count(), 0);
    eng.cancel(&mut world);
    assert_eq!(world.body_count(), 0);
    assert_eq!(eng.tick(5000.0, &mut world), TransitionStatus::Idle);
    assert_eq!(world.body_count(), 0);
}

#[test]
fn cancel_during_wait_prevents_apply() {
    let mut world = ImpulseWorld::new(canvas().rect());
    let mut eng = TransitionEngine::new(canvas(), 800.0, 3);
    eng.start(&pieces(), &mut world, None, 0.0);
    eng.cancel(&mut world);
    eng.tick(900.0, &mut world);
    assert_eq!(world.body_count(), 0);
    assert!(eng.start(&pieces(), &mut world, None, 1000.0));
}

#[test]
fn missing_backend_still_finishes_on_deadline() {
    let mut world = NullWorld;
    let mut eng = TransitionEngine::new(canvas(), 800.0, 3);
    eng.start(&pieces(), &mut world, Some(TransitionEffect::UfoBeam), 0.0);
    eng.tick(800.0, &mut world);
    assert!(eng.is_active());
    let end = 800.0 + TransitionEffect::UfoBeam.duration_ms();
    assert!(matches!(
        eng.tick(end, &mut world),
        TransitionStatus::Finished { .. }
    ));
}

#[test]
fn random_selection_is_seeded() {
    let mut wa = NullWorld;
    let mut wb = NullWorld;
    let mut a = TransitionEngine::new(canvas(), 0.0, 77);
    let mut b = TransitionEngine::new(canvas(), 0.0, 77);
    a.start(&pieces(), &mut wa, None, 0.0);
    b.start(&pieces(), &mut wb, None, 0.0);
    assert_eq!(a.effect(), b.effect());
}
