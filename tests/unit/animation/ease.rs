use super::*;

const ALL: [Ease; 4] = [
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::OutQuart,
    Ease::InOutQuint,
];

#[test]
fn endpoints_are_fixed() {
    for e in ALL {
        assert!(e.apply(0.0).abs() < 1e-12, "{e:?}");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::InOutQuint.apply(-3.0), 0.0);
    assert_eq!(Ease::OutQuart.apply(7.0), 1.0);
}

#[test]
fn in_out_curves_meet_at_the_midpoint() {
    for e in [Ease::InOutCubic, Ease::InOutQuint] {
        assert!((e.apply(0.5) - 0.5).abs() < 1e-12, "{e:?}");
        assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < 1e-12, "{e:?}");
    }
}

#[test]
fn out_curves_lead_linear_progress() {
    for e in [Ease::OutCubic, Ease::OutQuart] {
        assert!(e.apply(0.3) > 0.3, "{e:?}");
    }
    assert!(Ease::OutQuart.apply(0.3) > Ease::OutCubic.apply(0.3));
}

#[test]
fn curves_are_monotonic() {
    for e in ALL {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = e.apply(i as f64 / 100.0);
            assert!(v + 1e-12 >= prev, "{e:?} at {i}");
            prev = v;
        }
    }
}
