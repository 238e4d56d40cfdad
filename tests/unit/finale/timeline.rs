use super::*;

fn last_plan(snapshots: usize) -> FinalePlan {
    FinalePlan::new(&FinaleTimings::default(), true, snapshots)
}

#[test]
fn phase_boundaries_follow_the_default_plan() {
    let p = last_plan(3);
    assert_eq!(finale_phase(-5.0, &p), FinalePhase::Idle);
    assert_eq!(finale_phase(0.0, &p), FinalePhase::Idle);
    assert_eq!(finale_phase(1.0, &p), FinalePhase::Pause { since_ms: 1.0 });
    assert_eq!(finale_phase(1500.0, &p), FinalePhase::Pause { since_ms: 1500.0 });
    assert_eq!(finale_phase(1501.0, &p), FinalePhase::Wave { since_ms: 1.0 });
    assert_eq!(finale_phase(4000.0, &p), FinalePhase::Settle { since_ms: 0.0 });
    assert_eq!(
        finale_phase(7000.0, &p),
        FinalePhase::Slideshow { index: 0, t: 0.0 }
    );
    assert_eq!(
        finale_phase(11_500.0, &p),
        FinalePhase::Slideshow { index: 1, t: 0.5 }
    );
    assert_eq!(finale_phase(16_000.0, &p), FinalePhase::Outro { t: 0.0 });
    assert_eq!(finale_phase(20_000.0, &p), FinalePhase::Done);
    assert_eq!(p.total_ms(), 20_000.0);
    assert_eq!(p.collapse_at_ms(), 4500.0);
}

#[test]
fn single_snapshot_skips_the_slideshow() {
    let p = last_plan(1);
    assert_eq!(p.slides, 0);
    assert_eq!(finale_phase(7000.0, &p), FinalePhase::Outro { t: 0.0 });
    assert_eq!(p.total_ms(), 11_000.0);
}

#[test]
fn slides_are_capped_at_nine() {
    assert_eq!(last_plan(12).slides, 9);
}

#[test]
fn non_last_chapter_has_no_slideshow_or_outro() {
    let p = FinalePlan::new(&FinaleTimings::default(), false, 5);
    assert_eq!(p.slides, 0);
    assert_eq!(p.outro_ms, 0.0);
    assert_eq!(p.total_ms(), 7000.0);
    assert_eq!(finale_phase(7000.0, &p), FinalePhase::Done);
}

#[test]
fn wave_start_gates_offsets() {
    assert!(!FinalePhase::Pause { since_ms: 3.0 }.after_wave_start());
    assert!(FinalePhase::Wave { since_ms: 3.0 }.after_wave_start());
    assert!(FinalePhase::Done.is_done());
}
