use super::*;

fn schedule() -> GridSchedule {
    GridSchedule::new(&[10_000.0; PANELS], GridTimings::default())
}

#[test]
fn chapters_follow_duration_zoom_out_and_gap() {
    let s = schedule();
    assert_eq!(s.start_ms(0), 0.0);
    assert_eq!(s.start_ms(1), 12_000.0);
    assert_eq!(s.start_ms(8), 96_000.0);
    assert_eq!(s.finale_start_ms(), 107_200.0);
    assert_eq!(s.start_ms(9), f64::INFINITY);
    assert_eq!(s.started(0.0), 1);
    assert_eq!(s.started(11_999.0), 1);
    assert_eq!(s.started(12_000.0), 2);
    assert_eq!(s.started(1e9), PANELS);
}

#[test]
fn shots_cycle_through_every_state() {
    let s = schedule();
    assert_eq!(s.shot(600.0), CameraShot::ZoomIn { panel: 0, t: 0.5 });
    assert_eq!(s.shot(5_000.0), CameraShot::Focus { panel: 0 });
    assert_eq!(s.shot(10_600.0), CameraShot::ZoomOut { panel: 0, t: 0.5 });
    assert_eq!(s.shot(11_500.0), CameraShot::Gap { next: 1 });
    assert_eq!(s.shot(12_000.0), CameraShot::ZoomIn { panel: 1, t: 0.0 });
    assert_eq!(s.shot(200_000.0), CameraShot::Overview);
}

#[test]
fn panel_shots_stay_in_range() {
    let s = schedule();
    let mut t = 0.0;
    while t < 120_000.0 {
        match s.shot(t) {
            CameraShot::ZoomIn { panel, .. }
            | CameraShot::Focus { panel }
            | CameraShot::ZoomOut { panel, .. } => assert!(panel < PANELS),
            CameraShot::Gap { next } => assert!(next < PANELS),
            CameraShot::Overview => {}
        }
        t += 250.0;
    }
}

#[test]
fn overview_fits_the_world_and_focus_fills_the_screen() {
    let screen = Canvas::new(300, 600).unwrap();
    let layout = GridLayout::new(screen);
    let world = layout.world_size();
    let overview = layout.overview(screen).affine(screen);
    let corner = overview * Point::new(world.x, world.y);
    assert!(corner.x <= screen.w() + 1e-6 && corner.y <= screen.h() + 1e-6);

    let focus = layout.focus(4, screen).affine(screen);
    let o = layout.panel_origin(4);
    let p = focus * o;
    assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6);
}

#[test]
fn zoom_interpolates_between_overview_and_focus() {
    let screen = Canvas::new(300, 600).unwrap();
    let layout = GridLayout::new(screen);
    let a = layout.camera(CameraShot::ZoomIn { panel: 0, t: 0.0 }, screen);
    let b = layout.camera(CameraShot::ZoomIn { panel: 0, t: 1.0 }, screen);
    assert!((a.zoom - layout.overview(screen).zoom).abs() < 1e-9);
    assert!((b.zoom - 1.0).abs() < 1e-9);
    let mid = layout.camera(CameraShot::ZoomIn { panel: 0, t: 0.5 }, screen);
    assert!(mid.zoom > a.zoom && mid.zoom < b.zoom);
}
