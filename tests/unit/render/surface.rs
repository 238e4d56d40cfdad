use super::*;

#[test]
fn canvas_surface_is_scaled() {
    let s = Surface::for_canvas(Canvas::VERTICAL, 0.5).unwrap();
    assert_eq!((s.width(), s.height()), (540, 1140));
    assert_eq!(s.view(), Affine::scale(0.5));
}

#[test]
fn zero_sized_surface_is_rejected() {
    assert!(Surface::new(0, 10).is_err());
}

#[test]
fn draw_fills_pixels() {
    let mut s = Surface::new(4, 4).unwrap();
    s.draw(|ctx| {
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 0, 0, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 4.0, 4.0));
        Ok(())
    })
    .unwrap();
    let f = s.to_frame();
    assert_eq!(f.pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(9, 9), None);

    s.draw(|_| Ok(())).unwrap();
    assert_eq!(s.to_frame().pixel(1, 1), Some([0, 0, 0, 0]));
}

#[test]
fn straight_conversion_undoes_premultiplication() {
    let f = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    assert_eq!(f.to_straight_rgba8(), vec![128, 0, 0, 128]);
}

#[test]
fn snapshot_keeps_surface_size() {
    let s = Surface::new(6, 3).unwrap();
    let snap = s.snapshot();
    assert_eq!((snap.width, snap.height), (6, 3));
}
