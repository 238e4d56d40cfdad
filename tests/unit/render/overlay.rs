use super::*;
use crate::render::surface::Surface;

#[test]
fn window_fade_ramps_at_both_edges() {
    let w = [40.0, 60.0];
    assert_eq!(window_fade(39.0, w), 0.0);
    assert_eq!(window_fade(50.0, w), 1.0);
    assert!(window_fade(40.5, w) > 0.0 && window_fade(40.5, w) < 1.0);
    assert!(window_fade(59.5, w) < 1.0);
    assert_eq!(window_fade(60.0, w), 0.0);
}

#[test]
fn narrative_without_font_draws_nothing() {
    let canvas = Canvas::new(40, 80).unwrap();
    let mut s = Surface::new(40, 80).unwrap();
    let mut cache = TextCache::new(None);
    s.draw(|ctx| draw_narrative(ctx, Affine::IDENTITY, canvas, "Hello there.", 1.0, &mut cache))
        .unwrap();
    assert_eq!(s.to_frame().pixel(20, 60), Some([0, 0, 0, 0]));
}

#[test]
fn slideshow_covers_the_canvas() {
    let canvas = Canvas::new(20, 20).unwrap();
    let mut src = Surface::new(20, 20).unwrap();
    src.draw(|ctx| {
        ctx.set_paint(rgba(0, 200, 0, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 20.0, 20.0));
        Ok(())
    })
    .unwrap();
    let snaps = vec![src.snapshot()];

    let mut out = Surface::new(20, 20).unwrap();
    out.draw(|ctx| {
        draw_slideshow(ctx, Affine::IDENTITY, canvas, &snaps, 0, 0.5);
        Ok(())
    })
    .unwrap();
    let px = out.to_frame().pixel(10, 10).unwrap();
    assert_eq!(px[3], 255);
    assert!(px[1] > 150);
}

#[test]
fn outro_darkens_the_frame() {
    let canvas = Canvas::new(20, 20).unwrap();
    let mut out = Surface::new(20, 20).unwrap();
    let mut cache = TextCache::new(None);
    out.draw(|ctx| draw_outro(ctx, Affine::IDENTITY, canvas, None, Some("Follow"), 1.0, &mut cache))
        .unwrap();
    let px = out.to_frame().pixel(10, 10).unwrap();
    assert!(px[3] > 200);
}
