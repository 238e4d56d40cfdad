use super::*;

#[test]
fn premultiply_then_unpremultiply_is_close() {
    let mut px = vec![200u8, 100, 50, 128, 10, 20, 30, 0, 1, 2, 3, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..12], &[1, 2, 3, 255]);
    unpremultiply_rgba8_in_place(&mut px);
    assert!((i16::from(px[0]) - 200).abs() <= 1);
    assert!((i16::from(px[1]) - 100).abs() <= 1);
    assert!((i16::from(px[2]) - 50).abs() <= 1);
}

#[test]
fn pixmap_rejects_mismatched_len() {
    assert!(pixmap_from_premul_bytes(&[0u8; 12], 2, 2).is_err());
    assert!(pixmap_from_premul_bytes(&[0u8; 16], 2, 2).is_ok());
}

#[test]
fn oversized_pixmaps_are_rejected() {
    assert!(size_u16(70_000, 1).is_err());
    assert_eq!(size_u16(640, 480).unwrap(), (640, 480));
}

#[test]
fn bezpath_conversion_keeps_element_count() {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((10.0, 0.0));
    p.curve_to((10.0, 5.0), (5.0, 10.0), (0.0, 10.0));
    p.close_path();
    assert_eq!(bezpath_to_cpu(&p).elements().len(), 4);
}
