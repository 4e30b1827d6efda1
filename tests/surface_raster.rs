use duudl::{Brush, DisplayMetrics, Point, StrokeSurface};

const WHITE: [u8; 4] = [255, 255, 255, 255];

fn surface(w: f64, h: f64, dpr: f64) -> StrokeSurface {
    let mut s = StrokeSurface::new(DisplayMetrics::new(w, h, dpr)).unwrap();
    s.set_enabled(true);
    s
}

#[test]
fn finished_stroke_is_visible_along_its_path() {
    let mut s = surface(100.0, 100.0, 1.0);
    s.begin_stroke(Point::new(10.0, 50.0));
    for x in 11..=90 {
        s.extend_stroke(Point::new(f64::from(x), 50.0));
    }
    s.end_stroke();

    let snap = s.export_snapshot();
    assert!(snap.ink_pixels(WHITE) > 0);
    for x in [15u32, 50, 85] {
        assert_ne!(snap.pixel(x, 50), WHITE, "no ink at x={x}");
    }
}

#[test]
fn clear_restores_a_fresh_surface() {
    let mut s = surface(64.0, 64.0, 1.0);
    s.begin_stroke(Point::new(5.0, 5.0));
    s.extend_stroke(Point::new(60.0, 60.0));
    s.end_stroke();
    assert!(s.export_snapshot().ink_pixels(WHITE) > 0);

    s.clear();
    let fresh = StrokeSurface::new(DisplayMetrics::new(64.0, 64.0, 1.0)).unwrap();
    assert_eq!(s.export_snapshot(), fresh.export_snapshot());
}

#[test]
fn snapshot_is_a_copy_not_a_view() {
    let mut s = surface(64.0, 64.0, 1.0);
    s.begin_stroke(Point::new(5.0, 5.0));
    s.extend_stroke(Point::new(60.0, 60.0));
    s.end_stroke();
    let before = s.export_snapshot();

    s.clear();
    // The earlier snapshot still shows the drawing.
    assert!(before.ink_pixels(WHITE) > 0);
    assert_eq!(s.export_snapshot().ink_pixels(WHITE), 0);
}

#[test]
fn resize_preserves_the_drawing_at_double_scale() {
    let mut s = surface(100.0, 100.0, 1.0);
    s.begin_stroke(Point::new(20.0, 20.0));
    s.extend_stroke(Point::new(80.0, 80.0));
    s.end_stroke();
    let ink_before = s.export_snapshot().ink_pixels(WHITE);
    assert!(ink_before > 0);

    s.resize(DisplayMetrics::new(100.0, 100.0, 2.0)).unwrap();
    let snap = s.export_snapshot();
    assert_eq!((snap.width(), snap.height()), (200, 200));
    // Not blanked, and the stroke sits at the rescaled position.
    assert!(snap.ink_pixels(WHITE) > 0);
    assert_ne!(snap.pixel(100, 100), WHITE);
    assert_eq!(snap.pixel(20, 180), WHITE);
}

#[test]
fn resize_mid_stroke_closes_it_cleanly() {
    let mut s = surface(100.0, 100.0, 1.0);
    s.begin_stroke(Point::new(10.0, 10.0));
    s.extend_stroke(Point::new(50.0, 50.0));
    // No pointer-up before the resize.
    s.resize(DisplayMetrics::new(50.0, 50.0, 1.0)).unwrap();

    assert_eq!(s.strokes().len(), 1);
    assert!(s.export_snapshot().ink_pixels(WHITE) > 0);
    // Surface is still usable for new strokes afterwards.
    s.begin_stroke(Point::new(5.0, 40.0));
    s.extend_stroke(Point::new(45.0, 40.0));
    s.end_stroke();
    assert_eq!(s.strokes().len(), 2);
}

#[test]
fn css_coordinates_land_independent_of_dpr() {
    // Same CSS gesture on a 1x and a 2x display.
    let mut lo = surface(100.0, 100.0, 1.0);
    let mut hi = surface(100.0, 100.0, 2.0);
    for s in [&mut lo, &mut hi] {
        s.set_brush(Brush {
            width: 4.0,
            color: [0, 0, 0, 255],
        });
        s.begin_stroke(Point::new(25.0, 75.0));
        s.extend_stroke(Point::new(75.0, 75.0));
        s.end_stroke();
    }
    // Ink sits at the proportionally identical location in both buffers.
    assert_ne!(lo.export_snapshot().pixel(50, 75), WHITE);
    assert_ne!(hi.export_snapshot().pixel(100, 150), WHITE);
}

#[test]
fn revision_advances_on_end_clear_and_resize_only() {
    let mut s = surface(64.0, 64.0, 1.0);
    assert_eq!(s.revision(), 0);
    s.begin_stroke(Point::new(5.0, 5.0));
    s.extend_stroke(Point::new(10.0, 10.0));
    assert_eq!(s.revision(), 0, "painting alone must not publish a frame");
    s.end_stroke();
    assert_eq!(s.revision(), 1);
    s.clear();
    assert_eq!(s.revision(), 2);
    s.resize(DisplayMetrics::new(32.0, 32.0, 1.0)).unwrap();
    assert_eq!(s.revision(), 3);
}
