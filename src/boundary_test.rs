#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::ZOOM_MAX;
use crate::services::RenderedPage;

const EPSILON: f64 = 1e-9;

fn layout(n: usize, w: f64, h: f64) -> PageLayout {
    let pages = (0..n).map(|index| RenderedPage { index, size: Size::new(w, h) }).collect();
    PageLayout::stack(pages).unwrap()
}

fn engine(n: usize, canvas: Size) -> BoundaryEngine {
    BoundaryEngine::new(&layout(n, 800.0, 1000.0), canvas)
}

// =============================================================
// compute_envelope
// =============================================================

#[test]
fn two_page_envelope_scenario() {
    let canvas = Size::new(800.0, 600.0);
    let b = Boundary::compute_envelope(&layout(2, 800.0, 1000.0), canvas);
    assert_eq!(b.left, 0.0);
    assert_eq!(b.top, 0.0);
    assert_eq!(b.right, 800.0);
    assert_eq!(b.bottom, 2050.0);
    assert_eq!(b.zoom_max, 2.0);
    let fit = (800.0_f64 / 800.0).min(600.0 / 1000.0);
    assert_eq!(Boundary::fit_zoom(Size::new(800.0, 1000.0), canvas), fit);
    assert_eq!(b.zoom_min, fit / 2.0);
}

#[test]
fn single_page_zoom_min_is_fit() {
    let b = Boundary::compute_envelope(&layout(1, 800.0, 1000.0), Size::new(400.0, 1000.0));
    assert_eq!(b.zoom_min, 0.5);
    assert_eq!(b.bottom, 1000.0);
}

#[test]
fn hard_snapshot_matches_envelope_after_recompute() {
    let mut e = engine(2, Size::new(800.0, 600.0));
    e.recompute(&layout(3, 800.0, 1000.0), Size::new(400.0, 300.0));
    assert_eq!(e.envelope(), e.hard());
    assert_eq!(e.hard().bottom, 3100.0);
}

// =============================================================
// clamp_zoom
// =============================================================

#[test]
fn zoom_outside_range_snaps_to_nearest_bound() {
    let e = engine(2, Size::new(800.0, 600.0));
    let (lo, hi) = (e.hard().zoom_min, e.hard().zoom_max);
    for z in [0.0, 0.01, lo - 1e-6, -3.0] {
        assert_eq!(e.clamp_zoom(z), lo);
    }
    for z in [hi + 1e-6, 3.0, 100.0] {
        assert_eq!(e.clamp_zoom(z), hi);
    }
    assert_eq!(e.clamp_zoom(1.0), 1.0);
}

// =============================================================
// clamp
// =============================================================

#[test]
fn clamp_pins_top_left_and_reports_reach() {
    let e = engine(2, Size::new(800.0, 600.0));
    let c = e.clamp(Point::new(50.0, 100.0), Point::new(0.0, 0.0), 1.0, Size::new(800.0, 600.0));
    assert_eq!(c.pan, Point::new(0.0, 0.0));
    assert!(c.reach.left && c.reach.top);
    assert!(!c.reach.right && !c.reach.bottom);
}

#[test]
fn clamp_pins_bottom_right_and_reports_reach() {
    let e = engine(2, Size::new(800.0, 600.0));
    let c = e.clamp(Point::new(-10.0, -1500.0), Point::new(0.0, 0.0), 1.0, Size::new(800.0, 600.0));
    assert_eq!(c.pan, Point::new(0.0, 600.0 - 2050.0));
    assert!(c.reach.right && c.reach.bottom);
    assert!(!c.reach.left && !c.reach.top);
}

#[test]
fn clamp_inside_envelope_is_untouched() {
    let e = engine(2, Size::new(400.0, 600.0));
    let proposed = Point::new(-200.0, -700.0);
    let c = e.clamp(proposed, Point::new(0.0, 0.0), 1.0, Size::new(400.0, 600.0));
    assert_eq!(c.pan, proposed);
    assert_eq!(c.reach, Reach::default());
}

#[test]
fn clamp_scales_pins_with_zoom() {
    let e = engine(2, Size::new(400.0, 600.0));
    let c = e.clamp(Point::new(-5000.0, -9000.0), Point::new(0.0, 0.0), 2.0, Size::new(400.0, 600.0));
    // br.x = right: pan_x = 400 - 800 * 2; br.y = bottom: pan_y = 600 - 2050 * 2.
    assert_eq!(c.pan, Point::new(-1200.0, -3500.0));
}

#[test]
fn wide_canvas_locks_horizontal_axis() {
    let canvas = Size::new(1200.0, 600.0);
    let e = engine(2, canvas);
    let lock = e.axis_lock(1.0, canvas);
    assert!(lock.x);
    assert!(!lock.y);
    let current = Point::new(200.0, 0.0);
    let c = e.clamp(Point::new(260.0, -40.0), current, 1.0, canvas);
    assert_eq!(c.pan.x, 200.0);
    assert_eq!(c.pan.y, -40.0);
    assert!(!c.reach.left && !c.reach.right);
}

#[test]
fn single_page_zoomed_out_locks_both_axes() {
    let canvas = Size::new(800.0, 600.0);
    let e = engine(1, canvas);
    let lock = e.axis_lock(0.25, canvas);
    assert_eq!(lock, AxisLock { x: true, y: true });
    let current = Point::new(300.0, 175.0);
    let c = e.clamp(Point::new(0.0, 0.0), current, 0.25, canvas);
    assert_eq!(c.pan, current);
}

#[test]
fn multi_page_both_exceeding_keeps_vertical_free() {
    let canvas = Size::new(800.0, 600.0);
    let e = engine(2, canvas);
    // At 0.2 the visible window is 4000x3000, larger than 800x2050 on both axes.
    let lock = e.axis_lock(0.2, canvas);
    assert_eq!(lock, AxisLock { x: true, y: false });
    let c = e.clamp(Point::new(10.0, 30.0), Point::new(99.0, 0.0), 0.2, canvas);
    assert_eq!(c.pan.x, 99.0);
    assert_eq!(c.pan.y, 0.0);
    assert!(c.reach.top);
}

#[test]
fn clamped_window_stays_inside_envelope_unless_locked() {
    for pages in [1, 3] {
        for canvas in [Size::new(800.0, 600.0), Size::new(390.0, 844.0), Size::new(1280.0, 720.0)] {
            let e = engine(pages, canvas);
            let b = *e.envelope();
            for zoom in [e.hard().zoom_min, 0.5, 0.8, 1.0, 1.37, 2.0] {
                let lock = e.axis_lock(zoom, canvas);
                let current = Point::new(17.0, -23.0);
                let mut x = -6000.0;
                while x <= 2000.0 {
                    let mut y = -9000.0;
                    while y <= 2000.0 {
                        let c = e.clamp(Point::new(x, y), current, zoom, canvas);
                        let w = crate::geometry::Viewport { zoom, pan_x: c.pan.x, pan_y: c.pan.y }.visible_window(canvas);
                        if lock.x {
                            assert_eq!(c.pan.x, current.x);
                        } else {
                            assert!(w.x >= b.left - EPSILON && w.right() <= b.right + EPSILON);
                        }
                        if lock.y {
                            assert_eq!(c.pan.y, current.y);
                        } else if w.height <= b.height() {
                            assert!(w.y >= b.top - EPSILON && w.bottom() <= b.bottom + EPSILON);
                        }
                        y += 437.0;
                    }
                    x += 311.0;
                }
            }
        }
    }
}

// =============================================================
// centering_offset
// =============================================================

#[test]
fn centering_offset_only_where_content_is_smaller() {
    let canvas = Size::new(1000.0, 600.0);
    let e = engine(2, canvas);
    let (x, y) = e.centering_offset(1.0, canvas);
    assert_eq!(x, Some(100.0));
    assert_eq!(y, None);
}

#[test]
fn centering_offset_scales_with_zoom() {
    let canvas = Size::new(800.0, 600.0);
    let e = engine(1, canvas);
    let (x, y) = e.centering_offset(0.5, canvas);
    // Visible 1600x1200 canvas units around an 800x1000 page.
    assert_eq!(x, Some(200.0));
    assert_eq!(y, Some(50.0));
}

// =============================================================
// Content smaller than the canvas
// =============================================================

#[test]
fn small_single_page_zoom_min_is_capped_at_max() {
    // Fit would be min(800 / 300, 1000 / 200) = 2.67.
    let b = Boundary::compute_envelope(&layout(1, 300.0, 200.0), Size::new(800.0, 1000.0));
    assert_eq!(b.zoom_min, ZOOM_MAX);
    assert_eq!(b.zoom_max, ZOOM_MAX);
}

#[test]
fn small_multi_page_halved_fit_is_capped_at_max() {
    // Fit is 6.0, halved to 3.0, still above the maximum.
    let e = BoundaryEngine::new(&layout(2, 100.0, 100.0), Size::new(800.0, 600.0));
    assert_eq!(e.hard().zoom_min, ZOOM_MAX);
    for z in [0.1, 1.0, 2.0, 4.0, f64::NAN] {
        assert_eq!(e.clamp_zoom(z), ZOOM_MAX);
    }
}

#[test]
fn small_page_centres_on_both_axes() {
    let canvas = Size::new(800.0, 1000.0);
    let e = BoundaryEngine::new(&layout(1, 300.0, 200.0), canvas);
    let (x, y) = e.centering_offset(ZOOM_MAX, canvas);
    // 600x400 on screen inside 800x1000.
    assert_eq!(x, Some(100.0));
    assert_eq!(y, Some(300.0));
}
