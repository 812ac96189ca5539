#![allow(clippy::float_cmp)]

use super::*;
use crate::layout::PageLayout;
use crate::services::RenderedPage;

fn pages() -> PageLayout {
    let rendered = (0..2).map(|index| RenderedPage { index, size: Size::new(800.0, 1000.0) }).collect();
    PageLayout::stack(rendered).unwrap()
}

fn pen(points: &[(f64, f64)]) -> Stroke {
    let mut s = Stroke::new(DrawingTool::Pen, 2.0);
    for &(x, y) in points {
        s.push(Point::new(x, y));
    }
    s
}

fn image_at(x: f64, y: f64, w: f64, h: f64) -> Annotation {
    Annotation::image("blob:1".into(), Size::new(w, h), Rect::new(x, y, w, h), 1.0)
}

// =============================================================
// classify
// =============================================================

#[test]
fn classify_uses_creation_tag() {
    let layout = pages();
    assert_eq!(classify(&layout.pages()[0]), ObjectTag::Page);
    assert_eq!(classify(&Annotation::drawing(pen(&[(0.0, 0.0), (1.0, 1.0)])).unwrap()), ObjectTag::Drawing);
    assert_eq!(classify(&Annotation::signature(vec![pen(&[(0.0, 0.0)])]).unwrap()), ObjectTag::Signature);
    assert_eq!(classify(&image_at(0.0, 0.0, 1.0, 1.0)), ObjectTag::Image);
    assert_eq!(classify(&Annotation::textbox("hi".into(), 12.0, Rect::new(0.0, 0.0, 10.0, 12.0))), ObjectTag::Textbox);
}

#[test]
fn tag_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&ObjectTag::Textbox).unwrap(), "\"textbox\"");
}

// =============================================================
// Stroke / Annotation geometry
// =============================================================

#[test]
fn highlighter_stroke_is_translucent() {
    assert_eq!(Stroke::new(DrawingTool::Highlighter, 12.0).opacity, HIGHLIGHTER_OPACITY);
    assert_eq!(Stroke::new(DrawingTool::Pen, 2.0).opacity, 1.0);
}

#[test]
fn stroke_bounds_include_line_width() {
    let b = pen(&[(10.0, 20.0), (30.0, 25.0)]).bounds().unwrap();
    assert_eq!(b, Rect::new(9.0, 19.0, 22.0, 7.0));
}

#[test]
fn empty_strokes_make_no_annotation() {
    assert!(Annotation::drawing(pen(&[])).is_none());
    assert!(Annotation::signature(vec![pen(&[]), pen(&[])]).is_none());
}

#[test]
fn signature_bounds_cover_all_strokes() {
    let sig = Annotation::signature(vec![pen(&[(0.0, 0.0), (10.0, 0.0)]), pen(&[(5.0, 40.0)])]).unwrap();
    assert_eq!(sig.bounds, Some(Rect::new(-1.0, -1.0, 12.0, 42.0)));
}

#[test]
fn translate_moves_bounds_and_ink() {
    let mut a = Annotation::drawing(pen(&[(0.0, 0.0), (10.0, 10.0)])).unwrap();
    a.translate(100.0, 50.0);
    assert_eq!(a.bounds.unwrap().origin(), Point::new(99.0, 49.0));
    let AnnotationBody::Strokes(strokes) = &a.body else { panic!("expected strokes") };
    assert_eq!(strokes[0].points[1], Point::new(110.0, 60.0));
}

#[test]
fn position_is_footprint_top_left_when_rotated() {
    let mut a = image_at(0.0, 0.0, 100.0, 100.0);
    assert_eq!(a.position(), Some(Point::new(0.0, 0.0)));
    a.rotation = 45.0;
    let p = a.position().unwrap();
    let half_diag = 50.0 * 2.0_f64.sqrt();
    assert!((p.x - (50.0 - half_diag)).abs() < 1e-9);
    assert!((p.y - (50.0 - half_diag)).abs() < 1e-9);
}

#[test]
fn missing_bounds_has_no_corners() {
    let mut a = image_at(0.0, 0.0, 1.0, 1.0);
    a.bounds = None;
    assert!(a.corners().is_none());
    assert!(a.position().is_none());
}

// =============================================================
// AnnotationStore
// =============================================================

#[test]
fn insert_assigns_increasing_z() {
    let mut store = AnnotationStore::new();
    let a = store.insert(image_at(0.0, 0.0, 1.0, 1.0));
    let b = store.insert(image_at(0.0, 0.0, 1.0, 1.0));
    assert_eq!(store.get(&a).unwrap().z_index, 0);
    assert_eq!(store.get(&b).unwrap().z_index, 1);
    let order: Vec<AnnotationId> = store.sorted().iter().map(|x| x.id).collect();
    assert_eq!(order, vec![a, b]);
}

#[test]
fn remove_and_len() {
    let mut store = AnnotationStore::default();
    assert!(store.is_empty());
    let id = store.insert(image_at(0.0, 0.0, 1.0, 1.0));
    assert_eq!(store.len(), 1);
    assert!(store.remove(&id).is_some());
    assert!(store.remove(&id).is_none());
    assert!(store.is_empty());
}

#[test]
fn erase_removes_only_strokes_under_point() {
    let mut store = AnnotationStore::new();
    let ink = store.insert(Annotation::drawing(pen(&[(0.0, 0.0), (100.0, 100.0)])).unwrap());
    let far = store.insert(Annotation::drawing(pen(&[(500.0, 500.0), (600.0, 600.0)])).unwrap());
    let img = store.insert(image_at(0.0, 0.0, 200.0, 200.0));
    let removed = store.erase_at(Point::new(50.0, 50.0));
    assert_eq!(removed, vec![ink]);
    assert!(store.get(&far).is_some());
    assert!(store.get(&img).is_some());
}

// =============================================================
// group_by_page
// =============================================================

#[test]
fn annotation_inside_one_page() {
    let layout = pages();
    let mut store = AnnotationStore::new();
    store.insert(image_at(100.0, 1200.0, 50.0, 50.0));
    let groups = group_by_page(layout.pages(), &store);
    assert_eq!(groups.len(), 2);
    assert!(groups[0].is_empty());
    assert_eq!(groups[1].images.len(), 1);
    assert_eq!(groups[1].page_index, 1);
}

#[test]
fn straddling_annotation_appears_on_both_pages() {
    let layout = pages();
    let mut store = AnnotationStore::new();
    store.insert(Annotation::textbox("x".into(), 20.0, Rect::new(10.0, 980.0, 100.0, 100.0)));
    let groups = group_by_page(layout.pages(), &store);
    assert_eq!(groups[0].textboxes.len(), 1);
    assert_eq!(groups[1].textboxes.len(), 1);
}

#[test]
fn annotation_in_gap_belongs_to_no_page() {
    let layout = pages();
    let mut store = AnnotationStore::new();
    store.insert(image_at(10.0, 1010.0, 20.0, 20.0));
    let groups = group_by_page(layout.pages(), &store);
    assert!(groups.iter().all(PageAnnotations::is_empty));
}

#[test]
fn page_edges_are_inclusive() {
    let layout = pages();
    let mut store = AnnotationStore::new();
    // Bottom-left corner sits exactly on the first page's top edge.
    store.insert(image_at(800.0, -20.0, 20.0, 20.0));
    let groups = group_by_page(layout.pages(), &store);
    assert_eq!(groups[0].images.len(), 1);
}

#[test]
fn rotation_can_bring_a_corner_onto_a_page() {
    let layout = pages();
    let mut store = AnnotationStore::new();
    let mut a = image_at(810.0, 400.0, 20.0, 200.0);
    assert!(!a.touches(&layout.pages()[0].rect));
    a.rotation = 90.0;
    store.insert(a);
    let groups = group_by_page(layout.pages(), &store);
    assert_eq!(groups[0].images.len(), 1);
}

#[test]
fn kinds_are_grouped_and_ordered() {
    let layout = pages();
    let mut store = AnnotationStore::new();
    let t = store.insert(Annotation::textbox("t".into(), 10.0, Rect::new(0.0, 0.0, 10.0, 10.0)));
    let i = store.insert(image_at(0.0, 0.0, 10.0, 10.0));
    let s = store.insert(Annotation::signature(vec![pen(&[(5.0, 5.0)])]).unwrap());
    let d = store.insert(Annotation::drawing(pen(&[(6.0, 6.0)])).unwrap());
    let groups = group_by_page(layout.pages(), &store);
    let order: Vec<AnnotationId> = groups[0].iter().map(|a| a.id).collect();
    assert_eq!(order, vec![s, d, i, t]);
}

#[test]
fn unplaced_annotation_is_skipped() {
    let layout = pages();
    let mut store = AnnotationStore::new();
    let mut a = image_at(0.0, 0.0, 10.0, 10.0);
    a.bounds = None;
    store.insert(a);
    let groups = group_by_page(layout.pages(), &store);
    assert!(groups.iter().all(PageAnnotations::is_empty));
}
