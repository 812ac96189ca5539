//! Annotation model: signatures, drawings, images, and text boxes placed on
//! the page stack, plus the in-memory registry that owns them.
//!
//! This module defines what the user has added on top of the rendered pages
//! (`Annotation`, `AnnotationKind`, `AnnotationBody`), the fixed type tag every
//! canvas object carries (`ObjectTag`), and the store that owns all live
//! annotations (`AnnotationStore`).
//!
//! Page association is never stored. `group_by_page` recomputes it from the
//! rotated corners whenever the export pipeline asks, so an annotation moved
//! by the host always lands on the page it currently overlaps.

#[cfg(test)]
#[path = "annotation_test.rs"]
mod annotation_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::consts::HIGHLIGHTER_OPACITY;
use crate::geometry::{Point, Rect, Size};
use crate::input::DrawingTool;
use crate::layout::PageSlot;

/// Unique identifier for an annotation.
pub type AnnotationId = Uuid;

/// Type tag fixed on every canvas object at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectTag {
    /// A rendered page background.
    Page,
    Signature,
    Drawing,
    Image,
    Textbox,
}

/// Anything on the canvas that carries an [`ObjectTag`].
pub trait Tagged {
    fn tag(&self) -> ObjectTag;
}

/// Classify a canvas object by the tag it was created with.
#[must_use]
pub fn classify<T: Tagged + ?Sized>(object: &T) -> ObjectTag {
    object.tag()
}

impl Tagged for PageSlot {
    fn tag(&self) -> ObjectTag {
        ObjectTag::Page
    }
}

/// The kind of a user annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Stroke set captured by the signature pad.
    Signature,
    /// Free stroke drawn in drawing mode.
    Drawing,
    /// Inserted raster image.
    Image,
    /// Single-line text box.
    Textbox,
}

impl AnnotationKind {
    /// Kinds made of ink strokes; exported in the strokes group and erasable.
    #[must_use]
    pub fn is_stroke(self) -> bool {
        matches!(self, Self::Signature | Self::Drawing)
    }
}

/// One polyline of ink in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub width: f64,
    pub opacity: f64,
    pub tool: DrawingTool,
}

impl Stroke {
    /// Empty stroke styled for `tool` at `width`.
    #[must_use]
    pub fn new(tool: DrawingTool, width: f64) -> Self {
        let opacity = if tool == DrawingTool::Highlighter { HIGHLIGHTER_OPACITY } else { 1.0 };
        Self { points: Vec::new(), width, opacity, tool }
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    /// Bounding box of the ink, including half the line width on each side.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let r = Rect::bounding(self.points.iter().copied())?;
        let pad = self.width / 2.0;
        Some(Rect::new(r.x - pad, r.y - pad, r.width + self.width, r.height + self.width))
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }
}

/// Kind-specific payload of an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationBody {
    Strokes(Vec<Stroke>),
    Image {
        /// Host handle returned by `create_image_from_bytes`.
        handle: String,
        /// Natural pixel size of the source image.
        natural: Size,
    },
    Text {
        text: String,
        font_size: f64,
    },
}

/// Where and how large to place inserted text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextPlacement {
    /// Distance from the right edge of the canvas to the end of the text.
    pub left: f64,
    pub top: f64,
    pub font_size: f64,
}

/// A user annotation on the page stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    /// Unrotated bounding box on the canvas. `None` for objects the host has
    /// not laid out yet.
    pub bounds: Option<Rect>,
    /// Clockwise rotation in degrees around the bounding-box centre.
    pub rotation: f64,
    pub opacity: f64,
    /// Stacking order; assigned by the store on insert.
    pub z_index: i64,
    pub body: AnnotationBody,
}

impl Tagged for Annotation {
    fn tag(&self) -> ObjectTag {
        match self.kind {
            AnnotationKind::Signature => ObjectTag::Signature,
            AnnotationKind::Drawing => ObjectTag::Drawing,
            AnnotationKind::Image => ObjectTag::Image,
            AnnotationKind::Textbox => ObjectTag::Textbox,
        }
    }
}

impl Annotation {
    fn new(kind: AnnotationKind, bounds: Option<Rect>, body: AnnotationBody) -> Self {
        Self { id: Uuid::new_v4(), kind, bounds, rotation: 0.0, opacity: 1.0, z_index: 0, body }
    }

    /// Signature from a stroke set. `None` when no stroke has any points.
    #[must_use]
    pub fn signature(strokes: Vec<Stroke>) -> Option<Self> {
        let bounds = strokes_bounds(&strokes)?;
        Some(Self::new(AnnotationKind::Signature, Some(bounds), AnnotationBody::Strokes(strokes)))
    }

    /// Drawing from a single stroke. `None` when the stroke is empty.
    #[must_use]
    pub fn drawing(stroke: Stroke) -> Option<Self> {
        let bounds = stroke.bounds()?;
        Some(Self::new(AnnotationKind::Drawing, Some(bounds), AnnotationBody::Strokes(vec![stroke])))
    }

    #[must_use]
    pub fn image(handle: String, natural: Size, bounds: Rect, opacity: f64) -> Self {
        let mut a = Self::new(AnnotationKind::Image, Some(bounds), AnnotationBody::Image { handle, natural });
        a.opacity = opacity;
        a
    }

    #[must_use]
    pub fn textbox(text: String, font_size: f64, bounds: Rect) -> Self {
        Self::new(AnnotationKind::Textbox, Some(bounds), AnnotationBody::Text { text, font_size })
    }

    /// Move the annotation (and any ink it carries) by a canvas delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.bounds = self.bounds.map(|b| b.translated(dx, dy));
        if let AnnotationBody::Strokes(strokes) = &mut self.body {
            for s in strokes {
                s.translate(dx, dy);
            }
        }
    }

    /// Rotated corners `[tl, tr, br, bl]`.
    #[must_use]
    pub fn corners(&self) -> Option<[Point; 4]> {
        self.bounds.map(|b| b.rotated_corners(self.rotation))
    }

    /// Axis-aligned box around the rotated corners.
    #[must_use]
    pub fn footprint(&self) -> Option<Rect> {
        Rect::bounding(self.corners()?)
    }

    /// Top-left of the footprint; this is where a raster of the annotation is anchored.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.footprint().map(|r| r.origin())
    }

    /// Whether any rotated corner lies inside `page` (edges inclusive).
    #[must_use]
    pub fn touches(&self, page: &Rect) -> bool {
        self.corners().is_some_and(|cs| cs.iter().any(|&c| page.contains(c)))
    }
}

fn strokes_bounds(strokes: &[Stroke]) -> Option<Rect> {
    let boxes: Vec<Rect> = strokes.iter().filter_map(Stroke::bounds).collect();
    Rect::bounding(boxes.iter().flat_map(|b| [b.origin(), Point::new(b.right(), b.bottom())]))
}

/// In-memory store of annotations.
pub struct AnnotationStore {
    items: HashMap<AnnotationId, Annotation>,
    next_z: i64,
}

impl AnnotationStore {
    #[must_use]
    pub fn new() -> Self {
        Self { items: HashMap::new(), next_z: 0 }
    }

    /// Insert on top of the stack. Returns the annotation's id.
    pub fn insert(&mut self, mut annotation: Annotation) -> AnnotationId {
        annotation.z_index = self.next_z;
        self.next_z += 1;
        let id = annotation.id;
        self.items.insert(id, annotation);
        id
    }

    pub fn remove(&mut self, id: &AnnotationId) -> Option<Annotation> {
        self.items.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.items.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All annotations sorted by `(z_index, id)` for draw order.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Annotation> {
        let mut all: Vec<&Annotation> = self.items.values().collect();
        all.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        all
    }

    /// Remove every stroke annotation whose footprint contains `point`.
    /// Returns the removed ids in draw order.
    pub fn erase_at(&mut self, point: Point) -> Vec<AnnotationId> {
        let hits: Vec<AnnotationId> = self
            .sorted()
            .into_iter()
            .filter(|a| a.kind.is_stroke() && a.footprint().is_some_and(|r| r.contains(point)))
            .map(|a| a.id)
            .collect();
        for id in &hits {
            self.items.remove(id);
        }
        hits
    }
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Annotations overlapping one page, grouped the way export embeds them.
#[derive(Debug, Clone, Default)]
pub struct PageAnnotations<'a> {
    /// 0-based page index.
    pub page_index: usize,
    /// Signatures and drawings.
    pub strokes: Vec<&'a Annotation>,
    pub images: Vec<&'a Annotation>,
    pub textboxes: Vec<&'a Annotation>,
}

impl<'a> PageAnnotations<'a> {
    /// Strokes, then images, then text boxes.
    pub fn iter(&self) -> impl Iterator<Item = &'a Annotation> + '_ {
        self.strokes.iter().chain(&self.images).chain(&self.textboxes).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len() + self.images.len() + self.textboxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Assign annotations to every page one of their rotated corners falls on.
///
/// An annotation straddling two pages is listed under both. Annotations
/// without geometry are skipped.
#[must_use]
pub fn group_by_page<'a>(pages: &[PageSlot], store: &'a AnnotationStore) -> Vec<PageAnnotations<'a>> {
    let mut groups: Vec<PageAnnotations<'a>> =
        pages.iter().map(|p| PageAnnotations { page_index: p.index, ..PageAnnotations::default() }).collect();

    for annotation in store.sorted() {
        if annotation.bounds.is_none() {
            warn!(id = %annotation.id, kind = ?annotation.kind, "annotation has no bounds; skipping");
            continue;
        }
        for (page, group) in pages.iter().zip(groups.iter_mut()) {
            if !annotation.touches(&page.rect) {
                continue;
            }
            match annotation.kind {
                AnnotationKind::Signature | AnnotationKind::Drawing => group.strokes.push(annotation),
                AnnotationKind::Image => group.images.push(annotation),
                AnnotationKind::Textbox => group.textboxes.push(annotation),
            }
        }
    }
    groups
}
