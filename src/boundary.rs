//! Pan/zoom envelope and viewport clamping.
//!
//! The envelope is the canvas-space rectangle the visible window may travel
//! over, plus the zoom range. It is derived from the page stack and the canvas
//! size on every load or resize.
//!
//! Clamping works on a proposed pan offset. An axis whose visible span is
//! already larger than the envelope is "locked": it keeps the current offset
//! instead of snapping back and forth between the two edges. Multi-page
//! documents never lock vertically when both axes would lock, so the user can
//! still scroll through pages while zoomed far out.

#[cfg(test)]
#[path = "boundary_test.rs"]
mod boundary_test;

use serde::{Deserialize, Serialize};

use crate::consts::ZOOM_MAX;
use crate::geometry::{Point, Size};
use crate::layout::PageLayout;

/// Allowed pan rectangle (canvas space) and zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
}

impl Boundary {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Zoom at which the first page exactly fits the canvas.
    #[must_use]
    pub fn fit_zoom(page: Size, canvas: Size) -> f64 {
        (canvas.width / page.width).min(canvas.height / page.height)
    }

    /// Envelope for `layout` shown on a canvas of `canvas` pixels.
    ///
    /// The minimum zoom is the fit zoom, halved for multi-page documents so
    /// more than one page can be seen at once. Pages small enough to fit above
    /// [`ZOOM_MAX`] get a fixed zoom of [`ZOOM_MAX`] and are centred instead.
    #[must_use]
    pub fn compute_envelope(layout: &PageLayout, canvas: Size) -> Self {
        let page = layout.first_page();
        let fit = Self::fit_zoom(page, canvas);
        let zoom_min = (if layout.len() > 1 { fit / 2.0 } else { fit }).min(ZOOM_MAX);
        Self { left: 0.0, top: 0.0, right: page.width, bottom: layout.content_height(), zoom_min, zoom_max: ZOOM_MAX }
    }
}

/// Which envelope edges a clamp pinned the viewport against.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reach {
    pub top: bool,
    pub left: bool,
    pub right: bool,
    pub bottom: bool,
}

/// Result of clamping a proposed pan offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped {
    pub pan: Point,
    pub reach: Reach,
}

/// Per-axis lock decision for one clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisLock {
    pub x: bool,
    pub y: bool,
}

/// Holds the working envelope and the hard snapshot taken at computation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryEngine {
    envelope: Boundary,
    hard: Boundary,
    page_count: usize,
}

impl BoundaryEngine {
    #[must_use]
    pub fn new(layout: &PageLayout, canvas: Size) -> Self {
        let envelope = Boundary::compute_envelope(layout, canvas);
        Self { envelope, hard: envelope, page_count: layout.len() }
    }

    /// Recompute after a resize or reload. Resets the hard snapshot too.
    pub fn recompute(&mut self, layout: &PageLayout, canvas: Size) {
        *self = Self::new(layout, canvas);
    }

    #[must_use]
    pub fn envelope(&self) -> &Boundary {
        &self.envelope
    }

    #[must_use]
    pub fn hard(&self) -> &Boundary {
        &self.hard
    }

    /// Clamp a zoom factor into the hard zoom range.
    #[must_use]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.max(self.hard.zoom_min).min(self.hard.zoom_max)
    }

    /// Which axes are locked at `zoom` on a canvas of `canvas` pixels.
    #[must_use]
    pub fn axis_lock(&self, zoom: f64, canvas: Size) -> AxisLock {
        let mut lock = AxisLock {
            x: canvas.width / zoom > self.envelope.width(),
            y: canvas.height / zoom > self.envelope.height(),
        };
        if lock.x && lock.y && self.page_count > 1 {
            lock.y = false;
        }
        lock
    }

    /// Pull `proposed` back inside the envelope.
    ///
    /// `current` is the offset in effect before the gesture; locked axes keep
    /// it. Unlocked axes are pinned so the visible edge sits exactly on the
    /// envelope edge it crossed, and that edge is reported in `reach`.
    #[must_use]
    pub fn clamp(&self, proposed: Point, current: Point, zoom: f64, canvas: Size) -> Clamped {
        let b = &self.envelope;
        let lock = self.axis_lock(zoom, canvas);
        let mut reach = Reach::default();
        let mut pan = proposed;

        let tl = Point::new(-proposed.x / zoom, -proposed.y / zoom);
        let br = Point::new((canvas.width - proposed.x) / zoom, (canvas.height - proposed.y) / zoom);

        if lock.x {
            pan.x = current.x;
        } else if tl.x < b.left {
            pan.x = -b.left * zoom;
            reach.left = true;
        } else if br.x > b.right {
            pan.x = canvas.width - b.right * zoom;
            reach.right = true;
        }

        if lock.y {
            pan.y = current.y;
        } else if tl.y < b.top {
            pan.y = -b.top * zoom;
            reach.top = true;
        } else if br.y > b.bottom {
            pan.y = canvas.height - b.bottom * zoom;
            reach.bottom = true;
        }

        Clamped { pan, reach }
    }

    /// Pan offset that centres the envelope on an axis where it is smaller
    /// than the visible span, or `None` on axes where it fills the canvas.
    #[must_use]
    pub fn centering_offset(&self, zoom: f64, canvas: Size) -> (Option<f64>, Option<f64>) {
        let b = &self.envelope;
        let span_w = canvas.width / zoom;
        let span_h = canvas.height / zoom;
        let x = (span_w > b.width()).then(|| ((span_w - b.width()) / 2.0 - b.left) * zoom);
        let y = (span_h > b.height()).then(|| ((span_h - b.height()) / 2.0 - b.top) * zoom);
        (x, y)
    }
}
