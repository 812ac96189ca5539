//! Viewport controller: zoom, pan, page navigation, and gesture dispatch.
//!
//! DESIGN
//! ======
//! Every host pointer callback goes through [`ViewportController::handle`],
//! which advances the [`GestureState`] machine and returns the side effects
//! as [`Action`]s instead of performing them. Panning and pinching are
//! resolved here; ink and eraser gestures are forwarded as actions for the
//! engine to apply to the annotation store. All pan changes go through the
//! [`BoundaryEngine`] clamp, except explicit page navigation.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use tracing::{debug, warn};

use crate::boundary::{Boundary, BoundaryEngine};
use crate::config::{SignerConfig, ZoomStep};
use crate::consts::{EPSILON, PAGE_UNIT, PINCH_BASE, PINCH_SENSITIVITY};
use crate::engine::Action;
use crate::error::SignerError;
use crate::geometry::{Point, Size, Viewport};
use crate::input::{DrawingMode, GestureState, InputEvent};
use crate::layout::PageLayout;

pub struct ViewportController {
    viewport: Viewport,
    canvas: Size,
    bounds: BoundaryEngine,
    gesture: GestureState,
    current_page: usize,
    total_pages: usize,
    /// Scaled height of the first page; the navigation unit is this times 1.05.
    page_height: f64,
    zoom_step: ZoomStep,
    scroll_step: f64,
}

impl ViewportController {
    /// Controller fitted to `layout` on a canvas of `canvas` pixels.
    #[must_use]
    pub fn new(layout: &PageLayout, canvas: Size, config: &SignerConfig) -> Self {
        let mut controller = Self {
            viewport: Viewport::default(),
            canvas,
            bounds: BoundaryEngine::new(layout, canvas),
            gesture: GestureState::Idle,
            current_page: 1,
            total_pages: layout.len(),
            page_height: layout.first_page().height,
            zoom_step: config.zoom_step,
            scroll_step: config.scroll_chain_step,
        };
        controller.fit(layout);
        controller
    }

    // --- Queries ---

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    #[must_use]
    pub fn boundary(&self) -> &Boundary {
        self.bounds.envelope()
    }

    #[must_use]
    pub fn hard_boundary(&self) -> &Boundary {
        self.bounds.hard()
    }

    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Screen-space height of one page plus its gap at the current zoom.
    #[must_use]
    pub fn page_unit(&self) -> f64 {
        self.page_height * PAGE_UNIT * self.viewport.zoom
    }

    // --- Layout ---

    /// Recompute the envelope for a new canvas size, refit zoom, and re-centre.
    pub fn resize(&mut self, layout: &PageLayout, canvas: Size) -> Vec<Action> {
        self.canvas = canvas;
        self.bounds.recompute(layout, canvas);
        self.total_pages = layout.len();
        self.page_height = layout.first_page().height;
        self.fit(layout);
        debug!(width = canvas.width, height = canvas.height, zoom = self.viewport.zoom, "viewport resized");
        self.settled()
    }

    /// Replace the whole transform, e.g. to restore after an off-screen export.
    pub fn restore(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.update_current_page();
    }

    fn fit(&mut self, layout: &PageLayout) {
        let zoom = self.bounds.clamp_zoom(Boundary::fit_zoom(layout.first_page(), self.canvas));
        self.viewport.zoom_to_point(Point::new(0.0, 0.0), zoom);
        self.center();
    }

    /// Centre content on axes where it is smaller than the canvas, clamp elsewhere.
    pub fn center(&mut self) {
        let zoom = self.viewport.zoom;
        let current = self.pan();
        let clamped = self.bounds.clamp(current, current, zoom, self.canvas).pan;
        let (cx, cy) = self.bounds.centering_offset(zoom, self.canvas);
        self.viewport.pan_x = cx.unwrap_or(clamped.x);
        self.viewport.pan_y = cy.unwrap_or(clamped.y);
    }

    fn pan(&self) -> Point {
        Point::new(self.viewport.pan_x, self.viewport.pan_y)
    }

    // --- Zoom ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        let zoom = self.zoom_step.zoom_in(self.viewport.zoom);
        self.apply_zoom(zoom, Point::new(0.0, 0.0))
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        let zoom = self.zoom_step.zoom_out(self.viewport.zoom);
        self.apply_zoom(zoom, Point::new(0.0, 0.0))
    }

    /// Set an absolute zoom, clamped to the hard zoom range.
    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        self.apply_zoom(zoom, Point::new(0.0, 0.0))
    }

    fn apply_zoom(&mut self, zoom: f64, pivot: Point) -> Vec<Action> {
        let zoom = self.bounds.clamp_zoom(zoom);
        self.viewport.zoom_to_point(pivot, zoom);
        self.center();
        self.settled()
    }

    /// One pinch frame. The first frame of a pinch only records the distance.
    pub fn pinch(&mut self, a: Point, b: Point) -> Vec<Action> {
        let distance = a.distance(b);
        let last = match self.gesture {
            GestureState::Pinching { last_distance } => last_distance,
            _ => 0.0,
        };
        self.gesture = GestureState::Pinching { last_distance: distance };
        if distance <= 0.0 || last <= 0.0 {
            return Vec::new();
        }
        let delta = distance - last;
        let zoom = self.viewport.zoom * PINCH_BASE.powf(-PINCH_SENSITIVITY * delta);
        self.apply_zoom(zoom, a.midpoint(b))
    }

    // --- Pan ---

    /// Pan by a screen-space delta, clamped. With `chain`, hitting the top or
    /// bottom edge asks the host to scroll the outer page.
    pub fn pan_by(&mut self, dx: f64, dy: f64, chain: bool) -> Vec<Action> {
        let current = self.pan();
        let proposed = Point::new(current.x + dx, current.y + dy);
        let clamped = self.bounds.clamp(proposed, current, self.viewport.zoom, self.canvas);
        self.viewport.pan_x = clamped.pan.x;
        self.viewport.pan_y = clamped.pan.y;

        let mut actions = self.settled();
        if chain {
            if clamped.reach.bottom {
                actions.push(Action::ScrollHost { dx: 0.0, dy: self.scroll_step });
            }
            if clamped.reach.top {
                actions.push(Action::ScrollHost { dx: 0.0, dy: -self.scroll_step });
            }
        }
        actions
    }

    // --- Pages ---

    /// Jump so page `page` (1-based) is at the top of the canvas. Not clamped.
    ///
    /// # Errors
    ///
    /// Returns `PageOutOfRange` when `page` is not in `1..=total_pages`.
    #[allow(clippy::cast_precision_loss)]
    pub fn go_to_page(&mut self, page: usize) -> Result<Vec<Action>, SignerError> {
        if page == 0 || page > self.total_pages {
            return Err(SignerError::PageOutOfRange { page, total: self.total_pages });
        }
        self.viewport.pan_y = -((page - 1) as f64) * self.page_unit();
        self.current_page = page;
        Ok(vec![Action::ViewportChanged(self.viewport), Action::CurrentPageChanged(page)])
    }

    /// Page number under the top of the canvas, derived from the pan offset.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn page_at_offset(&self) -> usize {
        let unit = self.page_unit();
        if unit <= 0.0 {
            return 1;
        }
        let page = (self.viewport.pan_y / -unit + EPSILON).floor() + 1.0;
        page.clamp(1.0, self.total_pages.max(1) as f64) as usize
    }

    /// Resync `current_page` with the pan offset. Returns a change notice.
    pub fn update_current_page(&mut self) -> Option<Action> {
        let page = self.page_at_offset();
        if page == self.current_page {
            return None;
        }
        self.current_page = page;
        Some(Action::CurrentPageChanged(page))
    }

    fn settled(&mut self) -> Vec<Action> {
        let mut actions = vec![Action::ViewportChanged(self.viewport)];
        actions.extend(self.update_current_page());
        actions
    }

    // --- Input dispatch ---

    /// Advance the gesture machine with one host event.
    ///
    /// Malformed events are logged and dropped; they never reach the state.
    pub fn handle(&mut self, event: &InputEvent, drawing: DrawingMode) -> Vec<Action> {
        if let Some(reason) = event.malformed() {
            warn!(reason, ?event, "ignoring malformed pointer event");
            return Vec::new();
        }
        match event {
            InputEvent::PointerDown { contacts, on_object } => self.on_pointer_down(contacts, *on_object, drawing),
            InputEvent::PointerMove { contacts } => self.on_pointer_move(contacts, drawing),
            InputEvent::PointerUp => self.on_pointer_up(),
            InputEvent::Wheel(delta) => self.pan_by(-delta.dx, -delta.dy, false),
        }
    }

    fn on_pointer_down(&mut self, contacts: &[Point], on_object: bool, drawing: DrawingMode) -> Vec<Action> {
        let Some(&first) = contacts.first() else {
            return Vec::new();
        };
        let multi = contacts.len() > 1;

        if drawing.active {
            if multi {
                self.gesture = GestureState::Pinching { last_distance: 0.0 };
                return if drawing.is_inking() { vec![Action::StrokeCaptureChanged(false)] } else { Vec::new() };
            }
            let world = self.viewport.screen_to_world(first);
            if drawing.is_inking() {
                self.gesture = GestureState::Drawing { capturing: true };
                return vec![Action::StrokeCaptureChanged(true), Action::StrokeStarted(world)];
            }
            self.gesture = GestureState::Drawing { capturing: false };
            return vec![Action::EraseAt(world)];
        }

        self.gesture = if on_object {
            GestureState::Idle
        } else if multi {
            GestureState::Pinching { last_distance: 0.0 }
        } else {
            GestureState::Panning { last_screen: first }
        };
        Vec::new()
    }

    fn on_pointer_move(&mut self, contacts: &[Point], drawing: DrawingMode) -> Vec<Action> {
        if let [a, b, ..] = contacts {
            let mut actions = Vec::new();
            if self.gesture == (GestureState::Drawing { capturing: true }) {
                actions.push(Action::StrokeCaptureChanged(false));
            }
            actions.extend(self.pinch(*a, *b));
            return actions;
        }
        let Some(&p) = contacts.first() else {
            return Vec::new();
        };

        match self.gesture {
            GestureState::Panning { last_screen } => {
                let actions = self.pan_by(p.x - last_screen.x, p.y - last_screen.y, true);
                self.gesture = GestureState::Panning { last_screen: p };
                actions
            }
            GestureState::Drawing { capturing: true } => vec![Action::StrokeExtended(self.viewport.screen_to_world(p))],
            GestureState::Drawing { capturing: false } if drawing.is_erasing() => {
                vec![Action::EraseAt(self.viewport.screen_to_world(p))]
            }
            _ => Vec::new(),
        }
    }

    fn on_pointer_up(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.gesture) {
            GestureState::Panning { .. } => self.settled(),
            GestureState::Pinching { .. } => self.update_current_page().into_iter().collect(),
            GestureState::Drawing { capturing: true } => vec![Action::StrokeFinished],
            _ => Vec::new(),
        }
    }
}
