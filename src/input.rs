//! Input model: drawing tools, pointer events, and the gesture state machine.
//!
//! This module defines the types consumed by the viewport controller.
//! `DrawingMode` captures whether pointer movement should produce ink or pan
//! the page. `InputEvent` is one host pointer callback, already reduced to the
//! list of active contacts in screen space. `GestureState` is the gesture being
//! tracked between pointer-down and pointer-up.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Which drawing tool is active while drawing mode is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingTool {
    /// Thin opaque ink (default).
    #[default]
    Pen,
    /// Wide translucent ink.
    Highlighter,
    /// Removes strokes under the pointer.
    Eraser,
}

impl DrawingTool {
    /// Whether this tool lays down strokes.
    #[must_use]
    pub fn captures_strokes(self) -> bool {
        matches!(self, Self::Pen | Self::Highlighter)
    }
}

/// Persistent drawing-mode settings, toggled by the host toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawingMode {
    pub active: bool,
    pub tool: DrawingTool,
}

impl DrawingMode {
    /// Enabling always starts with the pen.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.active = enabled;
        if enabled {
            self.tool = DrawingTool::Pen;
        }
    }

    /// Drawing is on with a tool that lays down strokes.
    #[must_use]
    pub fn is_inking(&self) -> bool {
        self.active && self.tool.captures_strokes()
    }

    #[must_use]
    pub fn is_erasing(&self) -> bool {
        self.active && self.tool == DrawingTool::Eraser
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// One pointer callback from the host, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A contact went down. `on_object` is true when the host reports an
    /// annotation is selected or under the pointer.
    PointerDown { contacts: Vec<Point>, on_object: bool },
    /// Contacts moved.
    PointerMove { contacts: Vec<Point> },
    /// The last contact lifted.
    PointerUp,
    /// Desktop wheel scroll.
    Wheel(WheelDelta),
}

impl InputEvent {
    /// Reason this event cannot be processed, if any.
    #[must_use]
    pub fn malformed(&self) -> Option<&'static str> {
        let contacts = match self {
            Self::PointerDown { contacts, .. } | Self::PointerMove { contacts } => contacts,
            Self::PointerUp => return None,
            Self::Wheel(d) => {
                return (!(d.dx.is_finite() && d.dy.is_finite())).then_some("non-finite wheel delta");
            }
        };
        if contacts.is_empty() {
            return Some("no contacts");
        }
        if contacts.iter().any(|p| !p.is_finite()) {
            return Some("non-finite contact");
        }
        None
    }
}

/// Internal state for the gesture state machine.
///
/// Each active variant carries the context needed to compute deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the page with one contact.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Two-contact pinch.
    Pinching {
        /// Contact distance at the previous frame; zero until the first frame is seen.
        last_distance: f64,
    },
    /// Drawing mode owns the pointer.
    Drawing {
        /// A stroke is being captured (pen/highlighter with one contact).
        capturing: bool,
    },
}

impl GestureState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
