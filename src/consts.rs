//! Shared numeric constants for the signer crate.

// ── Page layout ─────────────────────────────────────────────────

/// Vertical gap between stacked pages, as a fraction of the page height.
pub const PAGE_SPACING: f64 = 0.05;

/// Height of one navigation step in page heights (page plus its gap).
pub const PAGE_UNIT: f64 = 1.0 + PAGE_SPACING;

// ── Zoom ────────────────────────────────────────────────────────

/// Maximum zoom factor.
pub const ZOOM_MAX: f64 = 2.0;

/// Multiplier applied by a discrete zoom-in step.
pub const ZOOM_IN_RATIO: f64 = 6.0 / 5.0;

/// Multiplier applied by a discrete zoom-out step.
pub const ZOOM_OUT_RATIO: f64 = 5.0 / 6.0;

/// Base of the exponential pinch response.
pub const PINCH_BASE: f64 = 0.999;

/// Exponent scale applied to the pinch distance delta (negated).
pub const PINCH_SENSITIVITY: f64 = 4.0;

// ── Host ────────────────────────────────────────────────────────

/// Outer-page scroll amount when a drag pan hits the top or bottom edge.
pub const SCROLL_CHAIN_STEP: f64 = 20.0;

/// Border width subtracted from the measured container width.
pub const CONTAINER_BORDER_PX: f64 = 2.0;

/// Page raster density multiplier on top of the device pixel ratio.
pub const RASTER_SCALE: f64 = 1.5;

// ── Annotations ─────────────────────────────────────────────────

/// Width of a freshly inserted single image, in canvas units.
pub const INSERTED_IMAGE_WIDTH: f64 = 300.0;

/// Pen stroke width in canvas units.
pub const PEN_WIDTH: f64 = 2.0;

/// Highlighter stroke width in canvas units.
pub const HIGHLIGHTER_WIDTH: f64 = 12.0;

/// Highlighter stroke opacity.
pub const HIGHLIGHTER_OPACITY: f64 = 0.4;

/// Tolerance for float comparisons in page math.
pub const EPSILON: f64 = 1e-9;
