//! Canvas-to-native page coordinate mapping.
//!
//! The canvas draws a page at its rendered pixel size with Y growing downward;
//! the output document measures the same page in its own units with Y growing
//! upward from the bottom-left corner. One uniform factor relates the two, so
//! a page whose rendered and native aspect ratios differ is distorted on
//! export. That is accepted, not reported.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use crate::error::SignerError;
use crate::geometry::{Point, Rect, Size};

/// Maps one page's canvas geometry onto its native geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransformer {
    page_origin: Option<Point>,
    canvas: Size,
    native: Size,
    scale: f64,
}

impl CoordinateTransformer {
    /// `page_origin` is the page's top-left on the canvas, `canvas` its scaled
    /// size there, `native` its size in document units.
    #[must_use]
    pub fn new(page_origin: Option<Point>, canvas: Size, native: Size) -> Self {
        Self { page_origin, canvas, native, scale: native.width / canvas.width }
    }

    /// Native units per canvas unit.
    #[must_use]
    pub fn scale_factor(&self) -> f64 {
        self.scale
    }

    /// Canvas units per native unit.
    #[must_use]
    pub fn canvas_scale_factor(&self) -> f64 {
        self.canvas.width / self.native.width
    }

    /// Map a canvas point to native page coordinates, flipping the Y axis.
    ///
    /// # Errors
    ///
    /// Returns `MissingGeometry` when the page or the object has no position.
    pub fn to_native_coords(&self, point: Option<Point>) -> Result<Point, SignerError> {
        let origin = self.page_origin.ok_or(SignerError::MissingGeometry("page position"))?;
        let point = point.ok_or(SignerError::MissingGeometry("object position"))?;
        let x = point.x - origin.x;
        let y = point.y - origin.y;
        Ok(Point::new(self.scale * x, self.scale * (self.canvas.height - y)))
    }

    #[must_use]
    pub fn to_native_length(&self, l: f64) -> f64 {
        l * self.scale
    }

    #[must_use]
    pub fn to_canvas_length(&self, l: f64) -> f64 {
        l * self.canvas_scale_factor()
    }

    /// Native rectangle for an image whose top-left sits at `object_origin`.
    ///
    /// The returned `y` is the bottom edge, since native placement anchors at
    /// the bottom-left while the canvas anchors at the top-left.
    ///
    /// # Errors
    ///
    /// Returns `MissingGeometry` as for [`Self::to_native_coords`].
    pub fn to_native_placement(&self, object_origin: Option<Point>, image: Size) -> Result<Rect, SignerError> {
        let coords = self.to_native_coords(object_origin)?;
        let width = self.to_native_length(image.width);
        let height = self.to_native_length(image.height);
        Ok(Rect::new(coords.x, coords.y - height, width, height))
    }
}
