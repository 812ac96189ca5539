//! Signer configuration parsed from the host's JSON options object.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    CONTAINER_BORDER_PX, HIGHLIGHTER_WIDTH, INSERTED_IMAGE_WIDTH, PEN_WIDTH, RASTER_SCALE, SCROLL_CHAIN_STEP,
    ZOOM_IN_RATIO, ZOOM_OUT_RATIO,
};
use crate::error::SignerError;

/// How discrete zoom-in/zoom-out buttons change the zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ZoomStep {
    /// Multiply by 6/5 or 5/6.
    Ratio,
    /// Add or subtract a fixed increment (small layouts).
    Fixed { increment: f64 },
}

impl Default for ZoomStep {
    fn default() -> Self {
        Self::Ratio
    }
}

impl ZoomStep {
    #[must_use]
    pub fn zoom_in(self, zoom: f64) -> f64 {
        match self {
            Self::Ratio => zoom * ZOOM_IN_RATIO,
            Self::Fixed { increment } => zoom + increment,
        }
    }

    #[must_use]
    pub fn zoom_out(self, zoom: f64) -> f64 {
        match self {
            Self::Ratio => zoom * ZOOM_OUT_RATIO,
            Self::Fixed { increment } => zoom - increment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Canvas width override; wins over the container's `data-width`.
    pub container_width: Option<f64>,
    /// Canvas height override; wins over the container's `data-height`.
    pub container_height: Option<f64>,
    /// Subtracted from the container width to leave room for its border.
    pub container_border: f64,
    /// Page raster density on top of the device pixel ratio.
    pub raster_scale: f64,
    pub zoom_step: ZoomStep,
    /// Outer scroll amount when a drag pan hits the top/bottom edge.
    pub scroll_chain_step: f64,
    /// Width given to a single inserted image.
    pub inserted_image_width: f64,
    pub pen_width: f64,
    pub highlighter_width: f64,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            container_width: None,
            container_height: None,
            container_border: CONTAINER_BORDER_PX,
            raster_scale: RASTER_SCALE,
            zoom_step: ZoomStep::Ratio,
            scroll_chain_step: SCROLL_CHAIN_STEP,
            inserted_image_width: INSERTED_IMAGE_WIDTH,
            pen_width: PEN_WIDTH,
            highlighter_width: HIGHLIGHTER_WIDTH,
        }
    }
}

impl SignerConfig {
    /// Parse and validate a JSON options object. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns `Config` on malformed JSON and `InvalidConfig` when a value is
    /// out of range.
    pub fn from_json(raw: &str) -> Result<Self, SignerError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), SignerError> {
        for (name, value) in [("container_width", self.container_width), ("container_height", self.container_height)] {
            if let Some(v) = value {
                if !(v.is_finite() && v > 0.0) {
                    return Err(SignerError::InvalidConfig(format!("{name} must be positive, got {v}")));
                }
            }
        }
        let positives = [
            ("raster_scale", self.raster_scale),
            ("inserted_image_width", self.inserted_image_width),
            ("pen_width", self.pen_width),
            ("highlighter_width", self.highlighter_width),
        ];
        for (name, v) in positives {
            if !(v.is_finite() && v > 0.0) {
                return Err(SignerError::InvalidConfig(format!("{name} must be positive, got {v}")));
            }
        }
        if !(self.container_border.is_finite() && self.container_border >= 0.0) {
            return Err(SignerError::InvalidConfig("container_border must be non-negative".into()));
        }
        if !(self.scroll_chain_step.is_finite() && self.scroll_chain_step >= 0.0) {
            return Err(SignerError::InvalidConfig("scroll_chain_step must be non-negative".into()));
        }
        if let ZoomStep::Fixed { increment } = self.zoom_step {
            if !(increment.is_finite() && increment > 0.0) {
                return Err(SignerError::InvalidConfig(format!("zoom increment must be positive, got {increment}")));
            }
        }
        Ok(())
    }
}
