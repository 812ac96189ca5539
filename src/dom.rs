//! Browser implementation of [`HostSurface`] over `web-sys`.
//!
//! This module is the only place that touches the DOM. It measures the
//! container the canvas lives in, scrolls the window when a drag chains past
//! the canvas edge, turns image bytes into object URLs, and measures text with
//! an off-screen 2D context.

use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, Url, Window};

use crate::error::SignerError;
use crate::geometry::Size;
use crate::services::{ContainerMetrics, HostSurface, ImageInfo, probe_image};

fn js_err(e: &JsValue) -> SignerError {
    SignerError::Host(format!("{e:?}"))
}

/// Parse a positive numeric `data-*` attribute.
fn parse_dimension(raw: Option<String>) -> Option<f64> {
    let raw = raw?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => None,
    }
}

pub struct DomHost {
    window: Window,
    container: HtmlElement,
    /// Off-screen context for text measurement.
    measure: CanvasRenderingContext2d,
}

impl DomHost {
    /// Bind to the element with id `container_id`.
    ///
    /// # Errors
    ///
    /// Returns `MissingContainer` when no such element exists, and `Host`
    /// when there is no window/document or the 2D context is unavailable.
    pub fn attach(container_id: &str) -> Result<Self, SignerError> {
        let window = web_sys::window().ok_or_else(|| SignerError::Host("no window".into()))?;
        let document = window.document().ok_or_else(|| SignerError::Host("no document".into()))?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| SignerError::MissingContainer(container_id.to_owned()))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| SignerError::MissingContainer(container_id.to_owned()))?;
        let measure = measuring_context(&document)?;
        Ok(Self { window, container, measure })
    }
}

fn measuring_context(document: &Document) -> Result<CanvasRenderingContext2d, SignerError> {
    let canvas = document.create_element("canvas").map_err(|e| js_err(&e))?.dyn_into::<HtmlCanvasElement>().map_err(|e| js_err(&e))?;
    canvas
        .get_context("2d")
        .map_err(|e| js_err(&e))?
        .ok_or_else(|| SignerError::Host("2d context unavailable".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|e| js_err(&e))
}

impl HostSurface for DomHost {
    fn measure(&self) -> Result<ContainerMetrics, SignerError> {
        Ok(ContainerMetrics {
            data_width: parse_dimension(self.container.get_attribute("data-width")),
            data_height: parse_dimension(self.container.get_attribute("data-height")),
            offset_width: f64::from(self.container.offset_width()),
            offset_height: f64::from(self.container.offset_height()),
            device_pixel_ratio: self.window.device_pixel_ratio(),
        })
    }

    fn scroll_by(&self, dx: f64, dy: f64) {
        self.window.scroll_by_with_x_and_y(dx, dy);
    }

    fn create_image_from_bytes(&self, bytes: &[u8]) -> Result<ImageInfo, SignerError> {
        let size = probe_image(bytes)?;
        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        let blob = Blob::new_with_u8_array_sequence(&parts).map_err(|e| js_err(&e))?;
        let handle = Url::create_object_url_with_blob(&blob).map_err(|e| js_err(&e))?;
        Ok(ImageInfo { handle, size })
    }

    fn measure_text(&self, text: &str, font_size: f64) -> Size {
        self.measure.set_font(&format!("{font_size}px sans-serif"));
        match self.measure.measure_text(text) {
            Ok(m) => Size::new(m.width(), font_size),
            Err(e) => {
                warn!(error = ?e, "text measurement failed; estimating");
                #[allow(clippy::cast_precision_loss)]
                let chars = text.chars().count() as f64;
                Size::new(chars * font_size / 2.0, font_size)
            }
        }
    }
}
