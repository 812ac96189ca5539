//! Collaborator seams: the host surface, the page renderer, the document
//! mutator, and the rasterizer.
//!
//! The engine never touches the DOM, a PDF parser, or pixel buffers directly.
//! Everything it needs from the outside world arrives through these traits so
//! the pan/zoom/export logic can be driven by plain test doubles. Browser
//! futures are `!Send`, hence `?Send` throughout.

#[cfg(test)]
#[path = "services_test.rs"]
mod services_test;

use std::io::Cursor;

use async_trait::async_trait;

use crate::annotation::Annotation;
use crate::error::SignerError;
use crate::geometry::{Rect, Size, Viewport};
use crate::layout::PageSlot;
use crate::source::Source;

/// Raw sizing information about the hosting container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerMetrics {
    /// Explicit `data-width` attribute, if present and numeric.
    pub data_width: Option<f64>,
    /// Explicit `data-height` attribute, if present and numeric.
    pub data_height: Option<f64>,
    /// Measured box width.
    pub offset_width: f64,
    /// Measured box height.
    pub offset_height: f64,
    pub device_pixel_ratio: f64,
}

/// An image handed to the host and ready to be placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    /// Host-side handle (e.g. an object URL) used when drawing the image.
    pub handle: String,
    /// Natural pixel size.
    pub size: Size,
}

/// One page as produced by the page renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedPage {
    /// 0-based position in the source document.
    pub index: usize,
    /// Rendered pixel size; this is the page's size on the canvas.
    pub size: Size,
}

/// Encoded raster produced by the rasterizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub png: Vec<u8>,
    pub width: f64,
    pub height: f64,
}

/// Everything needed to paint the canvas for raster export.
#[derive(Debug, Clone)]
pub struct SceneSnapshot<'a> {
    pub canvas: Size,
    pub viewport: Viewport,
    pub pages: &'a [PageSlot],
    pub annotations: Vec<&'a Annotation>,
}

/// Capabilities of the element hosting the canvas.
pub trait HostSurface {
    /// # Errors
    ///
    /// Returns `Host` when the container can no longer be measured.
    fn measure(&self) -> Result<ContainerMetrics, SignerError>;

    /// Scroll the outer document, chaining a pan that hit the canvas edge.
    fn scroll_by(&self, dx: f64, dy: f64);

    /// # Errors
    ///
    /// Returns `Image` when the bytes are not a decodable image.
    fn create_image_from_bytes(&self, bytes: &[u8]) -> Result<ImageInfo, SignerError>;

    /// Laid-out size of a single-line text run at `font_size`.
    fn measure_text(&self, text: &str, font_size: f64) -> Size;
}

/// Turns a document source into page rasters. Never parsed in this crate.
#[async_trait(?Send)]
pub trait PageRenderer {
    /// # Errors
    ///
    /// Returns `Render` when the source cannot be opened.
    async fn page_count(&self, source: &Source) -> Result<usize, SignerError>;

    /// # Errors
    ///
    /// Returns `Render` when the page fails to rasterize.
    async fn render_page(&self, source: &Source, index: usize, scale: f64) -> Result<RenderedPage, SignerError>;
}

/// Loads the native document for export.
#[async_trait(?Send)]
pub trait DocumentMutator {
    /// # Errors
    ///
    /// Returns `Mutation` when the source bytes cannot be fetched or loaded.
    async fn load(&self, source: &Source) -> Result<Box<dyn NativeDocument>, SignerError>;
}

/// A loaded native document that accepts embedded images.
#[async_trait(?Send)]
pub trait NativeDocument {
    fn page_count(&self) -> usize;

    /// Native size of page `index` (0-based) in document units.
    fn page_size(&self, index: usize) -> Option<Size>;

    /// Embed `image` into page `index` at `at` (native units, bottom-left anchored).
    ///
    /// # Errors
    ///
    /// Returns `Mutation` on failure.
    async fn embed_image(&mut self, index: usize, image: &RasterImage, at: Rect) -> Result<(), SignerError>;

    /// # Errors
    ///
    /// Returns `Mutation` on failure.
    async fn save(&mut self) -> Result<Vec<u8>, SignerError>;
}

/// Pixel rendering of canvas content.
#[async_trait(?Send)]
pub trait Rasterizer {
    /// # Errors
    ///
    /// Returns `Rasterize` when the annotation cannot be drawn.
    async fn rasterize_annotation(&self, annotation: &Annotation) -> Result<RasterImage, SignerError>;

    /// # Errors
    ///
    /// Returns `Rasterize` when the scene cannot be drawn.
    async fn rasterize_scene(&self, scene: &SceneSnapshot<'_>) -> Result<Vec<u8>, SignerError>;
}

/// The full set of collaborators an [`crate::engine::Engine`] drives.
pub struct Services {
    pub host: Box<dyn HostSurface>,
    pub renderer: Box<dyn PageRenderer>,
    pub mutator: Box<dyn DocumentMutator>,
    pub rasterizer: Box<dyn Rasterizer>,
}

/// Read an encoded image's pixel size without decoding its pixels.
///
/// # Errors
///
/// Returns `Image` when the format is unknown or the header is corrupt.
pub fn probe_image(bytes: &[u8]) -> Result<Size, SignerError> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format().map_err(image::ImageError::IoError)?;
    let (w, h) = reader.into_dimensions()?;
    Ok(Size::new(f64::from(w), f64::from(h)))
}
