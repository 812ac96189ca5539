//! Recording test doubles for the collaborator traits.

use std::cell::RefCell;
use std::collections::HashSet;
use std::io::Cursor;
use std::rc::Rc;

use async_trait::async_trait;

use crate::annotation::{Annotation, AnnotationId};
use crate::error::SignerError;
use crate::geometry::{Rect, Size, Viewport};
use crate::services::{
    ContainerMetrics, DocumentMutator, HostSurface, ImageInfo, NativeDocument, PageRenderer, RasterImage, RenderedPage,
    Rasterizer, SceneSnapshot, Services, probe_image,
};
use crate::source::Source;

/// Encode a blank PNG of `w`x`h` pixels.
pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::new(w, h);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

// =============================================================
// Host
// =============================================================

pub struct MockHost {
    pub metrics: ContainerMetrics,
    pub scrolls: Rc<RefCell<Vec<(f64, f64)>>>,
    pub images: Rc<RefCell<usize>>,
}

impl MockHost {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            metrics: ContainerMetrics {
                data_width: None,
                data_height: None,
                offset_width: width,
                offset_height: height,
                device_pixel_ratio: 1.0,
            },
            scrolls: Rc::default(),
            images: Rc::default(),
        }
    }
}

impl HostSurface for MockHost {
    fn measure(&self) -> Result<ContainerMetrics, SignerError> {
        Ok(self.metrics)
    }

    fn scroll_by(&self, dx: f64, dy: f64) {
        self.scrolls.borrow_mut().push((dx, dy));
    }

    fn create_image_from_bytes(&self, bytes: &[u8]) -> Result<ImageInfo, SignerError> {
        let size = probe_image(bytes)?;
        let mut n = self.images.borrow_mut();
        *n += 1;
        Ok(ImageInfo { handle: format!("blob:mock/{n}"), size })
    }

    /// Half an em per character.
    fn measure_text(&self, text: &str, font_size: f64) -> Size {
        #[allow(clippy::cast_precision_loss)]
        let chars = text.chars().count() as f64;
        Size::new(chars * font_size / 2.0, font_size)
    }
}

// =============================================================
// Renderer
// =============================================================

pub struct MockRenderer {
    /// Native page sizes; rendered size is this times the scale.
    pub pages: Vec<Size>,
    pub fail_page: Option<usize>,
    pub scales: Rc<RefCell<Vec<f64>>>,
}

impl MockRenderer {
    pub fn new(pages: Vec<Size>) -> Self {
        Self { pages, fail_page: None, scales: Rc::default() }
    }
}

#[async_trait(?Send)]
impl PageRenderer for MockRenderer {
    async fn page_count(&self, _source: &Source) -> Result<usize, SignerError> {
        Ok(self.pages.len())
    }

    async fn render_page(&self, _source: &Source, index: usize, scale: f64) -> Result<RenderedPage, SignerError> {
        self.scales.borrow_mut().push(scale);
        if self.fail_page == Some(index) {
            return Err(SignerError::Render(format!("page {index} is corrupt")));
        }
        let native = self.pages.get(index).ok_or_else(|| SignerError::Render(format!("no page {index}")))?;
        Ok(RenderedPage { index, size: Size::new(native.width * scale, native.height * scale) })
    }
}

// =============================================================
// Document mutator
// =============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub page: usize,
    pub at: Rect,
}

pub struct MockDocument {
    pub pages: Vec<Size>,
    pub embeds: Rc<RefCell<Vec<Embed>>>,
    pub fail_embed: bool,
}

impl MockDocument {
    pub fn new(pages: Vec<Size>) -> Self {
        Self { pages, embeds: Rc::default(), fail_embed: false }
    }
}

#[async_trait(?Send)]
impl NativeDocument for MockDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, index: usize) -> Option<Size> {
        self.pages.get(index).copied()
    }

    async fn embed_image(&mut self, index: usize, _image: &RasterImage, at: Rect) -> Result<(), SignerError> {
        if self.fail_embed {
            return Err(SignerError::Mutation("embed refused".into()));
        }
        self.embeds.borrow_mut().push(Embed { page: index, at });
        Ok(())
    }

    async fn save(&mut self) -> Result<Vec<u8>, SignerError> {
        Ok(format!("%PDF embeds={}", self.embeds.borrow().len()).into_bytes())
    }
}

pub struct MockMutator {
    pub pages: Vec<Size>,
    pub embeds: Rc<RefCell<Vec<Embed>>>,
}

impl MockMutator {
    pub fn new(pages: Vec<Size>) -> Self {
        Self { pages, embeds: Rc::default() }
    }
}

#[async_trait(?Send)]
impl DocumentMutator for MockMutator {
    async fn load(&self, _source: &Source) -> Result<Box<dyn NativeDocument>, SignerError> {
        let doc = MockDocument { pages: self.pages.clone(), embeds: Rc::clone(&self.embeds), fail_embed: false };
        Ok(Box::new(doc))
    }
}

// =============================================================
// Rasterizer
// =============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SceneRecord {
    pub canvas: Size,
    pub viewport: Viewport,
    pub pages: usize,
    pub annotations: usize,
}

/// Rasterizes each annotation to its footprint size.
#[derive(Default)]
pub struct MockRasterizer {
    pub fail_for: HashSet<AnnotationId>,
    pub scenes: Rc<RefCell<Vec<SceneRecord>>>,
}

#[async_trait(?Send)]
impl Rasterizer for MockRasterizer {
    async fn rasterize_annotation(&self, annotation: &Annotation) -> Result<RasterImage, SignerError> {
        if self.fail_for.contains(&annotation.id) {
            return Err(SignerError::Rasterize("tainted canvas".into()));
        }
        let r = annotation.footprint().ok_or(SignerError::MissingGeometry("annotation bounds"))?;
        Ok(RasterImage { png: vec![0x89], width: r.width, height: r.height })
    }

    async fn rasterize_scene(&self, scene: &SceneSnapshot<'_>) -> Result<Vec<u8>, SignerError> {
        self.scenes.borrow_mut().push(SceneRecord {
            canvas: scene.canvas,
            viewport: scene.viewport,
            pages: scene.pages.len(),
            annotations: scene.annotations.len(),
        });
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

// =============================================================
// Bundles
// =============================================================

/// Handles for inspecting a mocked [`Services`] after it is moved into an engine.
pub struct Probes {
    pub scrolls: Rc<RefCell<Vec<(f64, f64)>>>,
    pub render_scales: Rc<RefCell<Vec<f64>>>,
    pub embeds: Rc<RefCell<Vec<Embed>>>,
    pub scenes: Rc<RefCell<Vec<SceneRecord>>>,
}

/// Services over `pages` (native sizes) in a `width`x`height` container.
pub fn mock_services(pages: Vec<Size>, width: f64, height: f64) -> (Services, Probes) {
    let host = MockHost::new(width, height);
    let renderer = MockRenderer::new(pages.clone());
    let mutator = MockMutator::new(pages);
    let rasterizer = MockRasterizer::default();
    let probes = Probes {
        scrolls: Rc::clone(&host.scrolls),
        render_scales: Rc::clone(&renderer.scales),
        embeds: Rc::clone(&mutator.embeds),
        scenes: Rc::clone(&rasterizer.scenes),
    };
    let services = Services {
        host: Box::new(host),
        renderer: Box::new(renderer),
        mutator: Box::new(mutator),
        rasterizer: Box::new(rasterizer),
    };
    (services, probes)
}
