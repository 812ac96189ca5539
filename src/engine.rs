use futures::future::try_join_all;
use tracing::{debug, info};

use crate::annotation::{Annotation, AnnotationId, AnnotationStore, Stroke, TextPlacement};
use crate::boundary::Boundary;
use crate::config::SignerConfig;
use crate::export::{self, ExportedDocument};
use crate::error::SignerError;
use crate::geometry::{Point, Rect, Size, Viewport};
use crate::input::{DrawingMode, DrawingTool, InputEvent};
use crate::layout::PageLayout;
use crate::services::{ContainerMetrics, ImageInfo, RenderedPage, SceneSnapshot, Services};
use crate::source::{Source, SourceKind, file_extension};
use crate::viewport::ViewportController;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Side effects returned to the host after an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Re-apply the canvas transform.
    ViewportChanged(Viewport),
    /// Scroll the outer page. [`Engine`] performs this itself before returning.
    ScrollHost { dx: f64, dy: f64 },
    CurrentPageChanged(usize),
    /// Turn the host's freehand brush on or off.
    StrokeCaptureChanged(bool),
    StrokeStarted(Point),
    StrokeExtended(Point),
    StrokeFinished,
    EraseAt(Point),
    AnnotationAdded(AnnotationId),
    AnnotationRemoved(AnnotationId),
}

/// A loaded document and its on-screen state.
struct Session {
    source: Source,
    layout: PageLayout,
    view: ViewportController,
}

/// Core engine state: everything that does not need a collaborator.
///
/// Separated from `Engine` so it can be tested without a browser.
pub struct EngineCore {
    config: SignerConfig,
    session: Option<Session>,
    annotations: AnnotationStore,
    drawing: DrawingMode,
    pending: Option<Stroke>,
}

impl EngineCore {
    #[must_use]
    pub fn new(config: SignerConfig) -> Self {
        Self { config, session: None, annotations: AnnotationStore::new(), drawing: DrawingMode::default(), pending: None }
    }

    #[must_use]
    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn ensure_initialized(&self) -> Result<(), SignerError> {
        self.session().map(|_| ())
    }

    fn session(&self) -> Result<&Session, SignerError> {
        self.session.as_ref().ok_or(SignerError::UninitializedSurface)
    }

    fn session_mut(&mut self) -> Result<&mut Session, SignerError> {
        self.session.as_mut().ok_or(SignerError::UninitializedSurface)
    }

    /// Canvas size for a container: explicit override, then `data-*`
    /// attributes, then the measured box. The border comes off the width.
    #[must_use]
    pub fn canvas_size(&self, metrics: &ContainerMetrics) -> Size {
        let width = self.config.container_width.or(metrics.data_width).unwrap_or(metrics.offset_width);
        let height = self.config.container_height.or(metrics.data_height).unwrap_or(metrics.offset_height);
        Size::new((width - self.config.container_border).max(1.0), height.max(1.0))
    }

    /// Raster density for page rendering. Images are shown at their natural size.
    #[must_use]
    pub fn render_scale(&self, kind: SourceKind, device_pixel_ratio: f64) -> f64 {
        match kind {
            SourceKind::Pdf => device_pixel_ratio.max(1.0) * self.config.raster_scale,
            SourceKind::Image => 1.0,
        }
    }

    // --- Lifecycle ---

    /// Install rendered pages and fit them to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInitialized` on a second load and `EmptyDocument` when
    /// `pages` is empty.
    pub fn load(&mut self, source: Source, pages: Vec<RenderedPage>, canvas: Size) -> Result<Vec<Action>, SignerError> {
        if self.session.is_some() {
            return Err(SignerError::AlreadyInitialized);
        }
        let layout = PageLayout::stack(pages)?;
        let view = ViewportController::new(&layout, canvas, &self.config);
        info!(
            source = %source.location,
            pages = layout.len(),
            width = canvas.width,
            height = canvas.height,
            zoom = view.viewport().zoom,
            "document loaded"
        );
        let actions = vec![Action::ViewportChanged(view.viewport()), Action::CurrentPageChanged(view.current_page())];
        self.session = Some(Session { source, layout, view });
        Ok(actions)
    }

    /// Refit after the container changed size.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn resize(&mut self, canvas: Size) -> Result<Vec<Action>, SignerError> {
        let session = self.session_mut()?;
        Ok(session.view.resize(&session.layout, canvas))
    }

    // --- Queries ---

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn viewport(&self) -> Result<Viewport, SignerError> {
        Ok(self.session()?.view.viewport())
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn current_page(&self) -> Result<usize, SignerError> {
        Ok(self.session()?.view.current_page())
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn total_pages(&self) -> Result<usize, SignerError> {
        Ok(self.session()?.view.total_pages())
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn boundary(&self) -> Result<Boundary, SignerError> {
        Ok(*self.session()?.view.boundary())
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn layout(&self) -> Result<&PageLayout, SignerError> {
        Ok(&self.session()?.layout)
    }

    #[must_use]
    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    #[must_use]
    pub fn drawing_mode(&self) -> DrawingMode {
        self.drawing
    }

    // --- Viewport operations ---

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn zoom_in(&mut self) -> Result<Vec<Action>, SignerError> {
        Ok(self.session_mut()?.view.zoom_in())
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn zoom_out(&mut self) -> Result<Vec<Action>, SignerError> {
        Ok(self.session_mut()?.view.zoom_out())
    }

    /// Programmatic pan. Never scrolls the outer page.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Result<Vec<Action>, SignerError> {
        Ok(self.session_mut()?.view.pan_by(dx, dy, false))
    }

    /// One pinch frame with contacts `a` and `b` in screen space.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn pinch_zoom(&mut self, a: Point, b: Point) -> Result<Vec<Action>, SignerError> {
        Ok(self.session_mut()?.view.pinch(a, b))
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load and `PageOutOfRange` for a
    /// page outside `1..=total_pages`.
    pub fn go_to_page(&mut self, page: usize) -> Result<Vec<Action>, SignerError> {
        self.session_mut()?.view.go_to_page(page)
    }

    // --- Drawing mode ---

    /// Toggle drawing mode. Enabling starts with the pen; disabling drops
    /// any stroke in progress.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn set_drawing_mode(&mut self, enabled: bool) -> Result<Vec<Action>, SignerError> {
        self.ensure_initialized()?;
        self.drawing.set_enabled(enabled);
        if !enabled {
            self.pending = None;
        }
        debug!(enabled, tool = ?self.drawing.tool, "drawing mode");
        Ok(vec![Action::StrokeCaptureChanged(self.drawing.is_inking())])
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn set_drawing_tool(&mut self, tool: DrawingTool) -> Result<Vec<Action>, SignerError> {
        self.ensure_initialized()?;
        self.drawing.tool = tool;
        if !tool.captures_strokes() {
            self.pending = None;
        }
        Ok(vec![Action::StrokeCaptureChanged(self.drawing.is_inking())])
    }

    fn stroke_width(&self, tool: DrawingTool) -> f64 {
        match tool {
            DrawingTool::Highlighter => self.config.highlighter_width,
            DrawingTool::Pen | DrawingTool::Eraser => self.config.pen_width,
        }
    }

    // --- Input ---

    /// Feed one host pointer event through the gesture machine, then apply
    /// the stroke and eraser actions it produced to the annotation store.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn dispatch(&mut self, event: &InputEvent) -> Result<Vec<Action>, SignerError> {
        let drawing = self.drawing;
        let actions = self.session_mut()?.view.handle(event, drawing);
        let mut out = Vec::with_capacity(actions.len());
        for action in actions {
            let follow_up = self.apply_ink(&action);
            out.push(action);
            out.extend(follow_up);
        }
        Ok(out)
    }

    fn apply_ink(&mut self, action: &Action) -> Vec<Action> {
        match *action {
            Action::StrokeStarted(p) => {
                let tool = self.drawing.tool;
                let mut stroke = Stroke::new(tool, self.stroke_width(tool));
                stroke.push(p);
                self.pending = Some(stroke);
                Vec::new()
            }
            Action::StrokeExtended(p) => {
                if let Some(stroke) = self.pending.as_mut() {
                    stroke.push(p);
                }
                Vec::new()
            }
            Action::StrokeFinished => {
                let Some(annotation) = self.pending.take().and_then(Annotation::drawing) else {
                    return Vec::new();
                };
                vec![Action::AnnotationAdded(self.annotations.insert(annotation))]
            }
            Action::StrokeCaptureChanged(false) => {
                self.pending = None;
                Vec::new()
            }
            Action::EraseAt(p) => self.annotations.erase_at(p).into_iter().map(Action::AnnotationRemoved).collect(),
            _ => Vec::new(),
        }
    }

    // --- Annotations ---

    fn visible_center(&self) -> Result<Point, SignerError> {
        let view = &self.session()?.view;
        Ok(view.viewport().visible_window(view.canvas()).center())
    }

    /// Add a signature, centred in the visible window.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load and `MissingGeometry` when
    /// the strokes carry no points.
    pub fn add_signature(&mut self, strokes: Vec<Stroke>) -> Result<AnnotationId, SignerError> {
        let center = self.visible_center()?;
        let mut annotation = Annotation::signature(strokes).ok_or(SignerError::MissingGeometry("signature strokes"))?;
        if let Some(bounds) = annotation.bounds {
            let c = bounds.center();
            annotation.translate(center.x - c.x, center.y - c.y);
        }
        let id = self.annotations.insert(annotation);
        info!(%id, "signature added");
        Ok(id)
    }

    /// Add one drawing annotation per non-empty stroke, at the strokes' own
    /// canvas coordinates.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn add_drawing(&mut self, strokes: Vec<Stroke>) -> Result<Vec<AnnotationId>, SignerError> {
        self.ensure_initialized()?;
        let ids: Vec<AnnotationId> =
            strokes.into_iter().filter_map(Annotation::drawing).map(|a| self.annotations.insert(a)).collect();
        debug!(count = ids.len(), "drawings added");
        Ok(ids)
    }

    /// Place an image already handed to the host.
    ///
    /// A single image is scaled to the configured width and centred in the
    /// visible window. With `all_pages`, a copy is scaled to each page's
    /// width and centred vertically on that page.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn insert_image(&mut self, image: ImageInfo, opacity: f64, all_pages: bool) -> Result<Vec<AnnotationId>, SignerError> {
        let opacity = opacity.clamp(0.0, 1.0);
        let rects: Vec<Rect> = if all_pages {
            self.session()?
                .layout
                .pages()
                .iter()
                .map(|page| {
                    let size = image.size.scaled_to_width(page.rect.width);
                    Rect::new(page.rect.x, page.rect.y + (page.rect.height - size.height) / 2.0, size.width, size.height)
                })
                .collect()
        } else {
            let size = image.size.scaled_to_width(self.config.inserted_image_width);
            let center = self.visible_center()?;
            vec![Rect::from_origin_size(Point::new(0.0, 0.0), size).centered_on(center)]
        };
        let ids: Vec<AnnotationId> = rects
            .into_iter()
            .map(|r| self.annotations.insert(Annotation::image(image.handle.clone(), image.size, r, opacity)))
            .collect();
        info!(count = ids.len(), all_pages, "image inserted");
        Ok(ids)
    }

    /// Place a text box measured by the host at `text_size`.
    ///
    /// `placement.left` is measured from the right edge of the canvas to the
    /// end of the text.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn insert_text(&mut self, text: String, placement: TextPlacement, text_size: Size) -> Result<AnnotationId, SignerError> {
        let canvas = self.session()?.view.canvas();
        let left = canvas.width - text_size.width - placement.left;
        let bounds = Rect::new(left, placement.top, text_size.width, text_size.height);
        let id = self.annotations.insert(Annotation::textbox(text, placement.font_size, bounds));
        debug!(%id, left, top = placement.top, "text inserted");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn remove_annotation(&mut self, id: AnnotationId) -> Result<Vec<Action>, SignerError> {
        self.ensure_initialized()?;
        Ok(self.annotations.remove(&id).map(|a| Action::AnnotationRemoved(a.id)).into_iter().collect())
    }

    // --- Export inputs ---

    fn pdf_session(&self) -> Result<&Session, SignerError> {
        let session = self.session()?;
        match session.source.kind {
            SourceKind::Pdf => Ok(session),
            SourceKind::Image => Err(SignerError::UnsupportedSourceType(file_extension(&session.source.location).to_owned())),
        }
    }

    /// Scene painted for raster export: first page fitted, pan at the origin,
    /// canvas the size of the fitted page. The live viewport is untouched.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn raster_scene(&self) -> Result<SceneSnapshot<'_>, SignerError> {
        let session = self.session()?;
        let page = session.layout.first_page();
        let zoom = Boundary::fit_zoom(page, session.view.canvas());
        Ok(SceneSnapshot {
            canvas: Size::new(page.width * zoom, page.height * zoom),
            viewport: Viewport { zoom, pan_x: 0.0, pan_y: 0.0 },
            pages: session.layout.pages(),
            annotations: self.annotations.sorted(),
        })
    }
}

/// The full signer. Wraps `EngineCore` and drives the collaborators.
pub struct Engine {
    pub core: EngineCore,
    services: Services,
}

impl Engine {
    #[must_use]
    pub fn new(config: SignerConfig, services: Services) -> Self {
        Self { core: EngineCore::new(config), services }
    }

    /// Load `location`: measure the container, render every page, fit.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInitialized` if called twice, `UnsupportedSourceType`
    /// for an unknown extension, `EmptyDocument` for a document without
    /// pages, and any host or renderer failure.
    pub async fn initialize(&mut self, location: &str) -> Result<Vec<Action>, SignerError> {
        if self.core.is_initialized() {
            return Err(SignerError::AlreadyInitialized);
        }
        let source = Source::parse(location)?;
        let metrics = self.services.host.measure()?;
        let canvas = self.core.canvas_size(&metrics);
        let scale = self.core.render_scale(source.kind, metrics.device_pixel_ratio);
        let pages = self.render_pages(&source, scale).await?;
        self.core.load(source, pages, canvas)
    }

    async fn render_pages(&self, source: &Source, scale: f64) -> Result<Vec<RenderedPage>, SignerError> {
        let count = match source.kind {
            SourceKind::Pdf => self.services.renderer.page_count(source).await?,
            SourceKind::Image => 1,
        };
        if count == 0 {
            return Err(SignerError::EmptyDocument);
        }
        debug!(count, scale, "rendering pages");
        let renderer = &self.services.renderer;
        let mut pages = try_join_all((0..count).map(|index| renderer.render_page(source, index, scale))).await?;
        pages.sort_by_key(|p| p.index);
        Ok(pages)
    }

    fn perform(&self, actions: Vec<Action>) -> Vec<Action> {
        for action in &actions {
            if let Action::ScrollHost { dx, dy } = *action {
                self.services.host.scroll_by(dx, dy);
            }
        }
        actions
    }

    /// Measure the container again and refit.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load and `Host` when the
    /// container cannot be measured.
    pub fn resize(&mut self) -> Result<Vec<Action>, SignerError> {
        self.core.ensure_initialized()?;
        let metrics = self.services.host.measure()?;
        let canvas = self.core.canvas_size(&metrics);
        self.core.resize(canvas)
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn dispatch(&mut self, event: &InputEvent) -> Result<Vec<Action>, SignerError> {
        let actions = self.core.dispatch(event)?;
        Ok(self.perform(actions))
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn zoom_in(&mut self) -> Result<Vec<Action>, SignerError> {
        self.core.zoom_in()
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn zoom_out(&mut self) -> Result<Vec<Action>, SignerError> {
        self.core.zoom_out()
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Result<Vec<Action>, SignerError> {
        self.core.pan_by(dx, dy)
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn pinch_zoom(&mut self, a: Point, b: Point) -> Result<Vec<Action>, SignerError> {
        self.core.pinch_zoom(a, b)
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load or `PageOutOfRange`.
    pub fn go_to_page(&mut self, page: usize) -> Result<Vec<Action>, SignerError> {
        self.core.go_to_page(page)
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn set_drawing_mode(&mut self, enabled: bool) -> Result<Vec<Action>, SignerError> {
        self.core.set_drawing_mode(enabled)
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn set_drawing_tool(&mut self, tool: DrawingTool) -> Result<Vec<Action>, SignerError> {
        self.core.set_drawing_tool(tool)
    }

    /// # Errors
    ///
    /// See [`EngineCore::add_signature`].
    pub fn add_signature(&mut self, strokes: Vec<Stroke>) -> Result<AnnotationId, SignerError> {
        self.core.add_signature(strokes)
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn add_drawing(&mut self, strokes: Vec<Stroke>) -> Result<Vec<AnnotationId>, SignerError> {
        self.core.add_drawing(strokes)
    }

    /// Hand `bytes` to the host as an image and place it.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load and `Image`/`Host` when the
    /// bytes cannot be turned into an image.
    pub fn insert_image(&mut self, bytes: &[u8], opacity: f64, all_pages: bool) -> Result<Vec<AnnotationId>, SignerError> {
        self.core.ensure_initialized()?;
        let image = self.services.host.create_image_from_bytes(bytes)?;
        self.core.insert_image(image, opacity, all_pages)
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn insert_text(&mut self, text: &str, placement: TextPlacement) -> Result<AnnotationId, SignerError> {
        self.core.ensure_initialized()?;
        let size = self.services.host.measure_text(text, placement.font_size);
        self.core.insert_text(text.to_owned(), placement, size)
    }

    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load.
    pub fn remove_annotation(&mut self, id: AnnotationId) -> Result<Vec<Action>, SignerError> {
        self.core.remove_annotation(id)
    }

    /// Burn all annotations into the source document and return its bytes.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load, `UnsupportedSourceType`
    /// for image sources, and any mutator failure.
    pub async fn export_document(&self) -> Result<ExportedDocument, SignerError> {
        let session = self.core.pdf_session()?;
        export::export_document(
            &session.source,
            &session.layout,
            &self.core.annotations,
            self.services.mutator.as_ref(),
            self.services.rasterizer.as_ref(),
        )
        .await
    }

    /// Rasterize the fitted first page with its annotations.
    ///
    /// # Errors
    ///
    /// Returns `UninitializedSurface` before load and any rasterizer failure.
    pub async fn export_raster_image(&self) -> Result<Vec<u8>, SignerError> {
        let scene = self.core.raster_scene()?;
        let png = self.services.rasterizer.rasterize_scene(&scene).await?;
        info!(bytes = png.len(), zoom = scene.viewport.zoom, "raster exported");
        Ok(png)
    }
}
