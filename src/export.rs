//! Export pipeline: burn annotations into the native document.
//!
//! DESIGN
//! ======
//! Pages are visited in order. Each page gets its own coordinate transformer
//! built from the rendered page rectangle and the native page size. Every
//! annotation grouped onto the page is rasterized and embedded at its mapped
//! native rectangle, strokes first, then images, then text boxes.
//!
//! A single annotation that fails to rasterize is logged and recorded in the
//! report; the rest of the document still exports. Failures from the native
//! document itself abort the export.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use tracing::{debug, info, warn};

use crate::annotation::{AnnotationId, AnnotationStore, group_by_page};
use crate::error::SignerError;
use crate::geometry::Size;
use crate::layout::PageLayout;
use crate::services::{DocumentMutator, NativeDocument, Rasterizer};
use crate::source::Source;
use crate::transform::CoordinateTransformer;

/// An annotation left out of the export.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub id: AnnotationId,
    pub page_index: usize,
    pub reason: String,
}

/// Outcome of merging annotations into a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    /// Number of images embedded. Straddling annotations count once per page.
    pub embedded: usize,
    pub skipped: Vec<Skipped>,
}

/// Saved document bytes plus what went into them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub report: ExportReport,
}

/// Embed every annotation of `store` into `doc`.
///
/// # Errors
///
/// Returns `PageCountMismatch` when `doc` and `layout` disagree on the page
/// count, `MissingGeometry` when a native page has no size, and any error
/// raised by `embed_image`.
pub async fn merge_annotations(
    doc: &mut dyn NativeDocument,
    layout: &PageLayout,
    store: &AnnotationStore,
    rasterizer: &dyn Rasterizer,
) -> Result<ExportReport, SignerError> {
    let native_pages = doc.page_count();
    if native_pages != layout.len() {
        return Err(SignerError::PageCountMismatch { native: native_pages, rendered: layout.len() });
    }

    let mut report = ExportReport::default();
    for (slot, group) in layout.pages().iter().zip(group_by_page(layout.pages(), store)) {
        let native = doc.page_size(slot.index).ok_or(SignerError::MissingGeometry("native page size"))?;
        let transformer = CoordinateTransformer::new(Some(slot.origin()), slot.rect.size(), native);
        debug!(page = slot.index, annotations = group.len(), scale = transformer.scale_factor(), "merging page");

        for annotation in group.iter() {
            let raster = match rasterizer.rasterize_annotation(annotation).await {
                Ok(raster) => raster,
                Err(e) => {
                    warn!(id = %annotation.id, page = slot.index, error = %e, "annotation rasterize failed; skipping");
                    report.skipped.push(Skipped { id: annotation.id, page_index: slot.index, reason: e.to_string() });
                    continue;
                }
            };
            let at = transformer.to_native_placement(annotation.position(), Size::new(raster.width, raster.height))?;
            doc.embed_image(slot.index, &raster, at).await?;
            report.embedded += 1;
        }
    }
    Ok(report)
}

/// Load the native document for `source`, merge annotations, and save.
///
/// # Errors
///
/// Propagates load, merge, and save failures.
pub async fn export_document(
    source: &Source,
    layout: &PageLayout,
    store: &AnnotationStore,
    mutator: &dyn DocumentMutator,
    rasterizer: &dyn Rasterizer,
) -> Result<ExportedDocument, SignerError> {
    let mut doc = mutator.load(source).await?;
    let report = merge_annotations(doc.as_mut(), layout, store, rasterizer).await?;
    let bytes = doc.save().await?;
    info!(embedded = report.embedded, skipped = report.skipped.len(), bytes = bytes.len(), "document exported");
    Ok(ExportedDocument { bytes, report })
}
