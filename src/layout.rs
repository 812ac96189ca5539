//! Vertical page stack: where each rendered page sits on the canvas.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use crate::consts::{PAGE_SPACING, PAGE_UNIT};
use crate::error::SignerError;
use crate::geometry::{Point, Rect, Size};
use crate::services::RenderedPage;

/// A page's placement on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlot {
    /// 0-based source index.
    pub index: usize,
    /// On-canvas rectangle (scaled size at zoom 1).
    pub rect: Rect,
}

impl PageSlot {
    /// 1-based number used for navigation.
    #[must_use]
    pub fn number(&self) -> usize {
        self.index + 1
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        self.rect.origin()
    }
}

fn is_drawable(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

/// Pages stacked top to bottom with a gap of [`PAGE_SPACING`] page heights.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pages: Vec<PageSlot>,
}

impl PageLayout {
    /// Stack rendered pages in source order.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDocument` when no pages were rendered, and `Render` when
    /// a page came back with a zero, negative, or non-finite size.
    pub fn stack(mut rendered: Vec<RenderedPage>) -> Result<Self, SignerError> {
        if rendered.is_empty() {
            return Err(SignerError::EmptyDocument);
        }
        if let Some(bad) = rendered.iter().find(|p| !is_drawable(p.size)) {
            return Err(SignerError::Render(format!(
                "page {} rendered as {}x{}",
                bad.index, bad.size.width, bad.size.height
            )));
        }
        rendered.sort_by_key(|p| p.index);
        let mut top = 0.0;
        let pages = rendered
            .into_iter()
            .map(|p| {
                let slot = PageSlot { index: p.index, rect: Rect::from_origin_size(Point::new(0.0, top), p.size) };
                top += p.size.height * PAGE_UNIT;
                slot
            })
            .collect();
        Ok(Self { pages })
    }

    #[must_use]
    pub fn pages(&self) -> &[PageSlot] {
        &self.pages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Size of the first page; all pages are assumed to share its width.
    #[must_use]
    pub fn first_page(&self) -> Size {
        self.pages.first().map(|p| p.rect.size()).unwrap_or_default()
    }

    /// Sum of page heights plus the gaps between them (none below the last page).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn content_height(&self) -> f64 {
        let heights: f64 = self.pages.iter().map(|p| p.rect.height).sum();
        let gaps = self.pages.len().saturating_sub(1) as f64;
        heights + PAGE_SPACING * self.first_page().height * gaps
    }

    #[must_use]
    pub fn page(&self, number: usize) -> Option<&PageSlot> {
        number.checked_sub(1).and_then(|i| self.pages.get(i))
    }
}
