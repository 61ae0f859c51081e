//! Page-source abstraction used by the evidence locator.
//!
//! The locator only needs page geometry, literal search and region
//! rasterization. [`PdfDocument`] provides them through the PDF backend;
//! other sources (or test doubles) can implement the same traits.

use super::compositor::CropSpec;
use crate::document::{PdfDocument, PdfPage};
use crate::error::Result;
use crate::geometry::Rect;
use crate::rendering::{HighlightMark, PageRenderer, RenderOptions};
use image::RgbImage;

/// An ordered, paginated document.
pub trait EvidenceSource {
    /// Page handle borrowing the source.
    type Page<'a>: EvidencePage
    where
        Self: 'a;

    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Page at a 0-based index.
    fn page(&self, index: usize) -> Result<Self::Page<'_>>;
}

/// One page of an [`EvidenceSource`].
pub trait EvidencePage {
    /// 1-based page number.
    fn page_number(&self) -> usize;

    /// Page width in page units.
    fn width(&self) -> f32;

    /// Page height in page units.
    fn height(&self) -> f32;

    /// Rectangles of every exact occurrence of `literal`, in document order.
    fn search_text(&self, literal: &str) -> Result<Vec<Rect>>;

    /// Like [`search_text`](Self::search_text), with an occurrence that wraps
    /// across lines split into one rectangle per line.
    ///
    /// Sources without line information may keep the default, which returns
    /// whole occurrences.
    fn search_lines(&self, literal: &str) -> Result<Vec<Rect>> {
        self.search_text(literal)
    }

    /// Rasterize the crop with an optional highlight drawn over the content.
    fn render_region(&self, crop: &CropSpec, highlight: Option<&HighlightMark>) -> Result<RgbImage>;
}

impl EvidenceSource for PdfDocument {
    type Page<'a> = PdfPage<'a>;

    fn page_count(&self) -> usize {
        PdfDocument::page_count(self)
    }

    fn page(&self, index: usize) -> Result<PdfPage<'_>> {
        PdfDocument::page(self, index)
    }
}

impl EvidencePage for PdfPage<'_> {
    fn page_number(&self) -> usize {
        self.number()
    }

    fn width(&self) -> f32 {
        PdfPage::width(self)
    }

    fn height(&self) -> f32 {
        PdfPage::height(self)
    }

    fn search_text(&self, literal: &str) -> Result<Vec<Rect>> {
        self.search(literal)
    }

    fn search_lines(&self, literal: &str) -> Result<Vec<Rect>> {
        PdfPage::search_lines(self, literal)
    }

    fn render_region(&self, crop: &CropSpec, highlight: Option<&HighlightMark>) -> Result<RgbImage> {
        PageRenderer::new(RenderOptions::with_scale(crop.scale)).render_region(self, &crop.rect, highlight)
    }
}
