//! Evidence locator - drives search, matching, cropping and rendering per page.

use super::compositor::{CropSpec, RegionCompositor};
use super::matcher::match_and_mark;
use super::source::{EvidencePage, EvidenceSource};
use crate::config::{EvidenceConfig, FailurePolicy};
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::rendering::HighlightMark;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the manifest written by [`EvidenceResult::save`].
pub const MANIFEST_FILE: &str = "evidence.json";

/// Rendered evidence for one page.
#[derive(Debug, Clone)]
pub struct EvidenceImage {
    /// 1-based page number
    pub page_number: usize,
    /// Rasterized crop
    pub image: RgbImage,
    /// Region that was rendered
    pub crop: CropSpec,
    /// Highlight drawn over the answer, if one qualified
    pub highlight: Option<HighlightMark>,
}

impl EvidenceImage {
    /// File name used when saving this entry.
    pub fn file_name(&self) -> String {
        format!("page_{}.png", self.page_number)
    }
}

/// A page left out under [`FailurePolicy::SkipPage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPage {
    /// 1-based page number
    pub page_number: usize,
    /// Failure message
    pub reason: String,
}

/// Evidence found in one document, in page order.
#[derive(Debug, Clone, Default)]
pub struct EvidenceResult {
    /// One entry per page containing the search sentence
    pub entries: Vec<EvidenceImage>,
    /// Pages whose failure was recorded instead of propagated
    pub skipped: Vec<SkippedPage>,
}

/// Manifest line describing one saved image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// 1-based page number
    pub page_number: usize,
    /// Image file name, relative to the manifest
    pub file: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Nominal resolution
    pub dpi: u32,
    /// Rendered page region
    pub crop: Rect,
    /// Highlight drawn over the answer
    pub highlight: Option<HighlightMark>,
}

/// JSON manifest of an [`EvidenceResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceManifest {
    /// Rendered pages
    pub entries: Vec<ManifestEntry>,
    /// Pages skipped after a failure
    pub skipped: Vec<SkippedPage>,
}

impl EvidenceResult {
    /// Number of evidence images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no page contained the search sentence.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Page numbers with evidence, in order.
    pub fn page_numbers(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.page_number).collect()
    }

    /// `(image, page_number)` pairs in page order.
    pub fn into_pairs(self) -> Vec<(RgbImage, usize)> {
        self.entries.into_iter().map(|e| (e.image, e.page_number)).collect()
    }

    /// Describe the result without pixel data.
    pub fn manifest(&self) -> EvidenceManifest {
        EvidenceManifest {
            entries: self
                .entries
                .iter()
                .map(|e| ManifestEntry {
                    page_number: e.page_number,
                    file: e.file_name(),
                    width: e.image.width(),
                    height: e.image.height(),
                    dpi: e.crop.dpi,
                    crop: e.crop.rect,
                    highlight: e.highlight,
                })
                .collect(),
            skipped: self.skipped.clone(),
        }
    }

    /// Write every image as `page_<n>.png` plus the JSON manifest into `dir`.
    ///
    /// Returns the manifest path.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for entry in &self.entries {
            let path = dir.join(entry.file_name());
            entry
                .image
                .save_with_format(&path, image::ImageFormat::Png)
                .map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))?;
        }
        let manifest_path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&self.manifest())?;
        std::fs::write(&manifest_path, json)?;
        Ok(manifest_path)
    }
}

/// Locates and renders the evidence behind an answer.
///
/// # Example
///
/// ```no_run
/// use pdf_evidence::evidence::EvidenceLocator;
///
/// let locator = EvidenceLocator::default();
/// let result = locator.locate_file("report.pdf", "capital of France is Paris", "Paris")?;
/// for (image, page) in result.into_pairs() {
///     println!("page {}: {}x{}", page, image.width(), image.height());
/// }
/// # Ok::<(), pdf_evidence::error::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EvidenceLocator {
    config: EvidenceConfig,
    compositor: RegionCompositor,
}

impl EvidenceLocator {
    /// Create a locator after validating `config`.
    pub fn new(config: EvidenceConfig) -> Result<Self> {
        config.validate()?;
        let compositor = RegionCompositor::from_config(&config);
        Ok(Self { config, compositor })
    }

    /// Configuration in use.
    pub fn config(&self) -> &EvidenceConfig {
        &self.config
    }

    /// Open a PDF file and locate evidence in it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentUnreadable`] before any page is processed if
    /// the file cannot be opened.
    pub fn locate_file(&self, path: impl AsRef<Path>, search_sentence: &str, answer: &str) -> Result<EvidenceResult> {
        let document = PdfDocument::open(path)?;
        self.locate(&document, search_sentence, answer)
    }

    /// Parse PDF bytes and locate evidence in them.
    pub fn locate_bytes(&self, bytes: &[u8], search_sentence: &str, answer: &str) -> Result<EvidenceResult> {
        let document = PdfDocument::from_bytes(bytes)?;
        self.locate(&document, search_sentence, answer)
    }

    /// Visit every page in order and render those containing the sentence.
    ///
    /// An empty search sentence yields an empty result. The source is only
    /// read; the highlight exists solely in the returned images.
    pub fn locate<S>(&self, source: &S, search_sentence: &str, answer: &str) -> Result<EvidenceResult>
    where
        S: EvidenceSource + ?Sized,
    {
        let mut result = EvidenceResult::default();
        if search_sentence.trim().is_empty() {
            log::debug!("Empty search sentence, nothing to locate");
            return Ok(result);
        }

        for index in 0..source.page_count() {
            let number = index + 1;
            let outcome = source
                .page(index)
                .map_err(|e| e.into_search_failure(number))
                .and_then(|page| self.locate_on_page(&page, search_sentence, answer));

            match outcome {
                Ok(Some(entry)) => result.entries.push(entry),
                Ok(None) => {},
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::SkipPage => {
                        log::warn!("Skipping page {}: {}", number, e);
                        result.skipped.push(SkippedPage {
                            page_number: e.page().unwrap_or(number),
                            reason: e.to_string(),
                        });
                    },
                },
            }
        }

        log::info!(
            "Found evidence on {} of {} pages",
            result.entries.len(),
            source.page_count()
        );
        Ok(result)
    }

    fn locate_on_page<P: EvidencePage>(&self, page: &P, search_sentence: &str, answer: &str) -> Result<Option<EvidenceImage>> {
        let number = page.page_number();
        let sentence_boxes = page.search_text(search_sentence)?;
        if sentence_boxes.is_empty() {
            log::trace!("Page {}: search sentence not found", number);
            return Ok(None);
        }

        let answer_boxes = page.search_text(answer)?;
        // Compare against each line of a wrapped sentence, not their union.
        let sentence_lines = if answer_boxes.is_empty() {
            Vec::new()
        } else {
            page.search_lines(search_sentence)?
        };
        let highlight = match_and_mark(
            &sentence_lines,
            &answer_boxes,
            self.config.proximity_threshold,
            self.config.tie_break,
        )
        .map(|rect| HighlightMark::new(rect).with_color(self.config.highlight_color));

        let Some(crop) = self
            .compositor
            .compose(&sentence_boxes, page.width(), page.height())
        else {
            return Ok(None);
        };

        log::debug!(
            "Page {}: {} sentence and {} answer occurrences, highlight: {}",
            number,
            sentence_boxes.len(),
            answer_boxes.len(),
            highlight.is_some()
        );

        let image = page.render_region(&crop, highlight.as_ref())?;
        Ok(Some(EvidenceImage {
            page_number: number,
            image,
            crop,
            highlight,
        }))
    }
}
