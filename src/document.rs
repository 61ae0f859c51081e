//! PDF document model.
//!
//! [`PdfDocument`] owns a parsed `lopdf` document; [`PdfPage`] borrows it and
//! exposes what evidence location needs from a page: its visible size, a
//! top-down coordinate system, its text layout and its content for rendering.

use crate::content::{ContentInterpreter, ContentSink, Matrix};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::objects::{self, get, get_dict};
use crate::search::PageTextIndex;
use crate::text::{TextChar, TextCollector};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::cell::OnceCell;
use std::path::Path;

/// Page box used when a page declares neither /CropBox nor /MediaBox (US Letter).
const DEFAULT_PAGE_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Maximum depth of the page tree walked for inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// An open PDF document.
///
/// # Example
///
/// ```no_run
/// use pdf_evidence::document::PdfDocument;
///
/// let doc = PdfDocument::open("report.pdf")?;
/// for index in 0..doc.page_count() {
///     let page = doc.page(index)?;
///     println!("page {}: {} x {}", page.number(), page.width(), page.height());
/// }
/// # Ok::<(), pdf_evidence::error::Error>(())
/// ```
pub struct PdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
    system_fonts: OnceCell<fontdb::Database>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("version", &self.doc.version)
            .field("pages", &self.pages.len())
            .field("objects", &self.doc.objects.len())
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    /// Open a PDF file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentUnreadable`] if the file cannot be read or
    /// parsed, or if it is encrypted.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path)
            .map_err(|e| Error::DocumentUnreadable(format!("{}: {}", path.display(), e)))?;
        Self::from_document(doc)
    }

    /// Parse a PDF held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentUnreadable`] if the bytes are not a readable PDF.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| Error::DocumentUnreadable(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Wrap an already parsed `lopdf` document.
    pub fn from_document(doc: Document) -> Result<Self> {
        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(Error::DocumentUnreadable("encrypted documents are not supported".to_string()));
        }
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        log::debug!("Opened PDF {} with {} pages", doc.version, pages.len());
        Ok(Self {
            doc,
            pages,
            system_fonts: OnceCell::new(),
        })
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page at a 0-based index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PageOutOfRange`] for an index past the last page.
    pub fn page(&self, index: usize) -> Result<PdfPage<'_>> {
        let id = *self.pages.get(index).ok_or(Error::PageOutOfRange {
            index,
            count: self.pages.len(),
        })?;
        PdfPage::new(self, id, index + 1)
    }

    /// Underlying `lopdf` document.
    pub fn inner(&self) -> &Document {
        &self.doc
    }

    /// System font database, loaded on first use.
    pub(crate) fn system_fonts(&self) -> &fontdb::Database {
        self.system_fonts.get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            log::debug!("Loaded {} system font faces", db.len());
            db
        })
    }
}

/// One page of a [`PdfDocument`].
#[derive(Debug)]
pub struct PdfPage<'a> {
    doc: &'a PdfDocument,
    dict: &'a Dictionary,
    id: ObjectId,
    number: usize,
    page_box: Rect,
    rotation: i32,
    text_index: OnceCell<PageTextIndex>,
}

impl<'a> PdfPage<'a> {
    fn new(doc: &'a PdfDocument, id: ObjectId, number: usize) -> Result<Self> {
        let dict = doc
            .doc
            .get_dictionary(id)
            .map_err(|e| Error::InvalidPdf(format!("page {}: {}", number, e)))?;

        let page_box = inherited(&doc.doc, dict, b"CropBox")
            .or_else(|| inherited(&doc.doc, dict, b"MediaBox"))
            .and_then(|obj| rect_from_array(&doc.doc, obj))
            .unwrap_or_else(|| {
                log::warn!("Page {} has no usable page box, assuming US Letter", number);
                let [x0, y0, x1, y1] = DEFAULT_PAGE_BOX;
                Rect::new(x0, y0, x1, y1)
            });

        let rotation = inherited(&doc.doc, dict, b"Rotate")
            .and_then(objects::number)
            .map(|r| normalize_rotation(r as i32))
            .unwrap_or(0);

        Ok(Self {
            doc,
            dict,
            id,
            number,
            page_box,
            rotation,
            text_index: OnceCell::new(),
        })
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Visible width in page units, after rotation.
    pub fn width(&self) -> f32 {
        if self.rotation % 180 == 0 {
            self.page_box.width()
        } else {
            self.page_box.height()
        }
    }

    /// Visible height in page units, after rotation.
    pub fn height(&self) -> f32 {
        if self.rotation % 180 == 0 {
            self.page_box.height()
        } else {
            self.page_box.width()
        }
    }

    /// Clockwise rotation in degrees: 0, 90, 180 or 270.
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// Visible page box (CropBox, else MediaBox) in PDF user space.
    pub fn page_box(&self) -> Rect {
        self.page_box
    }

    /// Matrix mapping PDF user space to page space.
    ///
    /// Page space has its origin at the top-left corner of the visible,
    /// rotated page and y growing downward.
    pub fn page_matrix(&self) -> Matrix {
        let Rect { x0, y0, x1, y1 } = self.page_box;
        match self.rotation {
            90 => Matrix::new(0.0, 1.0, 1.0, 0.0, -y0, -x0),
            180 => Matrix::new(-1.0, 0.0, 0.0, 1.0, x1, -y0),
            270 => Matrix::new(0.0, -1.0, -1.0, 0.0, y1, x1),
            _ => Matrix::new(1.0, 0.0, 0.0, -1.0, -x0, y1),
        }
    }

    pub(crate) fn document(&self) -> &'a PdfDocument {
        self.doc
    }

    fn resources(&self) -> Option<&'a Dictionary> {
        let doc = &self.doc.doc;
        inherited(doc, self.dict, b"Resources").and_then(objects::as_dict)
    }

    /// Run the page content through a sink, in page space.
    pub fn interpret(&self, sink: &mut dyn ContentSink) -> Result<()> {
        let doc = &self.doc.doc;
        let content = doc
            .get_page_content(self.id)
            .map_err(|e| Error::InvalidPdf(format!("page content: {}", e)))?;
        ContentInterpreter::new(doc).run(&content, self.resources(), self.page_matrix(), sink)
    }

    /// Glyphs shown on the page, in content-stream order.
    pub fn text_chars(&self) -> Result<Vec<TextChar>> {
        let mut collector = TextCollector::new();
        self.interpret(&mut collector)?;
        Ok(collector.into_chars())
    }

    /// Searchable text of the page, built on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SearchFailure`] when the content cannot be interpreted.
    pub fn text_index(&self) -> Result<&PageTextIndex> {
        if let Some(index) = self.text_index.get() {
            return Ok(index);
        }
        let chars = self
            .text_chars()
            .map_err(|e| e.into_search_failure(self.number))?;
        let index = PageTextIndex::from_chars(&chars);
        log::trace!("Page {} text: {:?}", self.number, index.text());
        Ok(self.text_index.get_or_init(|| index))
    }

    /// Rectangles of every occurrence of `literal`, in page order.
    pub fn search(&self, literal: &str) -> Result<Vec<Rect>> {
        Ok(self.text_index()?.find_occurrences(literal))
    }

    /// Per-line rectangles of every occurrence of `literal`, in page order.
    ///
    /// Occurrences that wrap across lines yield one rectangle per line.
    pub fn search_lines(&self, literal: &str) -> Result<Vec<Rect>> {
        Ok(self.text_index()?.find_line_fragments(literal))
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Some(value) = get(doc, node, key) {
            return Some(value);
        }
        node = get_dict(doc, node, b"Parent")?;
    }
    None
}

fn rect_from_array(doc: &Document, obj: &Object) -> Option<Rect> {
    match obj {
        Object::Array(items) => match objects::numbers(doc, items).as_slice() {
            [x0, y0, x1, y1] => {
                let rect = Rect::new(*x0, *y0, *x1, *y1);
                (!rect.is_empty()).then_some(rect)
            },
            _ => None,
        },
        _ => None,
    }
}

/// Normalise a /Rotate value to 0, 90, 180 or 270.
fn normalize_rotation(degrees: i32) -> i32 {
    let snapped = ((degrees as f32 / 90.0).round() as i32) * 90;
    snapped.rem_euclid(360)
}
