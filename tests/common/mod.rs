//! Builders for small in-memory PDFs used by the integration tests.
#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Courier glyph advance at 12pt.
pub const ADVANCE: f32 = 7.2;
/// Font size used by [`Line`] text.
pub const FONT_SIZE: f32 = 12.0;
/// Courier ascent in page units at 12pt.
pub const ASCENT: f32 = 12.0 * 0.629;
/// Courier descent in page units at 12pt.
pub const DESCENT: f32 = 12.0 * 0.157;
/// Letter page size.
pub const PAGE_WIDTH: f32 = 612.0;
/// Letter page size.
pub const PAGE_HEIGHT: f32 = 792.0;

/// One line of Courier 12pt text, positioned by the top of its glyph boxes
/// in page space (y down).
#[derive(Debug, Clone)]
pub struct Line {
    pub x: f32,
    pub top: f32,
    pub text: String,
}

impl Line {
    pub fn new(x: f32, top: f32, text: &str) -> Self {
        Self {
            x,
            top,
            text: text.to_string(),
        }
    }

    /// Baseline in PDF user space (y up).
    pub fn baseline(&self) -> f32 {
        PAGE_HEIGHT - (self.top + ASCENT)
    }
}

/// A page's content.
#[derive(Debug, Clone, Default)]
pub struct PageSpec {
    pub lines: Vec<Line>,
    /// Raw operations appended after the text
    pub extra: Vec<Operation>,
    /// Draw a self-referencing form XObject, which never terminates
    pub recursive_form: bool,
    /// Page /Rotate entry
    pub rotate: Option<i64>,
}

impl PageSpec {
    pub fn with_lines(lines: Vec<Line>) -> Self {
        Self {
            lines,
            ..Default::default()
        }
    }
}

/// Build a Letter-sized PDF with a shared Courier font resource.
pub fn build_pdf(pages: &[PageSpec]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let form_id = doc.new_object_id();
    doc.objects.insert(
        form_id,
        Object::Stream(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            },
            b"/Fx Do".to_vec(),
        )),
    );

    let kids: Vec<Object> = pages
        .iter()
        .map(|spec| Object::Reference(add_page(&mut doc, pages_id, spec)))
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => dictionary! { "Fx" => form_id },
            },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize test PDF");
    bytes
}

fn add_page(doc: &mut Document, parent: ObjectId, spec: &PageSpec) -> ObjectId {
    let mut operations = Vec::new();
    for line in &spec.lines {
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
            Operation::new("Td", vec![line.x.into(), line.baseline().into()]),
            Operation::new("Tj", vec![Object::string_literal(line.text.as_str())]),
            Operation::new("ET", vec![]),
        ]);
    }
    operations.extend(spec.extra.iter().cloned());
    if spec.recursive_form {
        operations.push(Operation::new("Do", vec!["Fx".into()]));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode content")));
    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    };
    if let Some(rotate) = spec.rotate {
        page.set("Rotate", rotate);
    }
    doc.add_object(page)
}

/// Operations filling a rectangle (PDF user space) with an RGB colour.
pub fn filled_rect(x: f32, y: f32, w: f32, h: f32, rgb: (f32, f32, f32)) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![rgb.0.into(), rgb.1.into(), rgb.2.into()]),
        Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]),
        Operation::new("f", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Expected box of `text[start..end]` on a line (character offsets).
pub fn expected_box(line: &Line, start: usize, end: usize) -> pdf_evidence::Rect {
    pdf_evidence::Rect::new(
        line.x + start as f32 * ADVANCE,
        line.top,
        line.x + end as f32 * ADVANCE,
        line.top + ASCENT + DESCENT,
    )
}

/// Compare rectangles with a tolerance for float rounding.
pub fn assert_rect_near(actual: &pdf_evidence::Rect, expected: &pdf_evidence::Rect) {
    let close = |a: f32, b: f32| (a - b).abs() < 0.05;
    assert!(
        close(actual.x0, expected.x0)
            && close(actual.y0, expected.y0)
            && close(actual.x1, expected.x1)
            && close(actual.y1, expected.y1),
        "{:?} != {:?}",
        actual,
        expected
    );
}
