//! Glyph collection for text search.

use crate::content::{ContentSink, GlyphEvent};
use crate::geometry::{Point, Rect};

/// Gap between consecutive glyphs, as a fraction of the font height, above
/// which a word break is assumed.
const SPACE_GAP_RATIO: f32 = 0.2;

/// One unit of page text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChar {
    /// Decoded text (usually one character, more for ligatures)
    pub text: String,
    /// Glyph box in page space; `None` for inferred word breaks
    pub bbox: Option<Rect>,
}

impl TextChar {
    /// A glyph shown by the content stream.
    pub fn glyph(text: impl Into<String>, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            bbox: Some(bbox),
        }
    }

    /// A word break inferred from glyph positions.
    pub fn inferred_space() -> Self {
        Self {
            text: " ".to_string(),
            bbox: None,
        }
    }

    fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

#[derive(Debug, Clone, Copy)]
struct PenPosition {
    end: Point,
    height: f32,
}

/// Content sink that records every shown glyph.
///
/// Line changes and visible gaps between glyphs become a single inferred
/// space, so that words on different lines or in separately positioned runs
/// do not run together.
#[derive(Debug, Default)]
pub struct TextCollector {
    chars: Vec<TextChar>,
    pen: Option<PenPosition>,
}

impl TextCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected text in stream order.
    pub fn into_chars(self) -> Vec<TextChar> {
        self.chars
    }

    fn push_break(&mut self) {
        if self.chars.last().is_some_and(|c| !c.is_whitespace()) {
            self.chars.push(TextChar::inferred_space());
        }
    }
}

impl ContentSink for TextCollector {
    fn glyph(&mut self, event: &GlyphEvent<'_>) {
        let height = event.font_height();
        if let Some(pen) = self.pen {
            let origin = event.origin();
            let gap = ((origin.x - pen.end.x).powi(2) + (origin.y - pen.end.y).powi(2)).sqrt();
            if gap > pen.height.max(height) * SPACE_GAP_RATIO {
                self.push_break();
            }
        }

        self.chars.push(TextChar::glyph(event.glyph.text.clone(), event.bbox));
        self.pen = Some(PenPosition {
            end: event.advance_end(),
            height,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentInterpreter, Matrix};
    use lopdf::{dictionary, Dictionary, Document};

    fn collect(content: &[u8]) -> String {
        let mut doc = Document::with_version("1.5");
        let font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources: Dictionary = dictionary! { "Font" => dictionary! { "F1" => font } };
        let mut collector = TextCollector::new();
        ContentInterpreter::new(&doc)
            .run(content, Some(&resources), Matrix::identity(), &mut collector)
            .unwrap();
        collector.into_chars().into_iter().map(|c| c.text).collect()
    }

    #[test]
    fn test_adjacent_glyphs_have_no_break() {
        assert_eq!(collect(b"BT /F1 10 Tf 72 700 Td (Hel) Tj (lo) Tj ET"), "Hello");
    }

    #[test]
    fn test_new_line_inserts_space() {
        let text = collect(b"BT /F1 10 Tf 14 TL 72 700 Td (first) Tj T* (second) Tj ET");
        assert_eq!(text, "first second");
    }

    #[test]
    fn test_large_tj_gap_inserts_space() {
        assert_eq!(collect(b"BT /F1 10 Tf [(one) -600 (two)] TJ ET"), "one two");
        // Kerning-sized adjustments do not.
        assert_eq!(collect(b"BT /F1 10 Tf [(A) 50 (V)] TJ ET"), "AV");
    }

    #[test]
    fn test_no_double_space_after_real_space() {
        let text = collect(b"BT /F1 10 Tf 72 700 Td (end. ) Tj 0 -20 Td (Next) Tj ET");
        assert_eq!(text, "end. Next");
    }

    #[test]
    fn test_inferred_space_has_no_box() {
        let mut collector = TextCollector::new();
        collector.chars.push(TextChar::glyph("a", Rect::new(0.0, 0.0, 5.0, 10.0)));
        collector.push_break();
        collector.push_break();
        let chars = collector.into_chars();
        assert_eq!(chars.len(), 2);
        assert!(chars[1].bbox.is_none());
    }
}
