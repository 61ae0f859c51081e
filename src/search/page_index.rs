//! Per-page text index.

use crate::geometry::Rect;
use crate::text::TextChar;
use regex::Regex;

/// A single occurrence of a literal on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    /// The matched text
    pub text: String,
    /// Union of the boxes of the matched glyphs
    pub bbox: Rect,
    /// One box per text line the match covers, in page order
    pub lines: Vec<Rect>,
    /// Byte offset of the match in the page text
    pub start_index: usize,
    /// Byte offset one past the end of the match
    pub end_index: usize,
}

/// Searchable text of one page.
///
/// Whitespace is normalised while the index is built: every whitespace
/// character becomes a plain space and runs of spaces collapse to one.
#[derive(Debug, Clone, Default)]
pub struct PageTextIndex {
    text: String,
    /// Box of the character covering each byte of `text`
    byte_boxes: Vec<Option<Rect>>,
}

impl PageTextIndex {
    /// Build an index from collected page text.
    pub fn from_chars(chars: &[TextChar]) -> Self {
        let mut index = PageTextIndex::default();
        for ch in chars {
            for c in ch.text.chars() {
                let c = if c.is_whitespace() { ' ' } else { c };
                if c == ' ' && (index.text.is_empty() || index.text.ends_with(' ')) {
                    continue;
                }
                index.text.push(c);
                index
                    .byte_boxes
                    .extend(std::iter::repeat(ch.bbox).take(c.len_utf8()));
            }
        }
        index
    }

    /// The normalised page text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All occurrences of `literal`, in page order.
    ///
    /// Matching is exact and case-sensitive; whitespace runs in `literal` match
    /// a single space. An empty (or all-whitespace) literal has no occurrences.
    pub fn find(&self, literal: &str) -> Vec<SearchMatch> {
        let needle = normalize_whitespace(literal);
        if needle.is_empty() {
            return Vec::new();
        }
        let regex = match Regex::new(&regex::escape(&needle)) {
            Ok(regex) => regex,
            Err(e) => {
                // Only reachable when the escaped literal exceeds the regex size limit.
                log::warn!("Cannot search for literal of {} bytes: {}", needle.len(), e);
                return Vec::new();
            },
        };

        regex
            .find_iter(&self.text)
            .filter_map(|m| {
                let boxes = self.byte_boxes[m.start()..m.end()].iter().flatten().copied();
                let lines = line_boxes(boxes);
                let bbox = lines.iter().copied().reduce(|acc, b| acc.union(&b))?;
                Some(SearchMatch {
                    text: m.as_str().to_string(),
                    bbox,
                    lines,
                    start_index: m.start(),
                    end_index: m.end(),
                })
            })
            .collect()
    }

    /// Rectangles of all occurrences of `literal`, in page order.
    pub fn find_occurrences(&self, literal: &str) -> Vec<Rect> {
        self.find(literal).into_iter().map(|m| m.bbox).collect()
    }

    /// Per-line rectangles of all occurrences of `literal`, in page order.
    ///
    /// A match that wraps onto following lines contributes one rectangle per
    /// line instead of their union.
    pub fn find_line_fragments(&self, literal: &str) -> Vec<Rect> {
        self.find(literal).into_iter().flat_map(|m| m.lines).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Horizontal,
    Vertical,
}

/// Glyphs of one text line gathered while splitting a match.
struct LineRun {
    bbox: Rect,
    last: Rect,
    flow: Option<Flow>,
}

impl LineRun {
    fn new(first: Rect) -> Self {
        Self {
            bbox: first,
            last: first,
            flow: None,
        }
    }

    /// Whether `next` stays on this line: its centre must fall inside the
    /// previous glyph's band across the writing direction. Until a second
    /// glyph fixes the direction either band is accepted.
    fn continues(&self, next: &Rect) -> bool {
        let (cx, cy) = centre(next);
        let in_row = cy >= self.last.y0 && cy <= self.last.y1;
        let in_column = cx >= self.last.x0 && cx <= self.last.x1;
        match self.flow {
            Some(Flow::Horizontal) => in_row,
            Some(Flow::Vertical) => in_column,
            None => in_row || in_column,
        }
    }

    fn push(&mut self, next: Rect) {
        if self.flow.is_none() {
            let (lx, ly) = centre(&self.last);
            let (nx, ny) = centre(&next);
            self.flow = Some(if (nx - lx).abs() >= (ny - ly).abs() {
                Flow::Horizontal
            } else {
                Flow::Vertical
            });
        }
        self.bbox = self.bbox.union(&next);
        self.last = next;
    }
}

fn centre(rect: &Rect) -> (f32, f32) {
    ((rect.x0 + rect.x1) / 2.0, (rect.y0 + rect.y1) / 2.0)
}

/// Split glyph boxes, in stream order, into one rectangle per text line.
fn line_boxes(boxes: impl IntoIterator<Item = Rect>) -> Vec<Rect> {
    let mut lines = Vec::new();
    let mut current: Option<LineRun> = None;
    for next in boxes {
        if let Some(run) = current.as_mut().filter(|run| run.continues(&next)) {
            run.push(next);
            continue;
        }
        if let Some(run) = current.replace(LineRun::new(next)) {
            lines.push(run.bbox);
        }
    }
    lines.extend(current.map(|run| run.bbox));
    lines
}

/// Collapse whitespace runs to a single space and trim the ends.
///
/// # Examples
///
/// ```
/// use pdf_evidence::search::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  total\n  revenue\t"), "total revenue");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
