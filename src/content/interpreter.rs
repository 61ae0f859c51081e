//! Content stream execution.
//!
//! [`ContentInterpreter`] walks a page's operators once, maintains the
//! graphics state and reports what would be painted to a [`ContentSink`].
//! Text location and rasterization are both sinks, so glyph placement is
//! computed in exactly one place.

use crate::content::graphics_state::{GraphicsState, GraphicsStateStack, Matrix};
use crate::content::operators::{Operator, TextElement};
use crate::error::{Error, Result};
use crate::fonts::{DecodedGlyph, FontInfo};
use crate::geometry::{Point, Rect};
use crate::objects::{self, get, get_dict, get_name};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::sync::Arc;
use tiny_skia::{FillRule, Path, PathBuilder};

/// Default limit on nested form XObjects.
pub const DEFAULT_MAX_FORM_DEPTH: u32 = 16;

/// Font used when a content stream shows text without a resolvable font.
const FALLBACK_FONT: &str = "Helvetica";

/// A glyph about to be painted.
#[derive(Debug)]
pub struct GlyphEvent<'s> {
    /// Decoded code, text and advance width
    pub glyph: &'s DecodedGlyph,
    /// Font the glyph belongs to
    pub font: &'s FontInfo,
    /// Text rendering matrix: glyph space (em units) to page space
    pub matrix: Matrix,
    /// Glyph box in page space (advance width by descent..ascent)
    pub bbox: Rect,
    /// Graphics state at the time the glyph is shown
    pub state: &'s GraphicsState,
}

impl GlyphEvent<'_> {
    /// Glyph origin in page space.
    pub fn origin(&self) -> Point {
        self.matrix.transform_point(0.0, 0.0)
    }

    /// Point on the baseline after the glyph's advance, in page space.
    pub fn advance_end(&self) -> Point {
        self.matrix.transform_point(self.glyph.width / 1000.0, 0.0)
    }

    /// Rendered font size in page units.
    pub fn font_height(&self) -> f32 {
        (self.matrix.c * self.matrix.c + self.matrix.d * self.matrix.d).sqrt()
    }
}

/// Receiver of painting events.
///
/// Every method defaults to doing nothing, so a sink only implements what it
/// cares about. Path coordinates are in user space; `state.ctm` maps them to
/// page space.
pub trait ContentSink {
    /// A glyph is shown (including invisible text).
    fn glyph(&mut self, _event: &GlyphEvent<'_>) {}

    /// A path is filled.
    fn fill_path(&mut self, _path: &Path, _rule: FillRule, _state: &GraphicsState) {}

    /// A path is stroked.
    fn stroke_path(&mut self, _path: &Path, _state: &GraphicsState) {}

    /// An image XObject is painted into the unit square of `state.ctm`.
    fn image(&mut self, _image: &Stream, _state: &GraphicsState) {}
}

/// Interprets content streams against a document.
pub struct ContentInterpreter<'a> {
    doc: &'a Document,
    fonts: HashMap<ObjectId, Arc<FontInfo>>,
    fallback_font: Arc<FontInfo>,
    max_depth: u32,
}

impl<'a> ContentInterpreter<'a> {
    /// Create an interpreter for content belonging to `doc`.
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            fonts: HashMap::new(),
            fallback_font: Arc::new(FontInfo::standard(FALLBACK_FONT)),
            max_depth: DEFAULT_MAX_FORM_DEPTH,
        }
    }

    /// Set the maximum nesting depth for form XObjects.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Execute a content stream.
    ///
    /// `ctm` is the initial transformation, normally the page matrix that maps
    /// PDF user space into top-down page space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPdf`] when the stream cannot be tokenised and
    /// [`Error::RecursionLimitExceeded`] when forms nest too deeply.
    pub fn run(
        &mut self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        ctm: Matrix,
        sink: &mut dyn ContentSink,
    ) -> Result<()> {
        let mut stack = GraphicsStateStack::with_state(GraphicsState::with_ctm(ctm));
        self.execute(content, resources, &mut stack, sink, 0)
    }

    fn execute(
        &mut self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        stack: &mut GraphicsStateStack,
        sink: &mut dyn ContentSink,
        depth: u32,
    ) -> Result<()> {
        let content = Content::decode(content)
            .map_err(|e| Error::InvalidPdf(format!("content stream: {}", e)))?;
        log::trace!("Executing {} operations at depth {}", content.operations.len(), depth);

        let mut path = PathBuilder::new();

        for operation in &content.operations {
            let Some(op) = Operator::from_operation(operation) else {
                log::debug!("Skipping malformed '{}' operation", operation.operator);
                continue;
            };

            match op {
                Operator::SaveState => stack.save(),
                Operator::RestoreState => stack.restore(),
                Operator::Cm { a, b, c, d, e, f } => {
                    let gs = stack.current_mut();
                    gs.ctm = Matrix::new(a, b, c, d, e, f).multiply(&gs.ctm);
                },
                Operator::SetLineWidth { width } => stack.current_mut().line_width = width,
                Operator::SetLineCap { cap_style } => stack.current_mut().line_cap = cap_style,
                Operator::SetLineJoin { join_style } => stack.current_mut().line_join = join_style,
                Operator::SetMiterLimit { limit } => stack.current_mut().miter_limit = limit,
                Operator::SetDash { array, phase } => stack.current_mut().dash_pattern = (array, phase),
                Operator::SetExtGState { dict_name } => {
                    self.apply_ext_g_state(stack.current_mut(), &dict_name, resources);
                },

                // Colour
                Operator::SetFillGray { gray } => stack.current_mut().fill_color_rgb = (gray, gray, gray),
                Operator::SetStrokeGray { gray } => {
                    stack.current_mut().stroke_color_rgb = (gray, gray, gray)
                },
                Operator::SetFillRgb { r, g, b } => stack.current_mut().fill_color_rgb = (r, g, b),
                Operator::SetStrokeRgb { r, g, b } => stack.current_mut().stroke_color_rgb = (r, g, b),
                Operator::SetFillCmyk { c, m, y, k } => {
                    stack.current_mut().fill_color_rgb = cmyk_to_rgb(c, m, y, k)
                },
                Operator::SetStrokeCmyk { c, m, y, k } => {
                    stack.current_mut().stroke_color_rgb = cmyk_to_rgb(c, m, y, k)
                },
                Operator::SetFillColor { components } => {
                    if let Some(rgb) = components_to_rgb(&components) {
                        stack.current_mut().fill_color_rgb = rgb;
                    }
                },
                Operator::SetStrokeColor { components } => {
                    if let Some(rgb) = components_to_rgb(&components) {
                        stack.current_mut().stroke_color_rgb = rgb;
                    }
                },
                Operator::SetFillColorSpace | Operator::SetStrokeColorSpace => {},

                // Path construction
                Operator::MoveTo { x, y } => path.move_to(x, y),
                Operator::LineTo { x, y } => path.line_to(x, y),
                Operator::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x3,
                    y3,
                } => path.cubic_to(x1, y1, x2, y2, x3, y3),
                Operator::CurveToV { x2, y2, x3, y3 } => {
                    if let Some(p) = path.last_point() {
                        path.cubic_to(p.x, p.y, x2, y2, x3, y3);
                    }
                },
                Operator::CurveToY { x1, y1, x3, y3 } => path.cubic_to(x1, y1, x3, y3, x3, y3),
                Operator::ClosePath => path.close(),
                Operator::Rectangle {
                    x,
                    y,
                    width,
                    height,
                } => {
                    path.move_to(x, y);
                    path.line_to(x + width, y);
                    path.line_to(x + width, y + height);
                    path.line_to(x, y + height);
                    path.close();
                },

                // Path painting
                Operator::Stroke => paint(&mut path, sink, stack.current(), None, true),
                Operator::CloseStroke => {
                    path.close();
                    paint(&mut path, sink, stack.current(), None, true);
                },
                Operator::Fill => paint(&mut path, sink, stack.current(), Some(FillRule::Winding), false),
                Operator::FillEvenOdd => {
                    paint(&mut path, sink, stack.current(), Some(FillRule::EvenOdd), false)
                },
                Operator::FillStroke => paint(&mut path, sink, stack.current(), Some(FillRule::Winding), true),
                Operator::FillStrokeEvenOdd => {
                    paint(&mut path, sink, stack.current(), Some(FillRule::EvenOdd), true)
                },
                Operator::CloseFillStroke => {
                    path.close();
                    paint(&mut path, sink, stack.current(), Some(FillRule::Winding), true);
                },
                Operator::CloseFillStrokeEvenOdd => {
                    path.close();
                    paint(&mut path, sink, stack.current(), Some(FillRule::EvenOdd), true);
                },
                Operator::EndPath => path = PathBuilder::new(),
                // Clipping is not applied; the path is consumed by the next painting operator.
                Operator::ClipNonZero | Operator::ClipEvenOdd => {},

                // Text objects
                Operator::BeginText => {
                    let gs = stack.current_mut();
                    gs.text_matrix = Matrix::identity();
                    gs.text_line_matrix = Matrix::identity();
                },
                Operator::EndText => {},
                Operator::Td { tx, ty } => stack.current_mut().next_line(tx, ty),
                Operator::TD { tx, ty } => {
                    let gs = stack.current_mut();
                    gs.leading = -ty;
                    gs.next_line(tx, ty);
                },
                Operator::Tm { a, b, c, d, e, f } => {
                    let gs = stack.current_mut();
                    gs.text_matrix = Matrix::new(a, b, c, d, e, f);
                    gs.text_line_matrix = gs.text_matrix;
                },
                Operator::TStar => {
                    let gs = stack.current_mut();
                    let leading = gs.leading;
                    gs.next_line(0.0, -leading);
                },

                // Text state
                Operator::Tf { font, size } => {
                    let info = self.load_font(&font, resources);
                    let gs = stack.current_mut();
                    gs.font_name = Some(font);
                    gs.font = Some(info);
                    gs.font_size = size;
                },
                Operator::Tc { char_space } => stack.current_mut().char_space = char_space,
                Operator::Tw { word_space } => stack.current_mut().word_space = word_space,
                Operator::Tz { scale } => stack.current_mut().horizontal_scaling = scale,
                Operator::TL { leading } => stack.current_mut().leading = leading,
                Operator::Ts { rise } => stack.current_mut().text_rise = rise,
                Operator::Tr { render } => stack.current_mut().render_mode = render,

                // Text showing
                Operator::Tj { text } => self.show_text(&text, stack, sink),
                Operator::Quote { text } => {
                    let gs = stack.current_mut();
                    let leading = gs.leading;
                    gs.next_line(0.0, -leading);
                    self.show_text(&text, stack, sink);
                },
                Operator::DoubleQuote {
                    word_space,
                    char_space,
                    text,
                } => {
                    let gs = stack.current_mut();
                    gs.word_space = word_space;
                    gs.char_space = char_space;
                    let leading = gs.leading;
                    gs.next_line(0.0, -leading);
                    self.show_text(&text, stack, sink);
                },
                Operator::TJ { array } => {
                    for element in array {
                        match element {
                            TextElement::String(text) => self.show_text(&text, stack, sink),
                            TextElement::Offset(amount) => {
                                let gs = stack.current_mut();
                                let th = gs.horizontal_scaling / 100.0;
                                gs.advance_text(-amount / 1000.0 * gs.font_size * th);
                            },
                        }
                    }
                },

                Operator::Do { name } => {
                    self.paint_xobject(&name, resources, stack, sink, depth)?;
                },

                Operator::Other(_) => {},
            }
        }

        Ok(())
    }

    /// Show a string, emitting one glyph event per character code.
    fn show_text(&self, bytes: &[u8], stack: &mut GraphicsStateStack, sink: &mut dyn ContentSink) {
        let font = stack
            .current()
            .font
            .clone()
            .unwrap_or_else(|| self.fallback_font.clone());

        for glyph in font.decode(bytes) {
            let gs = stack.current();
            let matrix = gs.text_rendering_matrix();
            let w = glyph.width / 1000.0;
            let (asc, desc) = (font.ascent / 1000.0, font.descent / 1000.0);
            let corners = [(0.0, desc), (w, desc), (0.0, asc), (w, asc)]
                .map(|(x, y)| matrix.transform_point(x, y));
            let bbox = Rect::bounding(corners).unwrap_or_default();

            sink.glyph(&GlyphEvent {
                glyph: &glyph,
                font: &font,
                matrix,
                bbox,
                state: gs,
            });

            let th = gs.horizontal_scaling / 100.0;
            let mut tx = w * gs.font_size + gs.char_space;
            if glyph.is_space {
                tx += gs.word_space;
            }
            stack.current_mut().advance_text(tx * th);
        }
    }

    /// Resolve a font resource, caching fonts that are indirect objects.
    fn load_font(&mut self, name: &str, resources: Option<&'a Dictionary>) -> Arc<FontInfo> {
        let doc = self.doc;
        let Some(entry) = resources
            .and_then(|res| get_dict(doc, res, b"Font"))
            .and_then(|fonts| fonts.get(name.as_bytes()).ok())
        else {
            log::warn!("Font resource /{} not found, using {}", name, FALLBACK_FONT);
            return self.fallback_font.clone();
        };

        if let Object::Reference(id) = entry {
            if let Some(font) = self.fonts.get(id) {
                return font.clone();
            }
        }

        let parsed = objects::resolve(doc, entry)
            .and_then(objects::as_dict)
            .ok_or_else(|| Error::Font(format!("/{} is not a dictionary", name)))
            .and_then(|dict| FontInfo::from_dict(doc, dict));
        let font = match parsed {
            Ok(font) => Arc::new(font),
            Err(e) => {
                log::warn!("Font /{}: {}; using {}", name, e, FALLBACK_FONT);
                self.fallback_font.clone()
            },
        };

        if let Object::Reference(id) = entry {
            self.fonts.insert(*id, font.clone());
        }
        font
    }

    fn apply_ext_g_state(&self, gs: &mut GraphicsState, name: &str, resources: Option<&'a Dictionary>) {
        let doc = self.doc;
        let Some(state) = resources
            .and_then(|res| get_dict(doc, res, b"ExtGState"))
            .and_then(|states| get_dict(doc, states, name.as_bytes()))
        else {
            log::debug!("ExtGState /{} not found", name);
            return;
        };

        if let Some(ca) = get(doc, state, b"ca").and_then(objects::number) {
            gs.fill_alpha = ca.clamp(0.0, 1.0);
        }
        if let Some(ca) = get(doc, state, b"CA").and_then(objects::number) {
            gs.stroke_alpha = ca.clamp(0.0, 1.0);
        }
        if let Some(lw) = get(doc, state, b"LW").and_then(objects::number) {
            gs.line_width = lw;
        }
        if let Some(bm) = get_name(doc, state, b"BM") {
            gs.blend_mode = bm;
        }
    }

    fn paint_xobject(
        &mut self,
        name: &str,
        resources: Option<&'a Dictionary>,
        stack: &mut GraphicsStateStack,
        sink: &mut dyn ContentSink,
        depth: u32,
    ) -> Result<()> {
        let doc = self.doc;
        let Some(Object::Stream(stream)) = resources
            .and_then(|res| get_dict(doc, res, b"XObject"))
            .and_then(|xobjects| get(doc, xobjects, name.as_bytes()))
        else {
            log::debug!("XObject /{} not found", name);
            return Ok(());
        };

        match get_name(doc, &stream.dict, b"Subtype").as_deref() {
            Some("Image") => sink.image(stream, stack.current()),
            Some("Form") => {
                if depth + 1 > self.max_depth {
                    return Err(Error::RecursionLimitExceeded(self.max_depth));
                }
                let form_matrix = objects::get_array(doc, &stream.dict, b"Matrix")
                    .map(|m| objects::numbers(doc, m))
                    .filter(|m| m.len() == 6)
                    .map(|m| Matrix::new(m[0], m[1], m[2], m[3], m[4], m[5]))
                    .unwrap_or_default();
                let form_resources = get_dict(doc, &stream.dict, b"Resources").or(resources);

                stack.save();
                let gs = stack.current_mut();
                gs.ctm = form_matrix.multiply(&gs.ctm);
                let result = self.execute(
                    &objects::stream_data(stream),
                    form_resources,
                    stack,
                    sink,
                    depth + 1,
                );
                stack.restore();
                result?;
            },
            other => log::debug!("Ignoring XObject /{} with subtype {:?}", name, other),
        }
        Ok(())
    }
}

/// Hand the finished path to the sink and start a new one.
fn paint(
    path: &mut PathBuilder,
    sink: &mut dyn ContentSink,
    state: &GraphicsState,
    fill: Option<FillRule>,
    stroke: bool,
) {
    let Some(finished) = std::mem::replace(path, PathBuilder::new()).finish() else {
        return;
    };
    if let Some(rule) = fill {
        sink.fill_path(&finished, rule, state);
    }
    if stroke {
        sink.stroke_path(&finished, state);
    }
}

/// Convert CMYK to RGB.
pub(crate) fn cmyk_to_rgb(c: f32, m: f32, y: f32, k: f32) -> (f32, f32, f32) {
    let r = (1.0 - c) * (1.0 - k);
    let g = (1.0 - m) * (1.0 - k);
    let b = (1.0 - y) * (1.0 - k);
    (r, g, b)
}

/// Interpret `sc`/`scn` operands by component count.
fn components_to_rgb(components: &[f32]) -> Option<(f32, f32, f32)> {
    match components {
        [gray] => Some((*gray, *gray, *gray)),
        [r, g, b] => Some((*r, *g, *b)),
        [c, m, y, k] => Some(cmyk_to_rgb(*c, *m, *y, *k)),
        _ => None,
    }
}
