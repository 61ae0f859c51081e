//! Text rasterizer - paints glyphs using font outlines.
//!
//! Outlines come from the embedded font program when there is one, otherwise
//! from a matching system font. Glyphs without any outline are drawn as
//! simple placeholder boxes so that text regions stay visible.

use super::create_fill_paint;
use crate::content::GlyphEvent;
use crate::fonts::FontInfo;
use std::collections::HashMap;
use tiny_skia::{FillRule, Path, PathBuilder, Pixmap, Transform};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Descriptor flag: all glyphs have the same width.
const FLAG_FIXED_PITCH: i64 = 1 << 0;
/// Descriptor flag: glyphs have serifs.
const FLAG_SERIF: i64 = 1 << 1;

/// Text render modes that paint nothing (invisible, clip only).
const INVISIBLE_MODES: [u8; 2] = [3, 7];

/// Collects a ttf-parser outline into a tiny-skia path in em units.
struct OutlineSink {
    builder: PathBuilder,
    scale: f32,
}

impl OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x * self.scale, y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x * self.scale, y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let s = self.scale;
        self.builder.quad_to(x1 * s, y1 * s, x * s, y * s);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let s = self.scale;
        self.builder.cubic_to(x1 * s, y1 * s, x2 * s, y2 * s, x * s, y * s);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Key for a substitute system face: generic family, bold, italic.
type FaceKey = (&'static str, bool, bool);

/// Rasterizer for glyphs.
pub(crate) struct TextRasterizer<'db> {
    system_fonts: &'db fontdb::Database,
    outlines: HashMap<(String, u32), Option<Path>>,
    substitutes: HashMap<FaceKey, Option<fontdb::ID>>,
}

impl<'db> TextRasterizer<'db> {
    pub(crate) fn new(system_fonts: &'db fontdb::Database) -> Self {
        Self {
            system_fonts,
            outlines: HashMap::new(),
            substitutes: HashMap::new(),
        }
    }

    /// Paint one glyph; `base` maps page space to device pixels.
    pub(crate) fn draw_glyph(&mut self, pixmap: &mut Pixmap, base: Transform, event: &GlyphEvent<'_>) {
        if INVISIBLE_MODES.contains(&event.state.render_mode) {
            return;
        }
        if event.glyph.text.chars().all(char::is_whitespace) {
            return;
        }

        let key = (event.font.base_font.clone(), event.glyph.code);
        if !self.outlines.contains_key(&key) {
            let outline = self.load_outline(event);
            if outline.is_none() {
                log::trace!("No outline for code {} in '{}'", event.glyph.code, event.font.base_font);
            }
            self.outlines.insert(key.clone(), outline);
        }

        let transform = base.pre_concat(event.matrix.to_transform());
        let paint = create_fill_paint(event.state);
        match self.outlines.get(&key).and_then(Option::as_ref) {
            Some(path) => pixmap.fill_path(path, &paint, FillRule::Winding, transform, None),
            None => {
                let w = event.glyph.width / 1000.0;
                let top = event.font.ascent / 1000.0 * 0.7;
                if let Some(rect) = tiny_skia::Rect::from_ltrb(w * 0.1, 0.0, w * 0.9, top) {
                    pixmap.fill_rect(rect, &paint, transform, None);
                }
            },
        }
    }

    fn load_outline(&mut self, event: &GlyphEvent<'_>) -> Option<Path> {
        let font = event.font;
        if let Some(data) = &font.embedded_font_data {
            match Face::parse(data, 0) {
                Ok(face) => {
                    if let Some(gid) = embedded_glyph_id(&face, font, event.glyph.code, &event.glyph.text) {
                        return glyph_outline(&face, gid);
                    }
                },
                Err(e) => log::debug!("Embedded font '{}' unusable: {}", font.base_font, e),
            }
        }

        let ch = event.glyph.text.chars().next()?;
        if ch == char::REPLACEMENT_CHARACTER {
            return None;
        }
        let id = self.substitute_face(font)?;
        self.system_fonts
            .with_face_data(id, |data, index| {
                let face = Face::parse(data, index).ok()?;
                let gid = face.glyph_index(ch)?;
                glyph_outline(&face, gid)
            })
            .flatten()
    }

    fn substitute_face(&mut self, font: &FontInfo) -> Option<fontdb::ID> {
        let name = font.base_font.as_str();
        let flags = font.flags.unwrap_or(0);
        let family_name = match font.standard {
            Some(standard) => standard.family(),
            None if flags & FLAG_FIXED_PITCH != 0 => "monospace",
            None if flags & FLAG_SERIF != 0 => "serif",
            None => "sans-serif",
        };
        let bold = name.contains("Bold") || name.contains("Black") || name.contains("Heavy");
        let italic = name.contains("Italic") || name.contains("Oblique");
        let key = (family_name, bold, italic);

        if let Some(id) = self.substitutes.get(&key) {
            return *id;
        }

        let family = match family_name {
            "monospace" => fontdb::Family::Monospace,
            "serif" => fontdb::Family::Serif,
            _ => fontdb::Family::SansSerif,
        };
        let query = fontdb::Query {
            families: &[family],
            weight: if bold { fontdb::Weight::BOLD } else { fontdb::Weight::NORMAL },
            stretch: fontdb::Stretch::Normal,
            style: if italic { fontdb::Style::Italic } else { fontdb::Style::Normal },
        };
        let id = self.system_fonts.query(&query);
        if id.is_none() {
            log::debug!("No system font for {:?}; glyphs drawn as boxes", key);
        }
        self.substitutes.insert(key, id);
        id
    }
}

/// Map a character code to a glyph in an embedded font program.
fn embedded_glyph_id(face: &Face<'_>, font: &FontInfo, code: u32, text: &str) -> Option<GlyphId> {
    if font.is_composite() {
        // Identity CID-to-GID mapping.
        return u16::try_from(code).ok().map(GlyphId);
    }

    if !font.is_symbolic() {
        if let Some(gid) = text.chars().next().and_then(|ch| face.glyph_index(ch)) {
            return Some(gid);
        }
    }

    let cmap = face.tables().cmap?;
    for subtable in cmap.subtables {
        for candidate in [code, 0xF000 | code] {
            if let Some(gid) = subtable.glyph_index(candidate) {
                return Some(gid);
            }
        }
    }
    None
}

/// Outline of a glyph scaled to em units.
fn glyph_outline(face: &Face<'_>, gid: GlyphId) -> Option<Path> {
    let units_per_em = face.units_per_em() as f32;
    if units_per_em <= 0.0 {
        return None;
    }
    let mut sink = OutlineSink {
        builder: PathBuilder::new(),
        scale: 1.0 / units_per_em,
    };
    face.outline_glyph(gid, &mut sink)?;
    sink.builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_sink_scales_to_em() {
        let mut sink = OutlineSink {
            builder: PathBuilder::new(),
            scale: 1.0 / 1000.0,
        };
        sink.move_to(0.0, 0.0);
        sink.line_to(500.0, 0.0);
        sink.quad_to(600.0, 350.0, 500.0, 700.0);
        sink.close();
        let path = sink.builder.finish().unwrap();
        let bounds = path.bounds();
        assert!((bounds.right() - 0.6).abs() < 0.05);
        assert!((bounds.bottom() - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_unparseable_embedded_font_is_reported() {
        assert!(Face::parse(b"not a font", 0).is_err());
    }
}
