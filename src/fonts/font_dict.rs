//! Font dictionary parsing.
//!
//! Extracts what text location and rendering need from a PDF font: how to split
//! a shown string into character codes, the Unicode text and advance width of
//! each code, the vertical extent of a glyph box and any embedded font program.

use crate::error::{Error, Result};
use crate::fonts::cmap::ToUnicodeMap;
use crate::fonts::encoding::{BaseEncoding, SimpleEncoding};
use crate::fonts::standard_metrics::StandardFont;
use crate::objects::{self, get, get_array, get_dict, get_name, get_number, get_stream};
use lopdf::{Dictionary, Document, Object};
use std::collections::HashMap;
use std::sync::Arc;

/// Descriptor flag: all glyphs have the same width.
const FLAG_FIXED_PITCH: i64 = 1 << 0;
/// Descriptor flag: font uses a non-standard character set.
const FLAG_SYMBOLIC: i64 = 1 << 2;

/// Ascent used when neither the descriptor nor built-in metrics provide one.
const DEFAULT_ASCENT: f32 = 800.0;
/// Descent used when neither the descriptor nor built-in metrics provide one.
const DEFAULT_DESCENT: f32 = -200.0;

/// How shown strings are split into character codes.
#[derive(Debug, Clone)]
pub enum FontEncoding {
    /// Single-byte codes through a base encoding and `/Differences`
    Simple(SimpleEncoding),
    /// Two-byte codes equal to CIDs (Identity-H/V composite fonts)
    Identity,
}

/// One character code decoded from a shown string.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGlyph {
    /// Character code
    pub code: u32,
    /// Unicode text; `U+FFFD` when the code cannot be mapped
    pub text: String,
    /// Advance width in 1000ths of an em
    pub width: f32,
    /// Single-byte code 32, which receives word spacing
    pub is_space: bool,
}

/// Font information extracted from a PDF font dictionary.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// Base font name (e.g., "Times-Roman", "ABCDEF+Arial-BoldMT")
    pub base_font: String,
    /// Font subtype (e.g., "Type1", "TrueType", "Type0")
    pub subtype: String,
    /// Code splitting and base encoding
    pub encoding: FontEncoding,
    /// ToUnicode CMap, the preferred source of text
    pub to_unicode: Option<ToUnicodeMap>,
    /// Font descriptor flags
    pub flags: Option<i64>,
    /// Ascent in 1000ths of an em
    pub ascent: f32,
    /// Descent in 1000ths of an em (negative)
    pub descent: f32,
    /// Embedded TrueType/OpenType program (FontFile2 or OpenType FontFile3)
    pub embedded_font_data: Option<Arc<Vec<u8>>>,
    /// Simple font widths indexed by `code - first_char`
    pub widths: Option<Vec<f32>>,
    /// First code covered by `widths`
    pub first_char: u32,
    /// Composite font widths from the descendant's `/W` array
    pub cid_widths: HashMap<u32, f32>,
    /// Standard font family, when the base font names one
    pub standard: Option<StandardFont>,
    /// Width for codes not covered by any table (1000ths of an em)
    pub default_width: f32,
}

impl FontInfo {
    /// Parse a font dictionary.
    ///
    /// Missing optional entries fall back to sensible defaults; only a
    /// dictionary that declares a non-font `/Type` is rejected.
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Result<Self> {
        if let Some(kind) = get_name(doc, dict, b"Type") {
            if kind != "Font" {
                return Err(Error::Font(format!("expected /Font dictionary, found /{}", kind)));
            }
        }

        let base_font = get_name(doc, dict, b"BaseFont").unwrap_or_else(|| "Unknown".to_string());
        let subtype = get_name(doc, dict, b"Subtype").unwrap_or_else(|| "Type1".to_string());
        let standard = StandardFont::from_base_font(&base_font);

        let to_unicode = get_stream(doc, dict, b"ToUnicode")
            .map(|stream| ToUnicodeMap::parse(&objects::stream_data(stream)))
            .filter(|cmap| !cmap.is_empty());

        let (encoding, descriptor, widths, first_char, cid_widths, dw) = if subtype == "Type0" {
            let descendant = get_array(doc, dict, b"DescendantFonts")
                .and_then(|fonts| fonts.first())
                .and_then(|obj| objects::resolve(doc, obj))
                .and_then(objects::as_dict);
            if let Some(cmap_name) = get_name(doc, dict, b"Encoding") {
                if !cmap_name.starts_with("Identity") {
                    log::debug!("Font '{}': CMap {} treated as Identity", base_font, cmap_name);
                }
            }
            let descriptor = descendant.and_then(|d| get_dict(doc, d, b"FontDescriptor"));
            let cid_widths = descendant
                .and_then(|d| get_array(doc, d, b"W"))
                .map(|w| parse_cid_widths(doc, w))
                .unwrap_or_default();
            let dw = descendant
                .and_then(|d| get_number(doc, d, b"DW"))
                .unwrap_or(1000.0);
            (FontEncoding::Identity, descriptor, None, 0, cid_widths, Some(dw))
        } else {
            let widths = get_array(doc, dict, b"Widths").map(|w| objects::numbers(doc, w));
            let first_char = get_number(doc, dict, b"FirstChar").unwrap_or(0.0).max(0.0) as u32;
            let encoding = parse_simple_encoding(doc, dict, &subtype);
            let descriptor = get_dict(doc, dict, b"FontDescriptor");
            (FontEncoding::Simple(encoding), descriptor, widths, first_char, HashMap::new(), None)
        };

        let flags = descriptor
            .and_then(|d| get_number(doc, d, b"Flags"))
            .map(|f| f as i64);
        let ascent = descriptor
            .and_then(|d| get_number(doc, d, b"Ascent"))
            .filter(|a| *a > 0.0)
            .or_else(|| standard.map(StandardFont::ascent))
            .unwrap_or(DEFAULT_ASCENT);
        let descent = descriptor
            .and_then(|d| get_number(doc, d, b"Descent"))
            .filter(|d| *d < 0.0)
            .or_else(|| standard.map(StandardFont::descent))
            .unwrap_or(DEFAULT_DESCENT);
        let embedded_font_data = descriptor.and_then(|d| embedded_program(doc, d, &base_font));

        let default_width = dw.unwrap_or(match flags {
            Some(f) if f & FLAG_FIXED_PITCH != 0 => 600.0,
            Some(_) => 500.0,
            None => 550.0,
        });

        log::debug!(
            "Font '{}' ({}): widths={} cid_widths={} tounicode={} embedded={}",
            base_font,
            subtype,
            widths.as_ref().map(Vec::len).unwrap_or(0),
            cid_widths.len(),
            to_unicode.is_some(),
            embedded_font_data.is_some()
        );

        Ok(FontInfo {
            base_font,
            subtype,
            encoding,
            to_unicode,
            flags,
            ascent,
            descent,
            embedded_font_data,
            widths,
            first_char,
            cid_widths,
            standard,
            default_width,
        })
    }

    /// True for composite (two-byte) fonts.
    pub fn is_composite(&self) -> bool {
        matches!(self.encoding, FontEncoding::Identity)
    }

    /// True when the descriptor marks the font as symbolic.
    pub fn is_symbolic(&self) -> bool {
        self.flags.is_some_and(|f| f & FLAG_SYMBOLIC != 0)
    }

    /// Advance width of a character code in 1000ths of an em.
    pub fn glyph_width(&self, code: u32) -> f32 {
        if self.is_composite() {
            return self.cid_widths.get(&code).copied().unwrap_or(self.default_width);
        }
        if let Some(widths) = &self.widths {
            if let Some(index) = code.checked_sub(self.first_char) {
                if let Some(width) = widths.get(index as usize) {
                    return *width;
                }
            }
        }
        self.standard
            .and_then(|font| u8::try_from(code).ok().and_then(|c| font.width(c)))
            .unwrap_or(self.default_width)
    }

    /// Unicode text for a character code.
    pub fn code_to_text(&self, code: u32) -> Option<String> {
        if let Some(text) = self.to_unicode.as_ref().and_then(|cmap| cmap.get(code)) {
            return Some(text.to_string());
        }
        match &self.encoding {
            FontEncoding::Simple(enc) => u8::try_from(code)
                .ok()
                .and_then(|c| enc.decode(c))
                .map(String::from),
            FontEncoding::Identity => None,
        }
    }

    /// Split a shown string into decoded glyphs.
    ///
    /// Composite fonts consume two bytes per code; a trailing odd byte is
    /// dropped. Simple fonts consume one byte per code.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::fonts::FontInfo;
    ///
    /// let font = FontInfo::standard("Courier");
    /// let glyphs = font.decode(b"Hi there");
    /// assert_eq!(glyphs.len(), 8);
    /// assert_eq!(glyphs[0].text, "H");
    /// assert_eq!(glyphs[0].width, 600.0);
    /// assert!(glyphs[2].is_space);
    /// ```
    pub fn decode(&self, bytes: &[u8]) -> Vec<DecodedGlyph> {
        let codes: Vec<u32> = if self.is_composite() {
            bytes
                .chunks_exact(2)
                .map(|pair| u32::from(pair[0]) << 8 | u32::from(pair[1]))
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        };

        codes
            .into_iter()
            .map(|code| DecodedGlyph {
                code,
                text: self
                    .code_to_text(code)
                    .unwrap_or_else(|| char::REPLACEMENT_CHARACTER.to_string()),
                width: self.glyph_width(code),
                is_space: !self.is_composite() && code == 32,
            })
            .collect()
    }

    /// A non-embedded standard Type1 font with WinAnsi encoding.
    ///
    /// Used when a content stream selects a font resource that cannot be found.
    pub fn standard(base_font: &str) -> Self {
        let standard = StandardFont::from_base_font(base_font);
        FontInfo {
            base_font: base_font.to_string(),
            subtype: "Type1".to_string(),
            encoding: FontEncoding::Simple(SimpleEncoding::new(BaseEncoding::WinAnsi)),
            to_unicode: None,
            flags: None,
            ascent: standard.map(StandardFont::ascent).unwrap_or(DEFAULT_ASCENT),
            descent: standard.map(StandardFont::descent).unwrap_or(DEFAULT_DESCENT),
            embedded_font_data: None,
            widths: None,
            first_char: 0,
            cid_widths: HashMap::new(),
            standard,
            default_width: 550.0,
        }
    }
}

fn parse_simple_encoding(doc: &Document, dict: &Dictionary, subtype: &str) -> SimpleEncoding {
    let default_base = if subtype == "TrueType" {
        BaseEncoding::WinAnsi
    } else {
        BaseEncoding::Standard
    };

    match get(doc, dict, b"Encoding") {
        Some(Object::Name(name)) => {
            let name = String::from_utf8_lossy(name);
            SimpleEncoding::new(BaseEncoding::from_name(&name).unwrap_or(default_base))
        },
        Some(Object::Dictionary(enc)) => {
            let base = get_name(doc, enc, b"BaseEncoding")
                .and_then(|n| BaseEncoding::from_name(&n))
                .unwrap_or(default_base);
            let mut entries = Vec::new();
            if let Some(diffs) = get_array(doc, enc, b"Differences") {
                let mut code: u32 = 0;
                for item in diffs {
                    match objects::resolve(doc, item) {
                        Some(Object::Integer(n)) => code = (*n).max(0) as u32,
                        Some(Object::Name(glyph)) => {
                            if let Ok(byte) = u8::try_from(code) {
                                entries.push((byte, String::from_utf8_lossy(glyph).into_owned()));
                            }
                            code += 1;
                        },
                        _ => {},
                    }
                }
            }
            SimpleEncoding::new(base).with_differences(entries.iter().map(|(c, g)| (*c, g.as_str())))
        },
        _ => SimpleEncoding::new(default_base),
    }
}

/// Parse a composite font `/W` array.
///
/// Two forms are mixed freely: `c [w1 w2 ...]` assigns consecutive widths
/// starting at `c`, and `c_first c_last w` assigns one width to a range.
fn parse_cid_widths(doc: &Document, items: &[Object]) -> HashMap<u32, f32> {
    let mut widths = HashMap::new();
    let resolved: Vec<&Object> = items.iter().filter_map(|o| objects::resolve(doc, o)).collect();
    let mut i = 0;
    while i < resolved.len() {
        let Some(start) = objects::number(resolved[i]) else {
            i += 1;
            continue;
        };
        let start = start.max(0.0) as u32;
        match resolved.get(i + 1) {
            Some(Object::Array(list)) => {
                for (offset, width) in objects::numbers(doc, list).into_iter().enumerate() {
                    let cid = u32::try_from(offset).ok().and_then(|offset| start.checked_add(offset));
                    let Some(cid) = cid else {
                        break;
                    };
                    widths.insert(cid, width);
                }
                i += 2;
            },
            Some(other) => {
                let end = objects::number(other).map(|e| e.max(0.0) as u32);
                let width = resolved.get(i + 2).and_then(|w| objects::number(w));
                if let (Some(end), Some(width)) = (end, width) {
                    // Clamp pathological ranges.
                    for cid in start..=end.min(start.saturating_add(0xFFFF)) {
                        widths.insert(cid, width);
                    }
                }
                i += 3;
            },
            None => break,
        }
    }
    widths
}

fn embedded_program(doc: &Document, descriptor: &Dictionary, base_font: &str) -> Option<Arc<Vec<u8>>> {
    if let Some(stream) = get_stream(doc, descriptor, b"FontFile2") {
        return Some(Arc::new(objects::stream_data(stream)));
    }
    if let Some(stream) = get_stream(doc, descriptor, b"FontFile3") {
        let kind = get_name(doc, &stream.dict, b"Subtype");
        if kind.as_deref() == Some("OpenType") {
            return Some(Arc::new(objects::stream_data(stream)));
        }
        log::debug!("Font '{}': FontFile3 /{:?} outlines not supported", base_font, kind);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    #[test]
    fn test_standard_courier_widths() {
        let mut doc = Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let dict = doc.get_dictionary(font_id).unwrap().clone();
        let font = FontInfo::from_dict(&doc, &dict).unwrap();
        assert_eq!(font.standard, Some(StandardFont::Courier));
        assert_eq!(font.glyph_width(b'W' as u32), 600.0);
        assert_eq!(font.ascent, 629.0);
        assert_eq!(font.descent, -157.0);
    }

    #[test]
    fn test_explicit_widths_take_priority() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Helvetica",
            "FirstChar" => 65,
            "Widths" => vec![Object::Integer(700), Object::Integer(710)],
        };
        let font = FontInfo::from_dict(&doc, &dict).unwrap();
        assert_eq!(font.glyph_width(65), 700.0);
        assert_eq!(font.glyph_width(66), 710.0);
        // Outside /Widths falls back to the built-in Helvetica table.
        assert_eq!(font.glyph_width(32), 278.0);
    }

    #[test]
    fn test_differences_encoding() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Custom",
            "Encoding" => dictionary! {
                "BaseEncoding" => "WinAnsiEncoding",
                "Differences" => vec![Object::Integer(1), "f".into(), "i".into()],
            },
        };
        let font = FontInfo::from_dict(&doc, &dict).unwrap();
        let glyphs = font.decode(&[1, 2, b'x']);
        let text: String = glyphs.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(text, "fix");
    }

    #[test]
    fn test_type0_identity_with_tounicode_and_w() {
        let mut doc = Document::with_version("1.5");
        let cmap = Stream::new(
            dictionary! {},
            b"beginbfchar\n<0003> <0020>\n<0024> <0041>\nendbfchar".to_vec(),
        );
        let cmap_id = doc.add_object(cmap);
        let descendant = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => "ABCDEF+Arial",
            "DW" => 1000,
            "W" => vec![Object::Integer(3), Object::Array(vec![Object::Integer(278)]),
                        Object::Integer(36), Object::Integer(40), Object::Integer(667)],
        });
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "ABCDEF+Arial",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(descendant)],
            "ToUnicode" => cmap_id,
        };
        let font = FontInfo::from_dict(&doc, &dict).unwrap();
        assert!(font.is_composite());
        let glyphs = font.decode(&[0x00, 0x24, 0x00, 0x03, 0x00, 0x50, 0x01]);
        assert_eq!(glyphs.len(), 3);
        assert_eq!(glyphs[0].text, "A");
        assert_eq!(glyphs[0].width, 667.0);
        assert_eq!(glyphs[1].text, " ");
        assert_eq!(glyphs[1].width, 278.0);
        assert!(!glyphs[1].is_space);
        assert_eq!(glyphs[2].text, "\u{FFFD}");
        assert_eq!(glyphs[2].width, 1000.0);
    }

    #[test]
    fn test_cid_widths_stop_at_code_space_end() {
        let doc = Document::with_version("1.5");
        let items = vec![
            Object::Integer(u32::MAX as i64),
            Object::Array(vec![Object::Integer(500), Object::Integer(600)]),
            Object::Integer(10),
            Object::Array(vec![Object::Integer(250)]),
        ];
        let widths = parse_cid_widths(&doc, &items);
        assert_eq!(widths.get(&u32::MAX), Some(&500.0));
        assert_eq!(widths.get(&10), Some(&250.0));
        assert_eq!(widths.len(), 2);
    }

    #[test]
    fn test_non_font_dictionary_is_rejected() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! { "Type" => "XObject" };
        assert!(matches!(FontInfo::from_dict(&doc, &dict), Err(Error::Font(_))));
    }

    #[test]
    fn test_default_width_from_flags() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "SomeMono",
            "FontDescriptor" => dictionary! { "Flags" => 33 },
        };
        let font = FontInfo::from_dict(&doc, &dict).unwrap();
        assert_eq!(font.default_width, 600.0);
        assert_eq!(font.ascent, DEFAULT_ASCENT);
        assert!(!font.is_symbolic());
    }
}
