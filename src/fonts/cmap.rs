//! ToUnicode CMap parser.
//!
//! CMap streams map character codes to Unicode text. They are the most
//! reliable way to recover searchable text from subset and CID fonts.

use regex::Regex;
use std::collections::HashMap;

lazy_static::lazy_static! {
    static ref RE_HEX: Regex = Regex::new(r"<([0-9A-Fa-f\s]*)>").unwrap();
    static ref RE_BFCHAR: Regex =
        Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f\s]*)>").unwrap();
    static ref RE_BFRANGE_SEQ: Regex =
        Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f\s]*)>").unwrap();
    static ref RE_BFRANGE_ARRAY: Regex =
        Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*\[([^\]]*)\]").unwrap();
}

/// Upper bound on the size of a single bfrange, guarding against corrupt ranges.
const MAX_RANGE: u32 = 0xFFFF;

/// Mapping from character codes to Unicode strings.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeMap {
    map: HashMap<u32, String>,
    code_bytes: Option<usize>,
}

impl ToUnicodeMap {
    /// Parse a decoded ToUnicode CMap stream.
    ///
    /// Unparseable entries are skipped; an empty map is returned for input
    /// without any `bfchar`/`bfrange` sections.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::fonts::ToUnicodeMap;
    ///
    /// let cmap = ToUnicodeMap::parse(b"1 beginbfchar\n<0041> <0041>\nendbfchar");
    /// assert_eq!(cmap.get(0x41), Some("A"));
    /// ```
    pub fn parse(data: &[u8]) -> Self {
        let content = String::from_utf8_lossy(data);
        let mut cmap = ToUnicodeMap::default();

        for section in extract_sections(&content, "begincodespacerange", "endcodespacerange") {
            if let Some(caps) = RE_HEX.captures(section) {
                let digits = strip_whitespace(&caps[1]);
                if !digits.is_empty() {
                    cmap.code_bytes = Some(digits.len().div_ceil(2));
                }
            }
        }

        for section in extract_sections(&content, "beginbfchar", "endbfchar") {
            for caps in RE_BFCHAR.captures_iter(section) {
                let Ok(src) = u32::from_str_radix(&caps[1], 16) else {
                    continue;
                };
                if let Some(dst) = decode_utf16_hex(&caps[2]) {
                    log::trace!("ToUnicode bfchar: 0x{:02X} -> {:?}", src, dst);
                    cmap.map.insert(src, dst);
                }
            }
        }

        for section in extract_sections(&content, "beginbfrange", "endbfrange") {
            cmap.parse_bfrange_section(section);
        }

        cmap
    }

    fn parse_bfrange_section(&mut self, section: &str) {
        // Array form first: `<lo> <hi> [<dst0> <dst1> ...]`
        for caps in RE_BFRANGE_ARRAY.captures_iter(section) {
            let (Ok(lo), Ok(hi)) = (
                u32::from_str_radix(&caps[1], 16),
                u32::from_str_radix(&caps[2], 16),
            ) else {
                continue;
            };
            for (offset, dst) in RE_HEX.captures_iter(&caps[3]).enumerate() {
                let src = lo.saturating_add(offset as u32);
                if src > hi {
                    log::warn!("ToUnicode bfrange array longer than range 0x{:X}-0x{:X}", lo, hi);
                    break;
                }
                if let Some(text) = decode_utf16_hex(&dst[1]) {
                    self.map.insert(src, text);
                }
            }
        }

        let without_arrays = RE_BFRANGE_ARRAY.replace_all(section, "");
        for caps in RE_BFRANGE_SEQ.captures_iter(&without_arrays) {
            let (Ok(lo), Ok(hi)) = (
                u32::from_str_radix(&caps[1], 16),
                u32::from_str_radix(&caps[2], 16),
            ) else {
                continue;
            };
            if hi < lo || hi - lo > MAX_RANGE {
                log::warn!("Ignoring suspicious ToUnicode bfrange 0x{:X}-0x{:X}", lo, hi);
                continue;
            }
            let Some(base) = utf16_units(&caps[3]) else {
                continue;
            };
            for offset in 0..=(hi - lo) {
                // Only the last UTF-16 unit increments across a range.
                let mut units = base.clone();
                if let Some(last) = units.last_mut() {
                    *last = last.wrapping_add(offset as u16);
                }
                if let Ok(text) = String::from_utf16(&units) {
                    self.map.insert(lo + offset, text);
                }
            }
        }
    }

    /// Unicode text for a character code.
    pub fn get(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    /// Number of bytes per code declared by the codespace range, if any.
    pub fn code_bytes(&self) -> Option<usize> {
        self.code_bytes
    }

    /// Number of mapped codes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no code is mapped.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Extract sections between begin and end markers.
fn extract_sections<'a>(content: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut sections = Vec::new();
    let mut remaining = content;

    while let Some(begin_pos) = remaining.find(begin) {
        let after_begin = &remaining[begin_pos + begin.len()..];
        match after_begin.find(end) {
            Some(end_pos) => {
                sections.push(&after_begin[..end_pos]);
                remaining = &after_begin[end_pos + end.len()..];
            },
            None => break,
        }
    }

    sections
}

fn strip_whitespace(hex: &str) -> String {
    hex.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Interpret a hex string as big-endian UTF-16 code units.
fn utf16_units(hex: &str) -> Option<Vec<u16>> {
    let digits = strip_whitespace(hex);
    if digits.is_empty() {
        return None;
    }
    // Destinations shorter than one unit (e.g. `<41>`) are single bytes.
    let padded = if digits.len() % 4 != 0 {
        format!("{:0>width$}", digits, width = digits.len().div_ceil(4) * 4)
    } else {
        digits
    };
    padded
        .as_bytes()
        .chunks(4)
        .map(|chunk| std::str::from_utf8(chunk).ok().and_then(|s| u16::from_str_radix(s, 16).ok()))
        .collect()
}

/// Decode a ToUnicode destination string, including surrogate pairs and ligatures.
fn decode_utf16_hex(hex: &str) -> Option<String> {
    let units = utf16_units(hex)?;
    let text = String::from_utf16(&units).ok()?;
    // U+FFFD means the producer did not know; treat as unmapped.
    if text.is_empty() || text == "\u{FFFD}" {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bfchar_multiple() {
        let data = b"beginbfchar\n<0041> <0041>\n<0042> <0042>\n<0043> <0058>\nendbfchar";
        let cmap = ToUnicodeMap::parse(data);
        assert_eq!(cmap.get(0x41), Some("A"));
        assert_eq!(cmap.get(0x42), Some("B"));
        assert_eq!(cmap.get(0x43), Some("X"));
        assert_eq!(cmap.len(), 3);
    }

    #[test]
    fn test_parse_bfrange_sequential() {
        let data = b"beginbfrange\n<0020> <007E> <0020>\nendbfrange";
        let cmap = ToUnicodeMap::parse(data);
        assert_eq!(cmap.get(0x20), Some(" "));
        assert_eq!(cmap.get(0x41), Some("A"));
        assert_eq!(cmap.get(0x7E), Some("~"));
    }

    #[test]
    fn test_parse_bfrange_array_ligatures() {
        let data =
            b"beginbfrange\n<005F> <0061> [<00660066> <00660069> <00660066006C>]\nendbfrange";
        let cmap = ToUnicodeMap::parse(data);
        assert_eq!(cmap.get(0x5F), Some("ff"));
        assert_eq!(cmap.get(0x60), Some("fi"));
        assert_eq!(cmap.get(0x61), Some("ffl"));
    }

    #[test]
    fn test_parse_surrogate_pair() {
        let data = b"beginbfchar\n<0001> <D835DF0C>\nendbfchar";
        let cmap = ToUnicodeMap::parse(data);
        assert_eq!(cmap.get(0x01), Some("\u{1D70C}"));
    }

    #[test]
    fn test_replacement_character_is_unmapped() {
        let data = b"beginbfchar\n<0005> <FFFD>\nendbfchar";
        let cmap = ToUnicodeMap::parse(data);
        assert!(cmap.get(0x05).is_none());
        assert!(cmap.is_empty());
    }

    #[test]
    fn test_codespace_range_sets_code_width() {
        let data = b"1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n\
                     beginbfchar\n<0003> <0020>\nendbfchar";
        let cmap = ToUnicodeMap::parse(data);
        assert_eq!(cmap.code_bytes(), Some(2));
        assert_eq!(cmap.get(3), Some(" "));
    }

    #[test]
    fn test_parse_empty_cmap() {
        let cmap = ToUnicodeMap::parse(b"");
        assert!(cmap.is_empty());
        assert_eq!(cmap.code_bytes(), None);
    }

    #[test]
    fn test_extract_sections() {
        let content =
            "before\nbeginbfchar\ndata1\nendbfchar\nmiddle\nbeginbfchar\ndata2\nendbfchar\nafter";
        let sections = extract_sections(content, "beginbfchar", "endbfchar");
        assert_eq!(sections.len(), 2);
        assert!(sections[0].contains("data1"));
        assert!(sections[1].contains("data2"));
    }
}
