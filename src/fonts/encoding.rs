//! Simple-font encodings.
//!
//! Maps single-byte character codes to Unicode for fonts without a usable
//! ToUnicode CMap: the predefined base encodings plus `/Differences` arrays.

use std::collections::HashMap;

/// Predefined base encoding of a simple font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    /// Adobe StandardEncoding (default for Type1 fonts)
    Standard,
    /// Windows code page 1252
    WinAnsi,
    /// Mac OS Roman
    MacRoman,
    /// PDFDocEncoding
    PdfDoc,
}

impl BaseEncoding {
    /// Look up a base encoding by its PDF name.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::fonts::BaseEncoding;
    ///
    /// assert_eq!(BaseEncoding::from_name("WinAnsiEncoding"), Some(BaseEncoding::WinAnsi));
    /// assert_eq!(BaseEncoding::from_name("Identity-H"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "StandardEncoding" => Some(BaseEncoding::Standard),
            "WinAnsiEncoding" => Some(BaseEncoding::WinAnsi),
            "MacRomanEncoding" => Some(BaseEncoding::MacRoman),
            "PDFDocEncoding" => Some(BaseEncoding::PdfDoc),
            _ => None,
        }
    }

    /// Decode a single code.
    pub fn decode(self, code: u8) -> Option<char> {
        match self {
            BaseEncoding::Standard => standard_lookup(code),
            BaseEncoding::WinAnsi => winansi_lookup(code),
            BaseEncoding::MacRoman => macroman_lookup(code),
            BaseEncoding::PdfDoc => pdfdoc_lookup(code),
        }
    }
}

/// Encoding of a simple font: a base encoding overridden by `/Differences`.
#[derive(Debug, Clone)]
pub struct SimpleEncoding {
    /// Base encoding
    pub base: BaseEncoding,
    /// Code overrides from the `/Differences` array
    pub differences: HashMap<u8, char>,
}

impl SimpleEncoding {
    /// Encoding with no differences.
    pub fn new(base: BaseEncoding) -> Self {
        Self {
            base,
            differences: HashMap::new(),
        }
    }

    /// Apply a `/Differences` array given as `(code, glyph name)` pairs.
    ///
    /// Glyph names that cannot be mapped to Unicode are ignored.
    pub fn with_differences<'a>(mut self, entries: impl IntoIterator<Item = (u8, &'a str)>) -> Self {
        for (code, glyph) in entries {
            match glyph_name_to_char(glyph) {
                Some(ch) => {
                    self.differences.insert(code, ch);
                },
                None => log::debug!("Unknown glyph name in /Differences: '{}'", glyph),
            }
        }
        self
    }

    /// Decode a single code.
    pub fn decode(&self, code: u8) -> Option<char> {
        self.differences
            .get(&code)
            .copied()
            .or_else(|| self.base.decode(code))
    }
}

impl Default for SimpleEncoding {
    fn default() -> Self {
        Self::new(BaseEncoding::Standard)
    }
}

fn winansi_lookup(code: u8) -> Option<char> {
    let ch = match code {
        0x20..=0x7E => code as char,
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        // Non-breaking space is rendered as a space.
        0xA0 => ' ',
        0xA1..=0xFF => char::from_u32(code as u32)?,
        _ => return None,
    };
    Some(ch)
}

fn standard_lookup(code: u8) -> Option<char> {
    let ch = match code {
        // StandardEncoding uses typographic quotes at these two positions.
        0x27 => '\u{2019}',
        0x60 => '\u{2018}',
        0x20..=0x7E => code as char,
        0xA1 => '\u{00A1}',
        0xA2 => '\u{00A2}',
        0xA3 => '\u{00A3}',
        0xA4 => '\u{2044}',
        0xA5 => '\u{00A5}',
        0xA6 => '\u{0192}',
        0xA7 => '\u{00A7}',
        0xA8 => '\u{00A4}',
        0xA9 => '\'',
        0xAA => '\u{201C}',
        0xAB => '\u{00AB}',
        0xAC => '\u{2039}',
        0xAD => '\u{203A}',
        0xAE => '\u{FB01}',
        0xAF => '\u{FB02}',
        0xB1 => '\u{2013}',
        0xB2 => '\u{2020}',
        0xB3 => '\u{2021}',
        0xB4 => '\u{00B7}',
        0xB6 => '\u{00B6}',
        0xB7 => '\u{2022}',
        0xB8 => '\u{201A}',
        0xB9 => '\u{201E}',
        0xBA => '\u{201D}',
        0xBB => '\u{00BB}',
        0xBC => '\u{2026}',
        0xBD => '\u{2030}',
        0xBF => '\u{00BF}',
        0xD0 => '\u{2014}',
        0xE1 => '\u{00C6}',
        0xE8 => '\u{0141}',
        0xE9 => '\u{00D8}',
        0xEA => '\u{0152}',
        0xF1 => '\u{00E6}',
        0xF5 => '\u{0131}',
        0xF8 => '\u{0142}',
        0xF9 => '\u{00F8}',
        0xFA => '\u{0153}',
        0xFB => '\u{00DF}',
        _ => return None,
    };
    Some(ch)
}

fn macroman_lookup(code: u8) -> Option<char> {
    const HIGH: [char; 32] = [
        '\u{00C4}', '\u{00C5}', '\u{00C7}', '\u{00C9}', '\u{00D1}', '\u{00D6}', '\u{00DC}',
        '\u{00E1}', '\u{00E0}', '\u{00E2}', '\u{00E4}', '\u{00E3}', '\u{00E5}', '\u{00E7}',
        '\u{00E9}', '\u{00E8}', '\u{00EA}', '\u{00EB}', '\u{00ED}', '\u{00EC}', '\u{00EE}',
        '\u{00EF}', '\u{00F1}', '\u{00F3}', '\u{00F2}', '\u{00F4}', '\u{00F6}', '\u{00F5}',
        '\u{00FA}', '\u{00F9}', '\u{00FB}', '\u{00FC}',
    ];
    let ch = match code {
        0x20..=0x7E => code as char,
        0x80..=0x9F => HIGH[(code - 0x80) as usize],
        0xA0 => '\u{2020}',
        0xA5 => '\u{2022}',
        0xCA => ' ',
        0xD0 => '\u{2013}',
        0xD1 => '\u{2014}',
        0xD2 => '\u{201C}',
        0xD3 => '\u{201D}',
        0xD4 => '\u{2018}',
        0xD5 => '\u{2019}',
        0xC9 => '\u{2026}',
        0xDE => '\u{FB01}',
        0xDF => '\u{FB02}',
        _ => return None,
    };
    Some(ch)
}

fn pdfdoc_lookup(code: u8) -> Option<char> {
    let ch = match code {
        0x80 => '\u{2022}',
        0x81 => '\u{2020}',
        0x82 => '\u{2021}',
        0x83 => '\u{2026}',
        0x84 => '\u{2014}',
        0x85 => '\u{2013}',
        0x86 => '\u{0192}',
        0x87 => '\u{2044}',
        0x88 => '\u{2039}',
        0x89 => '\u{203A}',
        0x8A => '\u{2212}',
        0x8B => '\u{2030}',
        0x8C => '\u{201E}',
        0x8D => '\u{201C}',
        0x8E => '\u{201D}',
        0x8F => '\u{2018}',
        0x90 => '\u{2019}',
        0x91 => '\u{201A}',
        0x92 => '\u{2122}',
        0x93 => '\u{FB01}',
        0x94 => '\u{FB02}',
        0xA0 => '\u{20AC}',
        0x20..=0x7E | 0xA1..=0xFF => char::from_u32(code as u32)?,
        _ => return None,
    };
    Some(ch)
}

/// Map a glyph name to a character.
///
/// Handles the common Latin glyph names, `uniXXXX` and `uXXXX[XX]` forms.
///
/// # Examples
///
/// ```
/// use pdf_evidence::fonts::glyph_name_to_char;
///
/// assert_eq!(glyph_name_to_char("A"), Some('A'));
/// assert_eq!(glyph_name_to_char("space"), Some(' '));
/// assert_eq!(glyph_name_to_char("uni00E9"), Some('é'));
/// assert_eq!(glyph_name_to_char("g123"), None);
/// ```
pub fn glyph_name_to_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch.is_ascii_alphabetic() {
            return Some(ch);
        }
    }

    let named = match name {
        "space" | "nbspace" => ' ',
        "exclam" => '!',
        "quotedbl" => '"',
        "numbersign" => '#',
        "dollar" => '$',
        "percent" => '%',
        "ampersand" => '&',
        "quotesingle" => '\'',
        "parenleft" => '(',
        "parenright" => ')',
        "asterisk" => '*',
        "plus" => '+',
        "comma" => ',',
        "hyphen" | "minus" => '-',
        "period" => '.',
        "slash" => '/',
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "colon" => ':',
        "semicolon" => ';',
        "less" => '<',
        "equal" => '=',
        "greater" => '>',
        "question" => '?',
        "at" => '@',
        "bracketleft" => '[',
        "backslash" => '\\',
        "bracketright" => ']',
        "asciicircum" => '^',
        "underscore" => '_',
        "grave" => '`',
        "braceleft" => '{',
        "bar" => '|',
        "braceright" => '}',
        "asciitilde" => '~',
        "quoteleft" => '\u{2018}',
        "quoteright" => '\u{2019}',
        "quotedblleft" => '\u{201C}',
        "quotedblright" => '\u{201D}',
        "bullet" => '\u{2022}',
        "endash" => '\u{2013}',
        "emdash" => '\u{2014}',
        "ellipsis" => '\u{2026}',
        "fi" => '\u{FB01}',
        "fl" => '\u{FB02}',
        "eacute" => '\u{00E9}',
        "egrave" => '\u{00E8}',
        "aacute" => '\u{00E1}',
        "agrave" => '\u{00E0}',
        "udieresis" => '\u{00FC}',
        "odieresis" => '\u{00F6}',
        "adieresis" => '\u{00E4}',
        "germandbls" => '\u{00DF}',
        "ccedilla" => '\u{00E7}',
        "degree" => '\u{00B0}',
        "copyright" => '\u{00A9}',
        "registered" => '\u{00AE}',
        "trademark" => '\u{2122}',
        "Euro" => '\u{20AC}',
        "section" => '\u{00A7}',
        "paragraph" => '\u{00B6}',
        _ => return hex_glyph_name(name),
    };
    Some(named)
}

fn hex_glyph_name(name: &str) -> Option<char> {
    let hex = if let Some(rest) = name.strip_prefix("uni") {
        if rest.len() != 4 {
            return None;
        }
        rest
    } else if let Some(rest) = name.strip_prefix('u') {
        if !(4..=6).contains(&rest.len()) {
            return None;
        }
        rest
    } else {
        return None;
    };
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winansi_ascii_and_extended() {
        assert_eq!(BaseEncoding::WinAnsi.decode(b'A'), Some('A'));
        assert_eq!(BaseEncoding::WinAnsi.decode(0x93), Some('\u{201C}'));
        assert_eq!(BaseEncoding::WinAnsi.decode(0x97), Some('\u{2014}'));
        assert_eq!(BaseEncoding::WinAnsi.decode(0xE9), Some('\u{00E9}'));
        assert_eq!(BaseEncoding::WinAnsi.decode(0x81), None);
    }

    #[test]
    fn test_standard_quotes() {
        assert_eq!(BaseEncoding::Standard.decode(0x27), Some('\u{2019}'));
        assert_eq!(BaseEncoding::Standard.decode(0x60), Some('\u{2018}'));
        assert_eq!(BaseEncoding::Standard.decode(b'z'), Some('z'));
    }

    #[test]
    fn test_differences_override_base() {
        let enc = SimpleEncoding::new(BaseEncoding::WinAnsi)
            .with_differences([(65u8, "B"), (1u8, "fi"), (2u8, "nonsense-glyph")]);
        assert_eq!(enc.decode(65), Some('B'));
        assert_eq!(enc.decode(1), Some('\u{FB01}'));
        assert_eq!(enc.decode(2), None);
        assert_eq!(enc.decode(66), Some('B'));
    }

    #[test]
    fn test_hex_glyph_names() {
        assert_eq!(glyph_name_to_char("uni0041"), Some('A'));
        assert_eq!(glyph_name_to_char("u1F600"), Some('\u{1F600}'));
        assert_eq!(glyph_name_to_char("uni00"), None);
        assert_eq!(glyph_name_to_char("underscore"), Some('_'));
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!(BaseEncoding::from_name("MacRomanEncoding"), Some(BaseEncoding::MacRoman));
        assert_eq!(BaseEncoding::from_name("PDFDocEncoding"), Some(BaseEncoding::PdfDoc));
        assert_eq!(BaseEncoding::MacRoman.decode(0xD5), Some('\u{2019}'));
    }
}
