//! Built-in metrics for the standard Type1 fonts.
//!
//! Non-embedded standard fonts usually omit `/Widths`; these tables supply
//! advance widths (in 1000ths of an em) for the printable ASCII range so that
//! glyph boxes still line up with what a viewer would draw.

/// Standard font family recognised from a `/BaseFont` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    /// Courier and its variants (monospaced)
    Courier,
    /// Helvetica, Arial and their variants
    Helvetica,
    /// Times-Roman and its variants
    TimesRoman,
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 222, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    222, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 333, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

impl StandardFont {
    /// Recognise a standard font family from a base font name.
    ///
    /// Subset prefixes (`ABCDEF+`) are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::fonts::StandardFont;
    ///
    /// assert_eq!(StandardFont::from_base_font("Courier-Bold"), Some(StandardFont::Courier));
    /// assert_eq!(StandardFont::from_base_font("ABCDEF+Arial,Bold"), Some(StandardFont::Helvetica));
    /// assert_eq!(StandardFont::from_base_font("Symbol"), None);
    /// ```
    pub fn from_base_font(base_font: &str) -> Option<Self> {
        let name = match base_font.split_once('+') {
            Some((prefix, rest)) if prefix.len() == 6 => rest,
            _ => base_font,
        };
        if name.starts_with("Courier") {
            Some(StandardFont::Courier)
        } else if name.starts_with("Helvetica") || name.starts_with("Arial") {
            Some(StandardFont::Helvetica)
        } else if name.starts_with("Times") {
            Some(StandardFont::TimesRoman)
        } else {
            None
        }
    }

    /// Advance width of a character code, in 1000ths of an em.
    ///
    /// Bold and italic variants reuse the regular widths.
    pub fn width(self, code: u8) -> Option<f32> {
        match self {
            StandardFont::Courier => Some(600.0),
            StandardFont::Helvetica => table_width(&HELVETICA_WIDTHS, code),
            StandardFont::TimesRoman => table_width(&TIMES_WIDTHS, code),
        }
    }

    /// Ascent in 1000ths of an em.
    pub fn ascent(self) -> f32 {
        match self {
            StandardFont::Courier => 629.0,
            StandardFont::Helvetica => 718.0,
            StandardFont::TimesRoman => 683.0,
        }
    }

    /// Descent in 1000ths of an em (negative).
    pub fn descent(self) -> f32 {
        match self {
            StandardFont::Courier => -157.0,
            StandardFont::Helvetica => -207.0,
            StandardFont::TimesRoman => -217.0,
        }
    }

    /// Generic family name used to find a substitute system font.
    pub fn family(self) -> &'static str {
        match self {
            StandardFont::Courier => "monospace",
            StandardFont::Helvetica => "sans-serif",
            StandardFont::TimesRoman => "serif",
        }
    }
}

fn table_width(table: &[u16; 95], code: u8) -> Option<f32> {
    match code {
        32..=126 => Some(table[(code - 32) as usize] as f32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_is_monospaced() {
        for code in [b' ', b'i', b'W', 0xE9] {
            assert_eq!(StandardFont::Courier.width(code), Some(600.0));
        }
    }

    #[test]
    fn test_helvetica_widths() {
        let helv = StandardFont::Helvetica;
        assert_eq!(helv.width(b' '), Some(278.0));
        assert_eq!(helv.width(b'@'), Some(1015.0));
        assert_eq!(helv.width(b'W'), Some(944.0));
        assert_eq!(helv.width(b'i'), Some(222.0));
        assert_eq!(helv.width(b'~'), Some(584.0));
        assert_eq!(helv.width(0x7F), None);
    }

    #[test]
    fn test_times_widths() {
        let times = StandardFont::TimesRoman;
        assert_eq!(times.width(b' '), Some(250.0));
        assert_eq!(times.width(b'A'), Some(722.0));
        assert_eq!(times.width(b'm'), Some(778.0));
        assert_eq!(times.width(b'z'), Some(444.0));
    }

    #[test]
    fn test_family_detection() {
        assert_eq!(StandardFont::from_base_font("Times-BoldItalic"), Some(StandardFont::TimesRoman));
        assert_eq!(StandardFont::from_base_font("Helvetica-Oblique"), Some(StandardFont::Helvetica));
        assert_eq!(StandardFont::from_base_font("ABCXYZ+Courier"), Some(StandardFont::Courier));
        assert_eq!(StandardFont::from_base_font("XYZ+Courier"), None);
        assert_eq!(StandardFont::from_base_font("ZapfDingbats"), None);
    }
}
