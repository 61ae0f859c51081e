//! Font handling and encoding.
//!
//! This module provides font dictionary parsing, simple-font encodings,
//! built-in standard font metrics and ToUnicode CMap parsing.

pub mod cmap;
pub mod encoding;
pub mod font_dict;
pub mod standard_metrics;

pub use cmap::ToUnicodeMap;
pub use encoding::{glyph_name_to_char, BaseEncoding, SimpleEncoding};
pub use font_dict::{DecodedGlyph, FontEncoding, FontInfo};
pub use standard_metrics::StandardFont;
