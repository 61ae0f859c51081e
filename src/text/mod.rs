//! Page text extraction.
//!
//! Collects the glyphs a page shows, in content-stream order, together with
//! their boxes in page space.

pub mod extractor;

pub use extractor::{TextChar, TextCollector};
