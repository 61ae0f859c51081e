//! Literal text search with position tracking.
//!
//! A [`PageTextIndex`] holds the text of one page and the box of every
//! character, so each match can be reported as a rectangle on the page.

mod page_index;

pub use page_index::{normalize_whitespace, PageTextIndex, SearchMatch};
