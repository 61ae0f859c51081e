//! Evidence location.
//!
//! Given a search sentence (the passage around an answer) and the answer
//! itself, the [`EvidenceLocator`] visits each page in order:
//!
//! 1. find every occurrence of the sentence and of the answer
//! 2. pick the answer box lying on the same line as a sentence box
//!    ([`match_and_mark`])
//! 3. merge the sentence occurrences into one full-width crop
//!    ([`RegionCompositor`])
//! 4. rasterize the crop with the highlight drawn over the content
//!
//! Pages without the sentence produce nothing.

mod compositor;
mod locator;
mod matcher;
pub mod snippet;
mod source;

pub use compositor::{build_crop, CropSpec, RegionCompositor};
pub use locator::{
    EvidenceImage, EvidenceLocator, EvidenceManifest, EvidenceResult, ManifestEntry, SkippedPage, MANIFEST_FILE,
};
pub use matcher::match_and_mark;
pub use snippet::{AnswerSpan, EvidenceQuery};
pub use source::{EvidencePage, EvidenceSource};
