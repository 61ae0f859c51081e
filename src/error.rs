//! Error types for evidence location and rendering.
//!
//! This module defines all error types that can occur while opening a document,
//! searching its pages and rasterizing evidence regions.

/// Result type alias for evidence operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during evidence location.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input document could not be opened or parsed.
    ///
    /// Raised before any page is processed; no partial results exist.
    #[error("Document unreadable: {0}")]
    DocumentUnreadable(String),

    /// Rasterization failed on a specific page.
    #[error("Render failure on page {page}: {reason}")]
    RenderFailure {
        /// 1-based page number
        page: usize,
        /// Reason reported by the rendering backend
        reason: String,
    },

    /// The text layer of a page could not be interpreted.
    #[error("Search failure on page {page}: {reason}")]
    SearchFailure {
        /// 1-based page number
        page: usize,
        /// Reason reported by the content interpreter
        reason: String,
    },

    /// Invalid PDF structure inside an otherwise readable document
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Page index outside the document
    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange {
        /// Requested 0-based index
        index: usize,
        /// Number of pages in the document
        count: usize,
    },

    /// Font error
    #[error("Font error: {0}")]
    Font(String),

    /// Image error
    #[error("Image error: {0}")]
    Image(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Recursion depth limit exceeded while following form XObjects
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(u32),
}

impl Error {
    /// Attach a page number to a content-level error raised during search.
    pub(crate) fn into_search_failure(self, page: usize) -> Error {
        match self {
            Error::SearchFailure { .. } | Error::DocumentUnreadable(_) => self,
            other => Error::SearchFailure {
                page,
                reason: other.to_string(),
            },
        }
    }

    /// Attach a page number to a content-level error raised during rendering.
    pub(crate) fn into_render_failure(self, page: usize) -> Error {
        match self {
            Error::RenderFailure { .. } | Error::DocumentUnreadable(_) => self,
            other => Error::RenderFailure {
                page,
                reason: other.to_string(),
            },
        }
    }

    /// Page number carried by a per-page failure, if any.
    pub fn page(&self) -> Option<usize> {
        match self {
            Error::RenderFailure { page, .. } | Error::SearchFailure { page, .. } => Some(*page),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_unreadable_error() {
        let err = Error::DocumentUnreadable("not a PDF".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Document unreadable"));
        assert!(msg.contains("not a PDF"));
    }

    #[test]
    fn test_render_failure_error() {
        let err = Error::RenderFailure {
            page: 3,
            reason: "empty pixmap".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("page 3"));
        assert!(msg.contains("empty pixmap"));
        assert_eq!(err.page(), Some(3));
    }

    #[test]
    fn test_into_search_failure_wraps_content_errors() {
        let err = Error::InvalidPdf("bad operand".to_string()).into_search_failure(2);
        match err {
            Error::SearchFailure { page, reason } => {
                assert_eq!(page, 2);
                assert!(reason.contains("bad operand"));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_into_render_failure_keeps_existing_page() {
        let err = Error::RenderFailure {
            page: 1,
            reason: "x".to_string(),
        }
        .into_render_failure(5);
        assert_eq!(err.page(), Some(1));
    }

    #[test]
    fn test_page_out_of_range_error() {
        let err = Error::PageOutOfRange { index: 4, count: 2 };
        assert!(err.to_string().contains("2 pages"));
        assert_eq!(err.page(), None);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
