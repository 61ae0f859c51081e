//! Tests for literal text search on PDF pages.

mod common;

use common::{assert_rect_near, build_pdf, expected_box, Line, PageSpec};
use pdf_evidence::PdfDocument;

mod page_search {
    use super::*;

    #[test]
    fn test_single_occurrence_box() {
        let line = Line::new(72.0, 100.0, "The capital of France is Paris.");
        let bytes = build_pdf(&[PageSpec::with_lines(vec![line.clone()])]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();

        let hits = page.search("Paris").unwrap();
        assert_eq!(hits.len(), 1);
        assert_rect_near(&hits[0], &expected_box(&line, 25, 30));

        let hits = page.search("capital of France is Paris").unwrap();
        assert_eq!(hits.len(), 1);
        assert_rect_near(&hits[0], &expected_box(&line, 4, 30));
    }

    #[test]
    fn test_occurrences_in_document_order() {
        let first = Line::new(72.0, 100.0, "Paris in spring.");
        let second = Line::new(72.0, 400.0, "Autumn in Paris.");
        let bytes = build_pdf(&[PageSpec::with_lines(vec![first.clone(), second.clone()])]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();

        let hits = doc.page(0).unwrap().search("Paris").unwrap();
        assert_eq!(hits.len(), 2);
        assert_rect_near(&hits[0], &expected_box(&first, 0, 5));
        assert_rect_near(&hits[1], &expected_box(&second, 10, 15));
    }

    #[test]
    fn test_search_is_case_sensitive() {
        let bytes = build_pdf(&[PageSpec::with_lines(vec![Line::new(72.0, 100.0, "Paris")])]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        assert!(page.search("paris").unwrap().is_empty());
        assert!(page.search("PARIS").unwrap().is_empty());
        assert_eq!(page.search("Paris").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_literal_finds_nothing() {
        let bytes = build_pdf(&[PageSpec::with_lines(vec![Line::new(72.0, 100.0, "Paris")])]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        assert!(page.search("").unwrap().is_empty());
        assert!(page.search("   ").unwrap().is_empty());
    }

    #[test]
    fn test_match_across_line_break() {
        let first = Line::new(72.0, 100.0, "The capital of France is");
        let second = Line::new(72.0, 114.0, "Paris, on the Seine.");
        let bytes = build_pdf(&[PageSpec::with_lines(vec![first.clone(), second.clone()])]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();

        assert!(page.text_index().unwrap().text().contains("France is Paris,"));
        let hits = page.search("France is\nParis").unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].y0 - first.top).abs() < 0.05);
        assert!((hits[0].y1 - expected_box(&second, 0, 5).y1).abs() < 0.05);
    }

    #[test]
    fn test_wrapped_match_line_fragments() {
        let first = Line::new(72.0, 100.0, "The capital of France is");
        let second = Line::new(72.0, 114.0, "Paris, on the Seine.");
        let bytes = build_pdf(&[PageSpec::with_lines(vec![first.clone(), second.clone()])]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();

        let fragments = page.search_lines("France is Paris").unwrap();
        assert_eq!(fragments.len(), 2);
        assert_rect_near(&fragments[0], &expected_box(&first, 15, 24));
        assert_rect_near(&fragments[1], &expected_box(&second, 0, 5));
    }

    #[test]
    fn test_page_without_text() {
        let bytes = build_pdf(&[PageSpec::default()]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        assert_eq!(page.text_index().unwrap().text(), "");
        assert!(page.search("anything").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_form_is_search_failure() {
        let bytes = build_pdf(&[PageSpec {
            recursive_form: true,
            ..Default::default()
        }]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let err = doc.page(0).unwrap().search("x").unwrap_err();
        assert!(matches!(err, pdf_evidence::Error::SearchFailure { page: 1, .. }));
    }
}

mod absent_literals {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_absent_literal_finds_nothing(literal in "[0-9]{1,8}") {
            let bytes = build_pdf(&[
                PageSpec::with_lines(vec![Line::new(72.0, 100.0, "No digits on this page.")]),
                PageSpec::with_lines(vec![Line::new(72.0, 300.0, "Nor on this one.")]),
            ]);
            let doc = PdfDocument::from_bytes(&bytes).unwrap();
            for index in 0..doc.page_count() {
                prop_assert!(doc.page(index).unwrap().search(&literal).unwrap().is_empty());
            }
        }
    }
}
