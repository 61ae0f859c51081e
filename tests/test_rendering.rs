//! Tests for region rendering.

mod common;

use common::{build_pdf, filled_rect, Line, PageSpec};
use pdf_evidence::{Error, HighlightMark, PageRenderer, PdfDocument, Rect, RenderOptions};

/// A page with a red square at page-space (100, 142)-(150, 192).
fn red_square_pdf() -> Vec<u8> {
    build_pdf(&[PageSpec {
        extra: filled_rect(100.0, 600.0, 50.0, 50.0, (1.0, 0.0, 0.0)),
        ..Default::default()
    }])
}

mod regions {
    use super::*;

    #[test]
    fn test_region_size_follows_scale() {
        let bytes = red_square_pdf();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        let region = Rect::new(0.0, 100.0, 612.0, 250.5);

        let image = PageRenderer::new(RenderOptions::with_scale(1.0))
            .render_region(&page, &region, None)
            .unwrap();
        assert_eq!((image.width(), image.height()), (612, 151));

        let image = PageRenderer::default().render_region(&page, &region, None).unwrap();
        assert_eq!((image.width(), image.height()), (2448, 602));
    }

    #[test]
    fn test_region_is_positioned_on_page() {
        let bytes = red_square_pdf();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        let region = Rect::new(0.0, 100.0, 612.0, 250.0);

        let image = PageRenderer::new(RenderOptions::with_scale(1.0))
            .render_region(&page, &region, None)
            .unwrap();
        // Square spans x 100..150, y 142..192 in page space.
        assert_eq!(image.get_pixel(125, 67).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(90, 67).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(125, 30).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(125, 100).0, [255, 255, 255]);
    }

    #[test]
    fn test_background_option() {
        let bytes = build_pdf(&[PageSpec::default()]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        let image = PageRenderer::new(RenderOptions::with_scale(1.0).with_background([10, 20, 30]))
            .render_region(&page, &Rect::new(0.0, 0.0, 20.0, 20.0), None)
            .unwrap();
        assert!(image.pixels().all(|p| p.0 == [10, 20, 30]));
    }

    #[test]
    fn test_text_leaves_ink() {
        let bytes = build_pdf(&[PageSpec::with_lines(vec![Line::new(72.0, 100.0, "MMMMMMMM")])]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        let image = PageRenderer::default()
            .render_region(&page, &Rect::new(72.0, 100.0, 130.0, 110.0), None)
            .unwrap();
        assert!(image.pixels().any(|p| p.0[0] < 128));
    }
}

mod highlights {
    use super::*;

    #[test]
    fn test_highlight_multiplies_with_content() {
        let bytes = red_square_pdf();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        let region = Rect::new(0.0, 100.0, 612.0, 250.0);
        let mark = HighlightMark::new(Rect::new(80.0, 130.0, 200.0, 200.0));

        let image = PageRenderer::new(RenderOptions::with_scale(1.0))
            .render_region(&page, &region, Some(&mark))
            .unwrap();
        // Red under yellow stays red; white paper turns yellow.
        assert_eq!(image.get_pixel(125, 67).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(90, 67).0, [255, 255, 0]);
        // Outside the mark nothing changes.
        assert_eq!(image.get_pixel(300, 67).0, [255, 255, 255]);
    }

    #[test]
    fn test_highlight_colour() {
        let bytes = build_pdf(&[PageSpec::default()]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        let mark = HighlightMark::new(Rect::new(0.0, 0.0, 10.0, 10.0)).with_color([0, 255, 255]);
        let image = PageRenderer::new(RenderOptions::with_scale(1.0))
            .render_region(&page, &Rect::new(0.0, 0.0, 20.0, 20.0), Some(&mark))
            .unwrap();
        assert_eq!(image.get_pixel(5, 5).0, [0, 255, 255]);
        assert_eq!(image.get_pixel(15, 15).0, [255, 255, 255]);
    }

    #[test]
    fn test_rendering_twice_is_identical() {
        let bytes = red_square_pdf();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        let region = Rect::new(0.0, 100.0, 612.0, 250.0);
        let mark = HighlightMark::new(Rect::new(80.0, 130.0, 200.0, 200.0));
        let renderer = PageRenderer::new(RenderOptions::with_scale(1.0));

        let highlighted = renderer.render_region(&page, &region, Some(&mark)).unwrap();
        let plain = renderer.render_region(&page, &region, None).unwrap();
        assert_eq!(plain.get_pixel(90, 67).0, [255, 255, 255]);
        assert_eq!(highlighted, renderer.render_region(&page, &region, Some(&mark)).unwrap());
    }
}

mod failures {
    use super::*;

    #[test]
    fn test_empty_region_is_render_failure() {
        let bytes = red_square_pdf();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        let err = PageRenderer::default()
            .render_region(&page, &Rect::new(0.0, 100.0, 612.0, 100.0), None)
            .unwrap_err();
        assert!(matches!(err, Error::RenderFailure { page: 1, .. }));
    }

    #[test]
    fn test_unterminated_form_is_render_failure() {
        let bytes = build_pdf(&[PageSpec {
            recursive_form: true,
            ..Default::default()
        }]);
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(0).unwrap();
        let err = PageRenderer::default()
            .render_region(&page, &Rect::new(0.0, 0.0, 10.0, 10.0), None)
            .unwrap_err();
        assert!(matches!(err, Error::RenderFailure { page: 1, .. }));
    }
}
