//! Region rendering for evidence images.
//!
//! Rasterizes a rectangle of a page with the pure-Rust `tiny-skia` library and
//! optionally overlays a translucent highlight.
//!
//! ## Architecture
//!
//! The rendering pipeline:
//!
//! 1. Interpret the page content stream (shared with text search)
//! 2. Rasterize paths, glyph outlines and images into a pixmap positioned on
//!    the requested region
//! 3. Blend the highlight over the page content
//! 4. Convert to an RGB image

mod page_renderer;
mod path_rasterizer;
mod text_rasterizer;

pub use page_renderer::{HighlightMark, PageRenderer, RenderOptions, DEFAULT_HIGHLIGHT_COLOR, DEFAULT_SCALE};

use crate::content::GraphicsState;
use tiny_skia::{Color, Paint};

/// Create a Paint configured for fill operations from graphics state.
pub(crate) fn create_fill_paint(gs: &GraphicsState) -> Paint<'static> {
    let (r, g, b) = gs.fill_color_rgb;
    paint_for(r, g, b, gs.fill_alpha, &gs.blend_mode)
}

/// Create a Paint configured for stroke operations from graphics state.
pub(crate) fn create_stroke_paint(gs: &GraphicsState) -> Paint<'static> {
    let (r, g, b) = gs.stroke_color_rgb;
    paint_for(r, g, b, gs.stroke_alpha, &gs.blend_mode)
}

fn paint_for(r: f32, g: f32, b: f32, alpha: f32, blend_mode: &str) -> Paint<'static> {
    let mut paint = Paint::default();
    let clamp = |v: f32| v.clamp(0.0, 1.0);
    paint.set_color(Color::from_rgba(clamp(r), clamp(g), clamp(b), clamp(alpha)).unwrap_or(Color::BLACK));
    paint.anti_alias = true;
    paint.blend_mode = pdf_blend_mode_to_skia(blend_mode);
    paint
}

/// Convert PDF blend mode to tiny-skia.
pub(crate) fn pdf_blend_mode_to_skia(mode: &str) -> tiny_skia::BlendMode {
    match mode {
        "Multiply" => tiny_skia::BlendMode::Multiply,
        "Screen" => tiny_skia::BlendMode::Screen,
        "Overlay" => tiny_skia::BlendMode::Overlay,
        "Darken" => tiny_skia::BlendMode::Darken,
        "Lighten" => tiny_skia::BlendMode::Lighten,
        "ColorDodge" => tiny_skia::BlendMode::ColorDodge,
        "ColorBurn" => tiny_skia::BlendMode::ColorBurn,
        "HardLight" => tiny_skia::BlendMode::HardLight,
        "SoftLight" => tiny_skia::BlendMode::SoftLight,
        "Difference" => tiny_skia::BlendMode::Difference,
        "Exclusion" => tiny_skia::BlendMode::Exclusion,
        _ => tiny_skia::BlendMode::SourceOver,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_modes() {
        assert_eq!(pdf_blend_mode_to_skia("Multiply"), tiny_skia::BlendMode::Multiply);
        assert_eq!(pdf_blend_mode_to_skia("Normal"), tiny_skia::BlendMode::SourceOver);
        assert_eq!(pdf_blend_mode_to_skia("Compatible"), tiny_skia::BlendMode::SourceOver);
    }

    #[test]
    fn test_fill_paint_clamps_out_of_range_colour() {
        let mut gs = GraphicsState::new();
        gs.fill_color_rgb = (1.5, -0.2, 0.5);
        let paint = create_fill_paint(&gs);
        assert!(paint.anti_alias);
    }
}
