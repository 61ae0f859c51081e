//! Path rasterizer - paints filled and stroked paths.

use super::{create_fill_paint, create_stroke_paint};
use crate::content::GraphicsState;
use tiny_skia::{FillRule, LineCap, LineJoin, Path, Pixmap, Stroke, StrokeDash, Transform};

/// Fill a path with the current fill colour.
pub(crate) fn fill_path(pixmap: &mut Pixmap, path: &Path, rule: FillRule, transform: Transform, gs: &GraphicsState) {
    let paint = create_fill_paint(gs);
    pixmap.fill_path(path, &paint, rule, transform, None);
}

/// Stroke a path with the current stroke colour and line style.
///
/// A zero line width draws the thinnest line the device can show.
pub(crate) fn stroke_path(pixmap: &mut Pixmap, path: &Path, transform: Transform, gs: &GraphicsState) {
    let paint = create_stroke_paint(gs);

    let dash = if gs.dash_pattern.0.iter().any(|d| *d > 0.0) {
        let mut array = gs.dash_pattern.0.clone();
        // An odd-length PDF dash array repeats once to form on/off pairs.
        if array.len() % 2 == 1 {
            array.extend_from_within(..);
        }
        StrokeDash::new(array, gs.dash_pattern.1)
    } else {
        None
    };

    let stroke = Stroke {
        width: gs.line_width.max(0.0),
        line_cap: line_cap(gs.line_cap),
        line_join: line_join(gs.line_join),
        miter_limit: gs.miter_limit.max(1.0),
        dash,
    };

    pixmap.stroke_path(path, &paint, &stroke, transform, None);
}

fn line_cap(cap: u8) -> LineCap {
    match cap {
        1 => LineCap::Round,
        2 => LineCap::Square,
        _ => LineCap::Butt,
    }
}

fn line_join(join: u8) -> LineJoin {
    match join {
        1 => LineJoin::Round,
        2 => LineJoin::Bevel,
        _ => LineJoin::Miter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::{Color, PathBuilder, Rect};

    #[test]
    fn test_line_style_conversion() {
        assert_eq!(line_cap(1), LineCap::Round);
        assert_eq!(line_cap(99), LineCap::Butt);
        assert_eq!(line_join(2), LineJoin::Bevel);
        assert_eq!(line_join(0), LineJoin::Miter);
    }

    #[test]
    fn test_fill_path_paints_pixels() {
        let mut pixmap = Pixmap::new(10, 10).unwrap();
        pixmap.fill(Color::WHITE);
        let path = PathBuilder::from_rect(Rect::from_ltrb(2.0, 2.0, 8.0, 8.0).unwrap());
        let mut gs = GraphicsState::new();
        gs.fill_color_rgb = (1.0, 0.0, 0.0);
        fill_path(&mut pixmap, &path, FillRule::Winding, Transform::identity(), &gs);
        let center = pixmap.pixel(5, 5).unwrap();
        assert_eq!((center.red(), center.green(), center.blue()), (255, 0, 0));
        let corner = pixmap.pixel(0, 0).unwrap();
        assert_eq!(corner.green(), 255);
    }

    #[test]
    fn test_dash_with_only_zeros_is_solid() {
        let mut pixmap = Pixmap::new(20, 5).unwrap();
        let mut path = PathBuilder::new();
        path.move_to(0.0, 2.5);
        path.line_to(20.0, 2.5);
        let path = path.finish().unwrap();
        let mut gs = GraphicsState::new();
        gs.dash_pattern = (vec![0.0], 0.0);
        gs.line_width = 2.0;
        stroke_path(&mut pixmap, &path, Transform::identity(), &gs);
        assert!(pixmap.pixel(10, 2).unwrap().alpha() > 0);
    }
}
