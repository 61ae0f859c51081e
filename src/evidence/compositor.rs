//! Region compositor - turns search-term occurrences into one crop.

use crate::config::{EvidenceConfig, DEFAULT_DPI, DEFAULT_MARGIN};
use crate::geometry::Rect;
use crate::rendering::DEFAULT_SCALE;
use serde::{Deserialize, Serialize};

/// A page region to rasterize, with its resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSpec {
    /// Region in page space
    pub rect: Rect,
    /// Pixels per page unit
    pub scale: f32,
    /// Nominal resolution recorded with the image
    pub dpi: u32,
}

impl CropSpec {
    /// Output width in pixels.
    pub fn pixel_width(&self) -> u32 {
        (self.rect.width() * self.scale).ceil() as u32
    }

    /// Output height in pixels.
    pub fn pixel_height(&self) -> u32 {
        (self.rect.height() * self.scale).ceil() as u32
    }
}

/// Builds page crops from occurrence sets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionCompositor {
    top_margin: f32,
    bottom_margin: f32,
    scale: f32,
    dpi: u32,
    clamp_vertical: bool,
}

impl Default for RegionCompositor {
    fn default() -> Self {
        Self {
            top_margin: DEFAULT_MARGIN,
            bottom_margin: DEFAULT_MARGIN,
            scale: DEFAULT_SCALE,
            dpi: DEFAULT_DPI,
            clamp_vertical: true,
        }
    }
}

impl RegionCompositor {
    /// Compositor using the margins, scale and clamping of `config`.
    pub fn from_config(config: &EvidenceConfig) -> Self {
        Self {
            top_margin: config.top_margin,
            bottom_margin: config.bottom_margin,
            scale: config.scale,
            dpi: config.dpi,
            clamp_vertical: config.clamp_vertical,
        }
    }

    /// Merge all occurrences on a page into one full-width crop.
    ///
    /// The region runs from the top-left of the first occurrence to the
    /// bottom-right of the last, in document order. Occurrences in between
    /// are not consulted, so out-of-order layouts (multi-column pages) can
    /// yield a region that misses some of them. The region then grows by the
    /// margins and is stretched to the page width. With vertical clamping on,
    /// it is then limited to the page.
    pub fn compose(&self, search: &[Rect], page_width: f32, page_height: f32) -> Option<CropSpec> {
        let first = search.first()?;
        let last = search.last()?;
        let merged = first.span(last);

        let mut rect = merged
            .expand(self.top_margin, self.bottom_margin)
            .clamp_width(page_width);
        if self.clamp_vertical {
            rect = rect.clamp_height(page_height);
        }

        Some(CropSpec {
            rect,
            scale: self.scale,
            dpi: self.dpi,
        })
    }
}

/// Build a crop with the default margins, scale and DPI.
///
/// Without a page height the crop is not clamped vertically; use
/// [`RegionCompositor::compose`] for that.
///
/// # Examples
///
/// ```
/// use pdf_evidence::evidence::build_crop;
/// use pdf_evidence::geometry::Rect;
///
/// let crop = build_crop(&[Rect::new(72.0, 100.0, 300.0, 112.0)], 612.0).unwrap();
/// assert_eq!(crop.rect, Rect::new(0.0, 50.0, 612.0, 162.0));
/// assert_eq!(crop.pixel_width(), 2448);
/// assert!(build_crop(&[], 612.0).is_none());
/// ```
pub fn build_crop(search: &[Rect], page_width: f32) -> Option<CropSpec> {
    RegionCompositor {
        clamp_vertical: false,
        ..Default::default()
    }
    .compose(search, page_width, f32::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_two_occurrences_make_one_region() {
        let search = [
            Rect::new(72.0, 100.0, 300.0, 112.0),
            Rect::new(72.0, 400.0, 250.0, 412.0),
        ];
        let crop = RegionCompositor::default().compose(&search, 612.0, 792.0).unwrap();
        assert_eq!(crop.rect, Rect::new(0.0, 50.0, 612.0, 462.0));
        assert_eq!(crop.scale, 4.0);
        assert_eq!(crop.dpi, 300);
        assert_eq!(crop.pixel_height(), 1648);
    }

    #[test]
    fn test_vertical_clamp() {
        let search = [Rect::new(72.0, 20.0, 300.0, 32.0), Rect::new(72.0, 770.0, 300.0, 782.0)];
        let clamped = RegionCompositor::default().compose(&search, 612.0, 792.0).unwrap();
        assert_eq!(clamped.rect, Rect::new(0.0, 0.0, 612.0, 792.0));

        let config = EvidenceConfig::new().with_clamp_vertical(false);
        let free = RegionCompositor::from_config(&config).compose(&search, 612.0, 792.0).unwrap();
        assert_eq!(free.rect, Rect::new(0.0, -30.0, 612.0, 832.0));
    }

    #[test]
    fn test_custom_margins_and_scale() {
        let config = EvidenceConfig::new().with_top_margin(10.0).with_bottom_margin(0.0).with_scale(2.0);
        let crop = RegionCompositor::from_config(&config)
            .compose(&[Rect::new(10.0, 100.0, 20.0, 110.0)], 100.0, 200.0)
            .unwrap();
        assert_eq!(crop.rect, Rect::new(0.0, 90.0, 100.0, 110.0));
        assert_eq!((crop.pixel_width(), crop.pixel_height()), (200, 40));
    }

    #[test]
    fn test_document_order_decides_corners() {
        // Middle occurrence sits above the first; it does not move the top edge.
        let search = [
            Rect::new(72.0, 100.0, 300.0, 112.0),
            Rect::new(72.0, 30.0, 300.0, 42.0),
            Rect::new(72.0, 400.0, 300.0, 412.0),
        ];
        let crop = build_crop(&search, 612.0).unwrap();
        assert_eq!(crop.rect, Rect::new(0.0, 50.0, 612.0, 462.0));
    }

    #[test]
    fn test_last_above_first_spans_between_them() {
        // Corners are the first's top-left and the last's bottom-right.
        let search = [Rect::new(72.0, 400.0, 300.0, 412.0), Rect::new(72.0, 100.0, 300.0, 112.0)];
        let crop = build_crop(&search, 612.0).unwrap();
        assert_eq!(crop.rect, Rect::new(0.0, 62.0, 612.0, 450.0));
    }

    proptest! {
        #[test]
        fn prop_crop_uses_first_and_last_only(
            boxes in prop::collection::vec((0.0f32..500.0, 0.0f32..780.0, 1.0f32..100.0, 1.0f32..12.0), 1..8),
        ) {
            let search: Vec<Rect> = boxes
                .into_iter()
                .map(|(x, y, w, h)| Rect::from_xywh(x, y, w, h))
                .collect();
            let ends = [search[0], search[search.len() - 1]];

            let full = build_crop(&search, 612.0).unwrap();
            let trimmed = build_crop(&ends, 612.0).unwrap();
            prop_assert_eq!(full, trimmed);
        }

        #[test]
        fn prop_crop_covers_occurrences(
            boxes in prop::collection::vec((0.0f32..500.0, 0.0f32..780.0, 1.0f32..100.0, 1.0f32..12.0), 1..8),
        ) {
            let mut search: Vec<Rect> = boxes
                .into_iter()
                .map(|(x, y, w, h)| Rect::from_xywh(x, y, w, h))
                .collect();
            // Coverage only holds for top-to-bottom document order.
            search.sort_by(|a, b| a.y0.total_cmp(&b.y0));
            let (width, height) = (612.0, 792.0);

            let crop = RegionCompositor::default().compose(&search, width, height).unwrap();
            prop_assert_eq!(crop.rect.x0, 0.0);
            prop_assert_eq!(crop.rect.width(), width);

            let top = (search[0].y0 - 50.0).max(0.0);
            let bottom = (search[search.len() - 1].y1 + 50.0).min(height);
            prop_assert!(crop.rect.y0 <= top);
            prop_assert!(crop.rect.y1 >= bottom);
            prop_assert!(crop.rect.y0 >= 0.0 && crop.rect.y1 <= height);
        }
    }
}
