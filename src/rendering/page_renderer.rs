//! Page renderer - rasterizes a region of a page with an optional highlight.

use crate::content::{ContentSink, GlyphEvent, GraphicsState};
use crate::document::PdfPage;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::objects::{self, get, get_number};

use image::RgbImage;
use lopdf::{Document, Object, Stream};
use serde::{Deserialize, Serialize};
use tiny_skia::{
    BlendMode, Color, FillRule, FilterQuality, IntSize, Paint, Path, Pixmap, PixmapPaint, Transform,
};

use super::path_rasterizer;
use super::text_rasterizer::TextRasterizer;

/// Default pixels per page unit.
pub const DEFAULT_SCALE: f32 = 4.0;

/// Default highlight colour (yellow).
pub const DEFAULT_HIGHLIGHT_COLOR: [u8; 3] = [255, 255, 0];

/// Options for region rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Pixels per page unit (default: 4.0)
    pub scale: f32,
    /// Background colour painted before page content
    pub background: [u8; 3],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            background: [255, 255, 255],
        }
    }
}

impl RenderOptions {
    /// Create options with a custom scale.
    pub fn with_scale(scale: f32) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }

    /// Set the background colour.
    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }
}

/// A rectangle emphasised over the page content.
///
/// The mark is painted with a multiply blend, so dark text under it stays
/// legible while the paper turns the mark's colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightMark {
    /// Highlighted area in page space
    pub rect: Rect,
    /// RGB colour of the mark
    pub color: [u8; 3],
}

impl HighlightMark {
    /// Create a yellow mark.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            color: DEFAULT_HIGHLIGHT_COLOR,
        }
    }

    /// Set the mark colour.
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }
}

/// Renders page regions to RGB images.
#[derive(Debug, Clone, Default)]
pub struct PageRenderer {
    options: RenderOptions,
}

impl PageRenderer {
    /// Create a new page renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Rendering options in use.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Rasterize `region` of `page` (page space) with an optional highlight.
    ///
    /// The output is `ceil(width * scale) x ceil(height * scale)` pixels. The
    /// page itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RenderFailure`] carrying the page number when the
    /// region is empty or the content cannot be interpreted.
    pub fn render_region(
        &self,
        page: &PdfPage<'_>,
        region: &Rect,
        highlight: Option<&HighlightMark>,
    ) -> Result<RgbImage> {
        self.rasterize(page, region, highlight)
            .map_err(|e| e.into_render_failure(page.number()))
    }

    fn rasterize(&self, page: &PdfPage<'_>, region: &Rect, highlight: Option<&HighlightMark>) -> Result<RgbImage> {
        let scale = self.options.scale;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::Config(format!("render scale must be positive, got {}", scale)));
        }

        let width = (region.width() * scale).ceil() as u32;
        let height = (region.height() * scale).ceil() as u32;
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| Error::Image(format!("cannot allocate a {}x{} pixmap", width, height)))?;

        let [r, g, b] = self.options.background;
        pixmap.fill(Color::from_rgba8(r, g, b, 255));

        log::debug!(
            "Rendering page {} region ({:.1}, {:.1})-({:.1}, {:.1}) at {}x{}",
            page.number(),
            region.x0,
            region.y0,
            region.x1,
            region.y1,
            width,
            height
        );

        // Page space to device pixels.
        let base = Transform::from_scale(scale, scale).pre_translate(-region.x0, -region.y0);

        let document = page.document();
        {
            let mut sink = RasterSink {
                pixmap: &mut pixmap,
                base,
                doc: document.inner(),
                page: page.number(),
                text: TextRasterizer::new(document.system_fonts()),
            };
            page.interpret(&mut sink)?;
        }

        if let Some(mark) = highlight {
            draw_highlight(&mut pixmap, base, mark);
        }

        to_rgb_image(&pixmap)
    }
}

/// Content sink painting into a pixmap.
struct RasterSink<'p, 'd> {
    pixmap: &'p mut Pixmap,
    base: Transform,
    doc: &'d Document,
    page: usize,
    text: TextRasterizer<'d>,
}

impl RasterSink<'_, '_> {
    fn transform_for(&self, state: &GraphicsState) -> Transform {
        self.base.pre_concat(state.ctm.to_transform())
    }
}

impl ContentSink for RasterSink<'_, '_> {
    fn glyph(&mut self, event: &GlyphEvent<'_>) {
        self.text.draw_glyph(self.pixmap, self.base, event);
    }

    fn fill_path(&mut self, path: &Path, rule: FillRule, state: &GraphicsState) {
        let transform = self.transform_for(state);
        path_rasterizer::fill_path(self.pixmap, path, rule, transform, state);
    }

    fn stroke_path(&mut self, path: &Path, state: &GraphicsState) {
        let transform = self.transform_for(state);
        path_rasterizer::stroke_path(self.pixmap, path, transform, state);
    }

    fn image(&mut self, image: &Stream, state: &GraphicsState) {
        let decoded = match decode_image(self.doc, image) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("Skipping image on page {}: {}", self.page, e);
                return;
            },
        };

        // Images occupy the unit square of user space, first row at the top.
        let unit = Transform::from_row(
            1.0 / decoded.width() as f32,
            0.0,
            0.0,
            -1.0 / decoded.height() as f32,
            0.0,
            1.0,
        );
        let transform = self.transform_for(state).pre_concat(unit);
        let paint = PixmapPaint {
            opacity: state.fill_alpha.clamp(0.0, 1.0),
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap.draw_pixmap(0, 0, decoded.as_ref(), &paint, transform, None);
    }
}

/// Paint the highlight with a multiply blend over existing content.
fn draw_highlight(pixmap: &mut Pixmap, base: Transform, mark: &HighlightMark) {
    let Rect { x0, y0, x1, y1 } = mark.rect;
    let Some(rect) = tiny_skia::Rect::from_ltrb(x0, y0, x1, y1) else {
        log::debug!("Ignoring degenerate highlight {:?}", mark.rect);
        return;
    };

    let [r, g, b] = mark.color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, 255);
    paint.blend_mode = BlendMode::Multiply;
    paint.anti_alias = true;
    pixmap.fill_rect(rect, &paint, base, None);
}

/// Drop alpha and unpremultiply into an RGB buffer.
fn to_rgb_image(pixmap: &Pixmap) -> Result<RgbImage> {
    let mut data = Vec::with_capacity(pixmap.pixels().len() * 3);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        data.extend_from_slice(&[color.red(), color.green(), color.blue()]);
    }
    RgbImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| Error::Image("pixel buffer does not match pixmap size".to_string()))
}

/// Decode an image XObject into an opaque pixmap.
fn decode_image(doc: &Document, stream: &Stream) -> Result<Pixmap> {
    let dict = &stream.dict;
    if matches!(get(doc, dict, b"ImageMask"), Some(Object::Boolean(true))) {
        return Err(Error::Image("stencil masks are not painted".to_string()));
    }

    let (width, height, rgba) = match last_filter(doc, dict).as_deref() {
        Some("DCTDecode") => {
            let decoded = image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .map_err(|e| Error::Image(format!("JPEG: {}", e)))?
                .to_rgba8();
            (decoded.width(), decoded.height(), decoded.into_raw())
        },
        Some(filter @ ("JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode")) => {
            return Err(Error::Image(format!("{} images are not supported", filter)));
        },
        _ => {
            let width = get_number(doc, dict, b"Width").unwrap_or(0.0) as u32;
            let height = get_number(doc, dict, b"Height").unwrap_or(0.0) as u32;
            if width == 0 || height == 0 {
                return Err(Error::Image(format!("invalid image size {}x{}", width, height)));
            }
            let bits = get_number(doc, dict, b"BitsPerComponent").unwrap_or(8.0) as u32;
            let components = color_components(doc, dict)?;
            let data = objects::stream_data(stream);
            (width, height, raw_to_rgba(&data, width, height, bits, components)?)
        },
    };

    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| Error::Image(format!("invalid image size {}x{}", width, height)))?;
    Pixmap::from_vec(rgba, size).ok_or_else(|| Error::Image("image buffer does not match its size".to_string()))
}

/// Innermost filter of a stream, which determines the image encoding.
fn last_filter(doc: &Document, dict: &lopdf::Dictionary) -> Option<String> {
    match get(doc, dict, b"Filter")? {
        Object::Array(filters) => filters.last().and_then(|f| objects::resolve(doc, f)).and_then(objects::name),
        other => objects::name(other),
    }
}

/// Number of colour components for an image colour space.
fn color_components(doc: &Document, dict: &lopdf::Dictionary) -> Result<usize> {
    let space = get(doc, dict, b"ColorSpace").ok_or_else(|| Error::Image("image has no colour space".to_string()))?;

    let (family, params) = match space {
        Object::Array(items) => {
            let family = items.first().and_then(|f| objects::resolve(doc, f)).and_then(objects::name);
            (family, items.get(1))
        },
        other => (objects::name(other), None),
    };

    match family.as_deref() {
        Some("DeviceGray" | "CalGray" | "G") => Ok(1),
        Some("DeviceRGB" | "CalRGB" | "RGB") => Ok(3),
        Some("DeviceCMYK" | "CMYK") => Ok(4),
        Some("ICCBased") => {
            let n = params
                .and_then(|p| objects::resolve(doc, p))
                .and_then(|p| match p {
                    Object::Stream(s) => get_number(doc, &s.dict, b"N"),
                    _ => None,
                })
                .unwrap_or(3.0);
            match n as usize {
                n @ (1 | 3 | 4) => Ok(n),
                n => Err(Error::Image(format!("ICC profile with {} components", n))),
            }
        },
        Some(other) => Err(Error::Image(format!("{} colour space is not supported", other))),
        None => Err(Error::Image("malformed colour space".to_string())),
    }
}

/// Expand raw samples into opaque RGBA.
fn raw_to_rgba(data: &[u8], width: u32, height: u32, bits: u32, components: usize) -> Result<Vec<u8>> {
    let overflow = || Error::Image(format!("image dimensions {}x{} are too large", width, height));
    let pixels = (width as usize).checked_mul(height as usize).ok_or_else(overflow)?;
    let output_len = pixels.checked_mul(4).ok_or_else(overflow)?;

    let mut rgba = Vec::new();
    match (bits, components) {
        (8, _) => {
            let needed = pixels.checked_mul(components).ok_or_else(overflow)?;
            if data.len() < needed {
                return Err(Error::Image(format!("image data truncated: {} of {} bytes", data.len(), needed)));
            }
            rgba.reserve_exact(output_len);
            for sample in data[..needed].chunks_exact(components) {
                let (r, g, b) = match *sample {
                    [gray] => (gray, gray, gray),
                    [r, g, b] => (r, g, b),
                    [c, m, y, k] => {
                        let to_unit = |v: u8| v as f32 / 255.0;
                        let (r, g, b) =
                            crate::content::interpreter::cmyk_to_rgb(to_unit(c), to_unit(m), to_unit(y), to_unit(k));
                        ((r * 255.0).round() as u8, (g * 255.0).round() as u8, (b * 255.0).round() as u8)
                    },
                    _ => return Err(Error::Image(format!("{} colour components", components))),
                };
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        },
        (1, 1) => {
            let stride = (width as usize).div_ceil(8);
            let needed = stride.checked_mul(height as usize).ok_or_else(overflow)?;
            if data.len() < needed {
                return Err(Error::Image("bitonal image data truncated".to_string()));
            }
            rgba.reserve_exact(output_len);
            for row in data.chunks_exact(stride).take(height as usize) {
                for x in 0..width as usize {
                    let on = row[x / 8] & (0x80 >> (x % 8)) != 0;
                    let v = if on { 255 } else { 0 };
                    rgba.extend_from_slice(&[v, v, v, 255]);
                }
            }
        },
        _ => {
            return Err(Error::Image(format!(
                "{} bits per component with {} components is not supported",
                bits, components
            )));
        },
    }

    Ok(rgba)
}
