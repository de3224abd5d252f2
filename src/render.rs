//! Rasterizes a [`Surface`] into pixels and encodes PNG.
//!
//! The background is composited with `image`; the quote box, its text and
//! the spinner are filled with `tiny-skia` directly into the same buffer.

use std::f32::consts::{FRAC_PI_2, PI};
use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use tiny_skia::{FillRule, LineCap, Paint, Path, PathBuilder, PixmapMut, Stroke, Transform};
use tracing::{debug, warn};

use crate::cache::ImageRef;
use crate::error::CardError;
use crate::ports::Quote;
use crate::surface::{Layout, Overlay, Surface};
use crate::text::{system_font, TextBlock};

const BACKDROP: Rgba<u8> = Rgba([0, 0, 0, 255]);
const CONTAINER_PADDING: f32 = 20.0;
const BOX_PADDING: f32 = 16.0;
const BOX_RADIUS: f32 = 8.0;
const BOX_FILL: [u8; 4] = [0, 0, 0, 128];
const QUOTE_SIZE: f32 = 18.0;
const QUOTE_COLOR: [u8; 4] = [255, 255, 255, 255];
const AUTHOR_GAP: f32 = 8.0;
const AUTHOR_SIZE: f32 = 14.0;
const AUTHOR_COLOR: [u8; 4] = [255, 255, 255, 204];
const SPINNER_RADIUS: f32 = 16.0;
const SPINNER_STROKE: f32 = 4.0;

/// Paint the surface at its physical pixel size.
///
/// # Errors
///
/// Returns an error if the layout has no valid physical size.
pub fn rasterize(surface: &Surface) -> Result<RgbaImage, CardError> {
    let (width, height) = surface.layout.pixel_size()?;
    let mut canvas = RgbaImage::from_pixel(width, height, BACKDROP);
    if width == 0 || height == 0 {
        return Ok(canvas);
    }

    if let Some(reference) = &surface.background {
        paint_background(&mut canvas, reference);
    }

    // Every pixel is opaque here, so the straight RGBA buffer is also valid
    // premultiplied data for tiny-skia.
    if let Some(mut pixmap) = PixmapMut::from_bytes(&mut *canvas, width, height) {
        match &surface.overlay {
            Overlay::Empty => {}
            Overlay::Spinner => paint_spinner(&mut pixmap, &surface.layout),
            Overlay::Quote(quote) => paint_quote(&mut pixmap, quote, &surface.layout),
        }
    }
    Ok(canvas)
}

/// Encode pixels as PNG.
///
/// # Errors
///
/// Returns an error if the image is empty or encoding fails.
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, CardError> {
    if canvas.width() == 0 || canvas.height() == 0 {
        return Err(CardError::Capture("Failed to capture image".into()));
    }
    let mut buf = Cursor::new(Vec::new());
    canvas
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| CardError::Encode(format!("Failed to encode PNG: {e}")))?;
    Ok(buf.into_inner())
}

fn paint_background(canvas: &mut RgbaImage, reference: &ImageRef) {
    let bytes = match reference.read_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(%reference, "background left blank: {e}");
            return;
        }
    };
    let decoded = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!(%reference, "background left blank, cannot decode: {e}");
            return;
        }
    };
    let cover = decoded.resize_to_fill(canvas.width(), canvas.height(), FilterType::Triangle);
    imageops::overlay(canvas, &cover.to_rgba8(), 0, 0);
}

#[allow(clippy::cast_precision_loss)]
fn paint_quote(pixmap: &mut PixmapMut<'_>, quote: &Quote, layout: &Layout) {
    let ratio = layout.pixel_ratio;
    let logical_width = layout.width as f32;
    let logical_height = layout.height as f32;

    let box_width = (logical_width - 2.0 * CONTAINER_PADDING).max(0.0) * 0.9;
    let text_width = (box_width - 2.0 * BOX_PADDING).max(1.0);

    let font = system_font();
    let content = TextBlock::layout(font, &quote.content, QUOTE_SIZE, text_width);
    let author = TextBlock::layout(font, &format!("- {}", quote.author), AUTHOR_SIZE, text_width);
    debug!(
        quote_lines = content.line_count(),
        author_lines = author.line_count(),
        widest = content.width().max(author.width()),
        "quote laid out"
    );

    let box_height = 2.0 * BOX_PADDING + content.height() + AUTHOR_GAP + author.height();
    let box_height = box_height.min(logical_height - 2.0 * CONTAINER_PADDING).max(0.0);
    let left = (logical_width - box_width) / 2.0;
    let top = (logical_height - box_height) / 2.0;

    if let Some(path) = rounded_rect(
        left * ratio,
        top * ratio,
        box_width * ratio,
        box_height * ratio,
        BOX_RADIUS * ratio,
    ) {
        fill(pixmap, &path, BOX_FILL);
    }

    let text_left = left + BOX_PADDING;
    let text_top = top + BOX_PADDING;
    content.paint(pixmap, text_left, text_top, text_width, ratio, QUOTE_COLOR);
    let author_top = text_top + content.height() + AUTHOR_GAP;
    author.paint(pixmap, text_left, author_top, text_width, ratio, AUTHOR_COLOR);
}

/// A three-quarter ring, open at the top-left, centered on the surface.
#[allow(clippy::cast_precision_loss)]
fn paint_spinner(pixmap: &mut PixmapMut<'_>, layout: &Layout) {
    const SEGMENTS: u16 = 24;
    let ratio = layout.pixel_ratio;
    let cx = layout.width as f32 / 2.0 * ratio;
    let cy = layout.height as f32 / 2.0 * ratio;
    let radius = SPINNER_RADIUS * ratio;

    let mut builder = PathBuilder::new();
    for i in 0..=SEGMENTS {
        let angle = -FRAC_PI_2 + f32::from(i) / f32::from(SEGMENTS) * 1.5 * PI;
        let (x, y) = (cx + radius * angle.cos(), cy + radius * angle.sin());
        if i == 0 {
            builder.move_to(x, y);
        } else {
            builder.line_to(x, y);
        }
    }
    let Some(path) = builder.finish() else { return };

    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 255, 255, 255);
    paint.anti_alias = true;
    let stroke = Stroke { width: SPINNER_STROKE * ratio, line_cap: LineCap::Round, ..Stroke::default() };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

fn rounded_rect(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Option<Path> {
    let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
    let (right, bottom) = (x + width, y + height);
    let mut builder = PathBuilder::new();
    builder.move_to(x + r, y);
    builder.line_to(right - r, y);
    builder.quad_to(right, y, right, y + r);
    builder.line_to(right, bottom - r);
    builder.quad_to(right, bottom, right - r, bottom);
    builder.line_to(x + r, bottom);
    builder.quad_to(x, bottom, x, bottom - r);
    builder.line_to(x, y + r);
    builder.quad_to(x, y, x + r, y);
    builder.close();
    builder.finish()
}

fn fill(pixmap: &mut PixmapMut<'_>, path: &Path, color: [u8; 4]) {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
}
