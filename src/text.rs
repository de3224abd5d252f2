//! Quote typesetting: font discovery, shaping, line breaking and glyph painting.
//!
//! Layout happens in logical pixels. Painting takes the device pixel ratio so
//! glyph outlines are filled at physical resolution.

use std::sync::OnceLock;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use tiny_skia::{FillRule, Paint, PathBuilder, PixmapMut, Transform};
use tracing::{debug, warn};
use ttf_parser::{GlyphId, OutlineBuilder};

/// Families tried before falling back to whatever face is installed.
const PREFERRED_FAMILIES: &[Family<'static>] = &[
    Family::Name("Helvetica Neue"),
    Family::Name("Roboto"),
    Family::Name("DejaVu Sans"),
    Family::Name("Liberation Sans"),
    Family::Name("Noto Sans"),
    Family::SansSerif,
];

static SYSTEM_FONT: OnceLock<Option<Font>> = OnceLock::new();

/// The sans-serif face used for quotes, loaded from the system once.
///
/// `None` when no usable font is installed; cards are then drawn without text.
#[must_use]
pub fn system_font() -> Option<&'static Font> {
    SYSTEM_FONT
        .get_or_init(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            let font = Font::pick(&db);
            match &font {
                Some(font) => debug!(faces = db.len(), family = %font.family, "font selected"),
                None => warn!(faces = db.len(), "no usable font found, quote text will not be drawn"),
            }
            font
        })
        .as_ref()
}

/// An owned font face plus the vertical metrics layout needs.
#[derive(Debug)]
pub struct Font {
    data: Vec<u8>,
    index: u32,
    family: String,
    units_per_em: f32,
    ascender: f32,
    descender: f32,
    line_gap: f32,
}

impl Font {
    /// Parse a face out of font file bytes.
    #[must_use]
    pub fn from_bytes(data: Vec<u8>, index: u32, family: impl Into<String>) -> Option<Self> {
        let face = ttf_parser::Face::parse(&data, index).ok()?;
        let units_per_em = f32::from(face.units_per_em());
        let ascender = f32::from(face.ascender());
        let descender = f32::from(face.descender());
        let line_gap = f32::from(face.line_gap());
        if units_per_em <= 0.0 {
            return None;
        }
        Some(Self {
            data,
            index,
            family: family.into(),
            units_per_em,
            ascender,
            descender,
            line_gap,
        })
    }

    fn pick(db: &Database) -> Option<Self> {
        let query = Query {
            families: PREFERRED_FAMILIES,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().find(|face| !face.monospaced).map(|face| face.id))
            .or_else(|| db.faces().next().map(|face| face.id))?;
        let family = db
            .face(id)
            .and_then(|face| face.families.first())
            .map_or_else(String::new, |(name, _)| name.clone());
        db.with_face_data(id, |data, index| Self::from_bytes(data.to_vec(), index, family))
            .flatten()
    }

    /// Height of one line at `size`.
    fn line_height(&self, size: f32) -> f32 {
        (self.ascender - self.descender + self.line_gap) * size / self.units_per_em
    }

    /// Distance from a line's top to its baseline at `size`.
    fn ascent(&self, size: f32) -> f32 {
        (self.ascender + self.line_gap / 2.0) * size / self.units_per_em
    }

    fn shape(&self, text: &str) -> ShapedLine {
        let Some(face) = rustybuzz::Face::from_slice(&self.data, self.index) else {
            return ShapedLine::default();
        };
        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        let output = rustybuzz::shape(&face, &[], buffer);

        let mut line = ShapedLine::default();
        for (info, pos) in output.glyph_infos().iter().zip(output.glyph_positions()) {
            if let Ok(id) = u16::try_from(info.glyph_id) {
                line.glyphs.push(PlacedGlyph {
                    id,
                    x: line.advance + pos.x_offset,
                    y: pos.y_offset,
                });
            }
            line.advance += pos.x_advance;
        }
        line
    }

    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, text: &str, size: f32) -> f32 {
        self.shape(text).advance as f32 * size / self.units_per_em
    }
}

/// A glyph position in font units relative to the line start.
#[derive(Debug, Clone, Copy)]
struct PlacedGlyph {
    id: u16,
    x: i32,
    y: i32,
}

#[derive(Debug, Default)]
struct ShapedLine {
    glyphs: Vec<PlacedGlyph>,
    advance: i32,
}

/// Centered, word-wrapped text at one size.
#[derive(Debug)]
pub struct TextBlock<'f> {
    font: Option<&'f Font>,
    size: f32,
    lines: Vec<ShapedLine>,
    line_height: f32,
}

impl<'f> TextBlock<'f> {
    /// Break `text` into lines no wider than `max_width` where word
    /// boundaries allow. A single word wider than the box keeps its own line.
    ///
    /// Without a font the block reserves one line of height and paints nothing.
    #[must_use]
    pub fn layout(font: Option<&'f Font>, text: &str, size: f32, max_width: f32) -> Self {
        let Some(font) = font else {
            return Self { font: None, size, lines: Vec::new(), line_height: size * 1.2 };
        };

        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if font.measure(&candidate, size) <= max_width {
                current = candidate;
            } else {
                lines.push(font.shape(&current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(font.shape(&current));
        }

        Self { font: Some(font), size, lines, line_height: font.line_height(size) }
    }

    /// Number of laid-out lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Logical height taken by the block.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn height(&self) -> f32 {
        self.lines.len().max(1) as f32 * self.line_height
    }

    /// Widest line in logical pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn width(&self) -> f32 {
        let Some(font) = self.font else { return 0.0 };
        let widest = self.lines.iter().map(|line| line.advance).max().unwrap_or(0);
        widest as f32 * self.size / font.units_per_em
    }

    /// Fill the glyphs, each line centered within `width` starting at
    /// logical (`left`, `top`). `ratio` maps logical to physical pixels.
    #[allow(clippy::cast_precision_loss)]
    pub fn paint(
        &self,
        pixmap: &mut PixmapMut<'_>,
        left: f32,
        top: f32,
        width: f32,
        ratio: f32,
        color: [u8; 4],
    ) {
        let Some(font) = self.font else { return };
        let Ok(face) = ttf_parser::Face::parse(&font.data, font.index) else { return };

        let units = self.size / font.units_per_em;
        let mut pen = GlyphPen { builder: PathBuilder::new(), scale: units * ratio, x: 0.0, y: 0.0 };
        for (row, line) in self.lines.iter().enumerate() {
            let line_width = line.advance as f32 * units;
            let start = left + (width - line_width) / 2.0;
            let baseline = top + row as f32 * self.line_height + font.ascent(self.size);
            for glyph in &line.glyphs {
                pen.x = (start + glyph.x as f32 * units) * ratio;
                pen.y = (baseline - glyph.y as f32 * units) * ratio;
                let _ = face.outline_glyph(GlyphId(glyph.id), &mut pen);
            }
        }

        let Some(path) = pen.builder.finish() else { return };
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

/// Collects glyph outlines into one path, flipping font units to y-down.
struct GlyphPen {
    builder: PathBuilder,
    scale: f32,
    x: f32,
    y: f32,
}

impl OutlineBuilder for GlyphPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(self.x + x * self.scale, self.y - y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(self.x + x * self.scale, self.y - y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            self.x + x1 * self.scale,
            self.y - y1 * self.scale,
            self.x + x * self.scale,
            self.y - y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.x + x1 * self.scale,
            self.y - y1 * self.scale,
            self.x + x2 * self.scale,
            self.y - y2 * self.scale,
            self.x + x * self.scale,
            self.y - y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_reserves_one_line() {
        let block = TextBlock::layout(None, "Stay hungry, stay foolish.", 18.0, 300.0);
        assert_eq!(block.line_count(), 0);
        assert!((block.height() - 21.6).abs() < 0.01);
        assert!(block.width().abs() < f32::EPSILON);
    }

    #[test]
    fn garbage_is_not_a_font() {
        assert!(Font::from_bytes(b"definitely not a font".to_vec(), 0, "x").is_none());
    }

    #[test]
    fn long_text_wraps_within_width() {
        let Some(font) = system_font() else {
            eprintln!("no system font installed; skipping");
            return;
        };
        let text = "The only way to do great work is to love what you do. If you haven't \
                    found it yet, keep looking.";
        let single = TextBlock::layout(Some(font), text, 18.0, f32::INFINITY);
        assert_eq!(single.line_count(), 1);

        let wrapped = TextBlock::layout(Some(font), text, 18.0, 280.0);
        assert!(wrapped.line_count() > 1);
        assert!(wrapped.width() <= 280.0);
        assert!(wrapped.height() > single.height());
    }

    #[test]
    fn bigger_size_measures_wider() {
        let Some(font) = system_font() else {
            eprintln!("no system font installed; skipping");
            return;
        };
        let small = TextBlock::layout(Some(font), "- Steve Jobs", 14.0, f32::INFINITY);
        let large = TextBlock::layout(Some(font), "- Steve Jobs", 18.0, f32::INFINITY);
        assert!(small.width() > 0.0);
        assert!(large.width() > small.width());
    }
}
