//! Font source capability.
//!
//! A [`FontSource`] wraps one loaded font file. The font system only needs a
//! handful of operations from it: map codepoints to glyph ids, report
//! size-dependent metrics and rasterize a glyph into a coverage bitmap. How
//! that happens is up to the backend behind the [`FontLoader`].

use std::fmt;

use crate::error::FontResult;
use crate::name_table::FontMetadata;

/// Vertical metrics of a font at a given pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetrics {
    /// Distance from the baseline to the top of the tallest glyphs.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the lowest glyphs (typically negative).
    pub descent: f32,
    /// Recommended distance between consecutive baselines.
    pub line_height: f32,
}

/// Placement of a glyph's bitmap relative to its origin, in pixels.
///
/// The box uses a y-down convention: `y0` is the top edge and is negative
/// for glyphs rising above the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    /// Horizontal advance to the next glyph origin.
    pub advance: f32,
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl GlyphMetrics {
    /// Bitmap width in pixels.
    pub fn width(&self) -> u32 {
        (self.x1 - self.x0).max(0) as u32
    }

    /// Bitmap height in pixels.
    pub fn height(&self) -> u32 {
        (self.y1 - self.y0).max(0) as u32
    }

    /// Whether the glyph has no visible pixels (e.g. a space).
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// A rasterized glyph: 8-bit coverage, row-major, tightly packed.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    pub metrics: GlyphMetrics,
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    /// Bitmap width in pixels.
    pub fn width(&self) -> u32 {
        self.metrics.width()
    }

    /// Bitmap height in pixels.
    pub fn height(&self) -> u32 {
        self.metrics.height()
    }
}

/// One loaded font file.
///
/// Sources are immutable once loaded and live as long as the font system
/// that owns them.
pub trait FontSource: fmt::Debug {
    /// Map a Unicode codepoint to a glyph id, if the font covers it.
    fn glyph_id(&self, codepoint: u32) -> Option<u32>;

    /// Vertical metrics scaled to `size` pixels.
    fn metrics_for_size(&self, size: f32) -> LineMetrics;

    /// Advance and bounding box of a glyph at `size` pixels.
    fn glyph_metrics(&self, glyph_id: u32, size: f32) -> GlyphMetrics;

    /// Rasterize a glyph at `size` pixels.
    ///
    /// The coverage buffer must hold exactly `width * height` bytes of the
    /// returned metrics.
    fn render_glyph(&self, glyph_id: u32, size: f32) -> FontResult<GlyphBitmap>;

    /// Horizontal kerning between two glyphs at `size` pixels.
    fn kerning(&self, _left: u32, _right: u32, _size: f32) -> f32 {
        0.0
    }

    /// Every codepoint this source can map to a glyph, ascending.
    fn supported_codepoints(&self) -> &[u32];

    /// Decoded naming metadata, when the font carries a usable name table.
    fn metadata(&self) -> Option<&FontMetadata> {
        None
    }
}

/// Turns raw font bytes into a [`FontSource`].
pub trait FontLoader: fmt::Debug {
    /// Load a font from its file contents.
    ///
    /// Fails with a format error when the bytes are not a recognized font
    /// container.
    fn load(&self, data: Vec<u8>) -> FontResult<Box<dyn FontSource>>;
}
