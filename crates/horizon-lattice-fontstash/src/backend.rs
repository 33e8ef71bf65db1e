//! Default font backend.
//!
//! Font files are validated and inspected with `ttf-parser` (character map,
//! header metrics and the `name` table) and rasterized with `fontdue`.

use std::collections::BTreeMap;
use std::fmt;

use ttf_parser::{Face, Tag};

use crate::effects::{box_prefilter_horizontal, box_prefilter_vertical};
use crate::error::{FontError, FontResult};
use crate::name_table::{FontMetadata, NameTableMode};
use crate::source::{FontLoader, FontSource, GlyphBitmap, GlyphMetrics, LineMetrics};

const NAME_TABLE: Tag = Tag::from_bytes(b"name");

/// Loads fonts into [`DefaultFontSource`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultFontLoader {
    /// Horizontal box prefilter width applied to rendered glyphs; 0 or 1 disables it.
    pub kernel_width: u32,
    /// Vertical box prefilter height applied to rendered glyphs; 0 or 1 disables it.
    pub kernel_height: u32,
    /// How unsupported name table formats are handled.
    pub name_table_mode: NameTableMode,
}

impl DefaultFontLoader {
    /// Create a loader without prefiltering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the box prefilter kernel.
    pub fn with_kernel(mut self, width: u32, height: u32) -> Self {
        self.kernel_width = width;
        self.kernel_height = height;
        self
    }

    /// Set how unsupported name tables are handled.
    pub fn with_name_table_mode(mut self, mode: NameTableMode) -> Self {
        self.name_table_mode = mode;
        self
    }
}

impl FontLoader for DefaultFontLoader {
    fn load(&self, data: Vec<u8>) -> FontResult<Box<dyn FontSource>> {
        Ok(Box::new(DefaultFontSource::from_bytes(data, *self)?))
    }
}

/// A font loaded by the default backend.
pub struct DefaultFontSource {
    font: fontdue::Font,
    glyph_ids: BTreeMap<u32, u16>,
    codepoints: Vec<u32>,
    units_per_em: f32,
    ascender: f32,
    descender: f32,
    line_gap: f32,
    kernel_width: u32,
    kernel_height: u32,
    metadata: Option<FontMetadata>,
}

impl DefaultFontSource {
    /// Parse a TrueType/OpenType font.
    pub fn from_bytes(data: Vec<u8>, loader: DefaultFontLoader) -> FontResult<Self> {
        let face =
            Face::parse(&data, 0).map_err(|err| FontError::InvalidFont(err.to_string()))?;

        let mut glyph_ids = BTreeMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|codepoint| {
                    if let Some(id) = subtable.glyph_index(codepoint).filter(|id| id.0 != 0) {
                        glyph_ids.entry(codepoint).or_insert(id.0);
                    }
                });
            }
        }
        let codepoints = glyph_ids.keys().copied().collect();

        let metadata = match face.raw_face().table(NAME_TABLE) {
            Some(table) => FontMetadata::from_bytes(table, loader.name_table_mode)?,
            None => None,
        };

        let units_per_em = f32::from(face.units_per_em().max(1));
        let ascender = f32::from(face.ascender());
        let descender = f32::from(face.descender());
        let line_gap = f32::from(face.line_gap());
        drop(face);

        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|err| FontError::InvalidFont(err.to_string()))?;

        tracing::debug!(
            target: "horizon_lattice_fontstash::font_system",
            glyphs = font.glyph_count(),
            codepoints = glyph_ids.len(),
            has_metadata = metadata.is_some(),
            "loaded font"
        );

        Ok(Self {
            font,
            glyph_ids,
            codepoints,
            units_per_em,
            ascender,
            descender,
            line_gap,
            kernel_width: loader.kernel_width,
            kernel_height: loader.kernel_height,
            metadata,
        })
    }

    /// Extra pixels the prefilter adds to the right and bottom of a glyph.
    fn prefilter_growth(&self) -> (u32, u32) {
        (
            self.kernel_width.saturating_sub(1),
            self.kernel_height.saturating_sub(1),
        )
    }
}

/// Glyph ids come from `glyph_id`, so they always fit; anything else renders `.notdef`.
fn glyph_index(glyph_id: u32) -> u16 {
    u16::try_from(glyph_id).unwrap_or(0)
}

fn to_glyph_metrics(metrics: &fontdue::Metrics) -> GlyphMetrics {
    let x0 = metrics.xmin;
    let y0 = -(metrics.ymin + metrics.height as i32);
    GlyphMetrics {
        advance: metrics.advance_width,
        x0,
        y0,
        x1: x0 + metrics.width as i32,
        y1: y0 + metrics.height as i32,
    }
}

impl FontSource for DefaultFontSource {
    fn glyph_id(&self, codepoint: u32) -> Option<u32> {
        self.glyph_ids.get(&codepoint).map(|&id| u32::from(id))
    }

    fn metrics_for_size(&self, size: f32) -> LineMetrics {
        let scale = size / self.units_per_em;
        LineMetrics {
            ascent: self.ascender * scale,
            descent: self.descender * scale,
            line_height: (self.ascender - self.descender + self.line_gap) * scale,
        }
    }

    fn glyph_metrics(&self, glyph_id: u32, size: f32) -> GlyphMetrics {
        let mut metrics = to_glyph_metrics(&self.font.metrics_indexed(glyph_index(glyph_id), size));
        if !metrics.is_empty() {
            let (grow_x, grow_y) = self.prefilter_growth();
            metrics.x1 += grow_x as i32;
            metrics.y1 += grow_y as i32;
        }
        metrics
    }

    fn render_glyph(&self, glyph_id: u32, size: f32) -> FontResult<GlyphBitmap> {
        let (raw, coverage) = self.font.rasterize_indexed(glyph_index(glyph_id), size);
        let mut metrics = to_glyph_metrics(&raw);
        let (grow_x, grow_y) = self.prefilter_growth();

        if metrics.is_empty() || (grow_x == 0 && grow_y == 0) {
            return Ok(GlyphBitmap { metrics, coverage });
        }

        let (src_w, src_h) = (raw.width, raw.height);
        let (w, h) = (src_w + grow_x as usize, src_h + grow_y as usize);
        let mut filtered = vec![0u8; w * h];
        for (row, line) in coverage.chunks_exact(src_w).enumerate() {
            filtered[row * w..row * w + src_w].copy_from_slice(line);
        }
        box_prefilter_horizontal(&mut filtered, w, h, self.kernel_width as usize);
        box_prefilter_vertical(&mut filtered, w, h, self.kernel_height as usize);

        metrics.x1 += grow_x as i32;
        metrics.y1 += grow_y as i32;
        Ok(GlyphBitmap {
            metrics,
            coverage: filtered,
        })
    }

    fn kerning(&self, left: u32, right: u32, size: f32) -> f32 {
        self.font
            .horizontal_kern_indexed(glyph_index(left), glyph_index(right), size)
            .unwrap_or(0.0)
    }

    fn supported_codepoints(&self) -> &[u32] {
        &self.codepoints
    }

    fn metadata(&self) -> Option<&FontMetadata> {
        self.metadata.as_ref()
    }
}

impl fmt::Debug for DefaultFontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultFontSource")
            .field("glyph_count", &self.font.glyph_count())
            .field("codepoints", &self.codepoints.len())
            .field("units_per_em", &self.units_per_em)
            .field("kernel", &(self.kernel_width, self.kernel_height))
            .field("has_metadata", &self.metadata.is_some())
            .finish()
    }
}
