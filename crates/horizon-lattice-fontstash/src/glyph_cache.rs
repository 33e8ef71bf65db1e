//! Glyph records and the cache mapping glyph keys to atlas regions.
//!
//! Rasterization produces a [`RasterizedGlyph`]: RGBA8 pixels already padded
//! for the configured effect and the inter-glyph margin. Placement and upload
//! are driven by [`FontSystem`](crate::FontSystem), which owns the atlases.

use std::collections::HashMap;

use crate::effects::{CoverageBitmap, MAX_EFFECT_AMOUNT, glyph_padding, render_effect};
use crate::error::{FontError, FontResult};
use crate::source::FontSource;
use crate::types::{FontSystemEffect, Rect, TextureId};

/// Identifies one rendered glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    /// Index of the font source that maps the codepoint.
    pub source: usize,
    pub codepoint: u32,
    /// Requested pixel size, before the resolution factor.
    pub size: u32,
    pub effect: FontSystemEffect,
    pub effect_amount: u32,
}

/// A glyph placed in an atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub key: GlyphKey,
    /// Glyph id within its font source.
    pub glyph_id: u32,
    /// Region of the atlas texture holding the padded bitmap; empty for
    /// glyphs without pixels.
    pub bounds: Rect,
    /// Horizontal offset from the pen position to the left edge of `bounds`.
    pub x_offset: i32,
    /// Vertical offset from the baseline to the top edge of `bounds` (y-down).
    pub y_offset: i32,
    /// Horizontal advance to the next pen position.
    pub x_advance: f32,
    /// Index of the atlas in [`FontSystem::atlases`](crate::FontSystem::atlases).
    pub atlas: Option<usize>,
    /// Texture of that atlas.
    pub texture: Option<TextureId>,
}

impl Glyph {
    /// Whether the glyph has no pixels (e.g. a space).
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

/// Padded RGBA8 pixels of a glyph, ready for placement.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedGlyph {
    pub glyph_id: u32,
    pub width: u32,
    pub height: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_advance: f32,
    /// `width * height` RGBA8 pixels; empty when the glyph has no area.
    pub pixels: Vec<u8>,
}

impl RasterizedGlyph {
    /// Check if this glyph is empty (zero size).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel options applied when rasterizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Pixel size handed to the font source (requested size times the
    /// resolution factor).
    pub pixel_size: f32,
    pub effect: FontSystemEffect,
    pub effect_amount: u32,
    pub premultiply_alpha: bool,
}

/// Rasterize a glyph and apply the configured effect.
///
/// Glyphs without area are measured but not rendered. Effect amounts above
/// [`MAX_EFFECT_AMOUNT`] are rejected.
pub fn rasterize_glyph(
    source: &dyn FontSource,
    glyph_id: u32,
    options: &RasterOptions,
) -> FontResult<RasterizedGlyph> {
    if options.effect_amount > MAX_EFFECT_AMOUNT {
        return Err(FontError::InvalidSettings(format!(
            "effect amount {} exceeds {}",
            options.effect_amount, MAX_EFFECT_AMOUNT
        )));
    }

    let metrics = source.glyph_metrics(glyph_id, options.pixel_size);
    if metrics.is_empty() {
        return Ok(RasterizedGlyph {
            glyph_id,
            width: 0,
            height: 0,
            x_offset: metrics.x0,
            y_offset: metrics.y0,
            x_advance: metrics.advance,
            pixels: Vec::new(),
        });
    }

    // The amount only applies together with an effect.
    let effect_amount = match options.effect {
        FontSystemEffect::None => 0,
        _ => options.effect_amount,
    };
    let bitmap = source.render_glyph(glyph_id, options.pixel_size)?;
    let pad = glyph_padding(effect_amount);
    let padded = CoverageBitmap::padded(&bitmap.coverage, bitmap.width(), bitmap.height(), pad);
    let (width, height) = (padded.width, padded.height);
    let pixels = render_effect(
        padded,
        options.effect,
        effect_amount,
        options.premultiply_alpha,
    );

    Ok(RasterizedGlyph {
        glyph_id,
        width,
        height,
        x_offset: bitmap.metrics.x0 - pad as i32,
        y_offset: bitmap.metrics.y0 - pad as i32,
        x_advance: bitmap.metrics.advance,
        pixels,
    })
}

/// Statistics about glyph cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphCacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that required rendering.
    pub misses: u64,
    /// Glyphs rasterized and uploaded to an atlas.
    pub glyphs_rasterized: u64,
    /// Glyphs cached without pixels.
    pub empty_glyphs: u64,
}

/// Rendered glyphs by key.
#[derive(Debug, Default)]
pub struct GlyphCache {
    glyphs: HashMap<GlyphKey, Glyph>,
    stats: GlyphCacheStats,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a glyph, counting the hit or miss.
    pub fn lookup(&mut self, key: &GlyphKey) -> Option<Glyph> {
        match self.glyphs.get(key) {
            Some(glyph) => {
                self.stats.hits += 1;
                tracing::trace!(
                    target: "horizon_lattice_fontstash::glyph_cache",
                    codepoint = key.codepoint, size = key.size,
                    "glyph cache hit"
                );
                Some(*glyph)
            }
            None => {
                self.stats.misses += 1;
                tracing::trace!(
                    target: "horizon_lattice_fontstash::glyph_cache",
                    codepoint = key.codepoint, size = key.size,
                    "glyph cache miss"
                );
                None
            }
        }
    }

    /// Get a glyph without touching the statistics.
    pub fn get(&self, key: &GlyphKey) -> Option<&Glyph> {
        self.glyphs.get(key)
    }

    pub fn contains(&self, key: &GlyphKey) -> bool {
        self.glyphs.contains_key(key)
    }

    /// Store a newly rendered glyph.
    pub fn insert(&mut self, glyph: Glyph) {
        if glyph.is_empty() {
            self.stats.empty_glyphs += 1;
        } else {
            self.stats.glyphs_rasterized += 1;
        }
        self.glyphs.insert(glyph.key, glyph);
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Drop every glyph. Statistics are kept.
    pub fn clear(&mut self) {
        self.glyphs.clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &GlyphCacheStats {
        &self.stats
    }

    /// Reset cache statistics.
    pub fn reset_stats(&mut self) {
        self.stats = GlyphCacheStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::GLYPH_MARGIN;
    use crate::source::{GlyphBitmap, GlyphMetrics, LineMetrics};

    /// Every glyph is a solid 3x4 block except glyph 0, which is blank.
    #[derive(Debug)]
    struct BlockSource;

    impl BlockSource {
        fn metrics(glyph_id: u32) -> GlyphMetrics {
            if glyph_id == 0 {
                GlyphMetrics {
                    advance: 4.0,
                    ..Default::default()
                }
            } else {
                GlyphMetrics {
                    advance: 5.0,
                    x0: 1,
                    y0: -4,
                    x1: 4,
                    y1: 0,
                }
            }
        }
    }

    impl FontSource for BlockSource {
        fn glyph_id(&self, codepoint: u32) -> Option<u32> {
            Some(codepoint)
        }

        fn metrics_for_size(&self, size: f32) -> LineMetrics {
            LineMetrics {
                ascent: size,
                descent: 0.0,
                line_height: size,
            }
        }

        fn glyph_metrics(&self, glyph_id: u32, _size: f32) -> GlyphMetrics {
            Self::metrics(glyph_id)
        }

        fn render_glyph(&self, glyph_id: u32, _size: f32) -> FontResult<GlyphBitmap> {
            assert_ne!(glyph_id, 0, "blank glyphs must not be rendered");
            Ok(GlyphBitmap {
                metrics: Self::metrics(glyph_id),
                coverage: vec![255; 12],
            })
        }

        fn supported_codepoints(&self) -> &[u32] {
            &[]
        }
    }

    fn options(effect: FontSystemEffect, effect_amount: u32) -> RasterOptions {
        RasterOptions {
            pixel_size: 16.0,
            effect,
            effect_amount,
            premultiply_alpha: false,
        }
    }

    fn key(codepoint: u32) -> GlyphKey {
        GlyphKey {
            source: 0,
            codepoint,
            size: 16,
            effect: FontSystemEffect::None,
            effect_amount: 0,
        }
    }

    #[test]
    fn rasterized_glyph_is_padded() {
        let glyph = rasterize_glyph(&BlockSource, 1, &options(FontSystemEffect::None, 0)).unwrap();
        let pad = GLYPH_MARGIN;

        assert_eq!(glyph.width, 3 + 2 * pad);
        assert_eq!(glyph.height, 4 + 2 * pad);
        assert_eq!(glyph.x_offset, 1 - pad as i32);
        assert_eq!(glyph.y_offset, -4 - pad as i32);
        assert_eq!(glyph.pixels.len(), (glyph.width * glyph.height * 4) as usize);
        // Margin stays transparent.
        assert_eq!(&glyph.pixels[0..4], &[255, 255, 255, 0]);
    }

    #[test]
    fn effect_amount_grows_padding() {
        let glyph = rasterize_glyph(&BlockSource, 1, &options(FontSystemEffect::Stroked, 3)).unwrap();
        assert_eq!(glyph.width, 3 + 2 * (3 + GLYPH_MARGIN));
        assert_eq!(glyph.height, 4 + 2 * (3 + GLYPH_MARGIN));
    }

    #[test]
    fn amount_without_effect_adds_no_padding() {
        let glyph = rasterize_glyph(&BlockSource, 1, &options(FontSystemEffect::None, 3)).unwrap();
        assert_eq!(glyph.width, 3 + 2 * GLYPH_MARGIN);
        assert_eq!(glyph.x_offset, 1 - GLYPH_MARGIN as i32);
    }

    #[test]
    fn oversized_effect_amount_is_rejected() {
        for amount in [MAX_EFFECT_AMOUNT + 1, u32::MAX] {
            let err = rasterize_glyph(&BlockSource, 1, &options(FontSystemEffect::Blurry, amount)).unwrap_err();
            assert!(matches!(err, FontError::InvalidSettings(_)));
        }
        let glyph = rasterize_glyph(&BlockSource, 1, &options(FontSystemEffect::Stroked, MAX_EFFECT_AMOUNT)).unwrap();
        assert_eq!(glyph.width, 3 + 2 * (MAX_EFFECT_AMOUNT + GLYPH_MARGIN));
    }

    #[test]
    fn blank_glyph_is_not_rendered() {
        let glyph = rasterize_glyph(&BlockSource, 0, &options(FontSystemEffect::Blurry, 2)).unwrap();
        assert!(glyph.is_empty());
        assert!(glyph.pixels.is_empty());
        assert_eq!(glyph.x_advance, 4.0);
    }

    #[test]
    fn cache_tracks_hits_and_misses() {
        let mut cache = GlyphCache::new();
        assert_eq!(cache.lookup(&key(65)), None);

        cache.insert(Glyph {
            key: key(65),
            glyph_id: 65,
            bounds: Rect::new(0, 0, 7, 8),
            x_offset: -1,
            y_offset: -6,
            x_advance: 5.0,
            atlas: Some(0),
            texture: Some(TextureId(0)),
        });
        assert_eq!(cache.lookup(&key(65)).map(|g| g.glyph_id), Some(65));
        assert!(cache.contains(&key(65)));
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.glyphs_rasterized), (1, 1, 1));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 1);
        cache.reset_stats();
        assert_eq!(cache.stats(), &GlyphCacheStats::default());
    }
}
