//! Shared fixtures: a scripted font source and texture managers.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use horizon_lattice_fontstash::{
    FontError, FontLoader, FontMetadata, FontResult, FontSource, GlyphBitmap, GlyphMetrics,
    LineMetrics, PixelTextureManager, Rect, TextureId, TextureManager,
};

/// Install a test subscriber; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A glyph of a scripted source: a solid block of `width` x `height`.
#[derive(Debug, Clone, Copy)]
struct Block {
    width: u32,
    height: u32,
    advance: f32,
}

/// A font source whose glyphs are solid rectangles.
///
/// Glyph ids are `codepoint + 1`, so id 0 is never handed out.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    glyphs: BTreeMap<u32, Block>,
    codepoints: Vec<u32>,
    kerning: HashMap<(u32, u32), f32>,
    metadata: Option<FontMetadata>,
    renders: Rc<Cell<usize>>,
    last_size: Rc<Cell<f32>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cover `ch` with a `width` x `height` block.
    pub fn glyph(mut self, ch: char, width: u32, height: u32, advance: f32) -> Self {
        self.glyphs.insert(ch as u32, Block { width, height, advance });
        self.codepoints = self.glyphs.keys().copied().collect();
        self
    }

    /// Cover every character of `chars` with the same block.
    pub fn glyphs(self, chars: &str, width: u32, height: u32) -> Self {
        chars
            .chars()
            .fold(self, |source, ch| source.glyph(ch, width, height, width as f32 + 1.0))
    }

    pub fn kern(mut self, left: char, right: char, amount: f32) -> Self {
        self.kerning.insert((left as u32 + 1, right as u32 + 1), amount);
        self
    }

    pub fn metadata(mut self, metadata: FontMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Counter of `render_glyph` calls.
    pub fn render_counter(&self) -> Rc<Cell<usize>> {
        self.renders.clone()
    }

    /// Last pixel size passed to `render_glyph` or `glyph_metrics`.
    pub fn size_probe(&self) -> Rc<Cell<f32>> {
        self.last_size.clone()
    }

    pub fn boxed(self) -> Box<dyn FontSource> {
        Box::new(self)
    }

    fn block(&self, glyph_id: u32) -> Option<Block> {
        glyph_id
            .checked_sub(1)
            .and_then(|codepoint| self.glyphs.get(&codepoint).copied())
    }

    fn metrics(&self, glyph_id: u32) -> GlyphMetrics {
        match self.block(glyph_id) {
            Some(block) => GlyphMetrics {
                advance: block.advance,
                x0: 0,
                y0: -(block.height as i32),
                x1: block.width as i32,
                y1: 0,
            },
            None => GlyphMetrics::default(),
        }
    }
}

impl FontSource for ScriptedSource {
    fn glyph_id(&self, codepoint: u32) -> Option<u32> {
        self.glyphs.contains_key(&codepoint).then_some(codepoint + 1)
    }

    fn metrics_for_size(&self, size: f32) -> LineMetrics {
        LineMetrics {
            ascent: size * 0.8,
            descent: -size * 0.2,
            line_height: size,
        }
    }

    fn glyph_metrics(&self, glyph_id: u32, size: f32) -> GlyphMetrics {
        self.last_size.set(size);
        self.metrics(glyph_id)
    }

    fn render_glyph(&self, glyph_id: u32, size: f32) -> FontResult<GlyphBitmap> {
        self.last_size.set(size);
        self.renders.set(self.renders.get() + 1);
        let metrics = self.metrics(glyph_id);
        let len = (metrics.width() * metrics.height()) as usize;
        Ok(GlyphBitmap {
            metrics,
            coverage: vec![255; len],
        })
    }

    fn kerning(&self, left: u32, right: u32, _size: f32) -> f32 {
        self.kerning.get(&(left, right)).copied().unwrap_or(0.0)
    }

    fn supported_codepoints(&self) -> &[u32] {
        &self.codepoints
    }

    fn metadata(&self) -> Option<&FontMetadata> {
        self.metadata.as_ref()
    }
}

/// Loads the UTF-8 text of the "font file" as a source covering its characters.
#[derive(Debug, Default)]
pub struct ScriptedLoader;

impl FontLoader for ScriptedLoader {
    fn load(&self, data: Vec<u8>) -> FontResult<Box<dyn FontSource>> {
        let text = String::from_utf8(data).map_err(|e| FontError::InvalidFont(e.to_string()))?;
        if text.is_empty() {
            return Err(FontError::InvalidFont("empty font".to_string()));
        }
        Ok(ScriptedSource::new().glyphs(&text, 6, 8).boxed())
    }
}

/// A [`PixelTextureManager`] whose uploads can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyTextures {
    pub inner: PixelTextureManager,
    pub fail_uploads: bool,
}

impl TextureManager for FlakyTextures {
    fn create_texture(&mut self, width: u32, height: u32) -> FontResult<TextureId> {
        self.inner.create_texture(width, height)
    }

    fn upload_region(&mut self, texture: TextureId, region: Rect, pixels: &[u8]) -> FontResult<()> {
        if self.fail_uploads {
            return Err(FontError::Texture("device lost".to_string()));
        }
        self.inner.upload_region(texture, region, pixels)
    }

    fn texture_size(&self, texture: TextureId) -> FontResult<(u32, u32)> {
        self.inner.texture_size(texture)
    }
}

/// Encode a format 0 `name` table from `(platform, encoding, language, name id, text)`.
///
/// Macintosh strings are stored as UTF-8, everything else as UTF-16BE.
pub fn name_table(records: &[(u16, u16, u16, u16, &str)]) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = records
        .iter()
        .map(|&(platform, _, _, _, text)| match platform {
            1 => text.as_bytes().to_vec(),
            _ => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        })
        .collect();

    let storage_offset = 6 + records.len() * 12;
    let mut out = Vec::new();
    for field in [0, records.len() as u16, storage_offset as u16] {
        out.extend_from_slice(&field.to_be_bytes());
    }

    let mut offset = 0u16;
    for (&(platform, encoding, language, name_id, _), bytes) in records.iter().zip(&encoded) {
        for field in [platform, encoding, language, name_id, bytes.len() as u16, offset] {
            out.extend_from_slice(&field.to_be_bytes());
        }
        offset += bytes.len() as u16;
    }
    for bytes in &encoded {
        out.extend_from_slice(bytes);
    }
    out
}
