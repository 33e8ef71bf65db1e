//! Font system: font sources, sized fonts and the atlases glyphs live in.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::atlas::FontAtlas;
use crate::backend::DefaultFontLoader;
use crate::effects::MAX_EFFECT_AMOUNT;
use crate::error::{FontError, FontResult};
use crate::glyph_cache::{Glyph, GlyphCache, GlyphCacheStats, GlyphKey, RasterOptions, rasterize_glyph};
use crate::name_table::{FontMetadata, Locale, NameTableMode};
use crate::signal::Signal;
use crate::source::{FontLoader, FontSource};
use crate::texture::TextureManager;
use crate::types::{FontSystemEffect, Rect, TextureId};

/// Default atlas texture width and height.
pub const DEFAULT_TEXTURE_SIZE: u32 = 1024;

/// Configuration for a [`FontSystem`].
///
/// Settings are copied into the font system on construction and cannot be
/// changed afterwards.
#[derive(Debug, Clone)]
pub struct FontSystemSettings {
    /// Width of every atlas texture.
    pub texture_width: u32,
    /// Height of every atlas texture.
    pub texture_height: u32,
    /// Whether uploaded pixels have premultiplied alpha.
    pub premultiply_alpha: bool,
    /// Scale applied to requested sizes before rasterizing.
    pub font_resolution_factor: f32,
    /// Effect applied to every glyph.
    pub effect: FontSystemEffect,
    /// Blur radius or stroke width, depending on `effect`. At most
    /// [`MAX_EFFECT_AMOUNT`]; ignored without an effect.
    pub effect_amount: u32,
    /// Horizontal prefilter kernel of the default loader.
    pub kernel_width: u32,
    /// Vertical prefilter kernel of the default loader.
    pub kernel_height: u32,
    /// Texture to place the first atlas into, instead of creating one.
    pub existing_texture: Option<TextureId>,
    /// Region of `existing_texture` that already has content.
    pub existing_texture_used_space: Rect,
    /// Handling of unsupported name tables by the default loader.
    pub name_table_mode: NameTableMode,
    /// Locale used to pick localized font names (e.g., "en-US").
    pub locale: String,
    /// Custom font backend; the default backend is used when unset.
    pub font_loader: Option<Arc<dyn FontLoader>>,
}

impl Default for FontSystemSettings {
    fn default() -> Self {
        Self {
            texture_width: DEFAULT_TEXTURE_SIZE,
            texture_height: DEFAULT_TEXTURE_SIZE,
            premultiply_alpha: true,
            font_resolution_factor: 1.0,
            effect: FontSystemEffect::None,
            effect_amount: 0,
            kernel_width: 0,
            kernel_height: 0,
            existing_texture: None,
            existing_texture_used_space: Rect::EMPTY,
            name_table_mode: NameTableMode::default(),
            locale: Locale::current().tag().to_string(),
            font_loader: None,
        }
    }
}

impl FontSystemSettings {
    /// Create settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the atlas texture size.
    pub fn texture_size(mut self, width: u32, height: u32) -> Self {
        self.texture_width = width;
        self.texture_height = height;
        self
    }

    /// Set whether uploaded pixels have premultiplied alpha.
    pub fn premultiply_alpha(mut self, premultiply: bool) -> Self {
        self.premultiply_alpha = premultiply;
        self
    }

    /// Set the scale applied to requested sizes before rasterizing.
    pub fn font_resolution_factor(mut self, factor: f32) -> Self {
        self.font_resolution_factor = factor;
        self
    }

    /// Set the glyph effect and its amount.
    pub fn effect(mut self, effect: FontSystemEffect, amount: u32) -> Self {
        self.effect = effect;
        self.effect_amount = amount;
        self
    }

    /// Set the prefilter kernel of the default loader.
    pub fn kernel(mut self, width: u32, height: u32) -> Self {
        self.kernel_width = width;
        self.kernel_height = height;
        self
    }

    /// Place the first atlas into an existing texture.
    pub fn existing_texture(mut self, texture: TextureId, used_space: Rect) -> Self {
        self.existing_texture = Some(texture);
        self.existing_texture_used_space = used_space;
        self
    }

    /// Set how the default loader treats unsupported name tables.
    pub fn name_table_mode(mut self, mode: NameTableMode) -> Self {
        self.name_table_mode = mode;
        self
    }

    /// Set the locale used for font names.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Use a custom font backend.
    pub fn font_loader(mut self, loader: impl FontLoader + 'static) -> Self {
        self.font_loader = Some(Arc::new(loader));
        self
    }

    /// Check the settings for consistency.
    pub fn validate(&self) -> FontResult<()> {
        if self.texture_width == 0 || self.texture_height == 0 {
            return Err(FontError::InvalidSettings(format!(
                "texture size must be non-zero, got {}x{}",
                self.texture_width, self.texture_height
            )));
        }
        if !(self.font_resolution_factor > 0.0 && self.font_resolution_factor.is_finite()) {
            return Err(FontError::InvalidSettings(format!(
                "font resolution factor must be positive, got {}",
                self.font_resolution_factor
            )));
        }
        if self.effect_amount > MAX_EFFECT_AMOUNT {
            return Err(FontError::InvalidSettings(format!(
                "effect amount must be at most {}, got {}",
                MAX_EFFECT_AMOUNT, self.effect_amount
            )));
        }
        Ok(())
    }
}

/// A font at one pixel size.
///
/// Metrics are in rasterized pixels, that is with the resolution factor
/// applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizedFont {
    /// Requested pixel size.
    pub size: u32,
    pub ascent: f32,
    pub descent: f32,
    pub line_height: f32,
}

/// Payload of the "current atlas full" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasFullEvent {
    /// Index of the atlas that ran out of space.
    pub atlas_index: usize,
    /// Its texture.
    pub texture: TextureId,
}

/// Owns font sources and glyph atlases, and renders glyphs into them on demand.
///
/// Every call that may touch texture memory takes the [`TextureManager`]
/// to use. A font system is single-threaded and mutated in place.
///
/// # Example
///
/// ```no_run
/// use horizon_lattice_fontstash::{FontSystem, FontSystemSettings, PixelTextureManager};
///
/// # fn main() -> horizon_lattice_fontstash::FontResult<()> {
/// let mut textures = PixelTextureManager::new();
/// let mut fonts = FontSystem::new(FontSystemSettings::new().texture_size(512, 512))?;
/// fonts.add_font_file("assets/DroidSans.ttf")?;
///
/// let font = fonts.font(18)?;
/// if let Some(glyph) = fonts.glyph_for_char(&font, 'A', &mut textures)? {
///     println!("'A' lives at {:?} in atlas {:?}", glyph.bounds, glyph.atlas);
/// }
/// # Ok(())
/// # }
/// ```
pub struct FontSystem {
    settings: FontSystemSettings,
    loader: Arc<dyn FontLoader>,
    locale: Locale,
    sources: Vec<Box<dyn FontSource>>,
    /// Merged coverage of all sources, in addition order.
    supported_codepoints: Vec<u32>,
    known_codepoints: HashSet<u32>,
    fonts: HashMap<u32, SizedFont>,
    glyphs: GlyphCache,
    atlases: Vec<FontAtlas>,
    current_atlas: Option<usize>,
    use_kerning: bool,
    default_character: Option<char>,
    character_spacing: i32,
    line_spacing: i32,
    current_atlas_full: Signal<AtlasFullEvent>,
}

impl FontSystem {
    /// Create a font system.
    pub fn new(settings: FontSystemSettings) -> FontResult<Self> {
        settings.validate()?;

        let loader: Arc<dyn FontLoader> = match &settings.font_loader {
            Some(loader) => loader.clone(),
            None => Arc::new(
                DefaultFontLoader::new()
                    .with_kernel(settings.kernel_width, settings.kernel_height)
                    .with_name_table_mode(settings.name_table_mode),
            ),
        };
        let locale = Locale::new(&settings.locale);

        tracing::debug!(
            target: "horizon_lattice_fontstash::font_system",
            texture_width = settings.texture_width,
            texture_height = settings.texture_height,
            effect = ?settings.effect,
            effect_amount = settings.effect_amount,
            %locale,
            "created font system"
        );

        Ok(Self {
            settings,
            loader,
            locale,
            sources: Vec::new(),
            supported_codepoints: Vec::new(),
            known_codepoints: HashSet::new(),
            fonts: HashMap::new(),
            glyphs: GlyphCache::new(),
            atlases: Vec::new(),
            current_atlas: None,
            use_kerning: true,
            default_character: Some(' '),
            character_spacing: 0,
            line_spacing: 0,
            current_atlas_full: Signal::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Font sources
    // -------------------------------------------------------------------------

    /// Load a font and append it as the lowest-priority source.
    ///
    /// Returns the index of the new source.
    pub fn add_font(&mut self, data: Vec<u8>) -> FontResult<usize> {
        let source = self.loader.load(data)?;
        Ok(self.add_font_source(source))
    }

    /// Load a font file from disk.
    pub fn add_font_file(&mut self, path: impl AsRef<Path>) -> FontResult<usize> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| FontError::Io(format!("{}: {}", path.display(), e)))?;
        self.add_font(data)
    }

    /// Append an already loaded source.
    pub fn add_font_source(&mut self, source: Box<dyn FontSource>) -> usize {
        let before = self.supported_codepoints.len();
        for &codepoint in source.supported_codepoints() {
            if self.known_codepoints.insert(codepoint) {
                self.supported_codepoints.push(codepoint);
            }
        }

        let index = self.sources.len();
        tracing::debug!(
            target: "horizon_lattice_fontstash::font_system",
            index,
            new_codepoints = self.supported_codepoints.len() - before,
            "added font source"
        );
        self.sources.push(source);
        index
    }

    /// Number of font sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Get a font source by index.
    pub fn font_source(&self, index: usize) -> Option<&dyn FontSource> {
        self.sources.get(index).map(|s| s.as_ref())
    }

    /// Naming metadata of a font source, if it has any.
    pub fn font_metadata(&self, index: usize) -> Option<&FontMetadata> {
        self.sources.get(index)?.metadata()
    }

    /// Family name of a font source in the configured locale.
    pub fn font_family(&self, index: usize) -> Option<&str> {
        self.font_metadata(index)?.family(&self.locale)
    }

    /// Every codepoint covered by some source, without duplicates, in
    /// source addition order.
    pub fn supported_codepoints(&self) -> &[u32] {
        &self.supported_codepoints
    }

    /// Find the first source covering `codepoint`.
    ///
    /// Returns the source index and the glyph id within that source.
    pub fn codepoint_index(&self, codepoint: u32) -> Option<(usize, u32)> {
        self.sources
            .iter()
            .enumerate()
            .find_map(|(index, source)| source.glyph_id(codepoint).map(|id| (index, id)))
    }

    // -------------------------------------------------------------------------
    // Sized fonts and glyphs
    // -------------------------------------------------------------------------

    /// Get the font for a pixel size, creating it on first use.
    ///
    /// Vertical metrics come from the first source.
    pub fn font(&mut self, size: u32) -> FontResult<SizedFont> {
        if let Some(font) = self.fonts.get(&size) {
            return Ok(*font);
        }

        let source = self.sources.first().ok_or(FontError::NoFontSources)?;
        let metrics = source.metrics_for_size(self.pixel_size(size));
        let font = SizedFont {
            size,
            ascent: metrics.ascent,
            descent: metrics.descent,
            line_height: metrics.line_height,
        };

        tracing::debug!(
            target: "horizon_lattice_fontstash::font_system",
            size, line_height = font.line_height,
            "created sized font"
        );
        self.fonts.insert(size, font);
        Ok(font)
    }

    /// Get the glyph for `codepoint` from the first source covering it.
    ///
    /// Returns `Ok(None)` when no source covers the codepoint.
    pub fn glyph(
        &mut self,
        font: &SizedFont,
        codepoint: u32,
        textures: &mut dyn TextureManager,
    ) -> FontResult<Option<Glyph>> {
        match self.codepoint_index(codepoint) {
            Some((source, _)) => self.get_or_render_glyph(source, codepoint, font.size, textures),
            None => Ok(None),
        }
    }

    /// Get the glyph for a character, falling back to the default character.
    pub fn glyph_for_char(
        &mut self,
        font: &SizedFont,
        ch: char,
        textures: &mut dyn TextureManager,
    ) -> FontResult<Option<Glyph>> {
        if let Some(glyph) = self.glyph(font, ch as u32, textures)? {
            return Ok(Some(glyph));
        }
        match self.default_character {
            Some(fallback) if fallback != ch => self.glyph(font, fallback as u32, textures),
            _ => Ok(None),
        }
    }

    /// Get a glyph of a specific source, rendering and placing it on a cache miss.
    ///
    /// Returns `Ok(None)` if the source does not cover the codepoint. On
    /// error, neither the cache nor any atlas keeps a trace of the glyph.
    pub fn get_or_render_glyph(
        &mut self,
        source: usize,
        codepoint: u32,
        size: u32,
        textures: &mut dyn TextureManager,
    ) -> FontResult<Option<Glyph>> {
        let effect_amount = self.blur_amount().max(self.stroke_amount());
        let key = GlyphKey {
            source,
            codepoint,
            size,
            effect: self.settings.effect,
            effect_amount,
        };
        if let Some(glyph) = self.glyphs.lookup(&key) {
            return Ok(Some(glyph));
        }

        let font_source = self
            .sources
            .get(source)
            .ok_or(FontError::UnknownFontSource(source))?;
        let Some(glyph_id) = font_source.glyph_id(codepoint) else {
            return Ok(None);
        };

        let options = RasterOptions {
            pixel_size: self.pixel_size(size),
            effect: self.settings.effect,
            effect_amount,
            premultiply_alpha: self.settings.premultiply_alpha,
        };
        let raster = rasterize_glyph(font_source.as_ref(), glyph_id, &options)?;

        let (bounds, atlas, texture) = if raster.is_empty() {
            (Rect::EMPTY, None, None)
        } else {
            let (index, bounds) = self.place(textures, raster.width, raster.height, &raster.pixels)?;
            (bounds, Some(index), Some(self.atlases[index].texture()))
        };

        let glyph = Glyph {
            key,
            glyph_id,
            bounds,
            x_offset: raster.x_offset,
            y_offset: raster.y_offset,
            x_advance: raster.x_advance,
            atlas,
            texture,
        };
        self.glyphs.insert(glyph);
        Ok(Some(glyph))
    }

    /// Kerning between two consecutive glyphs of `font`.
    ///
    /// Zero when kerning is disabled or the glyphs come from different sources.
    pub fn kerning(&self, font: &SizedFont, previous: &Glyph, current: &Glyph) -> f32 {
        if !self.use_kerning || previous.key.source != current.key.source {
            return 0.0;
        }
        self.sources
            .get(current.key.source)
            .map(|s| s.kerning(previous.glyph_id, current.glyph_id, self.pixel_size(font.size)))
            .unwrap_or(0.0)
    }

    /// Glyph cache statistics.
    pub fn glyph_cache_stats(&self) -> &GlyphCacheStats {
        self.glyphs.stats()
    }

    /// Number of cached glyphs.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    fn pixel_size(&self, size: u32) -> f32 {
        size as f32 * self.settings.font_resolution_factor
    }

    // -------------------------------------------------------------------------
    // Atlases
    // -------------------------------------------------------------------------

    /// Size of new atlases: the existing texture's size when one is set.
    fn atlas_size(&self, textures: &dyn TextureManager) -> FontResult<(u32, u32)> {
        match self.settings.existing_texture {
            Some(texture) => textures.texture_size(texture),
            None => Ok((self.settings.texture_width, self.settings.texture_height)),
        }
    }

    /// Start the atlas that will get `index`, without making it current.
    ///
    /// The first atlas goes into the existing texture when one is set.
    fn start_atlas(&self, index: usize, textures: &mut dyn TextureManager) -> FontResult<FontAtlas> {
        match self.settings.existing_texture {
            Some(texture) if index == 0 => FontAtlas::attach(
                index,
                texture,
                textures,
                self.settings.existing_texture_used_space,
            ),
            _ => {
                let (width, height) = self.atlas_size(textures)?;
                FontAtlas::create(index, textures, width, height)
            }
        }
    }

    /// Append an atlas and make it current.
    fn commit_atlas(&mut self, atlas: FontAtlas) -> usize {
        let index = self.atlases.len();
        self.atlases.push(atlas);
        self.current_atlas = Some(index);
        index
    }

    fn announce_full(&self, index: usize) {
        let full = AtlasFullEvent {
            atlas_index: index,
            texture: self.atlases[index].texture(),
        };
        tracing::debug!(
            target: "horizon_lattice_fontstash::atlas",
            index, texture = %full.texture,
            "current atlas full"
        );
        self.current_atlas_full.emit(full);
    }

    /// Place and upload glyph pixels, starting a new atlas when the current one is full.
    ///
    /// A new atlas is only kept, and the full notification only emitted, once
    /// the glyph is in it. Textures created for a discarded atlas stay with
    /// the texture manager.
    fn place(
        &mut self,
        textures: &mut dyn TextureManager,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> FontResult<(usize, Rect)> {
        let (atlas_width, atlas_height) = self.atlas_size(textures)?;
        let too_large = FontError::GlyphTooLarge {
            width,
            height,
            atlas_width,
            atlas_height,
        };
        if width > atlas_width || height > atlas_height {
            return Err(too_large);
        }

        if let Some(index) = self.current_atlas {
            if let Some(bounds) = self.atlases[index].insert(textures, width, height, pixels)? {
                return Ok((index, bounds));
            }
            let mut next = self.start_atlas(self.atlases.len(), textures)?;
            let bounds = next.insert(textures, width, height, pixels)?.ok_or(too_large)?;
            self.announce_full(index);
            return Ok((self.commit_atlas(next), bounds));
        }

        let mut first = self.start_atlas(self.atlases.len(), textures)?;
        if let Some(bounds) = first.insert(textures, width, height, pixels)? {
            return Ok((self.commit_atlas(first), bounds));
        }

        // An attached texture may be too full for the glyph.
        let mut next = self.start_atlas(self.atlases.len() + 1, textures)?;
        let bounds = next.insert(textures, width, height, pixels)?.ok_or(too_large)?;
        let full = self.commit_atlas(first);
        self.announce_full(full);
        Ok((self.commit_atlas(next), bounds))
    }

    /// All atlases, oldest first.
    pub fn atlases(&self) -> &[FontAtlas] {
        &self.atlases
    }

    /// The atlas new glyphs are placed into, if one exists yet.
    pub fn current_atlas(&self) -> Option<&FontAtlas> {
        self.current_atlas.and_then(|index| self.atlases.get(index))
    }

    /// Notification emitted when the current atlas runs out of space, just
    /// before the new atlas holding the overflowing glyph becomes current.
    pub fn current_atlas_full(&self) -> &Signal<AtlasFullEvent> {
        &self.current_atlas_full
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Drop all atlases, sized fonts and cached glyphs. Font sources are kept.
    ///
    /// Texture handles of dropped atlases are not released; they belong to
    /// the texture manager.
    pub fn reset(&mut self) {
        tracing::debug!(
            target: "horizon_lattice_fontstash::font_system",
            atlases = self.atlases.len(),
            glyphs = self.glyphs.len(),
            "reset font system"
        );
        self.atlases.clear();
        self.current_atlas = None;
        self.fonts.clear();
        self.glyphs.clear();
    }

    /// Release everything, including font sources.
    ///
    /// The font system stays usable: fonts can be added again afterwards.
    pub fn dispose(&mut self) {
        self.reset();
        self.sources.clear();
        self.supported_codepoints.clear();
        self.known_codepoints.clear();
        tracing::debug!(target: "horizon_lattice_fontstash::font_system", "disposed font system");
    }

    // -------------------------------------------------------------------------
    // Settings and options
    // -------------------------------------------------------------------------

    /// The settings this font system was created with.
    pub fn settings(&self) -> &FontSystemSettings {
        &self.settings
    }

    pub fn texture_width(&self) -> u32 {
        self.settings.texture_width
    }

    pub fn texture_height(&self) -> u32 {
        self.settings.texture_height
    }

    pub fn premultiply_alpha(&self) -> bool {
        self.settings.premultiply_alpha
    }

    pub fn font_resolution_factor(&self) -> f32 {
        self.settings.font_resolution_factor
    }

    pub fn effect(&self) -> FontSystemEffect {
        self.settings.effect
    }

    pub fn effect_amount(&self) -> u32 {
        self.settings.effect_amount
    }

    /// Blur radius, zero unless the effect is [`FontSystemEffect::Blurry`].
    pub fn blur_amount(&self) -> u32 {
        match self.settings.effect {
            FontSystemEffect::Blurry => self.settings.effect_amount,
            _ => 0,
        }
    }

    /// Stroke width, zero unless the effect is [`FontSystemEffect::Stroked`].
    pub fn stroke_amount(&self) -> u32 {
        match self.settings.effect {
            FontSystemEffect::Stroked => self.settings.effect_amount,
            _ => 0,
        }
    }

    pub fn kernel_width(&self) -> u32 {
        self.settings.kernel_width
    }

    pub fn kernel_height(&self) -> u32 {
        self.settings.kernel_height
    }

    pub fn existing_texture(&self) -> Option<TextureId> {
        self.settings.existing_texture
    }

    pub fn existing_texture_used_space(&self) -> Rect {
        self.settings.existing_texture_used_space
    }

    /// Locale used for font names.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn use_kerning(&self) -> bool {
        self.use_kerning
    }

    pub fn set_use_kerning(&mut self, use_kerning: bool) {
        self.use_kerning = use_kerning;
    }

    /// Character substituted for codepoints no source covers.
    pub fn default_character(&self) -> Option<char> {
        self.default_character
    }

    pub fn set_default_character(&mut self, ch: Option<char>) {
        self.default_character = ch;
    }

    /// Extra horizontal space between characters, for text layout.
    pub fn character_spacing(&self) -> i32 {
        self.character_spacing
    }

    pub fn set_character_spacing(&mut self, spacing: i32) {
        self.character_spacing = spacing;
    }

    /// Extra vertical space between lines, for text layout.
    pub fn line_spacing(&self) -> i32 {
        self.line_spacing
    }

    pub fn set_line_spacing(&mut self, spacing: i32) {
        self.line_spacing = spacing;
    }
}

impl fmt::Debug for FontSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSystem")
            .field("sources", &self.sources.len())
            .field("supported_codepoints", &self.supported_codepoints.len())
            .field("fonts", &self.fonts.len())
            .field("glyphs", &self.glyphs.len())
            .field("atlases", &self.atlases)
            .field("current_atlas", &self.current_atlas)
            .finish()
    }
}
