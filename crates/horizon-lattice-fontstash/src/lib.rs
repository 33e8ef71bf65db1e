//! Dynamic glyph atlases for Horizon Lattice.
//!
//! This crate loads font files, rasterizes glyphs on demand and packs them
//! into one or more RGBA8 texture atlases that a renderer can sample from.
//! It does not shape or lay out text; it answers "where in which texture is
//! this glyph, and how do I position it".
//!
//! # Getting Started
//!
//! A [`FontSystem`] owns the fonts and atlases. Textures are created and
//! written through a [`TextureManager`] you pass to every call that may
//! touch them; [`PixelTextureManager`] keeps them in CPU memory.
//!
//! ```no_run
//! use horizon_lattice_fontstash::{
//!     FontSystem, FontSystemEffect, FontSystemSettings, PixelTextureManager,
//! };
//!
//! # fn main() -> horizon_lattice_fontstash::FontResult<()> {
//! let mut textures = PixelTextureManager::new();
//! let settings = FontSystemSettings::new()
//!     .texture_size(1024, 1024)
//!     .effect(FontSystemEffect::Stroked, 1);
//!
//! let mut fonts = FontSystem::new(settings)?;
//! fonts.add_font(std::fs::read("assets/DroidSans.ttf").unwrap())?;
//! // Later fonts are fallbacks for codepoints earlier ones do not cover.
//! fonts.add_font(std::fs::read("assets/DroidSansJapanese.ttf").unwrap())?;
//!
//! fonts.current_atlas_full().connect(|event| {
//!     println!("atlas {} is full", event.atlas_index);
//! });
//!
//! let font = fonts.font(24)?;
//! for ch in "Hello, 世界".chars() {
//!     if let Some(glyph) = fonts.glyph_for_char(&font, ch, &mut textures)? {
//!         println!("{ch:?}: {:?} in {:?}", glyph.bounds, glyph.texture);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Backends
//!
//! Fonts are loaded through a [`FontLoader`]. The default backend parses
//! TrueType/OpenType files with `ttf-parser` and rasterizes with `fontdue`;
//! any other rasterizer can be plugged in with
//! [`FontSystemSettings::font_loader`].
//!
//! # Font Names
//!
//! Each source exposes its decoded `name` table as [`FontMetadata`], which
//! resolves localized family and style names with locale fallback.

mod atlas;
mod backend;
mod effects;
mod error;
mod font_system;
mod glyph_cache;
pub mod logging;
pub mod name_table;
mod packer;
mod signal;
mod source;
mod texture;
mod types;

pub use atlas::FontAtlas;
pub use backend::{DefaultFontLoader, DefaultFontSource};
pub use effects::{GLYPH_MARGIN, MAX_EFFECT_AMOUNT, glyph_padding};
pub use error::{FontError, FontResult};
pub use font_system::{
    AtlasFullEvent, DEFAULT_TEXTURE_SIZE, FontSystem, FontSystemSettings, SizedFont,
};
pub use glyph_cache::{
    Glyph, GlyphCache, GlyphCacheStats, GlyphKey, RasterOptions, RasterizedGlyph,
    rasterize_glyph,
};
pub use name_table::{FontMetadata, Locale, NameId, NameTableMode, PlatformId};
pub use packer::{SkylineNode, SkylinePacker};
pub use signal::{ConnectionId, Signal};
pub use source::{FontLoader, FontSource, GlyphBitmap, GlyphMetrics, LineMetrics};
pub use texture::{BYTES_PER_PIXEL, PixelTexture, PixelTextureManager, TextureManager};
pub use types::{FontSystemEffect, FontWeight, Rect, TextureId};
