//! Glyph atlas: one texture plus the skyline describing its free space.
//!
//! An atlas never evicts. Once it is full the font system starts a new one
//! and keeps the old atlas around, so glyphs placed earlier stay valid.

use std::fmt;

use crate::error::{FontError, FontResult};
use crate::packer::SkylinePacker;
use crate::texture::{BYTES_PER_PIXEL, TextureManager};
use crate::types::{Rect, TextureId};

/// A texture that glyph bitmaps are packed into.
pub struct FontAtlas {
    /// Position in the font system's atlas list.
    index: usize,
    /// Backing texture.
    texture: TextureId,
    /// Free-space frontier.
    packer: SkylinePacker,
    /// Number of glyph bitmaps written so far.
    glyph_count: usize,
}

impl FontAtlas {
    /// Wrap an existing texture of the given size.
    pub fn new(index: usize, texture: TextureId, width: u32, height: u32) -> Self {
        Self {
            index,
            texture,
            packer: SkylinePacker::new(width, height),
            glyph_count: 0,
        }
    }

    /// Create a fresh texture and wrap it.
    pub fn create(
        index: usize,
        textures: &mut dyn TextureManager,
        width: u32,
        height: u32,
    ) -> FontResult<Self> {
        let texture = textures.create_texture(width, height)?;
        tracing::debug!(
            target: "horizon_lattice_fontstash::atlas",
            index, %texture, width, height,
            "created atlas"
        );
        Ok(Self::new(index, texture, width, height))
    }

    /// Wrap a texture that already has content in `used_space`.
    ///
    /// The occupied region is reserved in the skyline. It is trusted as is:
    /// nothing checks it against the pixels actually present.
    pub fn attach(
        index: usize,
        texture: TextureId,
        textures: &dyn TextureManager,
        used_space: Rect,
    ) -> FontResult<Self> {
        let (width, height) = textures.texture_size(texture)?;
        let mut atlas = Self::new(index, texture, width, height);

        if !used_space.is_empty() && !atlas.add_skyline_level(used_space) {
            return Err(FontError::InvalidExistingSpace(used_space));
        }

        tracing::debug!(
            target: "horizon_lattice_fontstash::atlas",
            index, %texture, width, height, ?used_space,
            "attached existing texture"
        );
        Ok(atlas)
    }

    /// Position in the font system's atlas list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Backing texture.
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn width(&self) -> u32 {
        self.packer.width()
    }

    pub fn height(&self) -> u32 {
        self.packer.height()
    }

    /// Texture size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.packer.width(), self.packer.height())
    }

    /// Fraction of the atlas below the skyline.
    pub fn usage(&self) -> f32 {
        self.packer.usage()
    }

    /// Number of glyph bitmaps written into this atlas.
    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    /// Read-only view of the packer.
    pub fn packer(&self) -> &SkylinePacker {
        &self.packer
    }

    /// Reserve a `width` x `height` rectangle.
    pub fn add_rect(&mut self, width: u32, height: u32) -> Option<Rect> {
        self.packer
            .add_rect(width, height)
            .map(|(x, y)| Rect::new(x, y, width, height))
    }

    /// Mark `region` as occupied without placing anything into it.
    pub fn add_skyline_level(&mut self, region: Rect) -> bool {
        self.packer
            .add_skyline_level(region.x, region.y, region.width, region.height)
    }

    /// Place RGBA8 `pixels` of a `width` x `height` bitmap and upload them.
    ///
    /// Returns `Ok(None)` when there is no room. If the upload fails, the
    /// reserved space is released again and the error is returned.
    pub fn insert(
        &mut self,
        textures: &mut dyn TextureManager,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> FontResult<Option<Rect>> {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * BYTES_PER_PIXEL);

        let snapshot = self.packer.clone();
        let Some(region) = self.add_rect(width, height) else {
            return Ok(None);
        };

        if let Err(err) = textures.upload_region(self.texture, region, pixels) {
            self.packer = snapshot;
            return Err(err);
        }

        self.glyph_count += 1;
        Ok(Some(region))
    }
}

impl fmt::Debug for FontAtlas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontAtlas")
            .field("index", &self.index)
            .field("texture", &self.texture)
            .field("size", &self.size())
            .field("glyph_count", &self.glyph_count)
            .field("usage", &format!("{:.1}%", self.usage() * 100.0))
            .finish()
    }
}
