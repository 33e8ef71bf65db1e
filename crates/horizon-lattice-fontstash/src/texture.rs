//! Texture capability consumed by the glyph atlases.
//!
//! The font system never talks to a graphics API directly. Instead every
//! operation that touches texture memory goes through a [`TextureManager`],
//! which a renderer implements on top of its own GPU resources.
//!
//! [`PixelTextureManager`] keeps textures in CPU memory. It is useful for
//! headless rendering, for baking atlases to disk and in tests.

use crate::error::{FontError, FontResult};
use crate::types::{Rect, TextureId};

/// Bytes per pixel of atlas uploads (RGBA8).
pub const BYTES_PER_PIXEL: usize = 4;

/// Creates textures and writes glyph pixels into them.
///
/// Uploads are synchronous from the font system's point of view: once
/// [`upload_region`](Self::upload_region) returns, the pixels are considered
/// written.
pub trait TextureManager {
    /// Create a new RGBA8 texture of the given size.
    fn create_texture(&mut self, width: u32, height: u32) -> FontResult<TextureId>;

    /// Write tightly packed RGBA8 `pixels` into `region` of `texture`.
    fn upload_region(&mut self, texture: TextureId, region: Rect, pixels: &[u8]) -> FontResult<()>;

    /// Get the size of an existing texture.
    fn texture_size(&self, texture: TextureId) -> FontResult<(u32, u32)>;
}

/// An RGBA8 texture stored in CPU memory.
#[derive(Debug, Clone)]
pub struct PixelTexture {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelTexture {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    /// Texture width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Texture height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 data, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read a single pixel, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.data[offset..offset + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// A [`TextureManager`] keeping every texture in CPU memory.
#[derive(Debug, Default)]
pub struct PixelTextureManager {
    textures: Vec<PixelTexture>,
    uploads: u64,
}

impl PixelTextureManager {
    /// Create an empty texture manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a texture by handle.
    pub fn texture(&self, texture: TextureId) -> Option<&PixelTexture> {
        usize::try_from(texture.0)
            .ok()
            .and_then(|index| self.textures.get(index))
    }

    /// Number of textures created so far.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of successful region uploads.
    pub fn upload_count(&self) -> u64 {
        self.uploads
    }

    fn texture_mut(&mut self, texture: TextureId) -> FontResult<&mut PixelTexture> {
        usize::try_from(texture.0)
            .ok()
            .and_then(|index| self.textures.get_mut(index))
            .ok_or_else(|| FontError::Texture(format!("unknown {}", texture)))
    }
}

impl TextureManager for PixelTextureManager {
    fn create_texture(&mut self, width: u32, height: u32) -> FontResult<TextureId> {
        if width == 0 || height == 0 {
            return Err(FontError::Texture(format!(
                "invalid texture dimensions: {}x{}",
                width, height
            )));
        }
        let id = TextureId(self.textures.len() as u64);
        self.textures.push(PixelTexture::new(width, height));
        Ok(id)
    }

    fn upload_region(&mut self, texture: TextureId, region: Rect, pixels: &[u8]) -> FontResult<()> {
        let target = self.texture_mut(texture)?;

        if !Rect::new(0, 0, target.width, target.height).contains_rect(&region) {
            return Err(FontError::Texture(format!(
                "region {:?} outside {}x{} texture",
                region, target.width, target.height
            )));
        }

        let row_bytes = region.width as usize * BYTES_PER_PIXEL;
        let expected_size = row_bytes * region.height as usize;
        if pixels.len() != expected_size {
            return Err(FontError::Texture(format!(
                "invalid pixel data size: expected {} bytes, got {}",
                expected_size,
                pixels.len()
            )));
        }

        let stride = target.width as usize * BYTES_PER_PIXEL;
        for (row, src) in pixels.chunks_exact(row_bytes.max(1)).enumerate() {
            let start = (region.y as usize + row) * stride + region.x as usize * BYTES_PER_PIXEL;
            target.data[start..start + row_bytes].copy_from_slice(src);
        }

        self.uploads += 1;
        Ok(())
    }

    fn texture_size(&self, texture: TextureId) -> FontResult<(u32, u32)> {
        self.texture(texture)
            .map(|t| (t.width, t.height))
            .ok_or_else(|| FontError::Texture(format!("unknown {}", texture)))
    }
}
