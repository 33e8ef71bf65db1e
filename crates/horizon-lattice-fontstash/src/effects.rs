//! Pixel passes applied to rasterized glyph coverage before upload.

use crate::texture::BYTES_PER_PIXEL;
use crate::types::FontSystemEffect;

/// Empty border kept around every glyph so bilinear sampling never picks up
/// a neighbour.
pub const GLYPH_MARGIN: u32 = 2;

/// Largest accepted blur radius or stroke width.
pub const MAX_EFFECT_AMOUNT: u32 = 20;

/// Padding on each side of a glyph for the given effect amount.
pub fn glyph_padding(effect_amount: u32) -> u32 {
    effect_amount + GLYPH_MARGIN
}

/// An 8-bit coverage bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageBitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl CoverageBitmap {
    /// Copy `src` (tightly packed `src_width` x `src_height`) into a new
    /// bitmap with `pad` empty pixels on every side.
    pub fn padded(src: &[u8], src_width: u32, src_height: u32, pad: u32) -> Self {
        let width = src_width + pad * 2;
        let height = src_height + pad * 2;
        let mut data = vec![0u8; width as usize * height as usize];

        if src_width > 0 {
            for (row, line) in src.chunks_exact(src_width as usize).take(src_height as usize).enumerate() {
                let start = (row + pad as usize) * width as usize + pad as usize;
                data[start..start + line.len()].copy_from_slice(line);
            }
        }

        Self {
            width,
            height,
            data,
        }
    }

    fn at(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            0
        } else {
            self.data[y as usize * self.width as usize + x as usize]
        }
    }
}

/// Apply a horizontal box prefilter of `kernel` pixels, in place.
///
/// A kernel of 0 or 1 leaves the coverage untouched.
pub fn box_prefilter_horizontal(data: &mut [u8], width: usize, height: usize, kernel: usize) {
    if kernel <= 1 || width == 0 {
        return;
    }
    let mut window = vec![0u8; kernel];
    for row in data.chunks_exact_mut(width).take(height) {
        window.iter_mut().for_each(|v| *v = 0);
        let mut total: u32 = 0;
        for (i, px) in row.iter_mut().enumerate() {
            let slot = i % kernel;
            total -= window[slot] as u32;
            window[slot] = *px;
            total += *px as u32;
            *px = (total / kernel as u32) as u8;
        }
    }
}

/// Apply a vertical box prefilter of `kernel` pixels, in place.
pub fn box_prefilter_vertical(data: &mut [u8], width: usize, height: usize, kernel: usize) {
    if kernel <= 1 || width == 0 {
        return;
    }
    let mut window = vec![0u8; kernel];
    for x in 0..width {
        window.iter_mut().for_each(|v| *v = 0);
        let mut total: u32 = 0;
        for y in 0..height {
            let px = &mut data[y * width + x];
            let slot = y % kernel;
            total -= window[slot] as u32;
            window[slot] = *px;
            total += *px as u32;
            *px = (total / kernel as u32) as u8;
        }
    }
}

const APREC: i32 = 16;
const ZPREC: i32 = 7;

fn blur_cols(data: &mut [u8], width: usize, height: usize, alpha: i32) {
    for row in data.chunks_exact_mut(width).take(height) {
        let mut z: i32 = 0;
        for x in 1..width {
            z += (alpha * (((row[x] as i32) << ZPREC) - z)) >> APREC;
            row[x] = (z >> ZPREC) as u8;
        }
        row[width - 1] = 0;
        z = 0;
        for x in (0..width.saturating_sub(1)).rev() {
            z += (alpha * (((row[x] as i32) << ZPREC) - z)) >> APREC;
            row[x] = (z >> ZPREC) as u8;
        }
        row[0] = 0;
    }
}

fn blur_rows(data: &mut [u8], width: usize, height: usize, alpha: i32) {
    for x in 0..width {
        let mut z: i32 = 0;
        for y in 1..height {
            let px = &mut data[y * width + x];
            z += (alpha * (((*px as i32) << ZPREC) - z)) >> APREC;
            *px = (z >> ZPREC) as u8;
        }
        data[(height - 1) * width + x] = 0;
        z = 0;
        for y in (0..height.saturating_sub(1)).rev() {
            let px = &mut data[y * width + x];
            z += (alpha * (((*px as i32) << ZPREC) - z)) >> APREC;
            *px = (z >> ZPREC) as u8;
        }
        data[x] = 0;
    }
}

/// Blur coverage in place with a two-pass recursive gaussian approximation.
pub fn blur(bitmap: &mut CoverageBitmap, radius: u32) {
    if radius == 0 || bitmap.width < 2 || bitmap.height < 2 {
        return;
    }

    // Roughly 1/sqrt(3) of the radius, so the kernel spans ~3 sigma.
    let sigma = radius as f32 * 0.577_35;
    let alpha = ((1 << APREC) as f32 * (1.0 - (-2.3 / (sigma + 1.0)).exp())) as i32;
    let (w, h) = (bitmap.width as usize, bitmap.height as usize);

    blur_rows(&mut bitmap.data, w, h, alpha);
    blur_cols(&mut bitmap.data, w, h, alpha);
    blur_rows(&mut bitmap.data, w, h, alpha);
    blur_cols(&mut bitmap.data, w, h, alpha);
}

/// Dilate coverage by `radius` pixels (circular neighbourhood).
pub fn dilate(bitmap: &CoverageBitmap, radius: u32) -> Vec<u8> {
    let r = radius as i64;
    let r2 = r * r;
    let mut out = vec![0u8; bitmap.data.len()];

    for y in 0..bitmap.height as i64 {
        for x in 0..bitmap.width as i64 {
            let mut max = 0u8;
            'window: for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy > r2 {
                        continue;
                    }
                    max = max.max(bitmap.at(x + dx, y + dy));
                    if max == u8::MAX {
                        break 'window;
                    }
                }
            }
            out[y as usize * bitmap.width as usize + x as usize] = max;
        }
    }
    out
}

/// Convert coverage into white RGBA8 pixels.
pub fn coverage_to_rgba(coverage: &[u8], premultiply_alpha: bool) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(coverage.len() * BYTES_PER_PIXEL);
    for &alpha in coverage {
        let c = if premultiply_alpha { alpha } else { 255 };
        rgba.extend_from_slice(&[c, c, c, alpha]);
    }
    rgba
}

/// Composite a white glyph over a black outline into RGBA8 pixels.
pub fn stroke_to_rgba(fill: &[u8], outline: &[u8], premultiply_alpha: bool) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(fill.len() * BYTES_PER_PIXEL);
    for (&fill, &outline) in fill.iter().zip(outline) {
        let alpha = fill.max(outline);
        let c = if premultiply_alpha || alpha == 0 {
            fill
        } else {
            ((fill as u32 * 255 + alpha as u32 / 2) / alpha as u32) as u8
        };
        rgba.extend_from_slice(&[c, c, c, alpha]);
    }
    rgba
}

/// Produce the final RGBA8 pixels for a padded coverage bitmap.
pub fn render_effect(
    mut bitmap: CoverageBitmap,
    effect: FontSystemEffect,
    amount: u32,
    premultiply_alpha: bool,
) -> Vec<u8> {
    match effect {
        FontSystemEffect::Blurry if amount > 0 => {
            blur(&mut bitmap, amount);
            coverage_to_rgba(&bitmap.data, premultiply_alpha)
        }
        FontSystemEffect::Stroked if amount > 0 => {
            let outline = dilate(&bitmap, amount);
            stroke_to_rgba(&bitmap.data, &outline, premultiply_alpha)
        }
        _ => coverage_to_rgba(&bitmap.data, premultiply_alpha),
    }
}
