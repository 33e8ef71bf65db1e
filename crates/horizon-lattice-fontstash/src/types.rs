//! Geometry and font value types shared across the crate.

use std::fmt;

/// An integer rectangle in texture pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// The empty rectangle at the origin.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Create a new rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the right-most column.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom-most row.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check whether two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Check whether `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Get normalized UV coordinates of this rectangle inside a texture.
    ///
    /// Returns (u_min, v_min, u_max, v_max).
    pub fn uv_rect(&self, texture_width: u32, texture_height: u32) -> (f32, f32, f32, f32) {
        let w = texture_width as f32;
        let h = texture_height as f32;
        (
            self.x as f32 / w,
            self.y as f32 / h,
            self.right() as f32 / w,
            self.bottom() as f32 / h,
        )
    }
}

/// Opaque handle to a texture owned by a [`TextureManager`].
///
/// [`TextureManager`]: crate::TextureManager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture#{}", self.0)
    }
}

/// Post-processing applied to every rasterized glyph of a font system.
///
/// Blur and stroke are mutually exclusive; the amount lives next to the
/// effect in [`FontSystemSettings`](crate::FontSystemSettings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontSystemEffect {
    /// Plain coverage.
    #[default]
    None,
    /// Gaussian-like blur with the configured radius.
    Blurry,
    /// Dark outline of the configured width around a white glyph.
    Stroked,
}

/// Font weight, typically ranging from 100 (thin) to 900 (black).
///
/// Common weight constants are provided for convenience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontWeight(u16);

impl FontWeight {
    /// Thin weight (100).
    pub const THIN: Self = Self(100);
    /// Extra-light weight (200).
    pub const EXTRA_LIGHT: Self = Self(200);
    /// Light weight (300).
    pub const LIGHT: Self = Self(300);
    /// Normal/regular weight (400).
    pub const NORMAL: Self = Self(400);
    /// Medium weight (500).
    pub const MEDIUM: Self = Self(500);
    /// Semi-bold weight (600).
    pub const SEMI_BOLD: Self = Self(600);
    /// Bold weight (700).
    pub const BOLD: Self = Self(700);
    /// Extra-bold weight (800).
    pub const EXTRA_BOLD: Self = Self(800);
    /// Black/heavy weight (900).
    pub const BLACK: Self = Self(900);

    /// Create a font weight from a numeric value.
    ///
    /// Zero means "unspecified" and maps to [`FontWeight::NORMAL`]; everything
    /// else is clamped to 100-900.
    pub fn new(weight: u16) -> Self {
        if weight == 0 {
            Self::NORMAL
        } else {
            Self(weight.clamp(100, 900))
        }
    }

    /// Get the numeric weight value.
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Guess the weight from a subfamily name such as "Bold Italic".
    ///
    /// Returns `None` when no weight keyword is present.
    pub fn from_subfamily(subfamily: &str) -> Option<Self> {
        let name: String = subfamily
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        // Longest keywords first so "extrabold" is not read as "bold".
        const KEYWORDS: &[(&str, FontWeight)] = &[
            ("extralight", FontWeight::EXTRA_LIGHT),
            ("ultralight", FontWeight::EXTRA_LIGHT),
            ("extrabold", FontWeight::EXTRA_BOLD),
            ("ultrabold", FontWeight::EXTRA_BOLD),
            ("semibold", FontWeight::SEMI_BOLD),
            ("demibold", FontWeight::SEMI_BOLD),
            ("hairline", FontWeight::THIN),
            ("regular", FontWeight::NORMAL),
            ("medium", FontWeight::MEDIUM),
            ("normal", FontWeight::NORMAL),
            ("black", FontWeight::BLACK),
            ("heavy", FontWeight::BLACK),
            ("light", FontWeight::LIGHT),
            ("thin", FontWeight::THIN),
            ("bold", FontWeight::BOLD),
            ("book", FontWeight::NORMAL),
        ];

        KEYWORDS
            .iter()
            .find(|(keyword, _)| name.contains(keyword))
            .map(|(_, weight)| *weight)
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<u16> for FontWeight {
    fn from(value: u16) -> Self {
        Self::new(value)
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.0
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(9, 9, 5, 5);
        let c = Rect::new(10, 0, 5, 5);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(!a.intersects(&Rect::new(2, 2, 0, 4)));
    }

    #[test]
    fn rect_containment() {
        let outer = Rect::new(0, 0, 64, 64);
        assert!(outer.contains_rect(&Rect::new(60, 0, 4, 64)));
        assert!(!outer.contains_rect(&Rect::new(60, 0, 5, 1)));
    }

    #[test]
    fn rect_uv() {
        let rect = Rect::new(100, 200, 50, 60);
        let (u_min, v_min, u_max, v_max) = rect.uv_rect(1000, 1000);
        assert_eq!(u_min, 0.1);
        assert_eq!(v_min, 0.2);
        assert_eq!(u_max, 0.15);
        assert_eq!(v_max, 0.26);
    }

    #[test]
    fn font_weight_constants() {
        assert_eq!(FontWeight::THIN.value(), 100);
        assert_eq!(FontWeight::NORMAL.value(), 400);
        assert_eq!(FontWeight::BOLD.value(), 700);
        assert_eq!(FontWeight::BLACK.value(), 900);
    }

    #[test]
    fn font_weight_conversions() {
        assert_eq!(FontWeight::new(0), FontWeight::NORMAL);
        assert_eq!(FontWeight::new(50).value(), 100);
        assert_eq!(FontWeight::from(1000).value(), 900);
        assert_eq!(u16::from(FontWeight::MEDIUM), 500);
    }

    #[test]
    fn font_weight_from_subfamily() {
        assert_eq!(FontWeight::from_subfamily("Bold Italic"), Some(FontWeight::BOLD));
        assert_eq!(FontWeight::from_subfamily("ExtraBold"), Some(FontWeight::EXTRA_BOLD));
        assert_eq!(FontWeight::from_subfamily("Semi-Bold"), Some(FontWeight::SEMI_BOLD));
        assert_eq!(FontWeight::from_subfamily("Regular"), Some(FontWeight::NORMAL));
        assert_eq!(FontWeight::from_subfamily("Italic"), None);
    }
}
