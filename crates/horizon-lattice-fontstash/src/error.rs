//! Error types for the fontstash crate.

use thiserror::Error;

use crate::types::Rect;

/// Errors that can occur while loading fonts or placing glyphs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FontError {
    /// A sized font was requested before any font source was added.
    #[error("no font sources registered; call add_font before requesting a font")]
    NoFontSources,

    /// A font source index does not refer to a registered source.
    #[error("font source {0} does not exist")]
    UnknownFontSource(usize),

    /// A glyph does not fit into an empty atlas of the configured size.
    #[error("glyph {width}x{height} does not fit into a {atlas_width}x{atlas_height} atlas")]
    GlyphTooLarge {
        width: u32,
        height: u32,
        atlas_width: u32,
        atlas_height: u32,
    },

    /// The occupied region of a pre-existing texture could not be reserved.
    #[error("unable to reserve existing texture used space {0:?}")]
    InvalidExistingSpace(Rect),

    /// The font system settings are inconsistent.
    #[error("invalid font system settings: {0}")]
    InvalidSettings(String),

    /// The font bytes are not a recognized font container.
    #[error("invalid font data: {0}")]
    InvalidFont(String),

    /// The name table uses a format version this crate does not understand.
    #[error("name table format {0} not supported")]
    UnsupportedNameTableFormat(u16),

    /// The name table is truncated or references data outside its bounds.
    #[error("malformed name table: {0}")]
    MalformedNameTable(String),

    /// Two name records share the same name, language, encoding and platform.
    #[error(
        "duplicate name record (name {name_id}, language {language_id:#06x}, encoding {encoding_id}, platform {platform_id})"
    )]
    DuplicateNameRecord {
        name_id: u16,
        language_id: u16,
        encoding_id: u16,
        platform_id: u16,
    },

    /// A name record uses a platform whose string encoding is unknown.
    #[error("name record platform {0} not supported")]
    UnsupportedPlatform(u16),

    /// Reading font data failed.
    #[error("failed to read font data: {0}")]
    Io(String),

    /// The texture manager rejected an operation.
    #[error("texture error: {0}")]
    Texture(String),
}

impl FontError {
    /// Whether this error stems from the font data itself rather than from
    /// configuration or a collaborator.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFont(_)
                | Self::UnsupportedNameTableFormat(_)
                | Self::MalformedNameTable(_)
                | Self::DuplicateNameRecord { .. }
        )
    }
}

/// Result type for fontstash operations.
pub type FontResult<T> = Result<T, FontError>;
