//! Binary decoding of the OpenType `name` table.
//!
//! Layout (all fields big-endian `u16`):
//!
//! ```text
//! format, count, storageOffset
//! count x { platformID, encodingID, languageID, nameID, length, offset }
//! format 1 only: langTagCount, langTagCount x { length, offset }
//! storage area (strings), at storageOffset from the start of the table
//! ```
//!
//! Every read is bounds-checked against the table slice; anything pointing
//! outside of it is reported as [`FontError::MalformedNameTable`].

use std::fmt;

use crate::error::{FontError, FontResult};

/// First language id assigned to language-tag records (format 1).
pub const LANG_TAG_BASE: u16 = 0x8000;

/// Semantic identifier of a name record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameId(pub u16);

impl NameId {
    pub const COPYRIGHT_NOTICE: Self = Self(0);
    pub const FONT_FAMILY: Self = Self(1);
    pub const FONT_SUBFAMILY: Self = Self(2);
    pub const UNIQUE_SUBFAMILY_IDENTIFICATION: Self = Self(3);
    pub const FULL_NAME: Self = Self(4);
    pub const VERSION: Self = Self(5);
    pub const POSTSCRIPT_NAME: Self = Self(6);
    pub const TRADEMARK_NOTICE: Self = Self(7);
    pub const MANUFACTURER_NAME: Self = Self(8);
    pub const DESIGNER: Self = Self(9);
    pub const DESCRIPTION: Self = Self(10);
    pub const VENDOR_URL: Self = Self(11);
    pub const DESIGNER_URL: Self = Self(12);
    pub const LICENSE_DESCRIPTION: Self = Self(13);
    pub const LICENSE_URL: Self = Self(14);
    pub const RESERVED: Self = Self(15);
    /// Typographic family name; preferred over [`NameId::FONT_FAMILY`].
    pub const PREFERRED_FAMILY: Self = Self(16);
    /// Typographic subfamily name; preferred over [`NameId::FONT_SUBFAMILY`].
    pub const PREFERRED_SUBFAMILY: Self = Self(17);
    pub const COMPATIBLE_FULL: Self = Self(18);
    pub const SAMPLE_TEXT: Self = Self(19);
    pub const POSTSCRIPT_CID_FINDFONT_NAME: Self = Self(20);
    pub const WWS_FAMILY: Self = Self(21);
    pub const WWS_SUBFAMILY: Self = Self(22);
    pub const LIGHT_BACKGROUND_PALETTE: Self = Self(23);
    pub const DARK_BACKGROUND_PALETTE: Self = Self(24);
    pub const VARIATIONS_POSTSCRIPT_NAME_PREFIX: Self = Self(25);

    /// Get the numeric id.
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl From<u16> for NameId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform of a name record, which selects its string encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformId {
    /// Unicode platform; UTF-16BE strings.
    Unicode,
    /// Macintosh platform; strings are decoded as UTF-8.
    Macintosh,
    /// Microsoft platform; UTF-16BE strings.
    Microsoft,
}

impl PlatformId {
    /// Numeric id as stored in the font.
    pub const fn value(self) -> u16 {
        match self {
            PlatformId::Unicode => 0,
            PlatformId::Macintosh => 1,
            PlatformId::Microsoft => 3,
        }
    }

    /// Decode a raw record string using this platform's encoding.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            PlatformId::Macintosh => String::from_utf8_lossy(bytes).into_owned(),
            PlatformId::Unicode | PlatformId::Microsoft => decode_utf16_be(bytes),
        }
    }
}

impl TryFrom<u16> for PlatformId {
    type Error = FontError;

    fn try_from(value: u16) -> FontResult<Self> {
        match value {
            0 => Ok(PlatformId::Unicode),
            1 => Ok(PlatformId::Macintosh),
            3 => Ok(PlatformId::Microsoft),
            other => Err(FontError::UnsupportedPlatform(other)),
        }
    }
}

/// Decode UTF-16BE, replacing invalid sequences with U+FFFD.
///
/// A trailing odd byte is ignored.
pub fn decode_utf16_be(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// One decoded name record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub platform_id: PlatformId,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: NameId,
    pub value: String,
}

/// A format-1 language tag, addressed by language ids from [`LANG_TAG_BASE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangTagRecord {
    pub language_id: u16,
    /// BCP 47 tag such as "en-US".
    pub tag: String,
}

/// A fully decoded `name` table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameTable {
    pub format: u16,
    pub records: Vec<NameRecord>,
    pub lang_tags: Vec<LangTagRecord>,
}

/// Bounds-checked big-endian reader over the table bytes.
struct TableReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> TableReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn read_u16(&mut self, what: &str) -> FontResult<u16> {
        let bytes = self
            .data
            .get(self.offset..self.offset + 2)
            .ok_or_else(|| {
                FontError::MalformedNameTable(format!("truncated while reading {}", what))
            })?;
        self.offset += 2;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }
}

/// Slice `length` bytes at `offset` within the storage area.
fn storage_slice(data: &[u8], storage: usize, offset: u16, length: u16) -> FontResult<&[u8]> {
    let start = storage + offset as usize;
    let end = start + length as usize;
    data.get(start..end).ok_or_else(|| {
        FontError::MalformedNameTable(format!(
            "string at {}..{} outside table of {} bytes",
            start,
            end,
            data.len()
        ))
    })
}

impl NameTable {
    /// Decode a `name` table from its raw bytes.
    pub fn parse(data: &[u8]) -> FontResult<Self> {
        let mut reader = TableReader::new(data);
        let format = reader.read_u16("format")?;
        let count = reader.read_u16("record count")?;
        let storage = reader.read_u16("storage offset")? as usize;

        if format > 1 {
            return Err(FontError::UnsupportedNameTableFormat(format));
        }

        let mut raw_records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            raw_records.push([
                reader.read_u16("platform id")?,
                reader.read_u16("encoding id")?,
                reader.read_u16("language id")?,
                reader.read_u16("name id")?,
                reader.read_u16("string length")?,
                reader.read_u16("string offset")?,
            ]);
        }

        let mut lang_tags = Vec::new();
        if format == 1 {
            let lang_tag_count = reader.read_u16("language tag count")?;
            for index in 0..lang_tag_count {
                let length = reader.read_u16("language tag length")?;
                let offset = reader.read_u16("language tag offset")?;
                let bytes = storage_slice(data, storage, offset, length)?;
                let language_id = LANG_TAG_BASE.checked_add(index).ok_or_else(|| {
                    FontError::MalformedNameTable("too many language tags".to_string())
                })?;
                lang_tags.push(LangTagRecord {
                    language_id,
                    tag: decode_utf16_be(bytes),
                });
            }
        }

        let mut records = Vec::with_capacity(raw_records.len());
        for [platform, encoding_id, language_id, name_id, length, offset] in raw_records {
            let platform_id = PlatformId::try_from(platform)?;
            let bytes = storage_slice(data, storage, offset, length)?;
            records.push(NameRecord {
                platform_id,
                encoding_id,
                language_id,
                name_id: NameId(name_id),
                value: platform_id.decode(bytes),
            });
        }

        Ok(Self {
            format,
            records,
            lang_tags,
        })
    }

    /// Find the language tag registered for a language id >= 0x8000.
    pub fn lang_tag(&self, language_id: u16) -> Option<&str> {
        self.lang_tags
            .iter()
            .find(|t| t.language_id == language_id)
            .map(|t| t.tag.as_str())
    }
}

/// Assembles `name` table bytes. Used by tests across the crate.
#[cfg(test)]
pub(crate) mod builder {
    /// (platform, encoding, language, name id, encoded string bytes)
    pub type RawRecord = (u16, u16, u16, u16, Vec<u8>);

    pub fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
    }

    pub fn build(format: u16, records: &[RawRecord], lang_tags: &[&str]) -> Vec<u8> {
        let header_len = 6
            + records.len() * 12
            + if format == 1 { 2 + lang_tags.len() * 4 } else { 0 };

        let mut storage = Vec::new();
        let mut out = Vec::new();
        out.extend_from_slice(&format.to_be_bytes());
        out.extend_from_slice(&(records.len() as u16).to_be_bytes());
        out.extend_from_slice(&(header_len as u16).to_be_bytes());

        for (platform, encoding, language, name_id, bytes) in records {
            for field in [*platform, *encoding, *language, *name_id, bytes.len() as u16, storage.len() as u16] {
                out.extend_from_slice(&field.to_be_bytes());
            }
            storage.extend_from_slice(bytes);
        }

        if format == 1 {
            out.extend_from_slice(&(lang_tags.len() as u16).to_be_bytes());
            for tag in lang_tags {
                let bytes = utf16(tag);
                out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                out.extend_from_slice(&(storage.len() as u16).to_be_bytes());
                storage.extend_from_slice(&bytes);
            }
        }

        out.extend_from_slice(&storage);
        out
    }
}
