//! Locale-aware lookup over decoded name records.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::error::{FontError, FontResult};
use crate::types::FontWeight;

use super::locale::Locale;
use super::table::{NameId, NameTable, PlatformId};

/// How to treat name tables in a format this crate does not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameTableMode {
    /// Fail with [`FontError::UnsupportedNameTableFormat`].
    Strict,
    /// Log a warning and carry no metadata.
    Permissive,
}

impl Default for NameTableMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Permissive
        }
    }
}

/// Platform preference when one language and encoding has several records.
const PLATFORM_PREFERENCE: [PlatformId; 3] = [
    PlatformId::Microsoft,
    PlatformId::Unicode,
    PlatformId::Macintosh,
];

type ByPlatform = BTreeMap<PlatformId, String>;
type ByEncoding = BTreeMap<u16, ByPlatform>;
type ByLanguage = BTreeMap<u16, ByEncoding>;

/// Naming strings of one font, indexed by name id, language id, encoding id
/// and platform.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontMetadata {
    names: BTreeMap<NameId, ByLanguage>,
    lang_tags: BTreeMap<u16, String>,
}

impl FontMetadata {
    /// Index a decoded table.
    ///
    /// Fails if two records share the same name, language, encoding and
    /// platform.
    pub fn from_name_table(table: NameTable) -> FontResult<Self> {
        let mut names: BTreeMap<NameId, ByLanguage> = BTreeMap::new();

        for record in table.records {
            let by_platform = names
                .entry(record.name_id)
                .or_default()
                .entry(record.language_id)
                .or_default()
                .entry(record.encoding_id)
                .or_default();

            match by_platform.entry(record.platform_id) {
                Entry::Occupied(_) => {
                    return Err(FontError::DuplicateNameRecord {
                        name_id: record.name_id.value(),
                        language_id: record.language_id,
                        encoding_id: record.encoding_id,
                        platform_id: record.platform_id.value(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(record.value);
                }
            }
        }

        let lang_tags = table
            .lang_tags
            .into_iter()
            .map(|t| (t.language_id, t.tag))
            .collect();

        Ok(Self { names, lang_tags })
    }

    /// Decode raw `name` table bytes.
    ///
    /// In [`NameTableMode::Permissive`] an unsupported table format yields
    /// `Ok(None)`; every other problem is reported in both modes.
    pub fn from_bytes(data: &[u8], mode: NameTableMode) -> FontResult<Option<Self>> {
        match NameTable::parse(data) {
            Ok(table) => Self::from_name_table(table).map(Some),
            Err(FontError::UnsupportedNameTableFormat(format))
                if mode == NameTableMode::Permissive =>
            {
                tracing::warn!(
                    target: "horizon_lattice_fontstash::name_table",
                    format,
                    "unsupported name table format, ignoring font metadata"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Number of distinct name ids present.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name ids present, ascending.
    pub fn name_ids(&self) -> impl Iterator<Item = NameId> + '_ {
        self.names.keys().copied()
    }

    /// Get the string stored under an exact four-level key.
    pub fn get(
        &self,
        name_id: NameId,
        language_id: u16,
        encoding_id: u16,
        platform_id: PlatformId,
    ) -> Option<&str> {
        self.names
            .get(&name_id)?
            .get(&language_id)?
            .get(&encoding_id)?
            .get(&platform_id)
            .map(String::as_str)
    }

    /// Find a name for `locale`.
    ///
    /// Tries the locale, then each of its parents down to the invariant
    /// culture, then falls back to any entry for the name id.
    pub fn find_name(&self, name_id: NameId, locale: &Locale) -> Option<&str> {
        let by_language = self.names.get(&name_id)?;

        for candidate in locale.chain() {
            let found = by_language.iter().find_map(|(&language_id, by_encoding)| {
                let tag = self.lang_tags.get(&language_id).map(String::as_str);
                candidate
                    .matches(language_id, tag)
                    .then(|| first_string(by_encoding))
                    .flatten()
            });
            if found.is_some() {
                return found;
            }
        }

        by_language.values().find_map(first_string)
    }

    /// Family name, preferring the typographic family.
    pub fn family(&self, locale: &Locale) -> Option<&str> {
        self.find_name(NameId::PREFERRED_FAMILY, locale)
            .or_else(|| self.find_name(NameId::FONT_FAMILY, locale))
    }

    /// Subfamily (style) name, preferring the typographic subfamily.
    pub fn subfamily(&self, locale: &Locale) -> Option<&str> {
        self.find_name(NameId::PREFERRED_SUBFAMILY, locale)
            .or_else(|| self.find_name(NameId::FONT_SUBFAMILY, locale))
    }

    /// Weight implied by the subfamily name, [`FontWeight::NORMAL`] if none.
    pub fn weight(&self, locale: &Locale) -> FontWeight {
        self.subfamily(locale)
            .and_then(FontWeight::from_subfamily)
            .unwrap_or_default()
    }
}

fn first_string(by_encoding: &ByEncoding) -> Option<&str> {
    by_encoding.values().find_map(|by_platform| {
        PLATFORM_PREFERENCE
            .iter()
            .find_map(|p| by_platform.get(p))
            .map(String::as_str)
    })
}
