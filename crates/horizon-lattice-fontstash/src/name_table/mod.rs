//! OpenType `name` table decoding.
//!
//! [`NameTable`] is the raw decoded table; [`FontMetadata`] indexes it for
//! locale-aware queries such as the family name to show in a font picker.

mod locale;
mod metadata;
mod table;

pub use locale::{FALLBACK_LOCALE, INVARIANT_LCID, Locale};
pub use metadata::{FontMetadata, NameTableMode};
pub use table::{LANG_TAG_BASE, LangTagRecord, NameId, NameRecord, NameTable, PlatformId, decode_utf16_be};
