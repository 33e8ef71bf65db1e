//! Locale identifiers used to pick localized name records.
//!
//! Name records are keyed by platform language ids. For the Microsoft and
//! Unicode platforms these are Windows LCIDs; ids from 0x8000 up refer to
//! language-tag strings stored in the table itself (format 1).

use std::fmt;

/// LCID of the invariant culture.
pub const INVARIANT_LCID: u16 = 0x007F;

/// Locale used when the system locale cannot be determined.
pub const FALLBACK_LOCALE: &str = "en-US";

/// Windows LCIDs of common cultures, keyed by lowercase tag.
///
/// Neutral cultures (language only) use the bare primary language id.
const LCIDS: &[(&str, u16)] = &[
    ("ar", 0x0001),
    ("ar-sa", 0x0401),
    ("bg", 0x0002),
    ("ca", 0x0003),
    ("zh", 0x0004),
    ("zh-tw", 0x0404),
    ("zh-cn", 0x0804),
    ("zh-hk", 0x0C04),
    ("zh-sg", 0x1004),
    ("cs", 0x0005),
    ("cs-cz", 0x0405),
    ("da", 0x0006),
    ("da-dk", 0x0406),
    ("de", 0x0007),
    ("de-de", 0x0407),
    ("de-ch", 0x0807),
    ("de-at", 0x0C07),
    ("el", 0x0008),
    ("el-gr", 0x0408),
    ("en", 0x0009),
    ("en-us", 0x0409),
    ("en-gb", 0x0809),
    ("en-au", 0x0C09),
    ("en-ca", 0x1009),
    ("en-nz", 0x1409),
    ("en-ie", 0x1809),
    ("es", 0x000A),
    ("es-mx", 0x080A),
    ("es-es", 0x0C0A),
    ("fi", 0x000B),
    ("fi-fi", 0x040B),
    ("fr", 0x000C),
    ("fr-fr", 0x040C),
    ("fr-be", 0x080C),
    ("fr-ca", 0x0C0C),
    ("fr-ch", 0x100C),
    ("he", 0x000D),
    ("he-il", 0x040D),
    ("hu", 0x000E),
    ("hu-hu", 0x040E),
    ("it", 0x0010),
    ("it-it", 0x0410),
    ("ja", 0x0011),
    ("ja-jp", 0x0411),
    ("ko", 0x0012),
    ("ko-kr", 0x0412),
    ("nl", 0x0013),
    ("nl-nl", 0x0413),
    ("nl-be", 0x0813),
    ("nb", 0x0014),
    ("nb-no", 0x0414),
    ("pl", 0x0015),
    ("pl-pl", 0x0415),
    ("pt", 0x0016),
    ("pt-br", 0x0416),
    ("pt-pt", 0x0816),
    ("ro", 0x0018),
    ("ro-ro", 0x0418),
    ("ru", 0x0019),
    ("ru-ru", 0x0419),
    ("sk", 0x001B),
    ("sk-sk", 0x041B),
    ("sv", 0x001D),
    ("sv-se", 0x041D),
    ("th", 0x001E),
    ("th-th", 0x041E),
    ("tr", 0x001F),
    ("tr-tr", 0x041F),
    ("id", 0x0021),
    ("id-id", 0x0421),
    ("uk", 0x0022),
    ("uk-ua", 0x0422),
    ("vi", 0x002A),
    ("vi-vn", 0x042A),
    ("hi", 0x0039),
    ("hi-in", 0x0439),
];

/// A culture tag such as `en-US`, or the invariant culture (empty tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Locale {
    tag: String,
}

impl Locale {
    /// Create a locale from a tag.
    ///
    /// POSIX-style tags are normalized: `en_US.UTF-8` becomes `en-US`.
    pub fn new(tag: impl AsRef<str>) -> Self {
        let tag = tag.as_ref().trim();
        let tag = tag.split(['.', '@']).next().unwrap_or_default();
        let tag = tag.replace('_', "-");
        if tag.eq_ignore_ascii_case("c") || tag.eq_ignore_ascii_case("posix") {
            return Self::invariant();
        }
        Self { tag }
    }

    /// The invariant culture.
    pub fn invariant() -> Self {
        Self::default()
    }

    /// The locale of the running process, or `en-US` if unknown.
    pub fn current() -> Self {
        sys_locale::get_locale()
            .map(Self::new)
            .filter(|l| !l.is_invariant())
            .unwrap_or_else(|| Self::new(FALLBACK_LOCALE))
    }

    /// The culture tag; empty for the invariant culture.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_invariant(&self) -> bool {
        self.tag.is_empty()
    }

    /// The next less specific locale: `zh-Hant-TW` -> `zh-Hant` -> `zh` -> invariant.
    pub fn parent(&self) -> Option<Self> {
        if self.is_invariant() {
            return None;
        }
        Some(match self.tag.rfind('-') {
            Some(pos) => Self {
                tag: self.tag[..pos].to_string(),
            },
            None => Self::invariant(),
        })
    }

    /// This locale followed by all of its parents, ending with the invariant culture.
    pub fn chain(&self) -> impl Iterator<Item = Locale> {
        std::iter::successors(Some(self.clone()), Locale::parent)
    }

    /// Windows LCID for this locale, when known.
    pub fn lcid(&self) -> Option<u16> {
        if self.is_invariant() {
            return Some(INVARIANT_LCID);
        }
        LCIDS
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(&self.tag))
            .map(|&(_, lcid)| lcid)
    }

    /// Whether a record's language id refers to this locale.
    ///
    /// `lang_tag` is the table's language tag for ids >= 0x8000, if any.
    pub fn matches(&self, language_id: u16, lang_tag: Option<&str>) -> bool {
        if self.lcid() == Some(language_id) {
            return true;
        }
        match lang_tag {
            Some(tag) if language_id >= super::LANG_TAG_BASE => {
                !self.is_invariant() && tag.eq_ignore_ascii_case(&self.tag)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invariant() {
            f.write_str("(invariant)")
        } else {
            f.write_str(&self.tag)
        }
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}
