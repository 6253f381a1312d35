//! The closed set of languages a page can be shown in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::I18nError;

/// A language the page has a translation file for.
///
/// The set is closed: any other code is rejected wherever it is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SupportedLanguage {
    /// Simplified Chinese.
    ZhCn,
    /// Traditional Chinese.
    ZhTw,
    /// English.
    En,
}

impl SupportedLanguage {
    /// Every supported language, in matching priority order.
    pub const ALL: [Self; 3] = [Self::ZhCn, Self::ZhTw, Self::En];

    /// Used when neither storage nor the host locale gives a usable signal.
    pub const DEFAULT: Self = Self::ZhCn;

    /// Canonical language tag, also the translation file stem.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ZhCn => "zh-CN",
            Self::ZhTw => "zh-TW",
            Self::En => "en",
        }
    }

    /// Exact, case-sensitive parse. Stored preferences and API callers must
    /// use the canonical tag.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    /// Match a host-reported locale tag such as `en-US` or `ZH-tw`.
    ///
    /// Tries a case-insensitive exact match first, then the first member
    /// (in [`Self::ALL`] order) that the tag starts with.
    #[must_use]
    pub fn match_locale(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(&tag))
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|lang| tag.starts_with(&lang.code().to_ascii_lowercase()))
            })
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SupportedLanguage {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| I18nError::UnsupportedLanguage(s.to_owned()))
    }
}

impl Serialize for SupportedLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for SupportedLanguage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_from_str() {
        for lang in SupportedLanguage::ALL {
            assert_eq!(lang.code().parse::<SupportedLanguage>(), Ok(lang));
            assert_eq!(lang.to_string(), lang.code());
        }
    }

    #[test]
    fn from_str_rejects_outsiders() {
        assert_eq!(
            "fr".parse::<SupportedLanguage>(),
            Err(I18nError::UnsupportedLanguage("fr".into()))
        );
        // Stored codes must be canonical.
        assert_eq!(SupportedLanguage::from_code("zh-cn"), None);
        assert_eq!(SupportedLanguage::from_code(""), None);
    }

    #[test]
    fn locale_exact_match_ignores_case() {
        assert_eq!(
            SupportedLanguage::match_locale("zh-tw"),
            Some(SupportedLanguage::ZhTw)
        );
        assert_eq!(
            SupportedLanguage::match_locale("EN"),
            Some(SupportedLanguage::En)
        );
    }

    #[test]
    fn locale_prefix_match() {
        assert_eq!(
            SupportedLanguage::match_locale("en-US"),
            Some(SupportedLanguage::En)
        );
        assert_eq!(
            SupportedLanguage::match_locale("zh-CN-u-nu-hanidec"),
            Some(SupportedLanguage::ZhCn)
        );
    }

    #[test]
    fn locale_without_match() {
        assert_eq!(SupportedLanguage::match_locale("fr-FR"), None);
        // A bare "zh" is not prefixed by any region-qualified member.
        assert_eq!(SupportedLanguage::match_locale("zh"), None);
        assert_eq!(SupportedLanguage::match_locale("  "), None);
    }

    #[test]
    fn serde_uses_code_string() {
        let json = serde_json::to_string(&SupportedLanguage::ZhTw).unwrap();
        assert_eq!(json, "\"zh-TW\"");
        let back: SupportedLanguage = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(back, SupportedLanguage::En);
        assert!(serde_json::from_str::<SupportedLanguage>("\"de\"").is_err());
    }
}
