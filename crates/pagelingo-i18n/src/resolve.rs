//! Preferred-language resolution.
//!
//! Precedence, first hit wins:
//!
//! 1. stored preference, if it is an exact supported code;
//! 2. host locale, case-insensitive exact match;
//! 3. host locale, case-insensitive prefix match (`en-US` -> `en`);
//! 4. [`SupportedLanguage::DEFAULT`].
//!
//! Resolution cannot fail. Callers turn unreadable storage or locale into
//! `None` before building [`PreferenceSignals`].

use crate::language::SupportedLanguage;

/// Raw signals gathered from the host environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceSignals {
    /// Value stored under the preference key, if readable and present.
    pub stored: Option<String>,
    /// Locale reported by the host (`navigator.language`).
    pub host_locale: Option<String>,
}

/// Pick the language to start with.
#[must_use]
pub fn resolve_preferred_language(signals: &PreferenceSignals) -> SupportedLanguage {
    if let Some(lang) = signals
        .stored
        .as_deref()
        .and_then(SupportedLanguage::from_code)
    {
        return lang;
    }
    signals
        .host_locale
        .as_deref()
        .and_then(SupportedLanguage::match_locale)
        .unwrap_or(SupportedLanguage::DEFAULT)
}
