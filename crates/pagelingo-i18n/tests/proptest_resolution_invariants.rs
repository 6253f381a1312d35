//! Property-based invariant tests for preference resolution and lookup.
//!
//! 1. Resolution always yields a supported language.
//! 2. A valid stored preference wins regardless of the host locale.
//! 3. Region-qualified host locales resolve to their language-only member.
//! 4. Lookup below a text leaf is always `None`.

use pagelingo_i18n::{
    PreferenceSignals, SupportedLanguage, TranslationTable, resolve_preferred_language,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn language_strategy() -> impl Strategy<Value = SupportedLanguage> {
    prop_oneof![
        Just(SupportedLanguage::ZhCn),
        Just(SupportedLanguage::ZhTw),
        Just(SupportedLanguage::En),
    ]
}

fn tag_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        "[a-zA-Z]{0,3}(-[a-zA-Z0-9]{0,8}){0,2}".prop_map(Some),
        ".{0,16}".prop_map(Some),
    ]
}

proptest! {
    #[test]
    fn resolution_is_always_supported(stored in tag_strategy(), host_locale in tag_strategy()) {
        let lang = resolve_preferred_language(&PreferenceSignals { stored, host_locale });
        prop_assert!(SupportedLanguage::ALL.contains(&lang));
    }

    #[test]
    fn stored_preference_wins(lang in language_strategy(), host_locale in tag_strategy()) {
        let signals = PreferenceSignals {
            stored: Some(lang.code().to_owned()),
            host_locale,
        };
        prop_assert_eq!(resolve_preferred_language(&signals), lang);
    }

    #[test]
    fn region_suffix_resolves_to_language(region in "[A-Z]{2}") {
        let signals = PreferenceSignals {
            stored: None,
            host_locale: Some(format!("en-{region}")),
        };
        prop_assert_eq!(resolve_preferred_language(&signals), SupportedLanguage::En);
    }

    #[test]
    fn lookup_below_text_is_none(leaf in "[a-z]{1,8}", extra in "[a-z]{1,8}") {
        let body = format!(r#"{{"nav": {{"{leaf}": "Home"}}}}"#);
        let table = TranslationTable::from_json_str("en.json", &body).unwrap();
        let nav_leaf = format!("nav.{leaf}");
        let below = format!("nav.{leaf}.{extra}");
        prop_assert_eq!(table.text(&nav_leaf), Some("Home"));
        prop_assert!(table.lookup(&below).is_none());
    }
}
