//! Localizer options supplied by the embedding page.
//!
//! Options arrive as a JS object (`new PageLocalizer({...})`) and are read
//! through `serde_json`, so every field uses its camelCase name and every
//! field is optional.

use serde::Deserialize;

use pagelingo_i18n::{I18nError, SupportedLanguage};

/// Attribute that opts a single element into markup under
/// [`MarkupPolicy::PerElement`].
pub const DEFAULT_MARKUP_ATTRIBUTE: &str = "data-i18n-html";

/// How translated values are written into non-input elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkupPolicy {
    /// Values are markup (`innerHTML`). Translation files must be
    /// operator-authored.
    #[default]
    Trusted,
    /// Values are plain text (`textContent`).
    TextOnly,
    /// Markup only for elements carrying the markup attribute; text elsewhere.
    PerElement,
}

/// Where `{lang}.json` files are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TranslationSource {
    /// One base for every page.
    Fixed { base: String },
    /// `nested` when the page path contains `marker`, `root` otherwise.
    ByNesting {
        root: String,
        nested: String,
        marker: String,
    },
}

impl Default for TranslationSource {
    fn default() -> Self {
        Self::ByNesting {
            root: "./locales/".into(),
            nested: "../locales/".into(),
            marker: "/pages/".into(),
        }
    }
}

impl TranslationSource {
    /// Base directory for a page at `location_path`.
    #[must_use]
    pub fn base_for(&self, location_path: &str) -> &str {
        match self {
            Self::Fixed { base } => base.as_str(),
            Self::ByNesting {
                root,
                nested,
                marker,
            } => {
                if !marker.is_empty() && location_path.contains(marker.as_str()) {
                    nested.as_str()
                } else {
                    root.as_str()
                }
            }
        }
    }

    /// URL of the translation file for `lang`.
    #[must_use]
    pub fn url_for(&self, lang: SupportedLanguage, location_path: &str) -> String {
        let base = self.base_for(location_path);
        let sep = if base.is_empty() || base.ends_with('/') {
            ""
        } else {
            "/"
        };
        format!("{base}{sep}{}.json", lang.code())
    }
}

/// Page contract and behavior knobs for the localization manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct LocalizerConfig {
    /// Durable storage key holding the preferred language.
    pub storage_key: String,
    /// Attribute whose value is the dotted translation key.
    pub key_attribute: String,
    /// Class marking language-selector elements.
    pub selector_class: String,
    /// Attribute on selectors naming their language code.
    pub language_attribute: String,
    /// Class toggled onto the selector of the current language.
    pub active_class: String,
    pub translations: TranslationSource,
    pub markup: MarkupPolicy,
    pub markup_attribute: String,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            storage_key: "preferredLang".into(),
            key_attribute: "data-i18n".into(),
            selector_class: "lang-selector".into(),
            language_attribute: "data-lang".into(),
            active_class: "active".into(),
            translations: TranslationSource::default(),
            markup: MarkupPolicy::default(),
            markup_attribute: DEFAULT_MARKUP_ATTRIBUTE.into(),
        }
    }
}

impl LocalizerConfig {
    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, I18nError> {
        serde_json::from_str(json).map_err(|e| I18nError::Config(e.to_string()))
    }

    /// CSS selector for translatable elements.
    #[must_use]
    pub fn key_selector(&self) -> String {
        format!("[{}]", self.key_attribute)
    }

    /// CSS selector for language-selector elements.
    #[must_use]
    pub fn language_selector(&self) -> String {
        format!(".{}", self.selector_class)
    }
}
