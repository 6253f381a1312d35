#![forbid(unsafe_code)]

//! Browser localization manager.
//!
//! Detects the preferred language, fetches `{lang}.json`, writes the
//! translations into `[data-i18n]` elements, and marks the active
//! `.lang-selector`. The flow is linear: resolve, fetch, apply, mark; it
//! re-runs whenever the user switches language.
//!
//! The [`manager`] and [`localizer`] modules are platform-independent and
//! run against any [`host::PageHost`]. On `wasm32` the `wasm` module binds
//! them to the real document and exports `PageLocalizer`, `install`, and
//! the global `switchLanguage` entry point.
//!
//! # Markup
//!
//! With the default [`config::MarkupPolicy::Trusted`], translation values are
//! written as markup (`innerHTML`). That is deliberate so translations can
//! carry links and emphasis, and it means translation files must be authored
//! by the site operator. Use `textOnly` or `perElement` for anything else.

pub mod config;
pub mod host;
pub mod localizer;
pub mod manager;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{PageLocalizer, WebPage, WindowFetcher, install, switch_language};

pub use config::{LocalizerConfig, MarkupPolicy, TranslationSource};
pub use host::{PageElement, PageHost, TranslationFetcher};
pub use localizer::Localizer;
pub use manager::{InitSchedule, LoadOutcome, LoadTicket, LocalizationManager};
pub use pagelingo_i18n::{I18nError, SupportedLanguage, TranslationTable, TranslationValue};
