#![forbid(unsafe_code)]

//! Localization data model for pagelingo.
//!
//! Provides the closed set of supported languages, JSON translation tables
//! with dotted-key lookup, and preference resolution. Nothing here touches
//! the DOM or JS; `pagelingo-web` drives these types from the page.

pub mod error;
pub mod language;
pub mod resolve;
pub mod table;

pub use error::I18nError;
pub use language::SupportedLanguage;
pub use resolve::{PreferenceSignals, resolve_preferred_language};
pub use table::{TranslationTable, TranslationValue};
