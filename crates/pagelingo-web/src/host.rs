//! Host seams for the localization manager.
//!
//! The manager never names a JS type. A page supplies a [`PageHost`] for
//! DOM, storage, and locale access, and a [`TranslationFetcher`] for the
//! network. `crate::wasm` binds both to `web-sys`; `crate::memory` (feature
//! `test-helpers`) provides in-memory versions.

use std::future::Future;

use pagelingo_i18n::I18nError;

/// One element of the page. Mutation goes through `&self`, like the DOM.
pub trait PageElement {
    /// Upper-case tag name (`INPUT`, `SPAN`, ...).
    fn tag_name(&self) -> String;
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);
    /// Replace the content with parsed markup.
    fn set_inner_html(&self, html: &str);
    /// Replace the content with a single text node.
    fn set_text_content(&self, text: &str);
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);

    /// Whether the element takes its translation as a placeholder.
    fn is_text_input(&self) -> bool {
        let tag = self.tag_name();
        tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea")
    }
}

/// Document and environment access for one page.
pub trait PageHost {
    type Element: PageElement;

    /// Elements matching `selector`, in document order.
    ///
    /// The manager only issues `[attribute]` and `.class` selectors.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Whether the document is still being parsed.
    fn document_loading(&self) -> bool;

    /// Path of the current page (`location.pathname`).
    fn location_path(&self) -> Result<String, I18nError>;

    /// Locale reported by the host (`navigator.language`).
    fn host_locale(&self) -> Result<Option<String>, I18nError>;

    fn read_preference(&self, key: &str) -> Result<Option<String>, I18nError>;

    fn write_preference(&self, key: &str, value: &str) -> Result<(), I18nError>;
}

/// Retrieves translation documents.
pub trait TranslationFetcher {
    /// Fetch the body at `url`.
    ///
    /// A response without a success status must fail with
    /// [`I18nError::FetchStatus`].
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, I18nError>>;
}
