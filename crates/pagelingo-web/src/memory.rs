//! In-memory page and fetcher, behind the `test-helpers` feature.
//!
//! [`MemoryPage`] implements [`PageHost`] over a flat list of elements and a
//! map standing in for `localStorage`. It understands the two selector forms
//! the manager issues (`[attribute]` and `.class`) and nothing else.
//! [`MemoryFetcher`] serves canned bodies and records every requested URL.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::future::{Future, ready};
use std::rc::Rc;

use pagelingo_i18n::I18nError;

use crate::host::{PageElement, PageHost, TranslationFetcher};

#[derive(Debug, Default)]
struct ElementState {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    content: String,
    content_is_markup: bool,
}

/// Shared handle to one in-memory element.
#[derive(Debug, Clone)]
pub struct MemoryElement(Rc<RefCell<ElementState>>);

impl MemoryElement {
    /// Create an element with the given tag name.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(ElementState {
            tag: tag.to_ascii_uppercase(),
            ..ElementState::default()
        })))
    }

    /// Builder: set an attribute.
    #[must_use]
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: add a class.
    #[must_use]
    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Builder: initial text content.
    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.set_text_content(text);
        self
    }

    /// Current content, markup or text.
    #[must_use]
    pub fn content(&self) -> String {
        self.0.borrow().content.clone()
    }

    /// Whether the last content write was markup.
    #[must_use]
    pub fn content_is_markup(&self) -> bool {
        self.0.borrow().content_is_markup
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(class) = selector.strip_prefix('.') {
            self.has_class(class)
        } else if let Some(attr) = selector
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            self.0.borrow().attributes.contains_key(attr)
        } else {
            false
        }
    }
}

impl PageElement for MemoryElement {
    fn tag_name(&self) -> String {
        self.0.borrow().tag.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_owned(), value.to_owned());
    }

    fn set_inner_html(&self, html: &str) {
        let mut state = self.0.borrow_mut();
        state.content = html.to_owned();
        state.content_is_markup = true;
    }

    fn set_text_content(&self, text: &str) {
        let mut state = self.0.borrow_mut();
        state.content = text.to_owned();
        state.content_is_markup = false;
    }

    fn add_class(&self, class: &str) {
        let mut state = self.0.borrow_mut();
        if !state.classes.iter().any(|c| c == class) {
            state.classes.push(class.to_owned());
        }
    }

    fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.retain(|c| c != class);
    }
}

/// In-memory page: elements, storage, locale, and location.
#[derive(Debug, Default)]
pub struct MemoryPage {
    elements: Vec<MemoryElement>,
    storage: RefCell<HashMap<String, String>>,
    storage_writes: Cell<usize>,
    storage_denied: bool,
    locale: Option<String>,
    locale_denied: bool,
    path: String,
    loading: Cell<bool>,
}

impl MemoryPage {
    /// Empty page at `/index.html` with no locale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: "/index.html".into(),
            ..Self::default()
        }
    }

    /// Builder: append an element. The caller keeps a clone to inspect it.
    #[must_use]
    pub fn with_element(mut self, element: &MemoryElement) -> Self {
        self.elements.push(element.clone());
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = Some(locale.to_owned());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_owned();
        self
    }

    /// Builder: seed a storage entry without counting it as a write.
    #[must_use]
    pub fn with_stored(self, key: &str, value: &str) -> Self {
        self.storage
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        self
    }

    /// Builder: storage access throws, as in a sandboxed iframe.
    #[must_use]
    pub fn with_storage_denied(mut self) -> Self {
        self.storage_denied = true;
        self
    }

    /// Builder: locale access throws.
    #[must_use]
    pub fn with_locale_denied(mut self) -> Self {
        self.locale_denied = true;
        self
    }

    /// Builder: the document is still parsing.
    #[must_use]
    pub fn still_loading(self) -> Self {
        self.loading.set(true);
        self
    }

    /// Simulate `DOMContentLoaded`.
    pub fn finish_loading(&self) {
        self.loading.set(false);
    }

    /// Stored value for `key`, bypassing access checks.
    #[must_use]
    pub fn stored(&self, key: &str) -> Option<String> {
        self.storage.borrow().get(key).cloned()
    }

    /// Number of successful preference writes.
    #[must_use]
    pub fn storage_writes(&self) -> usize {
        self.storage_writes.get()
    }
}

impl PageHost for MemoryPage {
    type Element = MemoryElement;

    fn query_all(&self, selector: &str) -> Vec<MemoryElement> {
        self.elements
            .iter()
            .filter(|el| el.matches(selector))
            .cloned()
            .collect()
    }

    fn document_loading(&self) -> bool {
        self.loading.get()
    }

    fn location_path(&self) -> Result<String, I18nError> {
        Ok(self.path.clone())
    }

    fn host_locale(&self) -> Result<Option<String>, I18nError> {
        if self.locale_denied {
            return Err(I18nError::environment("navigator.language", "access denied"));
        }
        Ok(self.locale.clone())
    }

    fn read_preference(&self, key: &str) -> Result<Option<String>, I18nError> {
        if self.storage_denied {
            return Err(I18nError::environment("localStorage", "access denied"));
        }
        Ok(self.stored(key))
    }

    fn write_preference(&self, key: &str, value: &str) -> Result<(), I18nError> {
        if self.storage_denied {
            return Err(I18nError::environment("localStorage", "access denied"));
        }
        self.storage
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        self.storage_writes.set(self.storage_writes.get() + 1);
        Ok(())
    }
}

/// Fetcher answering from a fixed map of URL to response.
///
/// Unknown URLs answer HTTP 404.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Result<String, I18nError>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: serve `body` at `url`.
    #[must_use]
    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_owned(), Ok(body.to_owned()));
        self
    }

    /// Builder: fail requests to `url` with `err`.
    #[must_use]
    pub fn with_error(mut self, url: &str, err: I18nError) -> Self {
        self.responses.insert(url.to_owned(), Err(err));
        self
    }

    /// Every URL requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl TranslationFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, I18nError>> {
        self.requests.borrow_mut().push(url.to_owned());
        let response = self.responses.get(url).cloned().unwrap_or_else(|| {
            Err(I18nError::FetchStatus {
                url: url.to_owned(),
                status: 404,
            })
        });
        ready(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_attribute_and_class() {
        let title = MemoryElement::new("h1").with_attribute("data-i18n", "nav.home");
        let selector = MemoryElement::new("a")
            .with_class("lang-selector")
            .with_attribute("data-lang", "en");
        let page = MemoryPage::new()
            .with_element(&title)
            .with_element(&selector);

        assert_eq!(page.query_all("[data-i18n]").len(), 1);
        assert_eq!(page.query_all(".lang-selector").len(), 1);
        assert!(page.query_all("div").is_empty());
    }

    #[test]
    fn classes_do_not_duplicate() {
        let el = MemoryElement::new("a").with_class("active").with_class("active");
        el.remove_class("active");
        assert!(!el.has_class("active"));
    }

    #[test]
    fn denied_storage_errors() {
        let page = MemoryPage::new().with_storage_denied();
        assert!(page.read_preference("preferredLang").is_err());
        assert!(page.write_preference("preferredLang", "en").is_err());
        assert_eq!(page.storage_writes(), 0);
    }

    #[test]
    fn unknown_url_is_404() {
        let fetcher = MemoryFetcher::new();
        let result = pollster::block_on(fetcher.fetch("./locales/en.json"));
        assert_eq!(
            result,
            Err(I18nError::FetchStatus {
                url: "./locales/en.json".into(),
                status: 404
            })
        );
        assert_eq!(fetcher.requests(), vec!["./locales/en.json"]);
    }
}
