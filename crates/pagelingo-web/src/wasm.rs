#![forbid(unsafe_code)]

//! `wasm-bindgen` exports and `web-sys` bindings.
//!
//! Only compiled on `wasm32` targets. [`WebPage`] and [`WindowFetcher`] are
//! the real [`PageHost`] and [`TranslationFetcher`]; [`PageLocalizer`] wraps
//! a [`Localizer`] over them for JavaScript. `install()` additionally keeps a
//! page-lifetime instance and assigns `window.switchLanguage`, so markup
//! injected later (a fetched header, say) can switch language without a
//! handle.

use std::cell::RefCell;
use std::future::Future;
use std::io;

use js_sys::{Function, JSON, Promise, Reflect};
use tracing::{Level, Metadata, warn};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise, spawn_local};
use web_sys::{Document, Element, Node, Response, Storage, Window};

use pagelingo_i18n::I18nError;

use crate::config::LocalizerConfig;
use crate::host::{PageElement, PageHost, TranslationFetcher};
use crate::localizer::Localizer;
use crate::manager::{InitSchedule, LocalizationManager};

type WebLocalizer = Localizer<WebPage, WindowFetcher>;

thread_local! {
    static INSTALLED: RefCell<Option<WebLocalizer>> = const { RefCell::new(None) };
}

// ---------------------------------------------------------------------------
// Console plumbing
// ---------------------------------------------------------------------------

fn console(method: &str, msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(log) = Reflect::get(&console, &method.into()) else {
        return;
    };
    let Ok(log_fn) = log.dyn_into::<Function>() else {
        return;
    };
    let _ = log_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console("error", &msg);
        }));
    });
}

/// One formatted event, flushed to `console.*` when dropped.
struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        let method = if self.level == Level::ERROR {
            "error"
        } else if self.level == Level::WARN {
            "warn"
        } else if self.level == Level::INFO {
            "info"
        } else {
            "debug"
        };
        console(method, line);
    }
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

fn install_tracing() {
    // A host page may already have installed a subscriber.
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .without_time()
        .with_target(false)
        .with_max_level(Level::INFO)
        .try_init();
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
    install_tracing();
}

fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

// ---------------------------------------------------------------------------
// Host bindings
// ---------------------------------------------------------------------------

impl PageElement for Element {
    fn tag_name(&self) -> String {
        Element::tag_name(self)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(err) = Element::set_attribute(self, name, value) {
            warn!(attribute = name, err = %describe(&err), "cannot set attribute");
        }
    }

    fn set_inner_html(&self, html: &str) {
        Element::set_inner_html(self, html);
    }

    fn set_text_content(&self, text: &str) {
        Node::set_text_content(self, Some(text));
    }

    fn add_class(&self, class: &str) {
        if let Err(err) = self.class_list().add_1(class) {
            warn!(class, err = %describe(&err), "cannot add class");
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(err) = self.class_list().remove_1(class) {
            warn!(class, err = %describe(&err), "cannot remove class");
        }
    }
}

/// The current browser page.
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    /// Bind to the global `window` and its document.
    pub fn from_global() -> Result<Self, I18nError> {
        let window =
            web_sys::window().ok_or_else(|| I18nError::environment("window", "not available"))?;
        let document = window
            .document()
            .ok_or_else(|| I18nError::environment("document", "not available"))?;
        Ok(Self { window, document })
    }

    fn storage(&self) -> Result<Storage, I18nError> {
        self.window
            .local_storage()
            .map_err(|err| I18nError::environment("localStorage", describe(&err)))?
            .ok_or_else(|| I18nError::environment("localStorage", "not available"))
    }
}

impl PageHost for WebPage {
    type Element = Element;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                warn!(selector, err = %describe(&err), "invalid selector");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn document_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    fn location_path(&self) -> Result<String, I18nError> {
        self.window
            .location()
            .pathname()
            .map_err(|err| I18nError::environment("location.pathname", describe(&err)))
    }

    fn host_locale(&self) -> Result<Option<String>, I18nError> {
        Ok(self.window.navigator().language())
    }

    fn read_preference(&self, key: &str) -> Result<Option<String>, I18nError> {
        self.storage()?
            .get_item(key)
            .map_err(|err| I18nError::environment("localStorage", describe(&err)))
    }

    fn write_preference(&self, key: &str, value: &str) -> Result<(), I18nError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| I18nError::environment("localStorage", describe(&err)))
    }
}

/// Fetches translation files with `window.fetch`.
pub struct WindowFetcher {
    window: Window,
}

impl WindowFetcher {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl TranslationFetcher for WindowFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, I18nError>> {
        let request = self.window.fetch_with_str(url);
        let url = url.to_owned();
        async move {
            let failed = |reason: String| I18nError::Fetch {
                url: url.clone(),
                reason,
            };
            let response = JsFuture::from(request)
                .await
                .map_err(|err| failed(describe(&err)))?;
            let response: Response = response
                .dyn_into()
                .map_err(|_| failed("fetch did not yield a Response".into()))?;
            if !response.ok() {
                return Err(I18nError::FetchStatus {
                    url: url.clone(),
                    status: response.status(),
                });
            }
            let text = response.text().map_err(|err| failed(describe(&err)))?;
            let body = JsFuture::from(text)
                .await
                .map_err(|err| failed(describe(&err)))?;
            body.as_string()
                .ok_or_else(|| failed("response body is not text".into()))
        }
    }
}

// ---------------------------------------------------------------------------
// JS surface
// ---------------------------------------------------------------------------

fn parse_options(options: Option<JsValue>) -> Result<LocalizerConfig, JsValue> {
    let Some(options) = options.filter(|o| !o.is_undefined() && !o.is_null()) else {
        return Ok(LocalizerConfig::default());
    };
    let json = JSON::stringify(&options)?;
    LocalizerConfig::from_json_str(&String::from(json))
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

fn spawn_init(localizer: WebLocalizer) {
    spawn_local(async move {
        localizer.init().await;
    });
}

fn spawn_switch(localizer: &WebLocalizer, lang: &str) {
    let pending = localizer.switch_language(lang);
    spawn_local(async move {
        pending.await;
    });
}

fn schedule_init(localizer: &WebLocalizer) {
    let schedule = localizer.manager().borrow().init_schedule();
    match schedule {
        InitSchedule::Immediate => spawn_init(localizer.clone()),
        InitSchedule::AfterDocumentReady => {
            let pending = localizer.clone();
            let handler = Closure::once_into_js(move || spawn_init(pending));
            let manager = localizer.manager().borrow();
            let document = &manager.host().document;
            if let Err(err) = document
                .add_event_listener_with_callback("DOMContentLoaded", handler.unchecked_ref())
            {
                warn!(err = %describe(&err), "cannot defer initialization");
            }
        }
    }
}

/// Localization manager bound to the current page.
#[wasm_bindgen]
pub struct PageLocalizer {
    inner: WebLocalizer,
}

#[wasm_bindgen]
impl PageLocalizer {
    /// Create a manager for this page. `options` is an optional object of
    /// `LocalizerConfig` fields (`storageKey`, `translations`, `markup`, ...).
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<JsValue>) -> Result<PageLocalizer, JsValue> {
        install_panic_hook();
        let config = parse_options(options)?;
        let page = WebPage::from_global().map_err(|err| JsValue::from_str(&err.to_string()))?;
        let fetcher = WindowFetcher::new(page.window.clone());
        let manager = LocalizationManager::new(page, config);
        Ok(Self {
            inner: Localizer::new(manager, fetcher),
        })
    }

    /// Load the preferred language now, or on `DOMContentLoaded` if the
    /// document is still loading.
    pub fn init(&self) {
        schedule_init(&self.inner);
    }

    /// Persist and load `lang` in the background. No-op for unsupported
    /// codes and for the active language.
    #[wasm_bindgen(js_name = switchLanguage)]
    pub fn switch_language(&self, lang: &str) {
        spawn_switch(&self.inner, lang);
    }

    /// Load `lang` without persisting it. Resolves once the page is updated
    /// or the load failed.
    #[wasm_bindgen(js_name = loadLanguage)]
    pub fn load_language(&self, lang: &str) -> Promise {
        let pending = self.inner.load_language(lang);
        future_to_promise(async move {
            pending.await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Re-apply the active table, e.g. after injecting new markup.
    /// Returns the number of elements updated.
    #[wasm_bindgen(js_name = applyTranslations)]
    pub fn apply_translations(&self) -> u32 {
        let applied = self.inner.manager().borrow().apply_translations();
        u32::try_from(applied).unwrap_or(u32::MAX)
    }

    #[wasm_bindgen(js_name = updateActiveIndicator)]
    pub fn update_active_indicator(&self) {
        self.inner.manager().borrow().update_active_indicator();
    }

    #[wasm_bindgen(js_name = currentLanguage)]
    pub fn current_language(&self) -> String {
        self.inner.current_language().code().to_owned()
    }

    /// Rendered translation for a dotted key, or `undefined`.
    pub fn translate(&self, key: &str) -> Option<String> {
        self.inner.manager().borrow().translate(key)
    }
}

/// Create the page-lifetime localizer, schedule its initialization, and
/// expose `window.switchLanguage`.
#[wasm_bindgen]
pub fn install(options: Option<JsValue>) -> Result<PageLocalizer, JsValue> {
    let localizer = PageLocalizer::new(options)?;
    localizer.init();
    let window = localizer.inner.manager().borrow().host().window.clone();
    INSTALLED.with(|slot| *slot.borrow_mut() = Some(localizer.inner.clone()));

    let switch = Closure::<dyn Fn(String)>::new(|lang: String| switch_language(&lang));
    Reflect::set(&window, &"switchLanguage".into(), switch.as_ref())?;
    // Lives as long as the page, like the installed instance.
    switch.forget();
    Ok(localizer)
}

/// Switch the installed localizer's language.
#[wasm_bindgen(js_name = switchLanguage)]
pub fn switch_language(lang: &str) {
    let installed = INSTALLED.with(|slot| slot.borrow().clone());
    match installed {
        Some(localizer) => spawn_switch(&localizer, lang),
        None => warn!(lang, "switchLanguage called before install()"),
    }
}
