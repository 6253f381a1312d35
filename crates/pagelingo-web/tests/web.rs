//! Browser tests for the `web-sys` bindings. Run with
//! `wasm-pack test --headless --firefox crates/pagelingo-web`.

#![cfg(target_arch = "wasm32")]

use js_sys::{Function, Reflect};
use pagelingo_web::{
    InitSchedule, LocalizationManager, LocalizerConfig, PageElement, PageHost, SupportedLanguage,
    WebPage, install, switch_language,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn append(tag: &str, attrs: &[(&str, &str)]) -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let el = document.create_element(tag).unwrap();
    for (name, value) in attrs {
        el.set_attribute(name, value).unwrap();
    }
    document
        .document_element()
        .unwrap()
        .append_child(&el)
        .unwrap();
    el
}

#[wasm_bindgen_test]
fn query_finds_annotated_elements() {
    append("span", &[("data-i18n", "web.query")]);
    let page = WebPage::from_global().unwrap();
    let found = page.query_all("[data-i18n]");
    assert!(
        found
            .iter()
            .any(|el| el.get_attribute("data-i18n").as_deref() == Some("web.query"))
    );
}

#[wasm_bindgen_test]
fn input_elements_take_placeholders() {
    let input = append("input", &[("data-i18n", "search")]);
    assert!(PageElement::is_text_input(&input));
    PageElement::set_attribute(&input, "placeholder", "Search");
    assert_eq!(input.get_attribute("placeholder").as_deref(), Some("Search"));
}

#[wasm_bindgen_test]
fn preference_round_trips_through_local_storage() {
    let page = WebPage::from_global().unwrap();
    page.write_preference("preferredLang", "zh-TW").unwrap();
    let manager = LocalizationManager::new(page, LocalizerConfig::default());
    assert_eq!(manager.current_language(), SupportedLanguage::ZhTw);
}

#[wasm_bindgen_test]
fn indicator_marks_only_active_language() {
    let en = append("a", &[("class", "lang-selector active"), ("data-lang", "en")]);
    let zh = append("a", &[("class", "lang-selector"), ("data-lang", "zh-CN")]);
    let page = WebPage::from_global().unwrap();
    page.write_preference("preferredLang", "zh-CN").unwrap();
    let manager = LocalizationManager::new(page, LocalizerConfig::default());
    manager.update_active_indicator();
    assert!(!en.class_list().contains("active"));
    assert!(zh.class_list().contains("active"));
}

#[wasm_bindgen_test]
fn loaded_document_initializes_immediately() {
    let page = WebPage::from_global().unwrap();
    assert!(!page.document_loading());
    let manager = LocalizationManager::new(page, LocalizerConfig::default());
    assert_eq!(manager.init_schedule(), InitSchedule::Immediate);
}

// The only test that installs: the installed instance lives for the page.
#[wasm_bindgen_test]
fn global_switch_language_after_install() {
    let window = web_sys::window().unwrap();
    let storage = window.local_storage().unwrap().unwrap();
    storage.set_item("preferredLang", "zh-CN").unwrap();

    // Before install there is nothing to switch; only a warning is logged.
    switch_language("en");
    assert_eq!(storage.get_item("preferredLang").unwrap().as_deref(), Some("zh-CN"));

    let localizer = install(None).unwrap();
    assert_eq!(localizer.current_language(), "zh-CN");

    let global = Reflect::get(&window, &"switchLanguage".into()).unwrap();
    assert!(global.is_function());
    let global: Function = global.dyn_into().unwrap();
    global.call1(&JsValue::NULL, &"zh-TW".into()).unwrap();
    assert_eq!(storage.get_item("preferredLang").unwrap().as_deref(), Some("zh-TW"));

    // The exported free function reaches the same instance.
    switch_language("en");
    assert_eq!(storage.get_item("preferredLang").unwrap().as_deref(), Some("en"));
}
