//! Translation tables and dotted-key lookup.
//!
//! # Invariants
//!
//! 1. **Root is a mapping**: a table is always built from a JSON object;
//!    any other document is rejected as a parse error.
//!
//! 2. **Lookup short-circuits on shape**: `nav.home.extra` yields `None`
//!    when `nav.home` is text. Only [`TranslationValue::Nested`] is
//!    descended into; lists and scalars end the walk.
//!
//! 3. **Rendering follows JS truthiness**: empty text, zero, `false` and
//!    `null` render nothing, so callers treat them as missing. Numbers print
//!    the way JS does, so `3.0` renders as `3`.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Segment absent at any depth | `lookup` returns `None` |
//! | Wrong shape | Segment below a non-mapping | `lookup` returns `None` |
//! | List index | `items.0` below a JSON array | `lookup` returns `None`; arrays are leaves |
//! | Bad document | Malformed JSON or non-object root | `I18nError::Parse` |

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::{Number, Value};

use crate::error::I18nError;

/// One node of a translation document.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationValue {
    /// A translation string. May contain markup.
    Text(String),
    Number(Number),
    Bool(bool),
    Null,
    List(Vec<TranslationValue>),
    /// A namespace of further keys.
    Nested(BTreeMap<String, TranslationValue>),
}

impl TranslationValue {
    /// The string to write into the page, or `None` when the value counts
    /// as "no translation".
    #[must_use]
    pub fn rendered(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(text) if !text.is_empty() => Some(Cow::Borrowed(text.as_str())),
            // f64's Display drops a zero fraction; serde_json's keeps it.
            Self::Number(n) if n.is_f64() => n
                .as_f64()
                .filter(|f| *f != 0.0 && !f.is_nan())
                .map(|f| Cow::Owned(f.to_string())),
            Self::Number(n) => (n.as_f64() != Some(0.0)).then(|| Cow::Owned(n.to_string())),
            Self::Bool(true) => Some(Cow::Borrowed("true")),
            _ => None,
        }
    }

    /// Text content, if this is a text leaf.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    fn count_leaves(&self) -> usize {
        match self {
            Self::Nested(map) => map.values().map(Self::count_leaves).sum(),
            _ => 1,
        }
    }

    fn collect_keys(&self, prefix: &str, out: &mut Vec<String>) {
        match self {
            Self::Nested(map) => {
                for (segment, child) in map {
                    child.collect_keys(&format!("{prefix}.{segment}"), out);
                }
            }
            _ => out.push(prefix.to_owned()),
        }
    }
}

impl From<Value> for TranslationValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Number(n) => Self::Number(n),
            Value::Bool(b) => Self::Bool(b),
            Value::Null => Self::Null,
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Nested(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// All translations for one language, as loaded from `{lang}.json`.
///
/// # Example
///
/// ```
/// use pagelingo_i18n::table::TranslationTable;
///
/// let table = TranslationTable::from_json_str(
///     "en.json",
///     r#"{"nav": {"home": "Home"}}"#,
/// ).unwrap();
///
/// assert_eq!(table.text("nav.home"), Some("Home"));
/// assert!(table.lookup("nav.missing").is_none());
/// assert!(table.lookup("nav.home.extra").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationTable {
    root: BTreeMap<String, TranslationValue>,
}

impl TranslationTable {
    /// Create an empty table. Every lookup misses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a translation document. `source` names the document in errors.
    pub fn from_json_str(source: &str, body: &str) -> Result<Self, I18nError> {
        let value: Value = serde_json::from_str(body).map_err(|e| I18nError::Parse {
            url: source.to_owned(),
            reason: e.to_string(),
        })?;
        Self::from_value(source, value)
    }

    /// Build a table from an already-parsed JSON value.
    pub fn from_value(source: &str, value: Value) -> Result<Self, I18nError> {
        match TranslationValue::from(value) {
            TranslationValue::Nested(root) => Ok(Self { root }),
            other => Err(I18nError::Parse {
                url: source.to_owned(),
                reason: format!("expected a JSON object at the root, found {}", kind(&other)),
            }),
        }
    }

    /// Resolve a dotted key such as `nav.home`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&TranslationValue> {
        let mut segments = key.split('.');
        let first = self.root.get(segments.next()?)?;
        segments.try_fold(first, |value, segment| match value {
            TranslationValue::Nested(map) => map.get(segment),
            _ => None,
        })
    }

    /// Resolve a dotted key to a text leaf.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.lookup(key).and_then(TranslationValue::as_text)
    }

    /// Number of leaf entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.values().map(TranslationValue::count_leaves).sum()
    }

    /// Whether the table has no leaves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dotted paths of every leaf, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for (segment, value) in &self.root {
            value.collect_keys(segment, &mut keys);
        }
        keys.sort_unstable();
        keys
    }
}

fn kind(value: &TranslationValue) -> &'static str {
    match value {
        TranslationValue::Text(_) => "a string",
        TranslationValue::Number(_) => "a number",
        TranslationValue::Bool(_) => "a boolean",
        TranslationValue::Null => "null",
        TranslationValue::List(_) => "an array",
        TranslationValue::Nested(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nav_table() -> TranslationTable {
        TranslationTable::from_json_str(
            "en.json",
            r#"{
                "nav": { "home": "Home", "about": "About <b>us</b>" },
                "search": { "placeholder": "Search" },
                "stats": { "zero": 0, "count": 3, "empty": "", "flag": false, "on": true },
                "list": ["a", "b"],
                "nothing": null
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn lookup_leaf() {
        let table = nav_table();
        assert_eq!(
            table.lookup("nav.home"),
            Some(&TranslationValue::Text("Home".into()))
        );
        assert_eq!(table.text("search.placeholder"), Some("Search"));
    }

    #[test]
    fn lookup_missing_segment() {
        let table = nav_table();
        assert_eq!(table.lookup("nav.missing"), None);
        assert_eq!(table.lookup("missing.home"), None);
        assert_eq!(table.lookup(""), None);
    }

    #[test]
    fn lookup_through_text_short_circuits() {
        let table = nav_table();
        assert_eq!(table.lookup("nav.home.extra"), None);
        assert_eq!(table.lookup("nav.home.extra.deeper"), None);
    }

    #[test]
    fn lists_are_not_containers() {
        let table = nav_table();
        assert!(matches!(table.lookup("list"), Some(TranslationValue::List(_))));
        assert_eq!(table.lookup("list.0"), None);
    }

    #[test]
    fn lookup_namespace_returns_mapping() {
        let table = nav_table();
        assert!(matches!(
            table.lookup("nav"),
            Some(TranslationValue::Nested(_))
        ));
        assert_eq!(table.text("nav"), None);
    }

    #[test]
    fn rendering_follows_truthiness() {
        let table = nav_table();
        let rendered = |key: &str| {
            table
                .lookup(key)
                .and_then(TranslationValue::rendered)
                .map(Cow::into_owned)
        };
        assert_eq!(rendered("nav.about"), Some("About <b>us</b>".into()));
        assert_eq!(rendered("stats.count"), Some("3".into()));
        assert_eq!(rendered("stats.on"), Some("true".into()));
        assert_eq!(rendered("stats.zero"), None);
        assert_eq!(rendered("stats.empty"), None);
        assert_eq!(rendered("stats.flag"), None);
        assert_eq!(rendered("nothing"), None);
        assert_eq!(rendered("nav"), None);
        assert_eq!(rendered("list"), None);
    }

    #[test]
    fn whole_floats_render_without_fraction() {
        let table = TranslationTable::from_json_str(
            "en.json",
            r#"{"whole": 3.0, "half": 1.5, "big": 12345678901, "zero": 0.0, "neg": -2.0}"#,
        )
        .unwrap();
        let rendered = |key: &str| {
            table
                .lookup(key)
                .and_then(TranslationValue::rendered)
                .map(Cow::into_owned)
        };
        assert_eq!(rendered("whole"), Some("3".into()));
        assert_eq!(rendered("half"), Some("1.5".into()));
        assert_eq!(rendered("big"), Some("12345678901".into()));
        assert_eq!(rendered("neg"), Some("-2".into()));
        assert_eq!(rendered("zero"), None);
    }

    #[test]
    fn len_and_keys_cover_leaves() {
        let table = nav_table();
        assert_eq!(table.len(), 10);
        assert_eq!(
            table.keys(),
            vec![
                "list",
                "nav.about",
                "nav.home",
                "nothing",
                "search.placeholder",
                "stats.count",
                "stats.empty",
                "stats.flag",
                "stats.on",
                "stats.zero",
            ]
        );
    }

    #[test]
    fn empty_table() {
        let table = TranslationTable::new();
        assert!(table.is_empty());
        assert_eq!(table.lookup("nav.home"), None);
        assert!(table.keys().is_empty());
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = TranslationTable::from_json_str("en.json", r#"["Home"]"#).unwrap_err();
        assert_eq!(
            err,
            I18nError::Parse {
                url: "en.json".into(),
                reason: "expected a JSON object at the root, found an array".into(),
            }
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = TranslationTable::from_json_str("zh-TW.json", "{\"nav\":").unwrap_err();
        assert!(err.is_fetch_failure());
        assert!(err.to_string().starts_with("invalid language file zh-TW.json"));
    }
}
