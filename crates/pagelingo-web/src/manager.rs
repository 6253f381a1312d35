//! The localization manager: resolve, load, apply, and switch.
//!
//! # Invariants
//!
//! 1. **Language is always supported**: the active language is set at
//!    construction from [`resolve_preferred_language`] and only replaced by a
//!    committed load of a [`SupportedLanguage`].
//!
//! 2. **All-or-nothing loads**: the table and language change together, and
//!    only after the body parsed. A failed load leaves both untouched.
//!
//! 3. **Last request wins**: every load issues a [`LoadTicket`]; only the
//!    most recently issued ticket may commit. Completions of superseded
//!    tickets are discarded whatever order the fetches resolve in. Switching
//!    back to the active language retires any in-flight ticket.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unsupported language | Code outside the set | `warn!`, no fetch, no change |
//! | Fetch failure | Network error or non-2xx | `error!`, no change |
//! | Parse failure | Body not a JSON object | `error!`, no change |
//! | Environment failure | Storage/locale/location throws | `warn!`, treated as no signal |
//!
//! Loads are split in two halves so a single-threaded host never holds the
//! manager borrowed across the fetch: [`LocalizationManager::begin_load`]
//! returns the ticket to fetch, [`LocalizationManager::complete_load`] commits
//! the body. [`crate::localizer::Localizer`] drives both halves.

use pagelingo_i18n::{
    I18nError, PreferenceSignals, SupportedLanguage, TranslationTable, resolve_preferred_language,
};
use tracing::{debug, error, info, warn};

use crate::config::{LocalizerConfig, MarkupPolicy};
use crate::host::{PageElement, PageHost};

/// Receipt for one in-flight load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    language: SupportedLanguage,
    url: String,
}

impl LoadTicket {
    /// Language this load will activate.
    #[must_use]
    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// URL to fetch.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What a load request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Table replaced and page updated.
    Applied(SupportedLanguage),
    /// Rejected before fetching.
    Unsupported,
    /// Nothing to do (switch to the active language).
    Unchanged,
    /// Fetch or parse failed; previous state kept.
    Failed,
    /// A newer request was issued before this one completed.
    Superseded,
}

/// When `init` should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitSchedule {
    Immediate,
    /// Wait for `DOMContentLoaded`.
    AfterDocumentReady,
}

/// Active language and its translations.
#[derive(Debug, Clone)]
pub struct ActiveLanguageState {
    language: SupportedLanguage,
    table: TranslationTable,
}

impl ActiveLanguageState {
    #[must_use]
    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    #[must_use]
    pub fn table(&self) -> &TranslationTable {
        &self.table
    }
}

/// Localization context for one page.
pub struct LocalizationManager<H: PageHost> {
    host: H,
    config: LocalizerConfig,
    state: ActiveLanguageState,
    issued: u64,
    /// Language of the latest ticket, until that ticket completes.
    pending: Option<SupportedLanguage>,
}

impl<H: PageHost> LocalizationManager<H> {
    /// Create a manager whose active language is the resolved preference.
    ///
    /// The table starts empty; call `init` (through a
    /// [`crate::localizer::Localizer`]) to load it.
    pub fn new(host: H, config: LocalizerConfig) -> Self {
        let language = resolve_preferred_language(&gather_signals(&host, &config));
        debug!(language = %language, "resolved preferred language");
        Self {
            host,
            config,
            state: ActiveLanguageState {
                language,
                table: TranslationTable::new(),
            },
            issued: 0,
            pending: None,
        }
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn config(&self) -> &LocalizerConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &ActiveLanguageState {
        &self.state
    }

    #[must_use]
    pub fn current_language(&self) -> SupportedLanguage {
        self.state.language
    }

    #[must_use]
    pub fn table(&self) -> &TranslationTable {
        &self.state.table
    }

    /// Rendered translation for a dotted key in the active table.
    #[must_use]
    pub fn translate(&self, key: &str) -> Option<String> {
        self.state
            .table
            .lookup(key)
            .and_then(|value| value.rendered())
            .map(|text| text.into_owned())
    }

    /// Re-read storage and locale and pick a language. Never fails.
    #[must_use]
    pub fn resolve_preferred_language(&self) -> SupportedLanguage {
        resolve_preferred_language(&gather_signals(&self.host, &self.config))
    }

    /// Whether initialization has to wait for the document.
    #[must_use]
    pub fn init_schedule(&self) -> InitSchedule {
        if self.host.document_loading() {
            InitSchedule::AfterDocumentReady
        } else {
            InitSchedule::Immediate
        }
    }

    /// Start the initial load of the active language.
    pub fn init_ticket(&mut self) -> LoadTicket {
        self.issue(self.state.language)
    }

    /// First half of a load. `None` means `lang` is unsupported and nothing
    /// will be fetched.
    pub fn begin_load(&mut self, lang: &str) -> Option<LoadTicket> {
        match lang.parse::<SupportedLanguage>() {
            Ok(language) => Some(self.issue(language)),
            Err(err) => {
                warn!(%err, "ignoring load request");
                None
            }
        }
    }

    /// Second half of a load: commit `body` if `ticket` is still current.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        body: Result<String, I18nError>,
    ) -> LoadOutcome {
        if ticket.seq != self.issued {
            debug!(
                language = %ticket.language,
                seq = ticket.seq,
                latest = self.issued,
                "discarding superseded load"
            );
            return LoadOutcome::Superseded;
        }
        self.pending = None;

        let table =
            body.and_then(|body| TranslationTable::from_json_str(&ticket.url, &body));
        match table {
            Ok(table) => {
                info!(
                    language = %ticket.language,
                    entries = table.len(),
                    "language loaded"
                );
                self.state = ActiveLanguageState {
                    language: ticket.language,
                    table,
                };
                self.apply_translations();
                self.update_active_indicator();
                LoadOutcome::Applied(ticket.language)
            }
            Err(err) => {
                error!(%err, language = %ticket.language, "error loading language file");
                LoadOutcome::Failed
            }
        }
    }

    /// Persist `lang` and start loading it.
    ///
    /// Returns `None` for unsupported codes and for the active language.
    /// Switching back to the active language while a load of another one is
    /// in flight cancels that load and persists `lang` without fetching. A
    /// storage failure is logged and the switch goes ahead.
    pub fn switch_language(&mut self, lang: &str) -> Option<LoadTicket> {
        let language = match lang.parse::<SupportedLanguage>() {
            Ok(language) => language,
            Err(err) => {
                warn!(%err, "ignoring switch request");
                return None;
            }
        };
        if language == self.state.language {
            match self.pending {
                Some(other) if other != language => {
                    debug!(language = %language, cancelled = %other, "cancelling pending load");
                    self.issued += 1;
                    self.pending = None;
                    self.persist(language);
                }
                _ => debug!(language = %language, "already active"),
            }
            return None;
        }
        self.persist(language);
        Some(self.issue(language))
    }

    /// Write translations into every annotated element. Returns how many
    /// elements were updated.
    pub fn apply_translations(&self) -> usize {
        let mut applied = 0;
        for element in self.host.query_all(&self.config.key_selector()) {
            let Some(key) = element.attribute(&self.config.key_attribute) else {
                continue;
            };
            let Some(text) = self.translate(&key) else {
                continue;
            };
            if element.is_text_input() {
                element.set_attribute("placeholder", &text);
            } else {
                match self.config.markup {
                    MarkupPolicy::Trusted => element.set_inner_html(&text),
                    MarkupPolicy::TextOnly => element.set_text_content(&text),
                    MarkupPolicy::PerElement => {
                        if element.attribute(&self.config.markup_attribute).is_some() {
                            element.set_inner_html(&text);
                        } else {
                            element.set_text_content(&text);
                        }
                    }
                }
            }
            applied += 1;
        }
        debug!(applied, language = %self.state.language, "translations applied");
        applied
    }

    /// Mark the selector(s) of the active language and unmark the rest.
    pub fn update_active_indicator(&self) {
        let code = self.state.language.code();
        for selector in self.host.query_all(&self.config.language_selector()) {
            selector.remove_class(&self.config.active_class);
            if selector.attribute(&self.config.language_attribute).as_deref() == Some(code) {
                selector.add_class(&self.config.active_class);
            }
        }
    }

    fn persist(&self, language: SupportedLanguage) {
        if let Err(err) = self
            .host
            .write_preference(&self.config.storage_key, language.code())
        {
            warn!(%err, "could not persist preferred language");
        }
    }

    fn issue(&mut self, language: SupportedLanguage) -> LoadTicket {
        self.issued += 1;
        self.pending = Some(language);
        let path = self.host.location_path().unwrap_or_else(|err| {
            warn!(%err, "location unavailable, using root translation path");
            String::new()
        });
        let url = self.config.translations.url_for(language, &path);
        debug!(language = %language, %url, seq = self.issued, "load requested");
        LoadTicket {
            seq: self.issued,
            language,
            url,
        }
    }
}

fn gather_signals<H: PageHost>(host: &H, config: &LocalizerConfig) -> PreferenceSignals {
    let stored = host
        .read_preference(&config.storage_key)
        .unwrap_or_else(|err| {
            warn!(%err, "error getting stored language");
            None
        });
    let host_locale = host.host_locale().unwrap_or_else(|err| {
        warn!(%err, "error getting host locale");
        None
    });
    PreferenceSignals {
        stored,
        host_locale,
    }
}
