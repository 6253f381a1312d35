//! Async driver pairing a manager with a fetcher.
//!
//! The manager lives in an `Rc<RefCell<_>>` shared with event handlers. A
//! borrow is taken to begin a load and again to complete it, never across
//! the fetch, so a handler firing mid-fetch (another switch, a manual
//! re-apply) always finds the manager free.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use pagelingo_i18n::SupportedLanguage;

use crate::host::{PageHost, TranslationFetcher};
use crate::manager::{LoadOutcome, LoadTicket, LocalizationManager};

/// Shared handle driving loads for one page.
pub struct Localizer<H: PageHost, F: TranslationFetcher> {
    manager: Rc<RefCell<LocalizationManager<H>>>,
    fetcher: Rc<F>,
}

impl<H: PageHost, F: TranslationFetcher> Clone for Localizer<H, F> {
    fn clone(&self) -> Self {
        Self {
            manager: Rc::clone(&self.manager),
            fetcher: Rc::clone(&self.fetcher),
        }
    }
}

impl<H: PageHost + 'static, F: TranslationFetcher + 'static> Localizer<H, F> {
    pub fn new(manager: LocalizationManager<H>, fetcher: F) -> Self {
        Self {
            manager: Rc::new(RefCell::new(manager)),
            fetcher: Rc::new(fetcher),
        }
    }

    /// Shared manager, for reads and synchronous operations.
    #[must_use]
    pub fn manager(&self) -> &Rc<RefCell<LocalizationManager<H>>> {
        &self.manager
    }

    #[must_use]
    pub fn current_language(&self) -> SupportedLanguage {
        self.manager.borrow().current_language()
    }

    /// Load the active language. Run once the document is ready.
    pub fn init(&self) -> impl Future<Output = LoadOutcome> + use<H, F> {
        let ticket = self.manager.borrow_mut().init_ticket();
        self.run(ticket)
    }

    /// Fetch and activate `lang`. Unsupported codes resolve immediately to
    /// [`LoadOutcome::Unsupported`] without fetching.
    pub fn load_language(&self, lang: &str) -> impl Future<Output = LoadOutcome> + use<H, F> {
        let ticket = self.manager.borrow_mut().begin_load(lang);
        let pending = ticket.map(|ticket| self.run(ticket));
        async move {
            match pending {
                Some(pending) => pending.await,
                None => LoadOutcome::Unsupported,
            }
        }
    }

    /// Persist and start loading `lang`.
    ///
    /// The preference is written before this returns; the returned future
    /// only performs the fetch and may be spawned without awaiting. Resolves
    /// to [`LoadOutcome::Unchanged`] for the active language (cancelling any
    /// in-flight load of another one) and [`LoadOutcome::Unsupported`] for
    /// unknown codes.
    pub fn switch_language(&self, lang: &str) -> impl Future<Output = LoadOutcome> + use<H, F> {
        let pending = match self.manager.borrow_mut().switch_language(lang) {
            Some(ticket) => Ok(ticket),
            None if lang.parse::<SupportedLanguage>().is_ok() => Err(LoadOutcome::Unchanged),
            None => Err(LoadOutcome::Unsupported),
        };
        let pending = pending.map(|ticket| self.run(ticket));
        async move {
            match pending {
                Ok(pending) => pending.await,
                Err(outcome) => outcome,
            }
        }
    }

    fn run(&self, ticket: LoadTicket) -> impl Future<Output = LoadOutcome> + use<H, F> {
        let manager = Rc::clone(&self.manager);
        let fetcher = Rc::clone(&self.fetcher);
        async move {
            let body = fetcher.fetch(ticket.url()).await;
            manager.borrow_mut().complete_load(ticket, body)
        }
    }
}
