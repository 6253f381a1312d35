//! Error taxonomy shared by the data model and the page manager.
//!
//! Every variant except [`I18nError::Config`] is recovered locally by the
//! manager: it is logged and the operation degrades to a no-op.

use thiserror::Error;

/// Errors from localization operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum I18nError {
    /// A language code outside the supported set.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    /// The translation file answered with a non-success HTTP status.
    #[error("failed to load language file {url}: HTTP {status}")]
    FetchStatus { url: String, status: u16 },
    /// The translation file could not be retrieved at all.
    #[error("failed to load language file {url}: {reason}")]
    Fetch { url: String, reason: String },
    /// The translation file is not a JSON object.
    #[error("invalid language file {url}: {reason}")]
    Parse { url: String, reason: String },
    /// Storage, locale, or location access threw.
    #[error("cannot access {resource}: {reason}")]
    EnvironmentAccess {
        resource: &'static str,
        reason: String,
    },
    /// Host-supplied options were malformed.
    #[error("invalid localizer options: {0}")]
    Config(String),
}

impl I18nError {
    /// Shorthand for an [`I18nError::EnvironmentAccess`] failure.
    pub fn environment(resource: &'static str, reason: impl Into<String>) -> Self {
        Self::EnvironmentAccess {
            resource,
            reason: reason.into(),
        }
    }

    /// Whether this error belongs to the fetch-failure class.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchStatus { .. } | Self::Fetch { .. } | Self::Parse { .. }
        )
    }
}
