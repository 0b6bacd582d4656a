//! Error types for phrasebridge-sync.

use std::path::PathBuf;

use thiserror::Error;

use phrasebridge_core::ConfigError;
use phrasebridge_phrase::PhraseError;
use phrasebridge_publish::PublishError;

/// All errors that can arise from a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("phrase error: {0}")]
    Phrase(#[from] PhraseError),

    #[error("publish error: {0}")]
    Publish(#[from] PublishError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "default locale not found for project {project}: list of locales fetched from phrase \
         didn't contain a locale named {locale}"
    )]
    DefaultLocaleNotFound { project: String, locale: String },

    /// A locale name from Phrase would resolve outside the project's locale directory.
    #[error("refusing locale name {locale:?} of project {project}: not a plain file name")]
    UnsafeLocaleName { project: String, locale: String },

    /// A pull needs Azure DevOps settings to open the pull request.
    #[error("pull requires Azure DevOps settings (missing: {missing})")]
    MissingAzureSettings { missing: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
