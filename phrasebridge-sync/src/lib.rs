//! # phrasebridge-sync
//!
//! Sync orchestration between Phrase and the repository.
//!
//! Call [`pipeline::run`] to push the default locale or pull every locale for
//! the first configured project. Pulled files go through the atomic
//! [`writer`]; [`diff`] shows what a pull would change without writing.

pub mod diff;
pub mod error;
pub mod pipeline;
pub mod service;
pub mod writer;

pub use diff::{diff_locales, FileDiff};
pub use error::SyncError;
pub use pipeline::{
    AzureSettings, PhraseSettings, PullReport, PushReport, SyncOutcome, SyncReport, SyncSettings,
};
pub use service::TranslationService;
pub use writer::{write_locale_file, WriteResult};
