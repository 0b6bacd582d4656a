//! phrasebridge core library — Phrase DTOs, project configuration, errors.
//!
//! - [`types`] — newtypes, remote payloads and the project descriptor
//! - [`config`] — loading `phrase.json`
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{
    Locale, LocaleId, ProjectDescriptor, ProjectId, ProjectsFile, SourceLocale, SyncDirection,
    Upload, UploadId, UploadState,
};
