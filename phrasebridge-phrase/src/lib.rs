//! # phrasebridge-phrase
//!
//! Phrase API v2 client and upload-completion polling.
//!
//! [`PhraseClient`] wraps the locale, upload and key endpoints used by a sync
//! run. [`poller::ensure_upload_succeeded`] waits for an upload to be processed
//! and only depends on the [`UploadStatusSource`] seam, so it can be driven by
//! a scripted source in tests.

mod client;
pub mod error;
pub mod poller;

pub use client::{PhraseClient, DEFAULT_API_URL, FILE_FORMAT};
pub use error::PhraseError;
pub use poller::{ensure_upload_succeeded, poll_upload, PollOutcome, PollPolicy, UploadStatusSource};
