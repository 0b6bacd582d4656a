//! Error types for phrasebridge-phrase.

use std::path::PathBuf;

use thiserror::Error;

use phrasebridge_core::UploadId;

/// All errors that can arise while talking to Phrase.
#[derive(Debug, Error)]
pub enum PhraseError {
    /// A required identifier was empty. Raised before any request is sent.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Network-level failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an unexpected status code.
    #[error("{operation} failed with HTTP {status} ({body_summary})")]
    Status {
        operation: &'static str,
        status: u16,
        body_summary: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A local locale file could not be read for upload.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The upload never reached the success state, so dependent work was skipped.
    #[error("upload {upload_id} was not confirmed by phrase; unmentioned keys were not removed")]
    UploadNotConfirmed { upload_id: UploadId },
}

pub(crate) fn invalid_argument(message: impl Into<String>) -> PhraseError {
    PhraseError::InvalidArgument {
        message: message.into(),
    }
}
