//! Error types for phrasebridge-publish.

use thiserror::Error;

/// All errors that can arise while publishing a branch or pull request.
#[derive(Debug, Error)]
pub enum PublishError {
    /// `git` could not be started at all.
    #[error("failed to execute git {command}: {source}")]
    GitSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// `git` ran and exited non-zero.
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    /// Network-level failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Azure DevOps answered with a non-success status.
    #[error("{operation} failed with HTTP {status}: {message}")]
    Status {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// A response was missing data needed by a later step.
    #[error("invalid response from {operation}: {message}")]
    InvalidResponse {
        operation: &'static str,
        message: String,
    },
}
