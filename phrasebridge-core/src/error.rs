//! Error types for phrasebridge-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading the project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse error on load, with the offending path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file parsed but lists no projects.
    #[error("no phrase projects configured in {path}")]
    NoProjects { path: PathBuf },
}
