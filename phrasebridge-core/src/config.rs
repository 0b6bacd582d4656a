//! Loading of the `phrase.json` project list.
//!
//! ```text
//! {
//!   "projects": [
//!     { "name": "web", "project_id": "…", "locale_path": "apps/web/i18n", "default_locale": "en" }
//!   ]
//! }
//! ```
//!
//! The file is read once per run and never written back.

use std::path::Path;

use crate::error::ConfigError;
use crate::types::ProjectsFile;

/// Conventional config file name, looked up relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "phrase.json";

/// Parse a projects file from a string. `path` is only used for error context.
pub fn parse(contents: &str, path: &Path) -> Result<ProjectsFile, ConfigError> {
    let file: ProjectsFile = serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    if file.projects.is_empty() {
        return Err(ConfigError::NoProjects {
            path: path.to_path_buf(),
        });
    }
    Ok(file)
}

/// Load the projects file at `path`.
///
/// Returns `ConfigError::NoProjects` if the file has an empty project list.
pub fn load_at(path: &Path) -> Result<ProjectsFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&contents, path)
}
