//! Dry-run unified diff support for `phrasebridge diff`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use phrasebridge_core::{Locale, ProjectDescriptor};

use crate::{error::io_err, pipeline::locale_file, service::TranslationService, SyncError};

/// A single locale file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Download every locale and compare it to the file a pull would overwrite.
///
/// No files are written. Content is compared verbatim, the same way
/// [`write_locale_file`](crate::write_locale_file) decides whether to write,
/// so a locale is listed exactly when a pull would rewrite it.
pub async fn diff_locales<S>(
    service: &S,
    project: &ProjectDescriptor,
    locales: &[Locale],
    repo_root: &Path,
) -> Result<Vec<FileDiff>, SyncError>
where
    S: TranslationService + ?Sized,
{
    let mut diffs = Vec::new();
    for locale in locales {
        let downloaded = service
            .download_locale(&locale.id, &project.project_id)
            .await?;
        let relative = locale_file(project, locale)?;
        let path = repo_root.join(&relative);
        if let Some(unified) = unified_diff(&path, &relative, &downloaded)? {
            diffs.push(FileDiff {
                path,
                unified_diff: unified,
            });
        }
    }
    Ok(diffs)
}

fn unified_diff(
    path: &Path,
    relative: &Path,
    downloaded: &str,
) -> Result<Option<String>, SyncError> {
    let existing = read_existing_or_empty(path)?;
    if existing == downloaded {
        return Ok(None);
    }

    let relative = relative.strip_prefix(".").unwrap_or(relative);
    let old_header = format!("a/{}", relative.display());
    let new_header = format!("b/{}", relative.display());
    Ok(Some(
        TextDiff::from_lines(existing.as_str(), downloaded)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string(),
    ))
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}
