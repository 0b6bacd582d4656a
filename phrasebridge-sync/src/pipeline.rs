//! One sync run: config → locales → push or pull → publish.
//!
//! [`run`] is the entrypoint used by `phrasebridge sync`. It builds a
//! [`PhraseClient`] from [`SyncSettings`] and delegates to [`run_with`], which
//! works against any [`TranslationService`].
//!
//! Only the first project listed in the config file is processed.

use std::path::{Path, PathBuf};

use serde::Serialize;

use phrasebridge_core::{
    config, Locale, ProjectDescriptor, ProjectsFile, SyncDirection, UploadId,
};
use phrasebridge_phrase::{PhraseClient, PollPolicy, DEFAULT_API_URL};
use phrasebridge_publish::{
    AzureDevOps, GitIdentity, GitPublisher, PublishedPullRequest, PullRequestRequest,
};

use crate::error::{io_err, SyncError};
use crate::service::TranslationService;
use crate::writer::{write_locale_file, WriteResult};

pub const DEFAULT_BRANCH: &str = "chore/phrase/update_i18n";
pub const DEFAULT_TARGET_BRANCH: &str = "master";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Phrase API access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseSettings {
    pub token: String,
    pub api_url: String,
}

impl PhraseSettings {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn client(&self) -> PhraseClient {
        PhraseClient::new(&self.token, &self.api_url)
    }
}

/// Azure DevOps access, needed only when a pull opens a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureSettings {
    pub collection_uri: Option<String>,
    pub project_id: Option<String>,
    pub repository_id: Option<String>,
    pub token: Option<String>,
}

impl AzureSettings {
    /// Build a client, or name every missing setting.
    pub fn client(&self) -> Result<AzureDevOps, SyncError> {
        let fields = [
            ("azure devops uri", &self.collection_uri),
            ("azure project id", &self.project_id),
            ("azure repository id", &self.repository_id),
            ("azure token", &self.token),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(SyncError::MissingAzureSettings {
                missing: missing.join(", "),
            });
        }

        let get = |v: &Option<String>| v.clone().unwrap_or_default();
        Ok(AzureDevOps::new(
            get(&self.collection_uri),
            get(&self.project_id),
            get(&self.repository_id),
            get(&self.token),
        ))
    }
}

/// Everything a sync run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub config_path: PathBuf,
    /// Repository root; locale paths from the config are relative to it.
    pub repo_root: PathBuf,
    pub phrase: PhraseSettings,
    pub azure: AzureSettings,
    pub git_identity: GitIdentity,
    pub branch: String,
    pub target_branch: String,
    pub remove_unmentioned_keys: bool,
    pub poll: PollPolicy,
    pub dry_run: bool,
}

impl SyncSettings {
    pub fn new(config_path: impl Into<PathBuf>, phrase: PhraseSettings) -> Self {
        Self {
            config_path: config_path.into(),
            repo_root: PathBuf::from("."),
            phrase,
            azure: AzureSettings::default(),
            git_identity: GitIdentity::default(),
            branch: DEFAULT_BRANCH.to_string(),
            target_branch: DEFAULT_TARGET_BRANCH.to_string(),
            remove_unmentioned_keys: false,
            poll: PollPolicy::default(),
            dry_run: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Result of pushing the default locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub file: PathBuf,
    /// `None` in dry-run mode.
    pub upload_id: Option<UploadId>,
    /// Number of deleted keys when unmentioned-key removal ran.
    pub keys_removed: Option<u64>,
}

/// Result of pulling every locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullReport {
    pub writes: Vec<WriteResult>,
    /// Branch pushed for the pull request, if the working tree had changes.
    pub branch: Option<String>,
    pub pull_request: Option<PublishedPullRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "direction", rename_all = "lowercase")]
pub enum SyncOutcome {
    Push(PushReport),
    Pull(PullReport),
}

/// Summary of one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub project: String,
    pub projects_configured: usize,
    pub dry_run: bool,
    pub outcome: SyncOutcome,
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Load the config and return the project a run operates on.
pub fn load_project(config_path: &Path) -> Result<(ProjectDescriptor, usize), SyncError> {
    let ProjectsFile { projects } = config::load_at(config_path)?;
    tracing::info!("Found {} projects", projects.len());
    let count = projects.len();
    let project = projects
        .into_iter()
        .next()
        .ok_or_else(|| phrasebridge_core::ConfigError::NoProjects {
            path: config_path.to_path_buf(),
        })?;
    Ok((project, count))
}

/// Resolve the configured default locale in a fetched locale list.
pub fn resolve_default_locale<'a>(
    project: &ProjectDescriptor,
    locales: &'a [Locale],
) -> Result<&'a Locale, SyncError> {
    project
        .find_default_locale(locales)
        .ok_or_else(|| SyncError::DefaultLocaleNotFound {
            project: project.name.clone(),
            locale: project.default_locale.clone(),
        })
}

/// Upload the default locale file and optionally prune keys it does not mention.
pub async fn push_default_locale<S>(
    service: &S,
    project: &ProjectDescriptor,
    default_locale: &Locale,
    settings: &SyncSettings,
) -> Result<PushReport, SyncError>
where
    S: TranslationService + ?Sized,
{
    let file = settings.repo_root.join(project.default_locale_file());
    tracing::info!("Push translation updates for project: {}", project.name);

    if settings.dry_run {
        tokio::fs::metadata(&file)
            .await
            .map_err(|e| io_err(&file, e))?;
        tracing::info!("[dry-run] would upload: {}", file.display());
        return Ok(PushReport {
            file,
            upload_id: None,
            keys_removed: None,
        });
    }

    let upload_id = service
        .upload_locale(&default_locale.id, &file, &project.project_id)
        .await?;
    tracing::info!("Initiated upload. UploadId: {upload_id}");

    let keys_removed = if settings.remove_unmentioned_keys {
        Some(
            service
                .remove_unmentioned_keys(&project.project_id, &upload_id, settings.poll)
                .await?,
        )
    } else {
        None
    };

    Ok(PushReport {
        file,
        upload_id: Some(upload_id),
        keys_removed,
    })
}

/// Relative path of `locale`'s file in `project`.
///
/// Locale names come from Phrase, so anything that is not a plain file name
/// (separators, `.`/`..`, empty) is rejected.
pub fn locale_file(project: &ProjectDescriptor, locale: &Locale) -> Result<PathBuf, SyncError> {
    let name = locale.name.as_str();
    let plain = !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0');
    if !plain {
        return Err(SyncError::UnsafeLocaleName {
            project: project.name.clone(),
            locale: locale.name.clone(),
        });
    }
    Ok(project.locale_file(name))
}

/// Download every locale into `<repo_root>/<locale_path>/<name>.json`.
pub async fn pull_locales<S>(
    service: &S,
    project: &ProjectDescriptor,
    locales: &[Locale],
    repo_root: &Path,
    dry_run: bool,
) -> Result<Vec<WriteResult>, SyncError>
where
    S: TranslationService + ?Sized,
{
    tracing::info!("Pull translation updates for project: {}", project.name);
    let mut writes = Vec::with_capacity(locales.len());
    for locale in locales {
        let path = repo_root.join(locale_file(project, locale)?);
        let content = service
            .download_locale(&locale.id, &project.project_id)
            .await?;
        writes.push(write_locale_file(&path, &content, dry_run)?);
    }
    Ok(writes)
}

/// Push a branch and open an approved, auto-completing pull request when the
/// working tree has changes.
pub async fn publish_changes(
    settings: &SyncSettings,
    azure: &AzureDevOps,
) -> Result<(Option<String>, Option<PublishedPullRequest>), SyncError> {
    let git = GitPublisher::new(&settings.repo_root, settings.git_identity.clone());
    if !git.has_changes().await? {
        tracing::info!("no translation changes to publish");
        return Ok((None, None));
    }

    git.publish_branch(&settings.branch).await?;
    let request = PullRequestRequest::for_branch(&settings.branch, &settings.target_branch);
    let pr = azure.open_auto_completing(&request).await?;
    Ok((Some(settings.branch.clone()), Some(pr)))
}

// ---------------------------------------------------------------------------
// Entrypoints
// ---------------------------------------------------------------------------

/// Run a sync against Phrase as configured in `settings`.
pub async fn run(settings: &SyncSettings, direction: SyncDirection) -> Result<SyncReport, SyncError> {
    let client = settings.phrase.client();
    run_with(&client, settings, direction).await
}

/// Run a sync against `service`.
///
/// A non-dry-run pull validates the Azure DevOps settings before any
/// request is made.
pub async fn run_with<S>(
    service: &S,
    settings: &SyncSettings,
    direction: SyncDirection,
) -> Result<SyncReport, SyncError>
where
    S: TranslationService + ?Sized,
{
    let azure = match direction {
        SyncDirection::Pull if !settings.dry_run => Some(settings.azure.client()?),
        _ => None,
    };

    let (project, projects_configured) = load_project(&settings.config_path)?;
    let locales = service.fetch_locales(&project.project_id).await?;
    let default_locale = resolve_default_locale(&project, &locales)?;

    let outcome = match direction {
        SyncDirection::Push => SyncOutcome::Push(
            push_default_locale(service, &project, default_locale, settings).await?,
        ),
        SyncDirection::Pull => {
            let writes = pull_locales(
                service,
                &project,
                &locales,
                &settings.repo_root,
                settings.dry_run,
            )
            .await?;
            let (branch, pull_request) = match &azure {
                Some(azure) => publish_changes(settings, azure).await?,
                None => (None, None),
            };
            SyncOutcome::Pull(PullReport {
                writes,
                branch,
                pull_request,
            })
        }
    };

    Ok(SyncReport {
        project: project.name,
        projects_configured,
        dry_run: settings.dry_run,
        outcome,
    })
}

/// Fetch the locales of the configured project, for listing and diffing.
pub async fn fetch_project_locales<S>(
    service: &S,
    config_path: &Path,
) -> Result<(ProjectDescriptor, Vec<Locale>), SyncError>
where
    S: TranslationService + ?Sized,
{
    let (project, _) = load_project(config_path)?;
    let locales = service.fetch_locales(&project.project_id).await?;
    Ok((project, locales))
}
