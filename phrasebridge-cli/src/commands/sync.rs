//! `phrasebridge sync` — push the default locale or pull every locale.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{builder::BoolishValueParser, ArgAction, Args};
use colored::Colorize;

use phrasebridge_core::SyncDirection;
use phrasebridge_phrase::PollPolicy;
use phrasebridge_publish::GitIdentity;
use phrasebridge_sync::{
    pipeline::{self, DEFAULT_BRANCH, DEFAULT_TARGET_BRANCH},
    AzureSettings, PullReport, PushReport, SyncOutcome, SyncReport, SyncSettings, WriteResult,
};

use super::PhraseArgs;

/// Arguments for `phrasebridge sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub phrase: PhraseArgs,

    /// Sync direction: push | pull.
    #[arg(long, env = "PHRASE_SYNC_DIRECTION")]
    pub direction: SyncDirection,

    /// After a push, delete Phrase keys the uploaded file no longer mentions.
    #[arg(
        long,
        env = "REMOVE_UNMENTIONED_KEYS",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "false",
        value_name = "BOOL"
    )]
    pub remove_unmentioned_keys: bool,

    /// Azure DevOps personal access token (pull only).
    #[arg(long, env = "SYSTEM_ACCESSTOKEN", hide_env_values = true)]
    pub azure_token: Option<String>,

    /// Azure DevOps collection URI, e.g. https://dev.azure.com/org/ (pull only).
    #[arg(long, env = "SYSTEM_TEAMFOUNDATIONCOLLECTIONURI")]
    pub azure_devops_uri: Option<String>,

    /// Azure DevOps project id (pull only).
    #[arg(long, env = "SYSTEM_TEAMPROJECTID")]
    pub azure_project_id: Option<String>,

    /// Azure DevOps repository id (pull only).
    #[arg(long, env = "BUILD_REPOSITORY_ID")]
    pub azure_repository_id: Option<String>,

    /// Commit author email.
    #[arg(long, env = "GIT_USER_MAIL", default_value = "phrase@devops.com")]
    pub git_user_mail: String,

    /// Commit author name.
    #[arg(long, env = "GIT_USER_NAME", default_value = "Phrase Devops")]
    pub git_user_name: String,

    /// Branch pushed with pulled translations.
    #[arg(long, default_value = DEFAULT_BRANCH)]
    pub branch: String,

    /// Branch the pull request merges into.
    #[arg(long, default_value = DEFAULT_TARGET_BRANCH)]
    pub target_branch: String,

    /// Delay between upload status checks, in milliseconds.
    #[arg(long, default_value_t = PollPolicy::DEFAULT_INTERVAL.as_millis() as u64)]
    pub poll_interval_ms: u64,

    /// Maximum number of upload status checks.
    #[arg(long, default_value_t = PollPolicy::DEFAULT_ATTEMPTS)]
    pub poll_attempts: u32,

    /// Report what would change without uploading, writing, committing or opening a PR.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    fn settings(&self) -> SyncSettings {
        let mut settings = self.phrase.settings();
        settings.azure = AzureSettings {
            collection_uri: self.azure_devops_uri.clone(),
            project_id: self.azure_project_id.clone(),
            repository_id: self.azure_repository_id.clone(),
            token: self.azure_token.clone(),
        };
        settings.git_identity = GitIdentity {
            name: self.git_user_name.clone(),
            email: self.git_user_mail.clone(),
        };
        settings.branch = self.branch.clone();
        settings.target_branch = self.target_branch.clone();
        settings.remove_unmentioned_keys = self.remove_unmentioned_keys;
        settings.poll = PollPolicy::new(
            Duration::from_millis(self.poll_interval_ms),
            self.poll_attempts,
        );
        settings.dry_run = self.dry_run;
        settings
    }

    pub async fn run(self) -> Result<()> {
        let settings = self.settings();
        tracing::debug!(
            direction = %self.direction,
            dry_run = self.dry_run,
            config = %settings.config_path.display(),
            "starting sync"
        );
        let report = pipeline::run(&settings, self.direction)
            .await
            .with_context(|| format!("{} failed", self.direction))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to render report JSON")?
            );
            return Ok(());
        }

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    if report.projects_configured > 1 {
        println!(
            "{prefix}{} only '{}' is synced; {} more project(s) in config are ignored",
            "note:".yellow(),
            report.project,
            report.projects_configured - 1
        );
    }

    match &report.outcome {
        SyncOutcome::Push(push) => print_push(prefix, &report.project, push),
        SyncOutcome::Pull(pull) => print_pull(prefix, &report.project, pull),
    }
}

fn print_push(prefix: &str, project: &str, push: &PushReport) {
    match &push.upload_id {
        Some(id) => println!(
            "{prefix}{} '{project}' uploaded {} (upload {id})",
            "✓".green(),
            push.file.display()
        ),
        None => println!(
            "{prefix}{} '{project}' would upload {}",
            "~".cyan(),
            push.file.display()
        ),
    }
    if let Some(removed) = push.keys_removed {
        println!("  removed {removed} unmentioned key(s)");
    }
}

fn print_pull(prefix: &str, project: &str, pull: &PullReport) {
    let changed = pull.writes.iter().filter(|w| w.is_change()).count();
    let unchanged = pull.writes.len() - changed;
    println!(
        "{prefix}{} '{project}' pulled ({changed} changed, {unchanged} unchanged)",
        "✓".green()
    );

    for w in &pull.writes {
        match w {
            WriteResult::Written { path, .. } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }

    match (&pull.branch, &pull.pull_request) {
        (Some(branch), Some(pr)) => println!(
            "  pushed {branch}; pull request {} set to auto-complete and approved by {}",
            pr.pull_request_id.to_string().bold(),
            pr.created_by
        ),
        _ if !prefix.is_empty() => {}
        _ => println!("  working tree clean, no pull request opened"),
    }
}
