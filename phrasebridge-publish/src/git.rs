//! Branch publishing through the local `git` client.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::PublishError;

/// Commit message used for translation updates.
pub const COMMIT_MESSAGE: &str = "Update PhraseApp translations";

/// Pathspec staged before committing.
pub const LOCALE_PATHSPEC: &str = "*.json";

/// Author identity written to the repository config before committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for GitIdentity {
    fn default() -> Self {
        Self {
            name: "Phrase Devops".to_string(),
            email: "phrase@devops.com".to_string(),
        }
    }
}

/// Runs `git` subcommands inside one repository.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo: PathBuf,
    identity: GitIdentity,
}

impl GitPublisher {
    pub fn new(repo: impl Into<PathBuf>, identity: GitIdentity) -> Self {
        Self {
            repo: repo.into(),
            identity,
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    async fn run(&self, args: &[&str]) -> Result<String, PublishError> {
        let command = args.first().copied().unwrap_or_default().to_string();
        tracing::debug!(repo = %self.repo.display(), "git {}", args.join(" "));

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()
            .await
            .map_err(|source| PublishError::GitSpawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(PublishError::Git { command, stderr });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Paths reported by `git status --porcelain`.
    pub async fn changed_files(&self) -> Result<Vec<String>, PublishError> {
        let stdout = self.run(&["status", "--porcelain"]).await?;
        Ok(stdout
            .lines()
            .filter(|line| line.len() > 3)
            .map(|line| line[3..].to_string())
            .collect())
    }

    pub async fn has_changes(&self) -> Result<bool, PublishError> {
        Ok(!self.changed_files().await?.is_empty())
    }

    /// Commit staged locale files on the current branch, move them onto a new
    /// `branch` and push it to `origin` with upstream tracking.
    pub async fn publish_branch(&self, branch: &str) -> Result<(), PublishError> {
        self.run(&["config", "user.email", &self.identity.email])
            .await?;
        self.run(&["config", "user.name", &self.identity.name])
            .await?;

        self.run(&["add", "--", LOCALE_PATHSPEC]).await?;
        self.run(&["commit", "-m", COMMIT_MESSAGE]).await?;
        self.run(&["checkout", "-b", branch]).await?;
        self.run(&["push", "--set-upstream", "origin", branch])
            .await?;

        tracing::info!(branch, "pushed translation branch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::process::Command as StdCommand;

    use tempfile::TempDir;

    use super::*;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn git_available() -> bool {
        StdCommand::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// A working repository whose `origin` is a bare repository next to it.
    fn repo_with_origin(root: &TempDir) -> (PathBuf, PathBuf) {
        let origin = root.path().join("origin.git");
        let work = root.path().join("work");
        fs::create_dir_all(&origin).unwrap();
        fs::create_dir_all(&work).unwrap();
        git(&origin, &["init", "--bare", "-q"]);
        git(&work, &["init", "-q"]);
        git(&work, &["remote", "add", "origin", origin.to_str().unwrap()]);
        (work, origin)
    }

    #[tokio::test]
    async fn clean_repo_has_no_changes() {
        if !git_available() {
            return;
        }
        let root = TempDir::new().unwrap();
        let (work, _) = repo_with_origin(&root);
        let publisher = GitPublisher::new(&work, GitIdentity::default());
        assert!(!publisher.has_changes().await.unwrap());
    }

    #[tokio::test]
    async fn publish_branch_commits_json_and_pushes() {
        if !git_available() {
            return;
        }
        let root = TempDir::new().unwrap();
        let (work, origin) = repo_with_origin(&root);
        fs::create_dir_all(work.join("i18n")).unwrap();
        fs::write(work.join("i18n").join("de.json"), "{\"a\":\"b\"}\n").unwrap();
        fs::write(work.join("notes.txt"), "not staged\n").unwrap();

        let publisher = GitPublisher::new(&work, GitIdentity::default());
        let changed = publisher.changed_files().await.unwrap();
        assert!(!changed.is_empty());

        publisher
            .publish_branch("chore/phrase/update_i18n")
            .await
            .expect("publish");

        let branches = git(&origin, &["branch", "--list"]);
        assert!(branches.contains("chore/phrase/update_i18n"), "{branches}");

        let files = git(&work, &["show", "--name-only", "--format=%an <%ae>%n%s", "HEAD"]);
        assert!(files.contains("Phrase Devops <phrase@devops.com>"));
        assert!(files.contains(COMMIT_MESSAGE));
        assert!(files.contains("i18n/de.json"));
        assert!(!files.contains("notes.txt"), "only json files are staged");
    }

    #[tokio::test]
    async fn failing_git_command_reports_stderr() {
        if !git_available() {
            return;
        }
        let root = TempDir::new().unwrap();
        let publisher = GitPublisher::new(root.path(), GitIdentity::default());
        let err = publisher.changed_files().await.expect_err("not a repo");
        match err {
            PublishError::Git { command, stderr } => {
                assert_eq!(command, "status");
                assert!(!stderr.is_empty());
            }
            other => panic!("expected git error, got {other:?}"),
        }
    }
}
