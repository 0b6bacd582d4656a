//! Argument handling and early failures of the `phrasebridge` binary.
//!
//! None of these cases reach the network: each one fails during argument
//! parsing or settings and config validation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PIPELINE_ENV: &[&str] = &[
    "PHRASEAPP_TOKEN",
    "PHRASEAPP_API_URL",
    "PHRASE_CONFIG",
    "PHRASE_SYNC_DIRECTION",
    "REMOVE_UNMENTIONED_KEYS",
    "SYSTEM_ACCESSTOKEN",
    "SYSTEM_TEAMFOUNDATIONCOLLECTIONURI",
    "SYSTEM_TEAMPROJECTID",
    "BUILD_REPOSITORY_ID",
    "GIT_USER_MAIL",
    "GIT_USER_NAME",
    "RUST_LOG",
];

fn phrasebridge() -> Command {
    let mut cmd = Command::cargo_bin("phrasebridge").expect("phrasebridge binary");
    for var in PIPELINE_ENV {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_subcommands() {
    phrasebridge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("locales"))
        .stdout(predicate::str::contains("diff"));
}

#[test]
fn sync_requires_direction() {
    phrasebridge()
        .args(["sync", "--phrase-token", "t"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--direction"));
}

#[test]
fn sync_rejects_unknown_direction() {
    phrasebridge()
        .args(["sync", "--phrase-token", "t", "--direction", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown sync direction 'sideways'"));
}

#[test]
fn sync_requires_phrase_token() {
    phrasebridge()
        .args(["sync", "--direction", "push"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--phrase-token"));
}

#[test]
fn direction_is_read_from_environment() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("missing.json");

    phrasebridge()
        .env("PHRASEAPP_TOKEN", "t")
        .env("PHRASE_SYNC_DIRECTION", "PUSH")
        .args(["sync", "--dry-run", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("push failed"))
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn missing_config_is_reported_with_its_path() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("phrase.json");

    phrasebridge()
        .args(["sync", "--phrase-token", "t", "--direction", "push", "--dry-run"])
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}

#[test]
fn empty_project_list_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("phrase.json");
    std::fs::write(&config, r#"{"projects": []}"#).unwrap();

    phrasebridge()
        .args(["sync", "--phrase-token", "t", "--direction", "push", "--dry-run"])
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no phrase projects configured"));
}

#[test]
fn pull_without_azure_settings_names_what_is_missing() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("phrase.json");
    std::fs::write(
        &config,
        r#"{"projects": [{"name": "web", "project_id": "p", "locale_path": "i18n", "default_locale": "en"}]}"#,
    )
    .unwrap();

    phrasebridge()
        .args(["sync", "--phrase-token", "t", "--direction", "pull"])
        .arg("--azure-project-id")
        .arg("proj")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("azure token"))
        .stderr(predicate::str::contains("azure devops uri"))
        .stderr(predicate::str::contains("azure project id").not());
}

#[test]
fn remove_unmentioned_keys_rejects_non_boolean_values() {
    phrasebridge()
        .args([
            "sync",
            "--phrase-token",
            "t",
            "--direction",
            "push",
            "--remove-unmentioned-keys",
            "maybe",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--remove-unmentioned-keys"));
}

#[test]
fn sync_help_shows_poll_defaults() {
    phrasebridge()
        .args(["sync", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--poll-interval-ms <POLL_INTERVAL_MS>"))
        .stdout(predicate::str::contains("[default: 1000]"))
        .stdout(predicate::str::contains("[default: 5]"));
}
