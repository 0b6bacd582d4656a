//! Subcommands plus the Phrase arguments they share.

pub mod diff;
pub mod locales;
pub mod sync;

use std::path::PathBuf;

use clap::Args;

use phrasebridge_core::config::DEFAULT_CONFIG_FILE;
use phrasebridge_phrase::DEFAULT_API_URL;
use phrasebridge_sync::{PhraseSettings, SyncSettings};

/// Phrase access and project location, shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct PhraseArgs {
    /// Phrase API access token.
    #[arg(long, env = "PHRASEAPP_TOKEN", hide_env_values = true)]
    pub phrase_token: String,

    /// Phrase API base URL.
    #[arg(long, env = "PHRASEAPP_API_URL", default_value = DEFAULT_API_URL)]
    pub phrase_api_url: String,

    /// Path of the project list (`{"projects": [...]}`).
    #[arg(long = "config", env = "PHRASE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Repository root that locale paths in the config are relative to.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
}

impl PhraseArgs {
    pub fn phrase_settings(&self) -> PhraseSettings {
        PhraseSettings {
            token: self.phrase_token.clone(),
            api_url: self.phrase_api_url.clone(),
        }
    }

    pub fn settings(&self) -> SyncSettings {
        let mut settings = SyncSettings::new(self.config.clone(), self.phrase_settings());
        settings.repo_root = self.repo.clone();
        settings
    }
}
