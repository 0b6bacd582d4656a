//! `phrasebridge diff` — show what a pull would change, without writing.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use phrasebridge_sync::{diff_locales, pipeline::fetch_project_locales};

use super::PhraseArgs;

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub phrase: PhraseArgs,
}

impl DiffArgs {
    pub async fn run(self) -> Result<()> {
        let client = self.phrase.phrase_settings().client();
        let (project, locales) = fetch_project_locales(&client, &self.phrase.config)
            .await
            .context("failed to fetch locales")?;
        let diffs = diff_locales(&client, &project, &locales, &self.phrase.repo)
            .await
            .context("failed to diff locales")?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in &diffs {
            println!("{}", diff.path.display().to_string().bold());
            for line in diff.unified_diff.lines() {
                if line.starts_with("+++") || line.starts_with("---") {
                    println!("{line}");
                } else if line.starts_with('+') {
                    println!("{}", line.green());
                } else if line.starts_with('-') {
                    println!("{}", line.red());
                } else if line.starts_with("@@") {
                    println!("{}", line.cyan());
                } else {
                    println!("{line}");
                }
            }
        }
        println!("{} file(s) would change", diffs.len());
        Ok(())
    }
}
