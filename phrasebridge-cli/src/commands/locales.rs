//! `phrasebridge locales` — list the Phrase locales of the configured project.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use phrasebridge_core::Locale;
use phrasebridge_sync::pipeline::fetch_project_locales;

use super::PhraseArgs;

#[derive(Args, Debug)]
pub struct LocalesArgs {
    #[command(flatten)]
    pub phrase: PhraseArgs,

    /// Emit the locale list as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct LocaleRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "code")]
    code: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "default")]
    default: String,
    #[tabled(rename = "file")]
    file: String,
}

impl LocalesArgs {
    pub async fn run(self) -> Result<()> {
        let client = self.phrase.phrase_settings().client();
        let (project, locales) = fetch_project_locales(&client, &self.phrase.config)
            .await
            .context("failed to list locales")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&locales).context("failed to render locales JSON")?
            );
            return Ok(());
        }

        println!("Project '{}' ({})", project.name, project.project_id);
        if locales.is_empty() {
            println!("No locales.");
            return Ok(());
        }

        let rows: Vec<LocaleRow> = locales
            .iter()
            .map(|locale| row(locale, &project.default_locale, &project.locale_file(&locale.name)))
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn row(locale: &Locale, default_locale: &str, file: &std::path::Path) -> LocaleRow {
    LocaleRow {
        name: locale.name.clone(),
        code: locale.code.clone(),
        id: locale.id.to_string(),
        default: if locale.name == default_locale { "yes" } else { "" }.to_string(),
        file: file.display().to_string(),
    }
}
