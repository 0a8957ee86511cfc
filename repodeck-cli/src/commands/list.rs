//! `repodeck list [--json]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use repodeck_core::store;

/// Show the registered repositories.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ListedRepo {
    position: usize,
    label: String,
    path: String,
    active: bool,
}

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "label")]
    label: String,
    #[tabled(rename = "path")]
    path: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home_dir()?;
        let registry = store::load_at(&home)
            .context("failed to load registry; run `repodeck init` first")?;
        let active = super::active_label(&home, &registry)?;

        let repos: Vec<ListedRepo> = registry
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| ListedRepo {
                position: i + 1,
                label: entry.label.to_string(),
                path: entry.path.to_string(),
                active: active.as_ref() == Some(&entry.label),
            })
            .collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&repos).context("failed to render registry JSON")?
            );
            return Ok(());
        }

        let rows = repos.into_iter().map(|repo| ListRow {
            position: repo.position,
            marker: if repo.active {
                "●".green().bold().to_string()
            } else {
                String::new()
            },
            label: repo.label,
            path: repo.path,
        });
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
