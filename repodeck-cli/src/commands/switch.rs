//! `repodeck switch [<label>]`: the selector.
//!
//! Without a label it prints the menu the selector would show. Picking the
//! `__manage_repos__` value opens `repodeck manage` instead of switching.

use std::io;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use repodeck_core::{store, Label};
use repodeck_session::{Choice, Selector, SelectorView, MANAGE_SENTINEL};

use super::Authority;

/// Show the selector, or make a repository the active one.
#[derive(Args, Debug)]
pub struct SwitchArgs {
    /// Label to switch to, or `__manage_repos__` to open the manager.
    pub label: Option<String>,

    /// Daemon base URL; overrides `server` in config.yaml.
    #[arg(long)]
    pub server: Option<String>,
}

impl SwitchArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home_dir()?;
        let config = super::load_config(&home)?;
        let authority = Authority::resolve(&home, self.server, &config);
        let (registry, manage_enabled) = authority.snapshot(&config)?;
        let current = super::active_label(&home, &registry)?.unwrap_or_else(|| Label::from(""));
        let selector = Selector::new(&registry.entries, &current, manage_enabled);

        let Some(value) = self.label else {
            print_view(&selector.view());
            return Ok(());
        };

        if value == MANAGE_SENTINEL && !manage_enabled {
            bail!("repository management is disabled");
        }
        if value != MANAGE_SENTINEL && !registry.contains_label(&Label::from(value.as_str())) {
            bail!("unknown repository '{value}'");
        }

        let mut switched = None;
        let mut open_manager = false;
        let shown = selector.choose(
            &value,
            |label| switched = Some(label.clone()),
            || open_manager = true,
        );

        if let Some(label) = switched {
            store::save_active_at(&home, &label).context("failed to save active selection")?;
            println!("{} Switched to '{}'", "✓".green(), label);
        } else if open_manager {
            let stdin = io::stdin();
            let stdout = io::stdout();
            super::manage::run_session(&home, &authority, &config, stdin.lock(), stdout.lock())?;
        } else if let Some(label) = shown {
            println!("Active repository: {label}");
        }
        Ok(())
    }
}

fn print_view(view: &SelectorView) {
    match view {
        SelectorView::Hidden => println!("No repositories registered"),
        SelectorView::Static(label) => println!("{label}"),
        SelectorView::Menu { choices, selected } => {
            for choice in choices {
                match choice {
                    Choice::Repo(label) if label == selected => {
                        println!("{} {}", "●".green().bold(), label.as_str().bold())
                    }
                    Choice::Repo(label) => println!("  {label}"),
                    Choice::Separator => println!("  {}", choice.title().dimmed()),
                    Choice::Manage => println!(
                        "  {}  (repodeck switch {})",
                        choice.title(),
                        MANAGE_SENTINEL
                    ),
                }
            }
        }
    }
}
