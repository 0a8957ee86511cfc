//! `repodeck validate <label> <path>`: the checks `add` runs, without adding.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use repodeck_core::{validate_local, Entry};
use repodeck_session::RemoteValidator;

use super::Authority;

/// Check whether a repository could be added.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    pub label: String,

    pub path: String,

    /// Daemon base URL; overrides `server` in config.yaml.
    #[arg(long)]
    pub server: Option<String>,
}

impl ValidateArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home_dir()?;
        let config = super::load_config(&home)?;
        let authority = Authority::resolve(&home, self.server, &config);
        let (registry, _) = authority.snapshot(&config)?;

        let candidate = Entry::new(self.label, self.path);
        if let Err(err) = validate_local(&candidate, &registry.entries, None) {
            bail!("{err}");
        }
        if let Err(err) = authority.validate(&candidate).into_result() {
            bail!("{err}");
        }

        println!("{} '{}' can be added", "✓".green(), candidate);
        Ok(())
    }
}
