//! `repodeck init <path> [--label <label>]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use repodeck_core::{store, Entry};

/// Create the registry with its first repository.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Absolute or relative path to the repository root directory.
    pub path: PathBuf,

    /// Label shown in the selector. Defaults to the directory name.
    #[arg(long, short = 'l')]
    pub label: Option<String>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home_dir()?;
        let path = self
            .path
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", self.path.display()))?;

        let label = match self.label {
            Some(label) => label,
            None => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .with_context(|| format!("cannot derive a label from '{}'", path.display()))?,
        };

        if store::registry_path_at(&home).exists() {
            let registry = store::load_at(&home).context("failed to load existing registry")?;
            println!(
                "Registry already exists with {} repositories; use `repodeck manage` to edit it",
                registry.len()
            );
            return Ok(());
        }

        let entry = Entry::new(label, path.to_string_lossy().into_owned());
        repodeck_core::validate::check_on_disk(&entry).context("invalid repository")?;
        let registry = store::init_at(&home, entry)
            .with_context(|| format!("failed to init registry with '{}'", path.display()))?;

        if let Some(first) = registry.first() {
            store::save_active_at(&home, &first.label).context("failed to save active selection")?;
            println!("✓ Registered '{}' at {}", first.label, first.path);
        }
        println!("  Saved to: {}", store::registry_path_at(&home).display());
        Ok(())
    }
}
