//! Subcommand implementations and the pieces they share.

pub mod daemon;
pub mod init;
pub mod list;
pub mod manage;
pub mod switch;
pub mod validate;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use repodeck_core::{config, store, Config, Entry, Label, Registry};
use repodeck_session::{
    CommitReply, HttpClient, LocalAuthority, RegistryBackend, RemoteValidator, Verdict,
};

pub(crate) fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

pub(crate) fn load_config(home: &Path) -> Result<Config> {
    config::load_at(home).context("failed to read ~/.repodeck/config.yaml")
}

/// Where validation and commits go: a running daemon, or the files under
/// `~/.repodeck/` when no server is configured.
pub(crate) enum Authority {
    Remote(HttpClient),
    Local(LocalAuthority),
}

impl Authority {
    /// `--server` wins over the config file; neither means offline.
    pub(crate) fn resolve(home: &Path, server: Option<String>, config: &Config) -> Self {
        match server.or_else(|| config.server.clone()) {
            Some(url) => Authority::Remote(HttpClient::new(
                url,
                Duration::from_secs(config.timeout_secs),
            )),
            None => Authority::Local(LocalAuthority::new(home)),
        }
    }

    /// Persisted registry and whether management is offered.
    pub(crate) fn snapshot(&self, config: &Config) -> Result<(Registry, bool)> {
        match self {
            Authority::Remote(client) => {
                let listed = client
                    .fetch()
                    .with_context(|| format!("failed to load registry from {}", client.base_url()))?;
                Ok((listed.repos.into(), listed.manage_repos_enabled))
            }
            Authority::Local(local) => {
                let registry = store::load_at(local.home())
                    .context("failed to load registry; run `repodeck init` first")?;
                Ok((registry, config.manage_repos_enabled))
            }
        }
    }
}

impl RemoteValidator for Authority {
    fn validate(&self, candidate: &Entry) -> Verdict {
        match self {
            Authority::Remote(client) => client.validate(candidate),
            Authority::Local(local) => local.validate(candidate),
        }
    }
}

impl RegistryBackend for Authority {
    fn replace(&self, entries: &[Entry]) -> CommitReply {
        match self {
            Authority::Remote(client) => client.replace(entries),
            Authority::Local(local) => local.replace(entries),
        }
    }
}

/// Active label as stored, resolved against `registry` (first entry when unset or stale).
pub(crate) fn active_label(home: &Path, registry: &Registry) -> Result<Option<Label>> {
    let stored = store::load_active_at(home).context("failed to read active selection")?;
    Ok(registry
        .resolve_active(stored.as_ref())
        .map(|entry| entry.label.clone()))
}
