//! `repodeck daemon`: run or control the registry daemon.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use repodeck_core::Config;
use repodeck_daemon::start_blocking;
use repodeck_session::{HttpClient, SessionError};

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Run the daemon in the foreground.
    Start(StartArgs),
    /// Ask a running daemon to shut down.
    Stop(TargetArgs),
    /// Report whether the daemon answers and what it serves.
    Status(TargetArgs),
}

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Listen address; overrides `bind` in config.yaml.
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Daemon base URL. Defaults to `server` in config.yaml, then to the bind address.
    #[arg(long)]
    pub server: Option<String>,
}

impl TargetArgs {
    fn client(self, config: &Config) -> HttpClient {
        let url = self
            .server
            .or_else(|| config.server.clone())
            .unwrap_or_else(|| format!("http://{}", config.bind));
        HttpClient::new(url, Duration::from_secs(config.timeout_secs))
    }
}

pub fn run(command: DaemonCommand) -> Result<()> {
    let home = super::home_dir()?;
    let config = super::load_config(&home)?;

    match command {
        DaemonCommand::Start(args) => {
            let bind = args.bind.unwrap_or_else(|| config.bind.clone());
            start_blocking(&home, &bind).context("daemon exited with error")?;
        }
        DaemonCommand::Stop(args) => {
            let client = args.client(&config);
            match client.shutdown() {
                Ok(()) => println!("daemon stop requested"),
                Err(SessionError::Transport(_)) => println!("daemon is not running"),
                Err(err) => return Err(err).context("failed to stop daemon"),
            }
        }
        DaemonCommand::Status(args) => {
            let client = args.client(&config);
            let payload = match client.health() {
                Ok(()) => {
                    // A daemon without a registry yet still counts as running.
                    let listed = client.fetch().ok();
                    serde_json::json!({
                        "running": true,
                        "url": client.base_url(),
                        "repos": listed.as_ref().map(|l| l.repos.len()),
                        "manage_repos_enabled": listed.as_ref().map(|l| l.manage_repos_enabled),
                    })
                }
                Err(err) if err.is_transport() => serde_json::json!({
                    "running": false,
                    "url": client.base_url(),
                    "error": err.to_string(),
                }),
                Err(err) => return Err(err).context("failed to query daemon status"),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to render daemon status JSON")?
            );
        }
    }

    Ok(())
}
