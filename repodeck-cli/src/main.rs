//! repodeck: manage the list of repositories a workspace can switch between.
//!
//! # Usage
//!
//! ```text
//! repodeck init <path> [--label <label>]
//! repodeck list [--json]
//! repodeck switch [<label>] [--server <url>]
//! repodeck validate <label> <path> [--server <url>]
//! repodeck manage [--server <url>]
//! repodeck daemon start|stop|status
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    daemon::DaemonCommand, init::InitArgs, list::ListArgs, manage::ManageArgs,
    switch::SwitchArgs, validate::ValidateArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "repodeck",
    version,
    about = "Keep a labelled list of repositories and switch between them",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the registry with its first repository.
    Init(InitArgs),

    /// Show the registered repositories.
    List(ListArgs),

    /// Show the selector, or make a repository the active one.
    Switch(SwitchArgs),

    /// Check whether a repository could be added.
    Validate(ValidateArgs),

    /// Edit the registry interactively and apply all changes at once.
    Manage(ManageArgs),

    /// Run or control the registry daemon.
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    if !matches!(cli.command, Commands::Daemon { .. }) {
        init_tracing();
    }
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::List(args) => args.run(),
        Commands::Switch(args) => args.run(),
        Commands::Validate(args) => args.run(),
        Commands::Manage(args) => args.run(),
        Commands::Daemon { command } => commands::daemon::run(command),
    }
}

/// Warnings only unless `RUST_LOG` says otherwise; the daemon installs its own.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
