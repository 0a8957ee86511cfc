//! `repodeck manage`: line-oriented management session.
//!
//! Edits accumulate in a working copy and reach the backend only on `apply`.
//! Repository numbers in the UI are 1-based.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use repodeck_core::{store, Entry};
use repodeck_session::{CloseDecision, CommitOutcome, ManageSession, NavTarget, Removal};

use super::Authority;

/// Edit the registry interactively and apply all changes at once.
#[derive(Args, Debug)]
pub struct ManageArgs {
    /// Daemon base URL; overrides `server` in config.yaml. Without either the
    /// session works directly on ~/.repodeck/.
    #[arg(long)]
    pub server: Option<String>,
}

impl ManageArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home_dir()?;
        let config = super::load_config(&home)?;
        let authority = Authority::resolve(&home, self.server, &config);
        let stdin = io::stdin();
        let stdout = io::stdout();
        run_session(&home, &authority, &config, stdin.lock(), stdout.lock())
    }
}

const HELP: &str = "\
commands:
  ls          show the working list
  add         add a repository
  edit N      edit repository N
  rm N        remove repository N
  up N        move repository N up
  down N      move repository N down
  apply       save all changes
  quit        leave (asks before discarding changes)
  help        this text";

/// Drive one session over `input`/`output` until apply, quit, or end of input.
pub(crate) fn run_session<R: BufRead, W: Write>(
    home: &Path,
    authority: &Authority,
    config: &repodeck_core::Config,
    input: R,
    output: W,
) -> Result<()> {
    let (registry, manage_enabled) = authority.snapshot(config)?;
    if !manage_enabled {
        bail!("repository management is disabled");
    }
    let active = super::active_label(home, &registry)?.context("registry is empty")?;

    let mut session = ManageSession::open(registry, active);
    let mut console = Console { input, output };
    let mode = match authority {
        Authority::Remote(client) => format!("via {}", client.base_url()),
        Authority::Local(_) => "offline".to_string(),
    };
    writeln!(
        console.output,
        "Managing {} repositories ({mode}). Type `help` for commands.",
        session.len()
    )?;
    print_entries(&mut console.output, &session)?;

    loop {
        let Some(line) = console.read_line("repodeck> ")? else {
            if session.has_changes() {
                writeln!(console.output, "input closed; pending changes discarded")?;
            }
            break;
        };
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let number = words.next();

        match command {
            "ls" | "list" => print_entries(&mut console.output, &session)?,
            "add" => match session.begin_add() {
                Ok(()) => run_dialog(&mut session, authority, &mut console, None)?,
                Err(err) => report(&mut console.output, &err)?,
            },
            "edit" => {
                let Some(index) = parse_number(&mut console.output, number, session.len())? else {
                    continue;
                };
                match session.begin_edit(index).cloned() {
                    Ok(current) => run_dialog(&mut session, authority, &mut console, Some(current))?,
                    Err(err) => report(&mut console.output, &err)?,
                }
            }
            "rm" | "remove" => {
                let Some(index) = parse_number(&mut console.output, number, session.len())? else {
                    continue;
                };
                let mut confirm = |question: &str| console.confirm(question);
                match session.remove(index, &mut confirm) {
                    Ok(Removal::Removed(entry)) => {
                        writeln!(console.output, "removed '{}' (not saved until apply)", entry.label)?
                    }
                    Ok(Removal::Declined) => writeln!(console.output, "kept")?,
                    Err(err) => report(&mut console.output, &err)?,
                }
            }
            "up" | "down" => {
                let Some(index) = parse_number(&mut console.output, number, session.len())? else {
                    continue;
                };
                let moved = if command == "up" {
                    session.move_up(index)
                } else {
                    session.move_down(index)
                };
                match moved {
                    Ok(true) => print_entries(&mut console.output, &session)?,
                    Ok(false) => writeln!(console.output, "already at the {}", edge(command))?,
                    Err(err) => report(&mut console.output, &err)?,
                }
            }
            "apply" => {
                if apply(home, &mut session, authority, &mut console.output)? {
                    break;
                }
            }
            "quit" | "exit" | "q" => {
                let mut confirm = |question: &str| console.confirm(question);
                if session.request_close(&mut confirm) == CloseDecision::Close {
                    break;
                }
            }
            "help" | "?" => writeln!(console.output, "{HELP}")?,
            other => writeln!(console.output, "unknown command '{other}'; type `help`")?,
        }
    }
    Ok(())
}

/// Commit the working copy. Returns `true` once the session is over.
fn apply<W: Write>(
    home: &Path,
    session: &mut ManageSession,
    authority: &Authority,
    output: &mut W,
) -> Result<bool> {
    let mut follow_error = None;
    let resolved = session.active().clone();
    let mut navigate = |target: &NavTarget| {
        let label = match target {
            NavTarget::Reload => &resolved,
            NavTarget::Switch(label) => label,
        };
        if let Err(err) = store::save_active_at(home, label) {
            tracing::warn!(%label, error = %err, "failed to persist active selection");
            follow_error = Some(err);
        }
    };

    match session.commit(authority, &mut navigate) {
        Ok(CommitOutcome::NothingToCommit) => {
            writeln!(output, "no changes to apply")?;
            Ok(false)
        }
        Ok(CommitOutcome::Committed(target)) => {
            if let Some(err) = follow_error {
                return Err(err).context("registry saved but the active selection was not updated");
            }
            let detail = match &target {
                NavTarget::Reload => format!("reloading '{}'", session.active()),
                NavTarget::Switch(label) => format!("switched to '{label}'"),
            };
            writeln!(
                output,
                "{} applied {} repositories; {detail}",
                "✓".green(),
                session.len()
            )?;
            Ok(true)
        }
        Err(err) => {
            report(output, &err)?;
            Ok(false)
        }
    }
}

/// Prompt for label and path until the open dialog is saved or abandoned.
fn run_dialog<R: BufRead, W: Write>(
    session: &mut ManageSession,
    authority: &Authority,
    console: &mut Console<R, W>,
    current: Option<Entry>,
) -> Result<()> {
    loop {
        let label = console.field("label", current.as_ref().map(|e| e.label.as_str()))?;
        let path = match label {
            Some(_) => console.field("path", current.as_ref().map(|e| e.path.as_str()))?,
            None => None,
        };
        let (Some(label), Some(path)) = (label, path) else {
            session.cancel_dialog();
            return Ok(());
        };

        match session.submit(Entry::new(label, path), authority) {
            Ok(()) => {
                writeln!(console.output, "{} saved (not applied yet)", "✓".green())?;
                return Ok(());
            }
            Err(err) => {
                report(&mut console.output, &err)?;
                if !console.confirm("Try again?") {
                    session.cancel_dialog();
                    return Ok(());
                }
            }
        }
    }
}

fn print_entries<W: Write>(output: &mut W, session: &ManageSession) -> Result<()> {
    for (i, entry) in session.entries().iter().enumerate() {
        let marker = if &entry.label == session.active() { "*" } else { " " };
        writeln!(output, "{marker} {:>2}. {}  {}", i + 1, entry.label, entry.path)?;
    }
    if session.has_changes() {
        writeln!(output, "{}", "(unsaved changes; `apply` to save)".yellow())?;
    }
    Ok(())
}

fn report<W: Write>(output: &mut W, err: &dyn std::fmt::Display) -> Result<()> {
    writeln!(output, "{} {err}", "✗".red())?;
    Ok(())
}

/// 1-based number from the UI to a 0-based index. Prints why and returns
/// `None` when the argument is missing or malformed.
fn parse_number<W: Write>(output: &mut W, arg: Option<&str>, len: usize) -> Result<Option<usize>> {
    match arg.and_then(|a| a.parse::<usize>().ok()) {
        Some(n) if (1..=len).contains(&n) => Ok(Some(n - 1)),
        _ => {
            writeln!(output, "expected a repository number between 1 and {len}")?;
            Ok(None)
        }
    }
}

fn edge(command: &str) -> &'static str {
    if command == "up" {
        "top"
    } else {
        "bottom"
    }
}

struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Next line without its line ending, or `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    /// Field prompt; an empty answer keeps `current` when there is one.
    fn field(&mut self, name: &str, current: Option<&str>) -> Result<Option<String>> {
        let prompt = match current {
            Some(value) => format!("{name} [{value}]: "),
            None => format!("{name}: "),
        };
        Ok(self.read_line(&prompt)?.map(|value| match current {
            Some(existing) if value.is_empty() => existing.to_string(),
            _ => value,
        }))
    }

    /// `y`/`yes` means yes; anything else, including end of input, means no.
    fn confirm(&mut self, question: &str) -> bool {
        matches!(
            self.read_line(&format!("{question} [y/N] ")),
            Ok(Some(answer)) if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use repodeck_core::{Config, Label, Registry};
    use repodeck_session::LocalAuthority;
    use tempfile::TempDir;

    use super::*;

    struct Fixture {
        home: TempDir,
        repos: TempDir,
    }

    impl Fixture {
        /// Registry with `a` and `b`, `b` active.
        fn new() -> Self {
            let fixture = Self {
                home: TempDir::new().expect("home"),
                repos: TempDir::new().expect("repos"),
            };
            let entries = ["a", "b"].map(|name| fixture.repo(name));
            store::save_at(fixture.home.path(), &Registry::new(entries.to_vec())).expect("seed");
            store::save_active_at(fixture.home.path(), &Label::from("b")).expect("active");
            fixture
        }

        fn repo(&self, name: &str) -> Entry {
            let dir = self.repos.path().join(name);
            std::fs::create_dir_all(&dir).expect("repo dir");
            Entry::new(name, dir.to_string_lossy().into_owned())
        }

        fn run(&self, script: &str) -> String {
            let authority = Authority::Local(LocalAuthority::new(self.home.path()));
            let mut output = Vec::new();
            run_session(
                self.home.path(),
                &authority,
                &Config::default(),
                Cursor::new(script.as_bytes()),
                &mut output,
            )
            .expect("session");
            String::from_utf8(output).expect("utf8")
        }

        fn persisted_labels(&self) -> Vec<String> {
            store::load_at(self.home.path())
                .expect("load")
                .labels()
                .map(|l| l.to_string())
                .collect()
        }
    }

    #[test]
    fn reload_persists_resolved_active_when_none_was_stored() {
        let fx = Fixture::new();
        std::fs::remove_file(store::active_path_at(fx.home.path())).expect("drop active");
        let out = fx.run("up 2\napply\n");

        assert!(out.contains("reloading 'a'"), "{out}");
        assert_eq!(fx.persisted_labels(), ["b", "a"]);
        assert_eq!(
            store::load_active_at(fx.home.path()).expect("active"),
            Some(Label::from("a"))
        );
    }

    #[test]
    fn add_and_apply_persists_and_reloads() {
        let fx = Fixture::new();
        let c = fx.repo("c");
        let out = fx.run(&format!("add\nc\n{}\napply\n", c.path));

        assert!(out.contains("saved (not applied yet)"), "{out}");
        assert!(out.contains("applied 3 repositories; reloading 'b'"), "{out}");
        assert_eq!(fx.persisted_labels(), ["a", "b", "c"]);
    }

    #[test]
    fn removing_active_repo_switches_selection() {
        let fx = Fixture::new();
        let out = fx.run("rm 2\ny\napply\n");

        assert!(out.contains("Remove 'b'? (Not saved until Apply) [y/N]"), "{out}");
        assert!(out.contains("switched to 'a'"), "{out}");
        assert_eq!(fx.persisted_labels(), ["a"]);
        assert_eq!(
            store::load_active_at(fx.home.path()).expect("active"),
            Some(Label::from("a"))
        );
    }

    #[test]
    fn duplicate_label_keeps_dialog_until_abandoned() {
        let fx = Fixture::new();
        let out = fx.run("add\na\n/elsewhere\nn\nquit\n");

        assert!(out.contains("Label 'a' already exists"), "{out}");
        assert!(out.contains("Try again? [y/N]"), "{out}");
        assert!(!out.contains("Discard all changes?"), "{out}");
        assert_eq!(fx.persisted_labels(), ["a", "b"]);
    }

    #[test]
    fn edit_keeps_current_values_on_empty_answers() {
        let fx = Fixture::new();
        let out = fx.run("edit 1\nalpha\n\napply\n");

        assert!(out.contains("label [a]: "), "{out}");
        assert_eq!(fx.persisted_labels(), ["alpha", "b"]);
    }

    #[test]
    fn quitting_with_changes_asks_first() {
        let fx = Fixture::new();
        let out = fx.run("down 1\nquit\nn\nquit\ny\n");

        assert_eq!(out.matches("Discard all changes? [y/N]").count(), 2, "{out}");
        assert_eq!(fx.persisted_labels(), ["a", "b"], "nothing applied");
    }

    #[test]
    fn moves_and_bad_numbers_are_reported() {
        let fx = Fixture::new();
        let out = fx.run("up 1\nup x\nrm 9\nfrobnicate\napply\n");

        assert!(out.contains("already at the top"), "{out}");
        assert_eq!(
            out.matches("expected a repository number between 1 and 2").count(),
            2,
            "{out}"
        );
        assert!(out.contains("unknown command 'frobnicate'"), "{out}");
        assert!(out.contains("no changes to apply"), "{out}");
    }

    #[test]
    fn end_of_input_discards_pending_changes() {
        let fx = Fixture::new();
        let out = fx.run("down 1\n");
        assert!(out.contains("pending changes discarded"), "{out}");
        assert_eq!(fx.persisted_labels(), ["a", "b"]);
    }
}
