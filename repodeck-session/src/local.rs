//! In-process backend over `~/.repodeck/`, used when no daemon is configured.

use std::path::{Path, PathBuf};

use repodeck_core::{store, validate, Entry};

use crate::backend::{CommitReply, RegistryBackend};
use crate::gateway::{RemoteValidator, Verdict};

/// Runs the same checks as the daemon's validate and update endpoints.
#[derive(Debug, Clone)]
pub struct LocalAuthority {
    home: PathBuf,
}

impl LocalAuthority {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}

impl RemoteValidator for LocalAuthority {
    fn validate(&self, candidate: &Entry) -> Verdict {
        match validate::check_on_disk(candidate) {
            Ok(()) => Verdict::Valid,
            Err(err) => Verdict::Rejected(err.to_string()),
        }
    }
}

impl RegistryBackend for LocalAuthority {
    fn replace(&self, entries: &[Entry]) -> CommitReply {
        // A failed local write is still an answer from the backend, never a transport failure.
        match store::replace_at(&self.home, entries) {
            Ok(()) => CommitReply::Accepted,
            Err(err) => CommitReply::Rejected(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repodeck_core::Registry;
    use tempfile::TempDir;

    fn dir_entry(label: &str, dir: &TempDir) -> Entry {
        Entry::new(label, dir.path().to_string_lossy().into_owned())
    }

    #[test]
    fn validate_checks_the_filesystem() {
        let home = TempDir::new().expect("home");
        let repo = TempDir::new().expect("repo");
        let authority = LocalAuthority::new(home.path());

        assert_eq!(authority.validate(&dir_entry("web", &repo)), Verdict::Valid);

        let gone = repo.path().join("gone").to_string_lossy().into_owned();
        assert_eq!(
            authority.validate(&Entry::new("web", gone.clone())),
            Verdict::Rejected(format!("Path '{gone}' does not exist"))
        );
    }

    #[test]
    fn replace_writes_registry() {
        let home = TempDir::new().expect("home");
        let a = TempDir::new().expect("a");
        let b = TempDir::new().expect("b");
        let authority = LocalAuthority::new(home.path());

        let entries = vec![dir_entry("b", &b), dir_entry("a", &a)];
        assert_eq!(authority.replace(&entries), CommitReply::Accepted);
        assert_eq!(
            store::load_at(home.path()).expect("load"),
            Registry::new(entries)
        );
    }

    #[test]
    fn replace_rejects_empty_registry() {
        let home = TempDir::new().expect("home");
        let authority = LocalAuthority::new(home.path());
        assert_eq!(
            authority.replace(&[]),
            CommitReply::Rejected("Registry must contain at least one repository".to_string())
        );
    }
}
