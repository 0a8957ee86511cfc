//! Error types for repodeck-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Label, RepoPath};

/// Why a candidate entry was refused by the local validator.
///
/// The `Display` text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("Label cannot be empty")]
    EmptyLabel,

    #[error("Path cannot be empty")]
    EmptyPath,

    #[error("Label '{0}' already exists")]
    DuplicateLabel(Label),

    #[error("Path '{0}' already exists")]
    DuplicatePath(RepoPath),
}

/// All errors that can arise from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.repodeck/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The registry YAML file did not exist at the expected path.
    #[error("registry not found at {path}")]
    RegistryNotFound { path: PathBuf },

    /// A registry must keep at least one entry.
    #[error("Registry must contain at least one repository")]
    Empty,

    /// One entry of a full registry breaks an entry rule.
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// A path failed the on-disk check (missing, not a directory).
    #[error("{0}")]
    Path(String),
}
