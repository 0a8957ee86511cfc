//! Domain types for the repodeck registry.
//!
//! A repository path is kept as an opaque string ([`RepoPath`]): the core only
//! compares paths for uniqueness, existence checks belong to the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The user-facing name of a registry entry. Compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(pub String);

impl Label {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Filesystem location of a repository, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoPath(pub String);

impl RepoPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoPath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A single label → path pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub label: Label,
    pub path: RepoPath,
}

impl Entry {
    pub fn new(label: impl Into<Label>, path: impl Into<RepoPath>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.path)
    }
}

/// Ordered collection of entries. Position 0 is the default entry.
///
/// The type does not enforce the uniqueness or minimum-size invariants on its
/// own; see [`crate::validate::check_registry`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    pub entries: Vec<Entry>,
}

impl Registry {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter().map(|e| &e.label)
    }

    pub fn paths(&self) -> impl Iterator<Item = &RepoPath> {
        self.entries.iter().map(|e| &e.path)
    }

    pub fn find(&self, label: &Label) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.label == label)
    }

    pub fn contains_label(&self, label: &Label) -> bool {
        self.find(label).is_some()
    }

    /// The entry a client should treat as active: exact label match, else the first entry.
    pub fn resolve_active(&self, label: Option<&Label>) -> Option<&Entry> {
        label
            .and_then(|l| self.find(l))
            .or_else(|| self.entries.first())
    }
}

impl From<Vec<Entry>> for Registry {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
