//! Entry checks.
//!
//! [`validate_local`] is the pure pre-filter run by a client before it asks
//! the backend anything. [`check_on_disk`] and [`check_registry`] are the
//! backend's authoritative checks; they reuse the local rules so both sides
//! report emptiness and duplicates with the same messages.

use std::path::Path;

use crate::error::{EntryError, RegistryError};
use crate::types::Entry;

/// Check `candidate` against `snapshot`.
///
/// Rules run in a fixed order and the first failure wins: empty label, empty
/// path, duplicate label, duplicate path. `exempt` is the entry being edited;
/// it is skipped by value in both duplicate checks.
pub fn validate_local(
    candidate: &Entry,
    snapshot: &[Entry],
    exempt: Option<&Entry>,
) -> Result<(), EntryError> {
    if candidate.label.as_str().trim().is_empty() {
        return Err(EntryError::EmptyLabel);
    }
    if candidate.path.as_str().trim().is_empty() {
        return Err(EntryError::EmptyPath);
    }

    let others = || snapshot.iter().filter(move |e| Some(*e) != exempt);

    if others().any(|e| e.label == candidate.label) {
        return Err(EntryError::DuplicateLabel(candidate.label.clone()));
    }
    if others().any(|e| e.path == candidate.path) {
        return Err(EntryError::DuplicatePath(candidate.path.clone()));
    }
    Ok(())
}

/// Whole-registry invariants: at least one entry, no empty fields, labels and
/// paths pairwise distinct.
pub fn check_registry(entries: &[Entry]) -> Result<(), RegistryError> {
    if entries.is_empty() {
        return Err(RegistryError::Empty);
    }
    for (i, entry) in entries.iter().enumerate() {
        validate_local(entry, &entries[..i], None)?;
    }
    Ok(())
}

/// Authoritative single-entry check: the local emptiness rules, then the path
/// must name an existing directory.
pub fn check_on_disk(entry: &Entry) -> Result<(), RegistryError> {
    validate_local(entry, &[], None)?;

    let path = Path::new(entry.path.as_str());
    if !path.exists() {
        return Err(RegistryError::Path(format!(
            "Path '{}' does not exist",
            entry.path
        )));
    }
    if !path.is_dir() {
        return Err(RegistryError::Path(format!(
            "Path '{}' is not a directory",
            entry.path
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
