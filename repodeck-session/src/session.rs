//! Management session: a working copy of the registry, the open sub-dialog, and
//! the operations that move the working copy away from its seed.
//!
//! All operations take `&mut self`, so a validation or commit call that is
//! still waiting on the gateway/backend excludes every other mutation.

use repodeck_core::{validate_local, Entry, Label, Registry};

use crate::backend::RegistryBackend;
use crate::commit::{self, CommitOutcome};
use crate::error::SessionError;
use crate::gateway::RemoteValidator;
use crate::hooks::{Confirm, NavTarget, Navigate};

pub const DISCARD_PROMPT: &str = "Discard all changes?";

/// Which sub-dialog is open. At most one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Dialog {
    #[default]
    Closed,
    Adding,
    /// `original` is the value being edited; its position is looked up again
    /// once validation returns.
    Editing { index: usize, original: Entry },
}

impl Dialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, Dialog::Closed)
    }
}

/// Outcome of [`ManageSession::remove`] when the operation was allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Removed(Entry),
    /// The user said no at the confirmation prompt.
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// The session may be dropped.
    Close,
    Stay,
}

#[derive(Debug, Clone)]
pub struct ManageSession {
    seed: Vec<Entry>,
    working: Vec<Entry>,
    active: Label,
    dialog: Dialog,
    last_error: Option<String>,
}

impl ManageSession {
    /// Start a session over a copy of the persisted registry.
    pub fn open(seed: Registry, active: Label) -> Self {
        tracing::debug!(entries = seed.len(), %active, "management session opened");
        Self {
            working: seed.entries.clone(),
            seed: seed.entries,
            active,
            dialog: Dialog::Closed,
            last_error: None,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.working
    }

    pub fn seed(&self) -> &[Entry] {
        &self.seed
    }

    pub fn active(&self) -> &Label {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    /// Pending-change flag: the working copy differs from the seed as an
    /// ordered sequence.
    pub fn has_changes(&self) -> bool {
        self.working != self.seed
    }

    pub fn can_remove(&self) -> bool {
        self.working.len() > 1
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    /// Message of the most recent refused operation, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // -----------------------------------------------------------------------
    // Dialog flow
    // -----------------------------------------------------------------------

    pub fn begin_add(&mut self) -> Result<(), SessionError> {
        let result = self.ensure_no_dialog().map(|()| {
            self.dialog = Dialog::Adding;
        });
        self.record(result)
    }

    pub fn begin_edit(&mut self, index: usize) -> Result<&Entry, SessionError> {
        let result = self.ensure_no_dialog().and_then(|()| self.entry(index).cloned());
        let original = self.record(result)?;
        self.dialog = Dialog::Editing { index, original };
        Ok(&self.working[index])
    }

    pub fn cancel_dialog(&mut self) {
        self.dialog = Dialog::Closed;
    }

    /// Save the open dialog: add or edit depending on which one is open. The
    /// dialog stays open on failure so the user can correct the input.
    pub fn submit<G>(&mut self, candidate: Entry, gateway: &G) -> Result<(), SessionError>
    where
        G: RemoteValidator + ?Sized,
    {
        let result = match self.dialog.clone() {
            Dialog::Closed => Err(SessionError::NoDialog),
            Dialog::Adding => self.apply_add(candidate, gateway),
            Dialog::Editing { index, original } => {
                self.apply_edit(index, &original, candidate, gateway)
            }
        };
        if result.is_ok() {
            self.dialog = Dialog::Closed;
        }
        self.record(result)
    }

    // -----------------------------------------------------------------------
    // Working-registry operations
    // -----------------------------------------------------------------------

    /// Validate `candidate` against the working copy, then the gateway, then append.
    pub fn add<G>(&mut self, candidate: Entry, gateway: &G) -> Result<(), SessionError>
    where
        G: RemoteValidator + ?Sized,
    {
        let result = self
            .ensure_no_dialog()
            .and_then(|()| self.apply_add(candidate, gateway));
        self.record(result)
    }

    /// Validate `candidate` with the entry at `index` exempt, then replace it in place.
    pub fn edit<G>(&mut self, index: usize, candidate: Entry, gateway: &G) -> Result<(), SessionError>
    where
        G: RemoteValidator + ?Sized,
    {
        let result = self
            .ensure_no_dialog()
            .and_then(|()| self.entry(index).cloned())
            .and_then(|original| self.apply_edit(index, &original, candidate, gateway));
        self.record(result)
    }

    /// Remove the entry at `index` after the user confirms.
    ///
    /// Refused without asking when only one entry is left.
    pub fn remove<C>(&mut self, index: usize, confirm: &mut C) -> Result<Removal, SessionError>
    where
        C: Confirm + ?Sized,
    {
        let result = self.apply_remove(index, confirm);
        self.record(result)
    }

    /// Swap the entry at `index` with the one above it. `Ok(false)` at the top.
    pub fn move_up(&mut self, index: usize) -> Result<bool, SessionError> {
        let result = self.ensure_no_dialog().and_then(|()| {
            self.entry(index)?;
            if index == 0 {
                return Ok(false);
            }
            self.working.swap(index - 1, index);
            tracing::debug!(index, "entry moved up");
            Ok(true)
        });
        self.record(result)
    }

    /// Swap the entry at `index` with the one below it. `Ok(false)` at the bottom.
    pub fn move_down(&mut self, index: usize) -> Result<bool, SessionError> {
        let result = self.ensure_no_dialog().and_then(|()| {
            self.entry(index)?;
            if index + 1 == self.working.len() {
                return Ok(false);
            }
            self.working.swap(index, index + 1);
            tracing::debug!(index, "entry moved down");
            Ok(true)
        });
        self.record(result)
    }

    // -----------------------------------------------------------------------
    // Commit / close
    // -----------------------------------------------------------------------

    /// Replace the persisted registry with the working copy.
    ///
    /// With no pending changes nothing is sent. On success the working copy
    /// becomes the new seed and `navigator` is told where to go; on failure the
    /// working copy is kept as-is for a retry.
    pub fn commit<B, N>(&mut self, backend: &B, navigator: &mut N) -> Result<CommitOutcome, SessionError>
    where
        B: RegistryBackend + ?Sized,
        N: Navigate + ?Sized,
    {
        if let Err(err) = self.ensure_no_dialog() {
            return self.record(Err(err));
        }
        if !self.has_changes() {
            tracing::debug!("commit skipped: no pending changes");
            return Ok(CommitOutcome::NothingToCommit);
        }

        let result = commit::commit(&self.working, &self.active, backend);
        let target = self.record(result)?;

        self.seed = self.working.clone();
        if let NavTarget::Switch(label) = &target {
            self.active = label.clone();
        }
        navigator.navigate(&target);
        Ok(CommitOutcome::Committed(target))
    }

    /// Ask whether the session may be dropped.
    ///
    /// An open sub-dialog is closed first and the session stays. With pending
    /// changes the user must confirm the discard.
    pub fn request_close<C>(&mut self, confirm: &mut C) -> CloseDecision
    where
        C: Confirm + ?Sized,
    {
        if self.dialog.is_open() {
            self.dialog = Dialog::Closed;
            return CloseDecision::Stay;
        }
        if self.has_changes() && !confirm.confirm(DISCARD_PROMPT) {
            return CloseDecision::Stay;
        }
        tracing::debug!(discarded = self.has_changes(), "management session closed");
        CloseDecision::Close
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn apply_add<G>(&mut self, candidate: Entry, gateway: &G) -> Result<(), SessionError>
    where
        G: RemoteValidator + ?Sized,
    {
        validate_local(&candidate, &self.working, None)?;
        gateway.validate(&candidate).into_result()?;

        tracing::debug!(label = %candidate.label, "entry added");
        self.working.push(candidate);
        Ok(())
    }

    fn apply_edit<G>(
        &mut self,
        index: usize,
        original: &Entry,
        candidate: Entry,
        gateway: &G,
    ) -> Result<(), SessionError>
    where
        G: RemoteValidator + ?Sized,
    {
        validate_local(&candidate, &self.working, Some(original))?;
        gateway.validate(&candidate).into_result()?;

        let index = self
            .working
            .iter()
            .position(|e| e == original)
            .ok_or(SessionError::NoSuchEntry(index))?;
        tracing::debug!(index, label = %candidate.label, "entry edited");
        self.working[index] = candidate;
        Ok(())
    }

    fn apply_remove<C>(&mut self, index: usize, confirm: &mut C) -> Result<Removal, SessionError>
    where
        C: Confirm + ?Sized,
    {
        self.ensure_no_dialog()?;
        if !self.can_remove() {
            return Err(SessionError::LastEntry);
        }
        let label = self.entry(index)?.label.clone();

        let prompt = format!("Remove '{label}'? (Not saved until Apply)");
        if !confirm.confirm(&prompt) {
            return Ok(Removal::Declined);
        }
        tracing::debug!(index, %label, "entry removed");
        Ok(Removal::Removed(self.working.remove(index)))
    }

    fn entry(&self, index: usize) -> Result<&Entry, SessionError> {
        self.working
            .get(index)
            .ok_or(SessionError::NoSuchEntry(index))
    }

    fn ensure_no_dialog(&self) -> Result<(), SessionError> {
        if self.dialog.is_open() {
            Err(SessionError::DialogOpen)
        } else {
            Ok(())
        }
    }

    fn record<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(err) => {
                tracing::debug!(error = %err, "session operation refused");
                self.last_error = Some(err.to_string());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Verdict;

    struct Accept;

    impl RemoteValidator for Accept {
        fn validate(&self, _candidate: &Entry) -> Verdict {
            Verdict::Valid
        }
    }

    fn session() -> ManageSession {
        ManageSession::open(
            Registry::new(vec![
                Entry::new("a", "/x"),
                Entry::new("b", "/y"),
                Entry::new("c", "/z"),
            ]),
            Label::from("a"),
        )
    }

    fn labels(s: &ManageSession) -> Vec<&str> {
        s.entries().iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn move_is_a_swap_not_a_rotate() {
        let mut s = session();
        assert_eq!(s.move_down(0), Ok(true));
        assert_eq!(labels(&s), ["b", "a", "c"]);
        assert_eq!(s.move_up(2), Ok(true));
        assert_eq!(labels(&s), ["b", "c", "a"]);
    }

    #[test]
    fn moves_at_boundaries_are_noops() {
        let mut s = session();
        assert_eq!(s.move_up(0), Ok(false));
        assert_eq!(s.move_down(2), Ok(false));
        assert_eq!(labels(&s), ["a", "b", "c"]);
        assert!(!s.has_changes());
    }

    #[test]
    fn move_out_of_range_is_an_error() {
        let mut s = session();
        assert_eq!(s.move_up(3), Err(SessionError::NoSuchEntry(3)));
        assert_eq!(s.last_error(), Some("No repository at index 3"));
    }

    #[test]
    fn moving_back_clears_pending_flag() {
        let mut s = session();
        s.move_down(0).expect("down");
        assert!(s.has_changes());
        s.move_up(1).expect("up");
        assert!(!s.has_changes());
    }

    #[test]
    fn dialogs_are_exclusive() {
        let mut s = session();
        s.begin_add().expect("add dialog");
        assert_eq!(s.begin_edit(0).unwrap_err(), SessionError::DialogOpen);
        assert_eq!(s.move_up(1), Err(SessionError::DialogOpen));
        s.cancel_dialog();
        assert_eq!(s.begin_edit(1).expect("edit dialog").label.as_str(), "b");
        assert_eq!(
            s.dialog(),
            &Dialog::Editing {
                index: 1,
                original: Entry::new("b", "/y")
            }
        );
    }

    #[test]
    fn submit_without_dialog_is_refused() {
        let mut s = session();
        let err = s.submit(Entry::new("d", "/w"), &Accept).unwrap_err();
        assert_eq!(err, SessionError::NoDialog);
    }

    #[test]
    fn failed_submit_keeps_dialog_open() {
        let mut s = session();
        s.begin_add().expect("dialog");
        let err = s.submit(Entry::new("", "/w"), &Accept).unwrap_err();
        assert_eq!(err.to_string(), "Label cannot be empty");
        assert_eq!(s.dialog(), &Dialog::Adding);

        s.submit(Entry::new("d", "/w"), &Accept).expect("second try");
        assert_eq!(s.dialog(), &Dialog::Closed);
        assert_eq!(s.last_error(), None);
        assert_eq!(labels(&s), ["a", "b", "c", "d"]);
    }

    #[test]
    fn close_with_open_dialog_closes_dialog_only() {
        let mut s = session();
        s.begin_add().expect("dialog");
        let mut never = |_: &str| -> bool { panic!("must not prompt") };
        assert_eq!(s.request_close(&mut never), CloseDecision::Stay);
        assert_eq!(s.dialog(), &Dialog::Closed);
        assert_eq!(s.request_close(&mut never), CloseDecision::Close);
    }
}
