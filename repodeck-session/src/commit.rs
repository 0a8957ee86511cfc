//! Commit coordinator: one full-replace exchange with the backend, then a
//! navigation decision.

use repodeck_core::{Entry, Label};

use crate::backend::{CommitReply, RegistryBackend};
use crate::error::SessionError;
use crate::hooks::NavTarget;

/// Result of [`crate::ManageSession::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Working copy equals its seed; no request was sent.
    NothingToCommit,
    /// Backend stored the list; the host was sent to this target.
    Committed(NavTarget),
}

/// Send `working` to `backend` as a total replace.
///
/// On success the active entry is reloaded if its label survived, otherwise
/// the host moves to the first committed entry. Failures leave `working`
/// untouched so the caller can retry.
pub fn commit<B>(working: &[Entry], active: &Label, backend: &B) -> Result<NavTarget, SessionError>
where
    B: RegistryBackend + ?Sized,
{
    let Some(first) = working.first() else {
        return Err(SessionError::LastEntry);
    };

    match backend.replace(working) {
        CommitReply::Accepted => {
            let target = if working.iter().any(|e| &e.label == active) {
                NavTarget::Reload
            } else {
                NavTarget::Switch(first.label.clone())
            };
            tracing::info!(entries = working.len(), %target, "registry committed");
            Ok(target)
        }
        CommitReply::Rejected(msg) => {
            tracing::warn!(error = %msg, "backend rejected registry update");
            Err(SessionError::CommitRejected(msg))
        }
        CommitReply::Unreachable(detail) => {
            tracing::warn!(error = %detail, "registry update did not reach backend");
            Err(SessionError::CommitTransport(detail))
        }
    }
}
