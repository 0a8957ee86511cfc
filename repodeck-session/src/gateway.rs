//! Authoritative validation boundary.

use repodeck_core::Entry;

use crate::error::SessionError;

/// Answer of a [`RemoteValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// The authority looked at the entry and refused it.
    Rejected(String),
    /// The authority could not be reached or answered garbage.
    Unreachable(String),
}

impl Verdict {
    /// `Ok(())` for [`Verdict::Valid`], otherwise the matching session error.
    pub fn into_result(self) -> Result<(), SessionError> {
        match self {
            Verdict::Valid => Ok(()),
            Verdict::Rejected(msg) => Err(SessionError::RemoteRejected(msg)),
            Verdict::Unreachable(detail) => Err(SessionError::Transport(detail)),
        }
    }
}

/// Checks a candidate entry with information the client does not have
/// (filesystem existence, backend policy). Called only after local
/// validation passed.
pub trait RemoteValidator {
    fn validate(&self, candidate: &Entry) -> Verdict;
}

impl<T: RemoteValidator + ?Sized> RemoteValidator for &T {
    fn validate(&self, candidate: &Entry) -> Verdict {
        (**self).validate(candidate)
    }
}
