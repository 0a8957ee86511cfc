//! Persistence boundary used by the commit coordinator.

use repodeck_core::Entry;

/// Answer of a [`RegistryBackend`] to a full replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitReply {
    Accepted,
    /// The backend refused; its message is shown verbatim.
    Rejected(String),
    /// No structured answer arrived.
    Unreachable(String),
}

/// Stores a complete, ordered registry in one all-or-nothing operation.
pub trait RegistryBackend {
    fn replace(&self, entries: &[Entry]) -> CommitReply;
}

impl<T: RegistryBackend + ?Sized> RegistryBackend for &T {
    fn replace(&self, entries: &[Entry]) -> CommitReply {
        (**self).replace(entries)
    }
}
