//! Error types for repodeck-session.

use thiserror::Error;

use repodeck_core::EntryError;

/// Every way a session operation can be refused.
///
/// The `Display` text is the message shown to the user; none of these end the
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Local pre-check failed (empty or duplicate label/path).
    #[error(transparent)]
    Invalid(#[from] EntryError),

    /// The gateway answered and said no.
    #[error("{0}")]
    RemoteRejected(String),

    /// The gateway could not be asked.
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend refused the full replace; text is the backend's, verbatim.
    #[error("{0}")]
    CommitRejected(String),

    /// The update request got no structured answer.
    #[error("Network error: {0}")]
    CommitTransport(String),

    #[error("At least one repository is required")]
    LastEntry,

    #[error("No repository at index {0}")]
    NoSuchEntry(usize),

    #[error("Finish or cancel the open dialog first")]
    DialogOpen,

    #[error("No add or edit dialog is open")]
    NoDialog,
}

impl SessionError {
    /// True for failures where nothing authoritative was said about the data.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SessionError::Transport(_) | SessionError::CommitTransport(_)
        )
    }
}
