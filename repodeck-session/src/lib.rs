//! # repodeck-session
//!
//! The editing core: a [`ManageSession`] owns a working copy of the registry,
//! validates every add/edit locally and through a [`RemoteValidator`], and
//! commits the whole list through a [`RegistryBackend`] in one replace.
//!
//! [`HttpClient`] speaks to `repodeck-daemon`; [`LocalAuthority`] runs the same
//! backend checks in-process against `~/.repodeck/`.

pub mod backend;
pub mod commit;
pub mod error;
pub mod gateway;
pub mod hooks;
pub mod http;
pub mod local;
pub mod selector;
pub mod session;

pub use backend::{CommitReply, RegistryBackend};
pub use commit::{commit, CommitOutcome};
pub use error::SessionError;
pub use gateway::{RemoteValidator, Verdict};
pub use hooks::{Confirm, NavTarget, Navigate};
pub use http::HttpClient;
pub use local::LocalAuthority;
pub use selector::{Choice, Selector, SelectorView, MANAGE_SENTINEL};
pub use session::{CloseDecision, Dialog, ManageSession, Removal};
