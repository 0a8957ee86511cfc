//! repodeck core library: domain types, entry validation, registry persistence.
//!
//! Public API surface:
//! - [`types`]: newtypes, [`Entry`] and the ordered [`Registry`]
//! - [`validate`]: local entry checks and whole-registry invariants
//! - [`error`]: [`RegistryError`], [`EntryError`]
//! - [`store`]: load / save / init of `~/.repodeck/repos.yaml`
//! - [`config`]: `~/.repodeck/config.yaml`
//! - [`wire`]: JSON bodies of the validate / update endpoints

pub mod config;
pub mod error;
pub mod store;
pub mod types;
pub mod validate;
pub mod wire;

pub use config::Config;
pub use error::{EntryError, RegistryError};
pub use types::{Entry, Label, Registry, RepoPath};
pub use validate::{check_registry, validate_local};
