//! repodeck daemon: the persistence backend behind the validate and update
//! endpoints, served over HTTP.

mod error;
mod runtime;

pub use error::DaemonError;
pub use runtime::{init_tracing, router, run, serve, start_blocking, AppState};
