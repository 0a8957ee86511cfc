//! Capabilities the session borrows from its host: asking yes/no questions and
//! moving to another registry entry after a commit.
//!
//! Closures implement both traits, which is what tests use.

use std::fmt;

use repodeck_core::Label;

/// Ask the user a yes/no question before a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Where the host should go after a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    /// The active entry survived; reload it in place.
    Reload,
    /// The active entry is gone; switch to this one.
    Switch(Label),
}

impl fmt::Display for NavTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavTarget::Reload => write!(f, "reload"),
            NavTarget::Switch(label) => write!(f, "switch to '{label}'"),
        }
    }
}

pub trait Navigate {
    fn navigate(&mut self, target: &NavTarget);
}

impl<F> Navigate for F
where
    F: FnMut(&NavTarget),
{
    fn navigate(&mut self, target: &NavTarget) {
        self(target)
    }
}
