//! Read-only selector over the persisted registry.
//!
//! It holds no state of its own: the host passes the registry, the active
//! label and the `manage_repos_enabled` flag on every render.

use repodeck_core::{Entry, Label};

/// Choice value that opens the management session instead of switching.
pub const MANAGE_SENTINEL: &str = "__manage_repos__";
pub const MANAGE_TITLE: &str = "Manage repos...";
const SEPARATOR_TITLE: &str = "────────";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Repo(Label),
    /// Not selectable.
    Separator,
    Manage,
}

impl Choice {
    /// Value submitted when this choice is picked; `None` for the separator.
    pub fn value(&self) -> Option<&str> {
        match self {
            Choice::Repo(label) => Some(label.as_str()),
            Choice::Separator => None,
            Choice::Manage => Some(MANAGE_SENTINEL),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Choice::Repo(label) => label.as_str(),
            Choice::Separator => SEPARATOR_TITLE,
            Choice::Manage => MANAGE_TITLE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorView {
    /// Nothing to show.
    Hidden,
    /// A single entry and no management: plain text, no switching.
    Static(Label),
    Menu {
        choices: Vec<Choice>,
        selected: Label,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Selector<'a> {
    entries: &'a [Entry],
    current: &'a Label,
    manage_enabled: bool,
}

impl<'a> Selector<'a> {
    pub fn new(entries: &'a [Entry], current: &'a Label, manage_enabled: bool) -> Self {
        Self {
            entries,
            current,
            manage_enabled,
        }
    }

    /// The active entry, or the first one when the active label is unknown.
    pub fn current(&self) -> Option<&'a Entry> {
        self.entries
            .iter()
            .find(|e| &e.label == self.current)
            .or_else(|| self.entries.first())
    }

    fn is_interactive(&self) -> bool {
        self.manage_enabled || self.entries.len() > 1
    }

    pub fn view(&self) -> SelectorView {
        let Some(current) = self.current() else {
            return SelectorView::Hidden;
        };
        if !self.is_interactive() {
            return SelectorView::Static(current.label.clone());
        }

        let mut choices: Vec<Choice> = self
            .entries
            .iter()
            .map(|e| Choice::Repo(e.label.clone()))
            .collect();
        if self.manage_enabled {
            choices.push(Choice::Separator);
            choices.push(Choice::Manage);
        }
        SelectorView::Menu {
            choices,
            selected: current.label.clone(),
        }
    }

    /// Handle the user picking `value`.
    ///
    /// The sentinel calls `on_manage`; a known label calls `on_switch`. Returns
    /// the label the control shows afterwards, which stays the active one for
    /// the sentinel and for unknown values.
    pub fn choose<S, M>(&self, value: &str, on_switch: S, on_manage: M) -> Option<Label>
    where
        S: FnOnce(&Label),
        M: FnOnce(),
    {
        let current = self.current()?.label.clone();
        if !self.is_interactive() {
            return Some(current);
        }

        if value == MANAGE_SENTINEL {
            if self.manage_enabled {
                on_manage();
            }
            return Some(current);
        }

        match self.entries.iter().find(|e| e.label.as_str() == value) {
            Some(entry) => {
                on_switch(&entry.label);
                Some(entry.label.clone())
            }
            None => Some(current),
        }
    }
}
