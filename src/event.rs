//! Filesystem events and their classification into downstream actions.
//!
//! The watch source reports four kinds of change (the inotify masks the
//! monitor subscribes to). Each kind maps deterministically to the action
//! the indexing API should take for the affected path.

use std::fmt;
use std::path::PathBuf;

/// The kinds of filesystem change the monitor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A file opened for writing was closed (the write is complete).
    CloseWrite,
    /// A file was moved into a watched directory.
    MovedTo,
    /// A file was moved out of a watched directory.
    MovedFrom,
    /// A file was deleted.
    Delete,
}

impl EventKind {
    /// Map an event kind to the downstream action.
    ///
    /// Total over all kinds: completed writes and move-ins index the file,
    /// move-outs and deletions remove it from the index.
    pub fn classify(self) -> Action {
        match self {
            EventKind::CloseWrite | EventKind::MovedTo => Action::Index,
            EventKind::MovedFrom | EventKind::Delete => Action::Delete,
        }
    }
}

/// A single filesystem change for one path. Consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub path: PathBuf,
    pub kind: EventKind,
}

impl Event {
    pub fn new(path: impl Into<PathBuf>, kind: EventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// The downstream operation an event triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Index,
    Delete,
}

impl Action {
    /// The path segment of the API endpoint for this action.
    pub fn endpoint(self) -> &'static str {
        match self {
            Action::Index => "index-file",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_matches_action_table() {
        assert_eq!(EventKind::CloseWrite.classify(), Action::Index);
        assert_eq!(EventKind::MovedTo.classify(), Action::Index);
        assert_eq!(EventKind::MovedFrom.classify(), Action::Delete);
        assert_eq!(EventKind::Delete.classify(), Action::Delete);
    }

    #[test]
    fn action_endpoints() {
        assert_eq!(Action::Index.endpoint(), "index-file");
        assert_eq!(Action::Delete.endpoint(), "delete");
        assert_eq!(Action::Delete.to_string(), "delete");
    }
}
