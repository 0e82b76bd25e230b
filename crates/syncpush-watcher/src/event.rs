//! Change events as seen by the watch loop.

use notify::event::{EventKind, ModifyKind};
use std::fmt;
use std::path::PathBuf;

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
    Other,
}

impl ChangeKind {
    /// Maps a notify event kind. Pure access notifications are not changes.
    pub fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Access(_) => None,
            EventKind::Create(_) => Some(Self::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Rename),
            EventKind::Modify(ModifyKind::Metadata(_)) => Some(Self::Chmod),
            EventKind::Modify(_) => Some(Self::Write),
            EventKind::Remove(_) => Some(Self::Remove),
            _ => Some(Self::Other),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Write => "write",
            Self::Remove => "remove",
            Self::Rename => "rename",
            Self::Chmod => "chmod",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A single observed change to a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Splits a notify event into one change per path.
    pub fn from_notify(event: &notify::Event) -> Vec<Self> {
        let Some(kind) = ChangeKind::from_notify(&event.kind) else {
            return Vec::new();
        };
        event
            .paths
            .iter()
            .map(|path| Self::new(path.clone(), kind))
            .collect()
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path.display())
    }
}

/// What the observer hands to the watch loop.
#[derive(Debug)]
pub enum ObserverEvent {
    Change(ChangeEvent),
    Error(crate::WatchError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RenameMode};

    #[test]
    fn test_kind_mapping() {
        let cases = [
            (EventKind::Create(CreateKind::Folder), Some(ChangeKind::Create)),
            (
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                Some(ChangeKind::Write),
            ),
            (
                EventKind::Modify(ModifyKind::Name(RenameMode::From)),
                Some(ChangeKind::Rename),
            ),
            (
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
                Some(ChangeKind::Chmod),
            ),
            (
                EventKind::Remove(notify::event::RemoveKind::File),
                Some(ChangeKind::Remove),
            ),
            (EventKind::Access(AccessKind::Read), None),
        ];

        for (kind, expected) in cases {
            assert_eq!(ChangeKind::from_notify(&kind), expected, "{:?}", kind);
        }
    }

    #[test]
    fn test_one_change_per_path() {
        let event = notify::Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/tmp/a"))
            .add_path(PathBuf::from("/tmp/b"));

        let changes = ChangeEvent::from_notify(&event);
        assert_eq!(
            changes,
            vec![
                ChangeEvent::new("/tmp/a", ChangeKind::Rename),
                ChangeEvent::new("/tmp/b", ChangeKind::Rename),
            ]
        );
    }

    #[test]
    fn test_access_events_are_dropped() {
        let event = notify::Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/tmp/a"));
        assert!(ChangeEvent::from_notify(&event).is_empty());
    }
}
