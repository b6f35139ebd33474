//! File-system watch registration.
//!
//! The host owns the actual watcher; this module only describes what to watch
//! and receives creation events. The creation-triggered refresh path is a
//! known gap: events are acknowledged and logged but do not dispatch yet
//! (newly created entity classes are not covered by the redefinition
//! mechanism).

use std::path::PathBuf;

/// What the host should watch on the coordinator's behalf
#[derive(Debug, Clone)]
pub struct WatchSpec {
    pub root: PathBuf,
    pub glob: String,
}

impl WatchSpec {
    pub fn new(root: impl Into<PathBuf>, glob: &str) -> Self {
        Self {
            root: root.into(),
            glob: glob.to_string(),
        }
    }
}

/// Kinds of file events the host can deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Create,
    Modify,
    Delete,
}

/// One file event under the watched root
#[derive(Debug, Clone)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: FileEventKind,
}

impl FileEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: FileEventKind::Create,
        }
    }
}
