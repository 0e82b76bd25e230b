//! Errors raised by the filesystem observer.

use std::path::PathBuf;
use thiserror::Error;

/// Things that can go wrong while watching the tree.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The platform watcher could not be created at all.
    #[error("failed to create filesystem watcher: {0}")]
    Create(#[source] notify::Error),

    /// A directory could not be added to the watch set.
    #[error("failed to watch '{path}': {source}")]
    Register {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// Walking the tree hit an entry we could not read.
    #[error("failed to walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The watcher reported an error while running.
    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),
}
