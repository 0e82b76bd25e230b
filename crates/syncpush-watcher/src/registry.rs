//! The set of watched directories.
//!
//! Watches are registered per directory, so the registry has to find
//! every directory under the root up front and pick up new ones as
//! they appear. Registrations are never removed: a deleted directory
//! just stops producing events. A directory that shows up again at a
//! known path is handed to the observer again, since the backend
//! dropped its watch when the old one went away.

use crate::error::WatchError;
use crate::watcher::Observer;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of registering a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSummary {
    /// Directories handed to the observer.
    pub registered: usize,

    /// Entries that could not be walked or watched.
    pub failed: usize,
}

/// Owns the observer and the directories it watches.
pub struct PathRegistry<O> {
    observer: O,
    watched: BTreeSet<PathBuf>,
}

impl<O: Observer> PathRegistry<O> {
    pub fn new(observer: O) -> Self {
        Self {
            observer,
            watched: BTreeSet::new(),
        }
    }

    /// Registers `root` and every directory below it.
    ///
    /// Failing to watch `root` itself is an error. Anything below it
    /// that cannot be read or watched is logged and skipped, and the
    /// walk carries on with its siblings. Symlinks are not followed.
    pub fn register_tree(&mut self, root: &Path) -> Result<RegisterSummary, WatchError> {
        let summary = self.walk(root, false)?;
        info!(
            "Watching {} directories under {} ({} failed)",
            summary.registered,
            root.display(),
            summary.failed
        );
        Ok(summary)
    }

    /// Registers `path` and its subtree if it currently is a directory.
    ///
    /// A new directory may already have children of its own whose
    /// creation we never saw, so the whole subtree is walked. Paths
    /// already in the watch set are added to the observer again: they
    /// may be a directory recreated where a removed one used to be.
    /// Returns whether `path` was handed to the observer.
    pub fn register_if_directory(&mut self, path: &Path) -> bool {
        match path.symlink_metadata() {
            Ok(meta) if meta.is_dir() => {}
            _ => return false,
        }

        match self.walk(path, true) {
            Ok(summary) => {
                debug!(
                    "Watching {} directories under {} ({} failed)",
                    summary.registered,
                    path.display(),
                    summary.failed
                );
                true
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    fn walk(&mut self, root: &Path, rewatch: bool) -> Result<RegisterSummary, WatchError> {
        let mut summary = RegisterSummary::default();
        if self.register(root, rewatch)? {
            summary.registered += 1;
        }

        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let path = source
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    warn!("{}", WatchError::Walk { path, source });
                    summary.failed += 1;
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            match self.register(entry.path(), rewatch) {
                Ok(true) => summary.registered += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("{}", e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Adds a single directory to the observer.
    ///
    /// Known paths are skipped unless `rewatch` is set. Returns whether
    /// the observer was called.
    fn register(&mut self, path: &Path, rewatch: bool) -> Result<bool, WatchError> {
        if !rewatch && self.watched.contains(path) {
            return Ok(false);
        }
        self.observer.add(path)?;
        if self.watched.insert(path.to_path_buf()) {
            debug!("Registered {}", path.display());
        } else {
            debug!("Registered {} again", path.display());
        }
        Ok(true)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.watched.contains(path)
    }

    /// Watched directories, sorted.
    pub fn watched(&self) -> impl Iterator<Item = &Path> {
        self.watched.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Releases the observer.
    pub fn close(self) {
        self.observer.close();
    }
}
