//! Filesystem observer.
//!
//! Uses the notify crate to watch individual directories and forward
//! their change events to the watch loop.

use crate::error::WatchError;
use crate::event::{ChangeEvent, ObserverEvent};
use notify::{Event, RecursiveMode, Watcher};
use std::path::Path;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace};

/// The side of a filesystem watcher the registry talks to.
///
/// Implementations deliver their events somewhere else (usually a
/// channel created alongside them); this trait only grows and releases
/// the watch set.
pub trait Observer {
    /// Starts watching `path` (non-recursively).
    fn add(&mut self, path: &Path) -> Result<(), WatchError>;

    /// Releases everything the observer holds.
    fn close(self)
    where
        Self: Sized,
    {
    }
}

/// Watches directories with the platform's recommended backend.
pub struct FileWatcher {
    watcher: notify::RecommendedWatcher,
}

impl FileWatcher {
    /// Creates a watcher with an empty watch set.
    ///
    /// Returns the watcher together with the receiving end of its event
    /// stream. Changes and runtime errors arrive on the same channel, in
    /// the order notify reported them.
    pub fn new() -> Result<(Self, UnboundedReceiver<ObserverEvent>), WatchError> {
        let (tx, rx) = unbounded_channel();

        let watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            forward(&tx, res);
        })
        .map_err(WatchError::Create)?;

        Ok((Self { watcher }, rx))
    }
}

fn forward(tx: &UnboundedSender<ObserverEvent>, res: Result<Event, notify::Error>) {
    match res {
        Ok(event) => {
            for change in ChangeEvent::from_notify(&event) {
                trace!("Observed {}", change);
                if tx.send(ObserverEvent::Change(change)).is_err() {
                    debug!("Watch loop gone, dropping event");
                    return;
                }
            }
        }
        Err(e) => {
            let _ = tx.send(ObserverEvent::Error(WatchError::Notify(e)));
        }
    }
}

impl Observer for FileWatcher {
    fn add(&mut self, path: &Path) -> Result<(), WatchError> {
        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Register {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Watching {}", path.display());
        Ok(())
    }

    fn close(self) {
        info!("Filesystem watcher closed");
    }
}
