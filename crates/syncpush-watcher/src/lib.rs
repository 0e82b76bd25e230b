//! sync-push watcher - change detection and sync triggering
//!
//! This crate handles the filesystem side of things:
//! - Registering every directory of the local tree with the observer
//! - Growing the watch set as directories appear
//! - Debouncing bursts of changes into single triggers
//! - Running the transfer when a burst settles
//!
//! The transfer itself comes from `syncpush-core`.

mod debounce;
mod error;
mod event;
mod registry;
mod watch_loop;
mod watcher;

#[cfg(test)]
mod test_support;

pub use debounce::{debounced, EventDebouncer};
pub use error::WatchError;
pub use event::{ChangeEvent, ChangeKind, ObserverEvent};
pub use registry::{PathRegistry, RegisterSummary};
pub use watch_loop::{LoopState, SyncReport, TriggerCause, WatchLoop};
pub use watcher::{FileWatcher, Observer};
