//! Fakes shared by the unit tests.

use crate::error::WatchError;
use crate::watcher::Observer;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use syncpush_core::{SyncInvocation, Transfer, TransferFailure, TransferOutput};

/// Observer that records registrations and can refuse chosen paths.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    added: Arc<Mutex<Vec<PathBuf>>>,
    refuse: Arc<HashSet<PathBuf>>,
}

impl RecordingObserver {
    pub fn failing_on(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            added: Arc::default(),
            refuse: Arc::new(paths.into_iter().collect()),
        }
    }

    pub fn added(&self) -> Vec<PathBuf> {
        self.added.lock().unwrap().clone()
    }
}

impl Observer for RecordingObserver {
    fn add(&mut self, path: &Path) -> Result<(), WatchError> {
        if self.refuse.contains(path) {
            return Err(WatchError::Register {
                path: path.to_path_buf(),
                source: notify::Error::generic("permission denied"),
            });
        }
        self.added.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

#[derive(Default)]
struct Script {
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    fail: AtomicBool,
    delay: Mutex<Duration>,
}

/// Transfer that counts calls, optionally sleeps and optionally fails.
#[derive(Clone, Default)]
pub struct ScriptedTransfer {
    script: Arc<Script>,
}

impl ScriptedTransfer {
    pub fn failing() -> Self {
        let transfer = Self::default();
        transfer.script.fail.store(true, Ordering::SeqCst);
        transfer
    }

    pub fn with_delay(delay: Duration) -> Self {
        let transfer = Self::default();
        *transfer.script.delay.lock().unwrap() = delay;
        transfer
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    /// Highest number of transfers that ever ran at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.script.max_active.load(Ordering::SeqCst)
    }
}

impl Transfer for ScriptedTransfer {
    fn execute(&self, _invocation: &SyncInvocation) -> syncpush_core::Result<TransferOutput> {
        let script = &self.script;
        let active = script.active.fetch_add(1, Ordering::SeqCst) + 1;
        script.max_active.fetch_max(active, Ordering::SeqCst);
        let call = script.calls.fetch_add(1, Ordering::SeqCst) + 1;

        let delay = *script.delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        script.active.fetch_sub(1, Ordering::SeqCst);

        if script.fail.load(Ordering::SeqCst) {
            Err(TransferFailure {
                code: Some(23),
                output: format!("simulated failure #{}", call),
            }
            .into())
        } else {
            Ok(TransferOutput {
                output: format!("transfer #{}", call),
            })
        }
    }
}
