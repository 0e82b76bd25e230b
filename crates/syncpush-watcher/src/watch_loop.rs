//! The watch loop.
//!
//! Ties the pieces together: observer events grow the watch set and
//! feed the debouncer, debounce fires start transfers. One `select!`
//! decides what happens next, over the inputs in [`Signal`].
//!
//! Transfers run on the blocking pool so events keep flowing while the
//! external program works. Only one transfer runs at a time; a fire
//! that lands while one is running is parked as the single follow-up,
//! and later fires replace the parked one.

use crate::debounce::EventDebouncer;
use crate::error::WatchError;
use crate::event::{ChangeEvent, ChangeKind, ObserverEvent};
use crate::registry::PathRegistry;
use crate::watcher::Observer;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use syncpush_core::{SyncConfig, SyncError, SyncInvocation, Transfer, TransferOutput};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Debounce state of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No change waiting to be synced.
    Idle,
    /// A debounce window is open.
    PendingFire,
}

/// Why a transfer was started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerCause {
    /// The unconditional push at startup.
    Initial,
    /// The last change of a settled burst.
    Change(ChangeEvent),
}

impl fmt::Display for TriggerCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => f.write_str("initial push"),
            Self::Change(change) => write!(f, "after {}", change),
        }
    }
}

/// Result of one finished transfer.
#[derive(Debug)]
pub struct SyncReport {
    pub cause: TriggerCause,
    pub started_at: Instant,
    pub outcome: syncpush_core::Result<TransferOutput>,
}

/// Everything the loop can wake up for.
enum Signal {
    Change(ChangeEvent),
    ObserverError(WatchError),
    TimerExpired(ChangeEvent),
    TransferFinished(SyncReport),
    ObserverClosed,
}

struct InFlight {
    cause: TriggerCause,
    started_at: Instant,
    handle: JoinHandle<syncpush_core::Result<TransferOutput>>,
}

/// Watches a tree and keeps the remote in sync with it.
pub struct WatchLoop<O, T> {
    registry: PathRegistry<O>,
    events: UnboundedReceiver<ObserverEvent>,
    debouncer: EventDebouncer<ChangeEvent>,
    invocation: Arc<SyncInvocation>,
    transfer: Arc<T>,
    in_flight: Option<InFlight>,
    queued: Option<ChangeEvent>,
    reports: Option<UnboundedSender<SyncReport>>,
}

impl<O: Observer, T: Transfer> WatchLoop<O, T> {
    /// Sets up the loop and registers the whole local tree.
    ///
    /// Fails if the local root itself cannot be watched. `events` must be
    /// the stream belonging to `observer`.
    pub fn new(
        config: &SyncConfig,
        observer: O,
        events: UnboundedReceiver<ObserverEvent>,
        transfer: T,
    ) -> Result<Self, WatchError> {
        let mut registry = PathRegistry::new(observer);
        registry.register_tree(config.local_root())?;

        Ok(Self {
            registry,
            events,
            debouncer: EventDebouncer::new(config.quiet_period()),
            invocation: Arc::new(SyncInvocation::build(config)),
            transfer: Arc::new(transfer),
            in_flight: None,
            queued: None,
            reports: None,
        })
    }

    /// Sends a [`SyncReport`] for every finished transfer to `reports`.
    pub fn with_reports(mut self, reports: UnboundedSender<SyncReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn state(&self) -> LoopState {
        if self.debouncer.is_pending() {
            LoopState::PendingFire
        } else {
            LoopState::Idle
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn registry(&self) -> &PathRegistry<O> {
        &self.registry
    }

    pub fn invocation(&self) -> &SyncInvocation {
        &self.invocation
    }

    /// Runs until `shutdown` resolves or the observer's stream ends.
    ///
    /// Starts with one unconditional transfer and waits for it before
    /// looking at any event. On the way out, a running transfer is
    /// allowed to finish; a parked follow-up and an open debounce
    /// window are dropped.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        self.start_transfer(TriggerCause::Initial);
        let initial = transfer_finished(&mut self.in_flight).await;
        self.complete(initial);

        loop {
            let signal = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down");
                    break;
                }
                signal = self.next_signal() => signal,
            };

            if !self.handle(signal) {
                info!("Observer stream closed");
                break;
            }
        }

        self.wind_down().await;
    }

    async fn next_signal(&mut self) -> Signal {
        tokio::select! {
            event = self.events.recv() => match event {
                Some(ObserverEvent::Change(change)) => Signal::Change(change),
                Some(ObserverEvent::Error(e)) => Signal::ObserverError(e),
                None => Signal::ObserverClosed,
            },
            fired = self.debouncer.expired() => Signal::TimerExpired(fired),
            report = transfer_finished(&mut self.in_flight) => Signal::TransferFinished(report),
        }
    }

    /// Applies one signal. Returns `false` once there is nothing left to watch.
    fn handle(&mut self, signal: Signal) -> bool {
        match signal {
            Signal::Change(change) => {
                // Directories moved into the tree show up as renames.
                if matches!(change.kind, ChangeKind::Create | ChangeKind::Rename)
                    && self.registry.register_if_directory(&change.path)
                {
                    info!("Now watching {}", change.path.display());
                }
                trace!("Change: {}", change);
                if self.debouncer.push(change) {
                    trace!("Debounce window restarted");
                }
            }
            Signal::ObserverError(e) => warn!("{}", e),
            Signal::TimerExpired(change) => self.trigger(change),
            Signal::TransferFinished(report) => self.complete(report),
            Signal::ObserverClosed => return false,
        }
        true
    }

    fn trigger(&mut self, change: ChangeEvent) {
        if self.in_flight.is_some() {
            if self.queued.replace(change).is_none() {
                debug!("Transfer still running, queueing a follow-up");
            }
            return;
        }
        self.start_transfer(TriggerCause::Change(change));
    }

    fn start_transfer(&mut self, cause: TriggerCause) {
        debug!("Starting transfer ({})", cause);
        let invocation = Arc::clone(&self.invocation);
        let transfer = Arc::clone(&self.transfer);
        let handle = tokio::task::spawn_blocking(move || transfer.execute(&invocation));

        self.in_flight = Some(InFlight {
            cause,
            started_at: Instant::now(),
            handle,
        });
    }

    fn complete(&mut self, report: SyncReport) {
        let elapsed = report.started_at.elapsed();
        match &report.outcome {
            Ok(_) => debug!("Transfer finished in {:?} ({})", elapsed, report.cause),
            Err(e) => debug!("Transfer failed after {:?} ({}): {}", elapsed, report.cause, e),
        }

        if let Some(reports) = &self.reports {
            if reports.send(report).is_err() {
                debug!("Report receiver dropped");
            }
        }

        if let Some(next) = self.queued.take() {
            self.start_transfer(TriggerCause::Change(next));
        }
    }

    async fn wind_down(mut self) {
        if let Some(dropped) = self.queued.take() {
            debug!("Dropping queued follow-up ({})", dropped);
        }
        if let Some(pending) = self.debouncer.flush() {
            debug!("Dropping pending change ({})", pending);
        }
        if self.in_flight.is_some() {
            info!("Waiting for the running transfer to finish");
            let report = transfer_finished(&mut self.in_flight).await;
            self.complete(report);
        }
        self.registry.close();
    }
}

/// Resolves when the running transfer ends. Never resolves if none is running.
async fn transfer_finished(in_flight: &mut Option<InFlight>) -> SyncReport {
    let Some(flight) = in_flight.as_mut() else {
        return std::future::pending().await;
    };

    let outcome = match (&mut flight.handle).await {
        Ok(outcome) => outcome,
        Err(e) => Err(SyncError::Aborted(e.to_string())),
    };
    let report = SyncReport {
        cause: flight.cause.clone(),
        started_at: flight.started_at,
        outcome,
    };
    *in_flight = None;
    report
}
