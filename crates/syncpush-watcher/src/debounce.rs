//! Trailing-edge debouncing.
//!
//! A burst of events produces a single fire, `quiet` after the last
//! event of the burst, carrying that last event. Every new event
//! pushes the deadline out again, so a stream that never goes quiet
//! never fires.
//!
//! There is only ever one pending window. Restarting it is a plain
//! assignment on state owned by whoever drives the debouncer, so an
//! old deadline can never fire after a newer event has replaced it.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

struct Pending<E> {
    deadline: Instant,
    latest: E,
}

/// Holds at most one pending fire.
pub struct EventDebouncer<E> {
    quiet: Duration,
    pending: Option<Pending<E>>,
}

impl<E> EventDebouncer<E> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Records an event, (re)starting the quiet period.
    ///
    /// Returns `true` if a window was already open and got restarted.
    pub fn push(&mut self, event: E) -> bool {
        let restarted = self.pending.is_some();
        self.pending = Some(Pending {
            deadline: Instant::now() + self.quiet,
            latest: event,
        });
        restarted
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending window fires, if one is open.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Takes the pending event without waiting for its deadline.
    pub fn flush(&mut self) -> Option<E> {
        self.pending.take().map(|p| p.latest)
    }

    /// Waits for the pending window to expire and returns its event.
    ///
    /// Never resolves while idle. Cancel-safe: dropping the future
    /// before it resolves leaves the window untouched.
    pub async fn expired(&mut self) -> E {
        loop {
            let Some(deadline) = self.deadline() else {
                return std::future::pending().await;
            };
            time::sleep_until(deadline).await;
            if let Some(pending) = self.pending.take() {
                return pending.latest;
            }
        }
    }
}

enum Step<E> {
    Event(Option<E>),
    Fire(E),
}

/// Debounces a channel.
///
/// Spawns a task that reads `events` and emits one value per quiet
/// period on the returned channel. When `events` closes, a still
/// pending value is delivered right away and the output closes.
pub fn debounced<E: Send + 'static>(
    mut events: mpsc::Receiver<E>,
    quiet: Duration,
) -> mpsc::Receiver<E> {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut debouncer = EventDebouncer::new(quiet);
        loop {
            let step = tokio::select! {
                event = events.recv() => Step::Event(event),
                fired = debouncer.expired() => Step::Fire(fired),
            };

            match step {
                Step::Event(Some(event)) => {
                    debouncer.push(event);
                }
                Step::Event(None) => break,
                Step::Fire(event) => {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
        }

        if let Some(event) = debouncer.flush() {
            let _ = tx.send(event).await;
        }
    });

    rx
}
