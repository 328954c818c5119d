//! Connection state tracking
//!
//! A cloneable handle over the shared connection flags. Every mutation goes
//! through a named transition method, and each method publishes a
//! [`ConnectionEvent`] only on the edge where the state actually changes, so a
//! listener sees one event per transition rather than one per attempt.
//!
//! Concurrent calls share the same flags; the last write wins.

use crate::consts::gateway_consts::EVENT_QUEUE_SIZE;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Point-in-time copy of the connection flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub server_starting: bool,
    pub offline: bool,
    pub connection_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ConnectionPhase {
    Nominal,
    ServerStarting,
    Offline,
}

impl ConnectionSnapshot {
    pub fn phase(&self) -> ConnectionPhase {
        if self.offline {
            ConnectionPhase::Offline
        } else if self.server_starting {
            ConnectionPhase::ServerStarting
        } else {
            ConnectionPhase::Nominal
        }
    }
}

/// Transitions published to listeners such as the notification bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// An auth request first found the backend unreachable.
    ServerStarting { attempt: u32, max_attempts: u32 },
    /// An ordinary request is being retried for the first time.
    RetryingRequest {
        endpoint: String,
        attempt: u32,
        max_retries: u32,
    },
    /// The startup budget ran out while the server was believed to be starting.
    StartupExhausted { max_startup_retries: u32 },
    /// First success after the server was believed to be starting.
    ConnectionEstablished,
    /// Offline mode was switched on.
    WentOffline { status: u16 },
    /// Offline mode was switched off.
    BackOnline,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    state: Arc<Mutex<ConnectionSnapshot>>,
    events: Option<mpsc::Sender<ConnectionEvent>>,
}

impl ConnectionTracker {
    /// A tracker nobody listens to.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker publishing into a fresh bounded channel.
    pub fn with_events() -> (Self, mpsc::Receiver<ConnectionEvent>) {
        let (sender, receiver) = mpsc::channel(EVENT_QUEUE_SIZE);
        (Self::with_event_sender(sender), receiver)
    }

    pub fn with_event_sender(sender: mpsc::Sender<ConnectionEvent>) -> Self {
        Self {
            state: Arc::default(),
            events: Some(sender),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConnectionSnapshot> {
        // The flags stay consistent even if a holder panicked mid-update.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: ConnectionEvent) {
        if let Some(sender) = &self.events {
            if let Err(e) = sender.try_send(event) {
                log::debug!("Dropped connection event: {}", e);
            }
        }
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        *self.lock()
    }

    pub fn is_offline(&self) -> bool {
        self.lock().offline
    }

    pub fn is_server_starting(&self) -> bool {
        self.lock().server_starting
    }

    pub fn connection_attempts(&self) -> u32 {
        self.lock().connection_attempts
    }

    /// An auth attempt found the backend unreachable.
    ///
    /// Bumps the counter while it is below the budget and enters the starting
    /// state on the first such failure. Returns the updated counter.
    pub fn record_startup_failure(&self, max_startup_retries: u32) -> u32 {
        let mut state = self.lock();
        if state.connection_attempts < max_startup_retries {
            state.connection_attempts += 1;
        }
        let attempts = state.connection_attempts;
        if attempts < max_startup_retries && !state.server_starting {
            state.server_starting = true;
            self.publish(ConnectionEvent::ServerStarting {
                attempt: attempts,
                max_attempts: max_startup_retries,
            });
        }
        attempts
    }

    /// An ordinary request is about to retry after failing `attempt`.
    /// Only the first retry of a call is published.
    pub fn record_transient_retry(&self, endpoint: &str, attempt: u32, max_retries: u32) {
        if attempt == 1 {
            self.publish(ConnectionEvent::RetryingRequest {
                endpoint: endpoint.to_string(),
                attempt,
                max_retries,
            });
        }
    }

    /// A call gave up. Status 0 (no response) and 504 switch on offline mode;
    /// if the startup budget is spent, the starting state ends here too.
    pub fn record_terminal_failure(&self, status: u16, unreachable: bool, max_startup_retries: u32) {
        if !(unreachable || status == 0 || status == 504) {
            return;
        }
        let mut state = self.lock();
        if !state.offline {
            state.offline = true;
            self.publish(ConnectionEvent::WentOffline { status });
        }
        if state.server_starting && state.connection_attempts >= max_startup_retries {
            state.server_starting = false;
            self.publish(ConnectionEvent::StartupExhausted {
                max_startup_retries,
            });
        }
    }

    /// Any successful response: back to nominal with a zeroed counter.
    pub fn record_success(&self) {
        let mut state = self.lock();
        let previous = *state;
        *state = ConnectionSnapshot::default();
        if previous.server_starting {
            self.publish(ConnectionEvent::ConnectionEstablished);
        }
        if previous.offline {
            self.publish(ConnectionEvent::BackOnline);
        }
    }

    /// Force offline mode on, e.g. after a failed health probe.
    pub fn mark_offline(&self, status: u16) {
        let mut state = self.lock();
        if !state.offline {
            state.offline = true;
            self.publish(ConnectionEvent::WentOffline { status });
        }
    }

    /// Manual "retry now": zero the counter and leave the starting state.
    /// Offline mode is left alone.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.connection_attempts = 0;
        state.server_starting = false;
    }
}
