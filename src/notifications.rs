//! Notification Bridge
//!
//! Reads [`ConnectionEvent`]s off the tracker's channel and turns the four
//! user-facing transitions into messages for a [`NotificationSink`]. Other
//! events (offline toggles) are observed but produce nothing; callers surface
//! their own client errors.

use crate::cli_messages::format_notification;
use crate::events::Notification;
use crate::gateway::state::ConnectionEvent;
use std::sync::{Mutex, PoisonError};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[cfg(test)]
use mockall::automock;

/// Somewhere user-visible messages end up (toasts, console, a log panel).
#[cfg_attr(test, automock)]
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: &Notification);
}

/// Prints notifications to stderr, leaving stdout to command output.
///
/// A notification identical to the one still on screen (shown less than its
/// level's display duration ago) is not printed again.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    on_screen: Mutex<Option<(Notification, Instant)>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `notification` as on screen unless its twin already is.
    fn admit(&self, notification: &Notification) -> bool {
        let mut on_screen = self.on_screen.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        if let Some((current, shown_at)) = on_screen.as_ref()
            && current == notification
            && now.duration_since(*shown_at) < current.level.display_duration()
        {
            return false;
        }
        *on_screen = Some((notification.clone(), now));
        true
    }
}

impl NotificationSink for ConsoleSink {
    fn show(&self, notification: &Notification) {
        if notification.should_display() && self.admit(notification) {
            eprintln!("{}", format_notification(notification));
        }
    }
}

pub struct NotificationBridge {
    sink: Box<dyn NotificationSink>,
}

impl NotificationBridge {
    pub fn new(sink: Box<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Fixed mapping from transitions to messages.
    pub fn notification_for(event: &ConnectionEvent) -> Option<Notification> {
        match event {
            ConnectionEvent::ServerStarting { .. } => Some(Notification::info(
                "Server Starting",
                "Server appears to be starting up. Will retry connecting automatically."
                    .to_string(),
            )),
            ConnectionEvent::RetryingRequest {
                attempt,
                max_retries,
                ..
            } => Some(Notification::warning(
                "Connection Issue",
                format!(
                    "Server connection issue. Retrying... ({}/{})",
                    attempt, max_retries
                ),
            )),
            ConnectionEvent::StartupExhausted {
                max_startup_retries,
            } => Some(Notification::warning(
                "Offline Mode",
                format!(
                    "Server appears to be unavailable after {} attempts. Switching to offline mode.",
                    max_startup_retries
                ),
            )),
            ConnectionEvent::ConnectionEstablished => Some(Notification::success(
                "Connection Established",
                "Successfully connected to the server!".to_string(),
            )),
            ConnectionEvent::WentOffline { .. } | ConnectionEvent::BackOnline => None,
        }
    }

    /// Forward one event; returns whether anything was shown.
    pub fn handle(&self, event: &ConnectionEvent) -> bool {
        match Self::notification_for(event) {
            Some(notification) => {
                self.sink.show(&notification);
                true
            }
            None => false,
        }
    }

    /// Drain events until the channel closes or shutdown is signalled.
    /// Events already queued at shutdown are still delivered.
    pub async fn run(
        self,
        mut events: mpsc::Receiver<ConnectionEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                maybe_event = events.recv() => match maybe_event {
                    Some(event) => {
                        self.handle(&event);
                    }
                    None => break,
                },
                _ = shutdown.recv() => {
                    while let Ok(event) = events.try_recv() {
                        self.handle(&event);
                    }
                    break;
                }
            }
        }
    }
}

/// Spawn the bridge as a background task.
pub fn spawn_notification_bridge(
    sink: Box<dyn NotificationSink>,
    events: mpsc::Receiver<ConnectionEvent>,
    shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(NotificationBridge::new(sink).run(events, shutdown))
}
