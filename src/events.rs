//! Notification records
//!
//! User-visible messages produced by the notification bridge.

use crate::logging::{LogLevel, should_log_with_env};
use chrono::Local;
use std::fmt::Display;
use std::time::Duration;

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    /// How long a toast-style sink should keep the message on screen.
    pub fn display_duration(&self) -> Duration {
        match self {
            NotificationLevel::Success | NotificationLevel::Info => Duration::from_millis(3_000),
            NotificationLevel::Warning => Duration::from_millis(4_000),
            NotificationLevel::Error => Duration::from_millis(5_000),
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            NotificationLevel::Success | NotificationLevel::Info => LogLevel::Info,
            NotificationLevel::Warning => LogLevel::Warn,
            NotificationLevel::Error => LogLevel::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub msg: String,
    pub timestamp: String,
}

impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        // Timestamps are ignored
        self.level == other.level && self.title == other.title && self.msg == other.msg
    }
}

impl Eq for Notification {}

impl Notification {
    fn new(level: NotificationLevel, title: &str, msg: String) -> Self {
        Self {
            level,
            title: title.to_string(),
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn success(title: &str, msg: String) -> Self {
        Self::new(NotificationLevel::Success, title, msg)
    }

    pub fn info(title: &str, msg: String) -> Self {
        Self::new(NotificationLevel::Info, title, msg)
    }

    pub fn warning(title: &str, msg: String) -> Self {
        Self::new(NotificationLevel::Warning, title, msg)
    }

    pub fn error(title: &str, msg: String) -> Self {
        Self::new(NotificationLevel::Error, title, msg)
    }

    pub fn should_display(&self) -> bool {
        // Always show success events
        if self.level == NotificationLevel::Success {
            return true;
        }
        should_log_with_env(self.level.log_level())
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.level, self.timestamp, self.title, self.msg
        )
    }
}
