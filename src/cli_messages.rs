//! Console messaging
//!
//! Coloured one-line messages for CLI commands and for notifications printed
//! by the console sink.

use crate::events::{Notification, NotificationLevel};

const YELLOW: &str = "\x1b[1;33m";
const BRIGHT_RED: &str = "\x1b[1;91m";
const RED: &str = "\x1b[1;31m";
const GREEN: &str = "\x1b[1;32m";
const CYAN: &str = "\x1b[1;36m";
const RESET: &str = "\x1b[0m";

fn format_line(colour: &str, tag: &str, title: &str, details: &str) -> String {
    if details.is_empty() {
        format!("{colour}[{tag}]{RESET} {title}")
    } else {
        format!("{colour}[{tag}]{RESET} {title}\t {details}")
    }
}

/// Print CLI command info message
pub fn print_info(title: &str, details: &str) {
    println!("{}", format_line(YELLOW, "INFO", title, details));
}

/// Print CLI command warn message
pub fn print_warn(title: &str, details: &str) {
    println!("{}", format_line(BRIGHT_RED, "WARN", title, details));
}

/// Print CLI command error
pub fn print_error(title: &str, details: Option<&str>) {
    println!("{RED}[ERROR]{RESET} {}", title);
    if let Some(details) = details {
        println!("{RED}[ERROR]{RESET} Details: {}", details);
    }
}

/// Print CLI command success
pub fn print_success(title: &str, details: &str) {
    println!("{}", format_line(GREEN, "SUCCESS", title, details));
}

/// Render a notification the way the console sink prints it.
pub fn format_notification(notification: &Notification) -> String {
    let (colour, tag) = match notification.level {
        NotificationLevel::Success => (GREEN, "SUCCESS"),
        NotificationLevel::Info => (CYAN, "NOTICE"),
        NotificationLevel::Warning => (BRIGHT_RED, "WARN"),
        NotificationLevel::Error => (RED, "ERROR"),
    };
    format_line(colour, tag, &notification.title, &notification.msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_are_tab_separated() {
        assert_eq!(
            format_line(GREEN, "SUCCESS", "Backend online", "ok"),
            "\x1b[1;32m[SUCCESS]\x1b[0m Backend online\t ok"
        );
        assert_eq!(
            format_line(YELLOW, "INFO", "Config", ""),
            "\x1b[1;33m[INFO]\x1b[0m Config"
        );
    }

    #[test]
    fn notifications_use_level_tag() {
        let n = Notification::info("Server Starting", "hang on".to_string());
        let line = format_notification(&n);
        assert!(line.contains("[NOTICE]"));
        assert!(line.ends_with("Server Starting\t hang on"));
    }
}
