//! Maps raw attempt outcomes onto failure categories.

use crate::gateway::error::{AttemptFailure, ErrorCategory};
use crate::logging::LogLevel;

/// Classify a `(status, message)` pair. Rules apply in order.
pub fn classify(status: u16, message: &str) -> ErrorCategory {
    if status == 0 || is_connection_refused(message) {
        return ErrorCategory::Unreachable;
    }
    match status {
        502 | 504 => ErrorCategory::GatewayTimeout,
        500..=599 => ErrorCategory::ServerFault,
        400..=499 => ErrorCategory::ClientRejected,
        _ => ErrorCategory::Unknown,
    }
}

/// Like [`classify`], except that requests which never left the client are
/// [`ErrorCategory::InvalidRequest`] whatever their message says.
pub fn classify_failure(failure: &AttemptFailure) -> ErrorCategory {
    if !failure.sent {
        return ErrorCategory::InvalidRequest;
    }
    classify(failure.status, &failure.message)
}

fn is_connection_refused(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("econnrefused") || message.contains("connection refused")
}

/// Log level used when a call terminates with the given category.
pub fn log_level_for(category: ErrorCategory) -> LogLevel {
    match category {
        // Backend availability problems are expected during cold starts
        ErrorCategory::Unreachable | ErrorCategory::GatewayTimeout => LogLevel::Warn,

        // The backend rejected us; callers surface this themselves
        ErrorCategory::ClientRejected => LogLevel::Warn,

        ErrorCategory::ServerFault | ErrorCategory::Unknown => LogLevel::Error,
        ErrorCategory::UnsupportedMethod | ErrorCategory::InvalidRequest => LogLevel::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_zero_is_unreachable() {
        assert_eq!(classify(0, ""), ErrorCategory::Unreachable);
        assert_eq!(
            classify(0, "Request timed out after 3000 ms"),
            ErrorCategory::Unreachable
        );
    }

    #[test]
    fn refused_message_wins_over_status() {
        assert_eq!(
            classify(500, "connect ECONNREFUSED 127.0.0.1:3000"),
            ErrorCategory::Unreachable
        );
        assert_eq!(
            classify(503, "tcp connect error: Connection refused (os error 111)"),
            ErrorCategory::Unreachable
        );
    }

    #[test]
    fn gateway_statuses() {
        assert_eq!(classify(502, "Bad Gateway"), ErrorCategory::GatewayTimeout);
        assert_eq!(classify(504, ""), ErrorCategory::GatewayTimeout);
        assert_eq!(classify(500, "boom"), ErrorCategory::ServerFault);
        assert_eq!(classify(503, "maintenance"), ErrorCategory::ServerFault);
    }

    #[test]
    fn client_errors_are_rejected() {
        assert_eq!(classify(400, ""), ErrorCategory::ClientRejected);
        assert_eq!(classify(403, "forbidden"), ErrorCategory::ClientRejected);
        assert_eq!(classify(429, ""), ErrorCategory::ClientRejected);
        assert!(!classify(404, "").is_transient());
    }

    #[test]
    fn everything_else_is_unknown() {
        assert_eq!(classify(302, ""), ErrorCategory::Unknown);
        assert_eq!(classify(600, ""), ErrorCategory::Unknown);
    }

    #[test]
    fn failure_helper_uses_both_fields() {
        let failure = AttemptFailure::new(0, "dns error");
        assert_eq!(classify_failure(&failure), ErrorCategory::Unreachable);
    }

    #[test]
    fn unsent_failures_are_invalid_requests() {
        let failure = AttemptFailure::unsent("builder error: connection refused by policy");
        assert_eq!(classify_failure(&failure), ErrorCategory::InvalidRequest);
        assert_eq!(log_level_for(ErrorCategory::InvalidRequest), LogLevel::Error);
    }
}
