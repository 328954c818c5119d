//! Error handling for the gateway module

use crate::gateway::request::{HttpResponse, Method};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Failure category assigned to an attempt by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ErrorCategory {
    /// No connection could be made (status 0, connection refused, timeout).
    Unreachable,
    /// The gateway in front of the backend gave up (502/504).
    GatewayTimeout,
    /// The backend refused the request (4xx). Never retried.
    ClientRejected,
    /// Any other 5xx.
    ServerFault,
    Unknown,
    /// Programmer error: the method is not one of GET/POST/PUT/DELETE.
    UnsupportedMethod,
    /// The request could not be built (bad header, bad URL) and was never sent.
    InvalidRequest,
}

impl ErrorCategory {
    /// Whether the category is eligible for automatic retry at all.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorCategory::Unreachable | ErrorCategory::GatewayTimeout
        )
    }
}

/// Raw outcome of one failed attempt. Status is 0 when no response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status {status}: {message}")]
pub struct AttemptFailure {
    pub status: u16,
    pub message: String,
    /// False when the request was rejected locally and never reached the network.
    pub sent: bool,
}

impl AttemptFailure {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            sent: true,
        }
    }

    pub fn unsent(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            message: message.into(),
            sent: false,
        }
    }

    /// Builds a failure from a non-2xx response, using the body as the message.
    pub fn from_response(response: &HttpResponse) -> Self {
        let message = match response.text() {
            Ok(text) if !text.trim().is_empty() => text,
            _ => format!("HTTP {}", response.status),
        };
        Self::new(response.status, message)
    }
}

/// Errors a single transport attempt can produce before any response exists.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not establish a connection to the backend.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The attempt did not complete within its timeout.
    #[error("Request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// Anything else the HTTP stack reported (body read failures, protocol errors).
    #[error("Transport error: {0}")]
    Other(String),

    /// The request could not be built, so nothing was sent.
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl From<TransportError> for AttemptFailure {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Invalid(_) => AttemptFailure::unsent(error.to_string()),
            _ => AttemptFailure::new(0, error.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The caller asked for a method the gateway does not issue.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Terminal failure of a logical request after its retry budget was applied.
    #[error("{method} {endpoint} failed after {attempts} attempt(s) [{category}]: {failure}")]
    Request {
        method: Method,
        endpoint: String,
        tracking_id: Uuid,
        attempts: u32,
        category: ErrorCategory,
        failure: AttemptFailure,
    },

    /// Failed to decode a JSON response body.
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl GatewayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::UnsupportedMethod(_) => ErrorCategory::UnsupportedMethod,
            GatewayError::Request { category, .. } => *category,
            GatewayError::Decode(_) | GatewayError::Client(_) => ErrorCategory::Unknown,
        }
    }

    /// Status of the last attempt, if the error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Request { failure, .. } => Some(failure.status),
            _ => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            GatewayError::Request { attempts, .. } => *attempts,
            _ => 0,
        }
    }
}
