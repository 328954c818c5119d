//! Resilient API gateway client.
//!
//! Classification, retry policy, and connection state tracking layered over a
//! pluggable one-attempt [`Transport`].

pub mod classify;
pub mod client;
pub mod error;
pub mod policy;
pub mod request;
pub mod sleeper;
pub mod state;
pub mod transport;

pub use client::GatewayClient;
pub use error::{AttemptFailure, ErrorCategory, GatewayError, TransportError};
pub use policy::{RetryDecision, RetryPolicy};
pub use request::{HttpRequest, HttpResponse, Method, RequestDescriptor, RequestOptions};
pub use sleeper::{Sleeper, TokioSleeper};
pub use state::{ConnectionEvent, ConnectionPhase, ConnectionSnapshot, ConnectionTracker};
pub use transport::{ReqwestTransport, Transport};
