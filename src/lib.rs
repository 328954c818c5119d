//! Resilient client for a backend whose availability is uncertain.
//!
//! [`gateway::GatewayClient`] retries transient failures with backoff, tells a
//! cold-starting server apart from an outage on auth requests, and keeps a
//! shared [`gateway::ConnectionTracker`] that the
//! [`notifications::NotificationBridge`] turns into user-facing messages.

pub mod cli_messages;
pub mod config;
pub mod consts;
pub mod environment;
pub mod events;
pub mod gateway;
pub mod logging;
pub mod notifications;
