//! Retry and backoff decisions.
//!
//! Ordinary requests back off exponentially on transient failures for a
//! bounded number of retries. Auth requests that cannot reach the backend are
//! assumed to be hitting a cold start and back off against the shared
//! connection-attempt counter instead, until the call's budget runs out.
//! On that path the budget counts attempts, not retries.
//! No jitter is applied; delays are deterministic.

use crate::config::GatewayConfig;
use crate::consts::gateway_consts::{startup_retry, transient_retry};
use crate::gateway::error::ErrorCategory;
use std::time::Duration;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Surface the failure to the caller.
    NoRetry,
    /// Backend looks like it is booting; wait and try again.
    ServerStarting(Duration),
    /// Ordinary transient failure; wait and try again.
    RetryAfter(Duration),
}

impl RetryDecision {
    pub fn delay(&self) -> Option<Duration> {
        match self {
            RetryDecision::NoRetry => None,
            RetryDecision::ServerStarting(d) | RetryDecision::RetryAfter(d) => Some(*d),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// First transient retry delay; doubles per retry.
    pub transient_base_delay: Duration,
    /// Multiplied by `2^connection_attempts` on the startup path.
    pub startup_base_delay: Duration,
    /// Cap on a single startup delay.
    pub max_startup_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            transient_base_delay: Duration::from_millis(transient_retry::INITIAL_BACKOFF_MS),
            startup_base_delay: Duration::from_millis(startup_retry::INITIAL_BACKOFF_MS),
            max_startup_delay: Duration::from_millis(startup_retry::MAX_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            max_startup_delay: Duration::from_millis(config.max_startup_delay_ms),
            ..Self::default()
        }
    }

    /// Decide what to do after attempt `attempt` (1-based) failed with `category`.
    ///
    /// For auth calls `max_retries` is the startup budget as well.
    /// `connection_attempts` is the shared startup counter as it stood before
    /// this failure was recorded.
    pub fn decide(
        &self,
        attempt: u32,
        category: ErrorCategory,
        is_auth_request: bool,
        max_retries: u32,
        connection_attempts: u32,
    ) -> RetryDecision {
        if is_auth_request && category == ErrorCategory::Unreachable {
            let next = connection_attempts.saturating_add(1);
            if next < max_retries {
                return RetryDecision::ServerStarting(self.startup_delay(next));
            }
            return RetryDecision::NoRetry;
        }

        if !category.is_transient() || attempt > max_retries {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.transient_delay(attempt))
    }

    /// `base * 2^(attempt-1)`: 1s, 2s, 4s with the defaults.
    pub fn transient_delay(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(20);
        self.transient_base_delay.saturating_mul(1 << shift)
    }

    /// `min(base * 2^connection_attempts, cap)`.
    pub fn startup_delay(&self, connection_attempts: u32) -> Duration {
        let shift = connection_attempts.min(20);
        self.startup_base_delay
            .saturating_mul(1 << shift)
            .min(self.max_startup_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn client_rejected_never_retries() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, ErrorCategory::ClientRejected, false, 3, 0),
            RetryDecision::NoRetry
        );
        assert_eq!(
            p.decide(1, ErrorCategory::ClientRejected, true, 5, 0),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn server_fault_and_unknown_are_not_retried() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, ErrorCategory::ServerFault, false, 3, 0),
            RetryDecision::NoRetry
        );
        assert_eq!(
            p.decide(1, ErrorCategory::Unknown, false, 3, 0),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn transient_backoff_doubles_until_budget() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, ErrorCategory::GatewayTimeout, false, 3, 0),
            RetryDecision::RetryAfter(ms(1_000))
        );
        assert_eq!(
            p.decide(2, ErrorCategory::Unreachable, false, 3, 0),
            RetryDecision::RetryAfter(ms(2_000))
        );
        assert_eq!(
            p.decide(3, ErrorCategory::GatewayTimeout, false, 3, 0),
            RetryDecision::RetryAfter(ms(4_000))
        );
        assert_eq!(
            p.decide(4, ErrorCategory::GatewayTimeout, false, 3, 0),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, ErrorCategory::Unreachable, false, 0, 0),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn startup_path_uses_connection_counter() {
        let p = RetryPolicy::default();
        // connection_attempts 0..=3 -> counter becomes 1..=4, delays 2s..16s
        let delays: Vec<_> = (0..4)
            .map(|count| p.decide(1, ErrorCategory::Unreachable, true, 5, count))
            .collect();
        assert_eq!(
            delays,
            vec![
                RetryDecision::ServerStarting(ms(2_000)),
                RetryDecision::ServerStarting(ms(4_000)),
                RetryDecision::ServerStarting(ms(8_000)),
                RetryDecision::ServerStarting(ms(16_000)),
            ]
        );
        // the fifth failure exhausts the budget
        assert_eq!(
            p.decide(5, ErrorCategory::Unreachable, true, 5, 4),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn startup_path_honours_call_budget() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, ErrorCategory::Unreachable, true, 2, 0),
            RetryDecision::ServerStarting(ms(2_000))
        );
        assert_eq!(
            p.decide(2, ErrorCategory::Unreachable, true, 2, 1),
            RetryDecision::NoRetry
        );
        assert_eq!(
            p.decide(1, ErrorCategory::Unreachable, true, 1, 0),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn startup_path_follows_shared_counter_not_attempt() {
        let p = RetryPolicy::default();
        // a fresh call joining a cold start already three failures deep
        assert_eq!(
            p.decide(1, ErrorCategory::Unreachable, true, 5, 3),
            RetryDecision::ServerStarting(ms(16_000))
        );
    }

    #[test]
    fn startup_delay_is_capped() {
        let p = RetryPolicy::default();
        assert_eq!(p.startup_delay(5), ms(30_000));
        assert_eq!(
            p.decide(1, ErrorCategory::Unreachable, true, 12, 9),
            RetryDecision::ServerStarting(ms(30_000))
        );
    }

    #[test]
    fn auth_gateway_timeout_uses_transient_path() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(4, ErrorCategory::GatewayTimeout, true, 5, 0),
            RetryDecision::RetryAfter(ms(8_000))
        );
        assert_eq!(
            p.decide(6, ErrorCategory::GatewayTimeout, true, 5, 0),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn from_config_reads_budgets() {
        let config = GatewayConfig {
            max_startup_delay_ms: 5_000,
            ..GatewayConfig::default()
        };
        let p = RetryPolicy::from_config(&config);
        assert_eq!(p.startup_delay(4), ms(5_000));
        assert_eq!(RetryDecision::NoRetry.delay(), None);
    }
}
