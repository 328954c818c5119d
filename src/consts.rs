pub mod gateway_consts {
    //! Gateway Configuration Constants
    //!
    //! Default budgets and timings for the resilient API client, organized by
    //! functional area. Every value here can be overridden through
    //! `GatewayConfig` or per call through `RequestOptions`.

    // =============================================================================
    // ROUTING
    // =============================================================================

    /// Prefix applied to every relative endpoint.
    pub const API_PREFIX: &str = "/api/";

    /// Endpoint probed by `check_backend_health`.
    pub const HEALTH_ENDPOINT: &str = "health-check";

    /// Maximum number of connection events buffered for the notification bridge
    pub const EVENT_QUEUE_SIZE: usize = 100;

    // =============================================================================
    // TIMEOUTS
    // =============================================================================

    pub mod timeouts {
        /// Per-attempt timeout for ordinary requests (milliseconds)
        pub const BASE_TIMEOUT_MS: u64 = 10_000;

        /// Auth requests get this multiple of the base timeout
        pub const AUTH_TIMEOUT_MULTIPLIER: u64 = 2;

        /// Fixed timeout for the health probe (milliseconds)
        pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 3_000;
    }

    // =============================================================================
    // RETRY BUDGETS
    // =============================================================================

    /// Ordinary request backoff configuration
    pub mod transient_retry {
        /// Retries after the first attempt for 502/504/unreachable failures
        pub const MAX_RETRIES: u32 = 3;

        /// Delay before the first retry; doubles on every further retry (milliseconds)
        pub const INITIAL_BACKOFF_MS: u64 = 1_000;
    }

    /// Server-starting backoff configuration for auth requests
    pub mod startup_retry {
        /// Consecutive unreachable auth attempts before switching to offline mode
        pub const MAX_STARTUP_RETRIES: u32 = 5;

        /// Multiplied by 2^connection_attempts (milliseconds)
        pub const INITIAL_BACKOFF_MS: u64 = 1_000;

        /// Upper bound on a single startup delay (milliseconds)
        pub const MAX_BACKOFF_MS: u64 = 30_000;
    }
}
