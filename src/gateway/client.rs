//! Gateway client with built-in retry and connection tracking

use crate::config::GatewayConfig;
use crate::consts::gateway_consts::timeouts::AUTH_TIMEOUT_MULTIPLIER;
use crate::environment::Environment;
use crate::gateway::classify::{classify_failure, log_level_for};
use crate::gateway::error::{AttemptFailure, ErrorCategory, GatewayError, TransportError};
use crate::gateway::policy::{RetryDecision, RetryPolicy};
use crate::gateway::request::{
    HttpRequest, HttpResponse, Method, RequestDescriptor, RequestOptions, api_path,
};
use crate::gateway::sleeper::{Sleeper, TokioSleeper};
use crate::gateway::state::ConnectionTracker;
use crate::gateway::transport::{ReqwestTransport, Transport};
use log::{Level, LevelFilter, debug, info, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Resilient request/response client over a [`Transport`].
///
/// Each logical call gets its own attempt loop; calls share only the
/// [`ConnectionTracker`].
#[derive(Clone)]
pub struct GatewayClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    tracker: ConnectionTracker,
    policy: RetryPolicy,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: GatewayConfig,
        tracker: ConnectionTracker,
    ) -> Self {
        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            tracker,
            policy: RetryPolicy::from_config(&config),
            config,
        }
    }

    /// Client over reqwest, pointed at the configured base URL or the environment's.
    pub fn connect(
        config: GatewayConfig,
        environment: Environment,
        tracker: ConnectionTracker,
    ) -> Result<Self, GatewayError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| environment.api_base_url());
        let transport = ReqwestTransport::new(&base_url)?;
        Ok(Self::new(Arc::new(transport), config, tracker))
    }

    /// Replace the backoff clock.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Resolve a call into its descriptor, applying defaults.
    ///
    /// Auth requests default to the startup budget and a doubled timeout.
    pub fn describe(
        &self,
        method: &str,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<RequestDescriptor, GatewayError> {
        let method: Method = method.parse()?;
        let is_auth_request = options.is_auth_request;

        let default_timeout_ms = if is_auth_request {
            self.config
                .base_timeout_ms
                .saturating_mul(AUTH_TIMEOUT_MULTIPLIER)
        } else {
            self.config.base_timeout_ms
        };
        let default_retries = if is_auth_request {
            self.config.max_startup_retries
        } else {
            self.config.max_retries
        };

        Ok(RequestDescriptor {
            request: HttpRequest {
                method,
                path: api_path(endpoint),
                headers: options.headers,
                params: options.params,
                body: options.body,
                tracking_id: Uuid::new_v4(),
            },
            endpoint: endpoint.to_string(),
            timeout: Duration::from_millis(options.timeout_ms.unwrap_or(default_timeout_ms)),
            max_retries: options.retries.unwrap_or(default_retries),
            is_auth_request,
        })
    }

    /// Issue a request and drive it through the retry policy.
    ///
    /// An unsupported method fails before any network call.
    pub async fn execute(
        &self,
        method: &str,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, GatewayError> {
        let descriptor = self.describe(method, endpoint, options).inspect_err(|e| {
            log::error!("{}", e);
        })?;
        self.execute_descriptor(descriptor).await
    }

    pub async fn execute_descriptor(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<HttpResponse, GatewayError> {
        let method = descriptor.method();
        let tracking_id = descriptor.tracking_id();
        let endpoint = descriptor.endpoint.as_str();
        debug!(
            "{} request initiated [{}] endpoint={} timeout={}ms retries={} auth={}",
            method,
            tracking_id,
            endpoint,
            descriptor.timeout.as_millis(),
            descriptor.max_retries,
            descriptor.is_auth_request
        );

        // Auth calls spend their own budget on the startup path; other calls
        // only need it to tell whether a starting server has run out of attempts.
        let startup_budget = if descriptor.is_auth_request {
            descriptor.max_retries
        } else {
            self.config.max_startup_retries
        };

        let mut attempt = 1u32;
        loop {
            let failure = match self.attempt(&descriptor).await {
                Ok(response) => {
                    self.tracker.record_success();
                    debug!(
                        "{} request successful [{}] endpoint={} attempt={} status={}",
                        method, tracking_id, endpoint, attempt, response.status
                    );
                    return Ok(response);
                }
                Err(failure) => failure,
            };

            let category = classify_failure(&failure);
            let decision = self.policy.decide(
                attempt,
                category,
                descriptor.is_auth_request,
                descriptor.max_retries,
                self.tracker.connection_attempts(),
            );
            if descriptor.is_auth_request && category == ErrorCategory::Unreachable {
                self.tracker.record_startup_failure(startup_budget);
            }

            let delay = match decision {
                RetryDecision::ServerStarting(delay) => {
                    info!(
                        "Server seems to be starting up, retry in {}s [{}] endpoint={} attempt={}/{} error={}",
                        delay.as_secs_f64(),
                        tracking_id,
                        endpoint,
                        self.tracker.connection_attempts(),
                        startup_budget,
                        failure
                    );
                    delay
                }
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        "Connection issue, retrying in {}ms [{}] endpoint={} attempt={}/{} error={}",
                        delay.as_millis(),
                        tracking_id,
                        endpoint,
                        attempt,
                        descriptor.max_retries,
                        failure
                    );
                    if !descriptor.is_auth_request {
                        self.tracker
                            .record_transient_retry(endpoint, attempt, descriptor.max_retries);
                    }
                    delay
                }
                RetryDecision::NoRetry => {
                    if category != ErrorCategory::InvalidRequest {
                        self.tracker.record_terminal_failure(
                            failure.status,
                            category == ErrorCategory::Unreachable,
                            startup_budget,
                        );
                    }
                    let level = LevelFilter::from(log_level_for(category))
                        .to_level()
                        .unwrap_or(Level::Warn);
                    log::log!(
                        level,
                        "{} request failed [{}] endpoint={} attempts={} category={} status={} message={}",
                        method,
                        tracking_id,
                        endpoint,
                        attempt,
                        category,
                        failure.status,
                        failure.message
                    );
                    return Err(GatewayError::Request {
                        method,
                        endpoint: descriptor.endpoint.clone(),
                        tracking_id,
                        attempts: attempt,
                        category,
                        failure,
                    });
                }
            };

            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }

    /// One transport attempt under the descriptor's timeout.
    async fn attempt(&self, descriptor: &RequestDescriptor) -> Result<HttpResponse, AttemptFailure> {
        match tokio::time::timeout(descriptor.timeout, self.transport.send(&descriptor.request))
            .await
        {
            Err(_elapsed) => Err(TransportError::Timeout(descriptor.timeout).into()),
            Ok(Err(e)) => Err(e.into()),
            Ok(Ok(response)) if response.is_success() => Ok(response),
            Ok(Ok(response)) => Err(AttemptFailure::from_response(&response)),
        }
    }

    pub async fn get(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, GatewayError> {
        self.execute("GET", endpoint, options).await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<HttpResponse, GatewayError> {
        self.execute("POST", endpoint, options.with_body(body)).await
    }

    pub async fn put(
        &self,
        endpoint: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<HttpResponse, GatewayError> {
        self.execute("PUT", endpoint, options.with_body(body)).await
    }

    pub async fn delete(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, GatewayError> {
        self.execute("DELETE", endpoint, options).await
    }

    /// Login/session calls: startup-aware retries and a doubled timeout.
    pub async fn auth_request(
        &self,
        method: &str,
        endpoint: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<HttpResponse, GatewayError> {
        let mut options = options.auth();
        if body.is_some() {
            options.body = body;
        }
        self.execute(method, endpoint, options).await
    }

    /// Single short probe of the health endpoint. Never errors.
    pub async fn check_backend_health(&self) -> bool {
        let options = RequestOptions::default()
            .with_timeout_ms(self.config.health_timeout_ms)
            .with_retries(0);
        match self
            .execute("GET", &self.config.health_endpoint, options)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                self.tracker.mark_offline(e.status().unwrap_or(0));
                debug!("Health check failed: {}", e);
                false
            }
        }
    }

    /// Manual "retry now": zero the startup counter and leave the starting state.
    pub fn reset_connection_tracking(&self) {
        self.tracker.reset();
    }

    pub fn is_offline(&self) -> bool {
        self.tracker.is_offline()
    }

    pub fn is_server_starting(&self) -> bool {
        self.tracker.is_server_starting()
    }
}
