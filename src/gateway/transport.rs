//! HTTP transport
//!
//! A [`Transport`] performs exactly one HTTP attempt. It never retries and
//! never applies the per-attempt timeout; both are the client's job.

use crate::gateway::error::{GatewayError, TransportError};
use crate::gateway::request::{HttpRequest, HttpResponse};
use reqwest::{Client, ClientBuilder};
use std::error::Error as StdError;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

// Build timestamp in milliseconds since epoch
const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP", "Build timestamp not available");

// User-Agent string with gateway version
const USER_AGENT: &str = concat!("craft-gateway/", env!("CARGO_PKG_VERSION"));

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Perform one attempt. Non-2xx statuses come back as responses, not errors.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Flattens an error and its sources so "connection refused" survives into the message.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let message = error_chain(&error);
        if error.is_connect() {
            TransportError::Connect(message)
        } else if error.is_builder() {
            TransportError::Invalid(message)
        } else {
            TransportError::Other(message)
        }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.build_url(&request.path);
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &url)
            .header("User-Agent", USER_AGENT)
            .header("X-Build-Timestamp", BUILD_TIMESTAMP)
            .header("X-Request-Id", request.tracking_id.to_string());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
