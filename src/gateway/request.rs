//! Request and response types shared by the client and its transports.

use crate::consts::gateway_consts::API_PREFIX;
use crate::gateway::error::GatewayError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl FromStr for Method {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(GatewayError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Per-call overrides. Anything left as `None` takes the client's configured default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
    pub is_auth_request: bool,
}

impl RequestOptions {
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn auth(mut self) -> Self {
        self.is_auth_request = true;
        self
    }
}

/// What a transport needs to perform one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute path including the `/api/` prefix.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Shared by every attempt of one logical call.
    pub tracking_id: Uuid,
}

/// One logical call: the request plus the budget it runs under.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub request: HttpRequest,
    /// The endpoint as the caller passed it, for logs and errors.
    pub endpoint: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub is_auth_request: bool,
}

impl RequestDescriptor {
    pub fn method(&self) -> Method {
        self.request.method
    }

    pub fn tracking_id(&self) -> Uuid {
        self.request.tracking_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Applies the `/api/` prefix after stripping any leading slashes from `endpoint`.
pub fn api_path(endpoint: &str) -> String {
    format!("{}{}", API_PREFIX, endpoint.trim_start_matches('/'))
}
