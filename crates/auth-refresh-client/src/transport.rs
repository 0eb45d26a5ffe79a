//! HTTP transport seam.
//!
//! The gateway talks to the network through the [`RequestExecutor`] trait so
//! tests can inject a scripted transport. Production uses
//! [`ReqwestExecutor`], a thin wrapper over a shared `reqwest::Client`.

use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// HTTP method for an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// An outbound request, fully described before it hits the wire.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Header name/value pairs, applied in order.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
}

/// A raw response: status plus body bytes.
///
/// HTTP error statuses are data here, not `Err` — the caller decides what a
/// 401 or 404 means for its own state.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the body is empty (or whitespace / JSON null only).
    pub fn is_empty_body(&self) -> bool {
        let trimmed = std::str::from_utf8(&self.body).map(str::trim).unwrap_or("");
        trimmed.is_empty() || trimmed == "null"
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Lossy text view of the body, for error messages.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes an [`ApiRequest`] and returns the raw response.
///
/// `Err` means the request never produced an HTTP response (connection
/// failure, timeout); any status code that did arrive is `Ok`.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> AuthResult<ApiResponse>;
}

/// Production executor backed by `reqwest`.
///
/// Relies on reqwest's default timeout behavior; no application-level
/// timeout is layered on top.
#[derive(Clone, Default)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl RequestExecutor for ReqwestExecutor {
    async fn execute(&self, request: ApiRequest) -> AuthResult<ApiResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(AuthError::Http)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(AuthError::Http)?.to_vec();

        Ok(ApiResponse { status, body })
    }
}
