// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pluggable HTTP transport.
//!
//! The client talks to the network through a single-operation capability
//! trait so production and test implementations are interchangeable. The
//! default implementation wraps [`reqwest::Client`]; tests use
//! [`crate::testkit::StubTransport`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

/// A fully assembled outgoing request.
///
/// The body is [`Bytes`] so the retry loop can clone it per attempt without
/// copying the payload.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, base + path already joined.
    pub url: String,
    pub headers: HeaderMap,
    /// `None` means no body at all, not an empty one.
    pub body: Option<Bytes>,
    /// Per-attempt timeout.
    pub timeout: Duration,
}

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// Raw body text; JSON decoding is the normalizer's job.
    pub body: String,
    /// Response headers with lowercased names.
    pub headers: HashMap<String, String>,
}

/// A transport-level failure: the call never produced an HTTP status.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// A failure with no underlying cause (used by test transports).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

/// Capability interface for performing one HTTP call.
///
/// Implementations must be safe for concurrent use; the client issues
/// strictly sequential attempts per action call, but one client may serve
/// several tasks at once.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by a shared [`reqwest::Client`].
///
/// The per-attempt timeout from the request is applied via
/// [`reqwest::RequestBuilder::timeout`], so one slow attempt cannot eat the
/// whole retry budget's worth of wall clock.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::new("failed to build HTTP client", e))?;
        Ok(Self { http })
    }

    /// Wrap an existing [`reqwest::Client`], keeping its pool settings.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(request.timeout);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new("network request failed", e))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new("failed to read response body", e))?;

        Ok(HttpResponse {
            status,
            body,
            headers,
        })
    }
}
