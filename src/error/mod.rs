// SPDX-License-Identifier: MIT OR Apache-2.0

use http::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::transport::TransportError;

/// Classification of a non-2xx API response.
///
/// Display renders the wire-style code string (`VALIDATION_ERROR`, ...) so
/// callers can log or compare against what the service itself reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// 400 — the service rejected the request payload or path.
    Validation,
    /// 404 — the job key is unknown to the service.
    NotFound,
    /// 429 — over the service's rate limit.
    RateLimited,
    /// 5xx — the service failed.
    Server,
    /// Any other non-2xx status.
    Unknown,
}

impl ApiErrorCode {
    /// Map an HTTP status to its classification.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => Self::Validation,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            s if s >= 500 => Self::Server,
            _ => Self::Unknown,
        }
    }

    /// Whether a response with this classification is worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Server)
    }

    /// The wire-style code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::Server => "SERVER_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-2xx response from the Cronbeats API, after retries were exhausted
/// or ruled out.
#[derive(Debug, Clone, Error)]
#[error("{code} ({status}): {message}")]
pub struct ApiError {
    /// Status classification, per the table in [`ApiErrorCode::from_status`].
    pub code: ApiErrorCode,
    /// The HTTP status the service answered with.
    pub status: StatusCode,
    /// Whether this class of failure is retryable. Informational: by the
    /// time the error is returned the retry budget is already spent.
    pub retryable: bool,
    /// Message extracted from the response body, or `"Request failed"`.
    pub message: String,
    /// The decoded response body (or the fallback object if it was not
    /// valid JSON).
    pub raw: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum CronbeatsError {
    /// Invalid input caught before any network call: a malformed job key,
    /// base URL, user agent, end status, or progress sequence.
    #[error("validation error: {0}")]
    Validation(String),

    /// The transport could not complete the call (DNS, timeout, connection
    /// reset). Always retryable; surfaced once the retry budget is spent.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The service answered with a non-2xx status.
    #[error("API request failed: {0}")]
    Api(#[from] ApiError),
}

impl CronbeatsError {
    /// Whether retrying the call could plausibly succeed. Lets callers
    /// branch without destructuring the variant.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::Network(_) => true,
            Self::Api(err) => err.retryable,
        }
    }
}

pub type Result<T> = std::result::Result<T, CronbeatsError>;
