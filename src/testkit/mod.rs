// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test support: a scripted in-process transport.
//!
//! [`StubTransport`] lets SDK users (and this crate's own tests) exercise
//! the full request/retry/normalization pipeline without a network. Script
//! responses in order, optionally inject leading transport failures, and
//! inspect the recorded calls afterwards.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};

use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// One scripted response.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A request the stub observed, kept for assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Scripted [`Transport`] implementation.
///
/// Consumes `fail_times` network failures first, then the scripted
/// responses in order. Once the script runs dry it answers `200 {}`.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<StubResponse>>,
    network_failures: AtomicU32,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_responses(responses: impl IntoIterator<Item = StubResponse>) -> Self {
        let stub = Self::new();
        for response in responses {
            stub.push_response(response);
        }
        stub
    }

    /// Append a scripted response.
    pub fn push_response(&self, response: StubResponse) {
        self.responses
            .lock()
            .expect("stub responses poisoned")
            .push_back(response);
    }

    /// Fail the next `count` calls at the transport level before serving
    /// any scripted response.
    pub fn fail_times(&self, count: u32) {
        self.network_failures.store(count, Ordering::SeqCst);
    }

    /// All calls observed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("stub calls poisoned").clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("stub calls poisoned").len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls
            .lock()
            .expect("stub calls poisoned")
            .push(RecordedCall {
                method: request.method,
                url: request.url,
                headers: request.headers,
                body: request
                    .body
                    .map(|b| String::from_utf8_lossy(&b).into_owned()),
            });

        let failed = self
            .network_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(TransportError::message("socket timeout"));
        }

        let next = self
            .responses
            .lock()
            .expect("stub responses poisoned")
            .pop_front()
            .unwrap_or_else(|| StubResponse::new(200, "{}"));

        Ok(HttpResponse {
            status: StatusCode::from_u16(next.status).expect("valid scripted status code"),
            body: next.body,
            headers: std::collections::HashMap::new(),
        })
    }
}
