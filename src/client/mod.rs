// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use http::Method;
use rand::rngs::StdRng;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ApiErrorCode, CronbeatsError, Result};
use crate::resources::{decode_or_fallback, PingResult, ProgressBody, ProgressInput};
use crate::runtime::ExponentialBackoff;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};

/// SDK name reported in the default user agent.
const SDK_NAME: &str = "cronbeats-rs-sdk";
/// SDK version reported in the default user agent.
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Production endpoint of the Cronbeats API.
pub const DEFAULT_BASE_URL: &str = "https://cronbeats.io";

/// Construction-time configuration. Immutable once the client is built.
#[derive(Clone, Debug)]
pub struct CronbeatsClientConfig {
    /// Base URL of the service; a trailing slash is trimmed.
    pub base_url: String,
    /// Timeout applied to each network attempt, not to the whole call.
    pub timeout: Duration,
    /// How many retries follow the initial attempt. 0 disables retries.
    pub max_retries: u32,
    /// Base wait for the backoff formula.
    pub retry_backoff: Duration,
    /// Upper bound of the uniformly random jitter added to each wait.
    pub retry_jitter: Duration,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for CronbeatsClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(5000),
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
            retry_jitter: Duration::from_millis(100),
            user_agent: format!("{SDK_NAME}/{SDK_VERSION}"),
        }
    }
}

/// Client for reporting a single job's lifecycle to Cronbeats.
///
/// Each action method performs one bounded retry loop and returns exactly
/// one [`PingResult`] or [`CronbeatsError`]. The client is cheap to share
/// across tasks; the only interior state is the jitter RNG.
///
/// # Example
///
/// ```no_run
/// use cronbeats_rs::{CronbeatsClient, CronbeatsClientConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CronbeatsClient::new("YCrXzYbV", CronbeatsClientConfig::default())?;
///
/// client.start().await?;
/// // ... do the job's work ...
/// client.success().await?;
/// # Ok(())
/// # }
/// ```
pub struct CronbeatsClient {
    base_url: String,
    job_key: String,
    timeout: Duration,
    max_retries: u32,
    backoff: ExponentialBackoff,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
    rng: Mutex<StdRng>,
}

impl CronbeatsClient {
    /// Build a client with the default reqwest-backed transport.
    pub fn new(job_key: &str, config: CronbeatsClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Self::with_transport(job_key, config, transport)
    }

    /// Build a client around an injected [`Transport`].
    ///
    /// # Errors
    ///
    /// Returns a [`CronbeatsError::Validation`] if the job key is not
    /// exactly 8 alphanumeric characters, the base URL does not parse, or
    /// the user agent is not a valid header value.
    pub fn with_transport(
        job_key: &str,
        config: CronbeatsClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        validate_job_key(job_key)?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| CronbeatsError::Validation(format!("invalid base URL: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| CronbeatsError::Validation(format!("invalid user agent: {e}")))?,
        );

        Ok(Self {
            base_url,
            job_key: job_key.to_string(),
            timeout: config.timeout,
            max_retries: config.max_retries,
            backoff: ExponentialBackoff::new(config.retry_backoff, config.retry_jitter),
            headers,
            transport,
            rng: Mutex::new(rand::make_rng::<StdRng>()),
        })
    }

    /// The validated job key this client reports for.
    #[must_use]
    pub fn job_key(&self) -> &str {
        &self.job_key
    }

    /// The normalized base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Report a plain heartbeat.
    pub async fn ping(&self) -> Result<PingResult> {
        self.request("ping", &format!("/ping/{}", self.job_key), None)
            .await
    }

    /// Report that the job has started.
    pub async fn start(&self) -> Result<PingResult> {
        self.request("start", &format!("/ping/{}/start", self.job_key), None)
            .await
    }

    /// Report that the job has finished with the given status.
    ///
    /// The status is trimmed and lowercased; empty defaults to `success`.
    /// Anything other than `success` or `fail` is rejected before any
    /// network call.
    pub async fn end(&self, status: &str) -> Result<PingResult> {
        let status = status.trim().to_lowercase();
        let status = if status.is_empty() {
            "success".to_string()
        } else {
            status
        };
        if status != "success" && status != "fail" {
            return Err(CronbeatsError::Validation(
                r#"status must be "success" or "fail""#.to_string(),
            ));
        }
        self.request(
            "end",
            &format!("/ping/{}/end/{}", self.job_key, status),
            None,
        )
        .await
    }

    /// Report a successful finish. Equivalent to `end("success")`.
    pub async fn success(&self) -> Result<PingResult> {
        self.end("success").await
    }

    /// Report a failed finish. Equivalent to `end("fail")`.
    pub async fn fail(&self) -> Result<PingResult> {
        self.end("fail").await
    }

    /// Report intermediate progress.
    ///
    /// Accepts `()`, a bare sequence number, a message, or
    /// [`crate::ProgressOptions`]:
    ///
    /// ```no_run
    /// # use cronbeats_rs::{CronbeatsClient, CronbeatsClientConfig, ProgressOptions};
    /// # async fn example(client: CronbeatsClient) -> cronbeats_rs::Result<()> {
    /// client.progress(()).await?;
    /// client.progress(3).await?;
    /// client.progress("halfway there").await?;
    /// client.progress(ProgressOptions::new().seq(4).message("loading")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn progress(&self, input: impl Into<ProgressInput>) -> Result<PingResult> {
        let (seq, message) = input.into().resolve()?;
        let path = match seq {
            Some(seq) => format!("/ping/{}/progress/{}", self.job_key, seq),
            None => format!("/ping/{}/progress", self.job_key),
        };
        let body = serde_json::to_vec(&ProgressBody { message }).map_err(|e| {
            CronbeatsError::Validation(format!("failed to encode request payload: {e}"))
        })?;
        self.request("progress", &path, Some(Bytes::from(body)))
            .await
    }

    async fn request(&self, action: &str, path: &str, payload: Option<Bytes>) -> Result<PingResult> {
        let url = format!("{}{}", self.base_url, path);

        let mut attempt: u32 = 0;
        loop {
            let request = HttpRequest {
                method: Method::POST,
                url: url.clone(),
                headers: self.headers.clone(),
                body: payload.clone(),
                timeout: self.timeout,
            };

            let response = match self.transport.send(request).await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= self.max_retries {
                        warn!(action, attempts = attempt + 1, error = %err, "transport failed, retry budget exhausted");
                        return Err(CronbeatsError::Network(err));
                    }
                    attempt += 1;
                    debug!(action, attempt, error = %err, "transport failure, retrying");
                    self.backoff_sleep(attempt).await;
                    continue;
                }
            };

            let decoded = decode_or_fallback(&response.body);
            if response.status.is_success() {
                debug!(action, status = response.status.as_u16(), "request succeeded");
                return Ok(PingResult::from_payload(action, &self.job_key, decoded));
            }

            let code = ApiErrorCode::from_status(response.status);
            if code.is_retryable() && attempt < self.max_retries {
                attempt += 1;
                debug!(
                    action,
                    attempt,
                    status = response.status.as_u16(),
                    "retryable status, retrying"
                );
                self.backoff_sleep(attempt).await;
                continue;
            }

            let message = decoded
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("Request failed")
                .to_string();

            warn!(action, status = response.status.as_u16(), code = %code, "request failed");
            return Err(CronbeatsError::Api(ApiError {
                code,
                status: response.status,
                retryable: code.is_retryable(),
                message,
                raw: decoded,
            }));
        }
    }

    async fn backoff_sleep(&self, attempt: u32) {
        // Compute the delay before awaiting so the RNG lock is never held
        // across a suspension point.
        let delay = {
            let mut rng = match self.rng.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            self.backoff.delay(attempt, &mut *rng)
        };
        tokio::time::sleep(delay).await;
    }
}

fn validate_job_key(job_key: &str) -> Result<()> {
    if job_key.len() == 8 && job_key.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(CronbeatsError::Validation(
            "job key must be exactly 8 alphanumeric characters".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests;
