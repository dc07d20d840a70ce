// SPDX-License-Identifier: MIT OR Apache-2.0

//! The canonical result of a successful ping, and the normalization that
//! produces it from whatever JSON the service answered with.

use serde_json::{Map, Value};

/// Normalized result of a successful telemetry call.
///
/// The service's responses vary in which fields they populate;
/// normalization fills the gaps from known client state so callers always
/// see the same shape.
#[derive(Debug, Clone)]
pub struct PingResult {
    /// Always `true`: this type only exists on the 2xx path.
    pub ok: bool,
    /// The `action` field of the response, or the action that was sent.
    pub action: String,
    /// The `job_key` field of the response, or the client's configured key.
    pub job_key: String,
    /// The `timestamp` field of the response, verbatim. Empty if absent.
    pub timestamp: String,
    /// The `processing_time_ms` field coerced to f64; 0 if absent or
    /// unparseable.
    pub processing_time_ms: f64,
    /// The `next_expected` field, only when present and a string.
    pub next_expected: Option<String>,
    /// The full decoded payload, kept for forward compatibility.
    pub raw: Map<String, Value>,
}

impl PingResult {
    pub(crate) fn from_payload(
        action: &str,
        job_key: &str,
        payload: Map<String, Value>,
    ) -> Self {
        let out_action = non_empty_str(&payload, "action").unwrap_or(action).to_string();
        let out_job_key = non_empty_str(&payload, "job_key")
            .unwrap_or(job_key)
            .to_string();

        let timestamp = payload
            .get("timestamp")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let next_expected = payload
            .get("next_expected")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            ok: true,
            action: out_action,
            job_key: out_job_key,
            timestamp,
            processing_time_ms: float_or_zero(payload.get("processing_time_ms")),
            next_expected,
            raw: payload,
        }
    }
}

/// Decode a response body into a JSON object, substituting a minimal
/// fallback when the body is not JSON or not an object at the top level.
///
/// Both the success and error paths run through this; neither ever fails
/// on a malformed body.
pub(crate) fn decode_or_fallback(body: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut fallback = Map::new();
            fallback.insert(
                "message".to_string(),
                Value::String("Invalid JSON response".to_string()),
            );
            fallback
        }
    }
}

fn non_empty_str<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Coerce a JSON value to f64: numbers directly, numeric strings via
/// parsing, anything else (or absence) to 0.
fn float_or_zero(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
