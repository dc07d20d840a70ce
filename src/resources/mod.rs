// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strongly typed domain wrappers for Cronbeats telemetry calls.
//!
//! Request-side input shapes and the normalized success result live here;
//! the client composes them with the transport and retry policy.

mod ping;
mod progress;

pub use ping::PingResult;
pub use progress::{ProgressInput, ProgressOptions};

pub(crate) use ping::decode_or_fallback;
pub(crate) use progress::ProgressBody;
