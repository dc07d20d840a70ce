// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod client;
pub mod error;
pub mod resources;
pub mod runtime;
pub mod testkit;
pub mod transport;

pub use client::{CronbeatsClient, CronbeatsClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiErrorCode, CronbeatsError, Result};
pub use resources::{PingResult, ProgressInput, ProgressOptions};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
