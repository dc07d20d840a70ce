// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime utilities for resilience.
//!
//! Houses the backoff strategy used by the client's retry loop.

mod retry;

pub use retry::ExponentialBackoff;
