// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input shapes for progress reports.
//!
//! A progress call may carry nothing, a bare sequence number, or a
//! sequence/message pair. The variants are validated at this boundary so
//! the client's request path only ever sees well-formed input.

use serde::Serialize;

use crate::error::{CronbeatsError, Result};

/// Longest message the service stores; anything longer is cut, not rejected.
pub(crate) const MAX_MESSAGE_CHARS: usize = 255;

/// Wire payload of a progress report.
#[derive(Debug, Serialize)]
pub(crate) struct ProgressBody {
    pub message: String,
}

/// Optional sequence and message for a progress report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressOptions {
    /// Monotonic step counter; must be non-negative when present.
    pub seq: Option<i64>,
    /// Free-form status line, truncated to 255 characters.
    pub message: String,
}

impl ProgressOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn seq(mut self, seq: i64) -> Self {
        self.seq = Some(seq);
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// What a caller may hand to [`crate::CronbeatsClient::progress`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProgressInput {
    /// No sequence, empty message.
    #[default]
    None,
    /// A bare sequence number.
    Seq(i64),
    /// Sequence and/or message.
    Options(ProgressOptions),
}

impl ProgressInput {
    /// Validate and reduce to the pieces the request builder needs:
    /// the optional sequence and the (possibly truncated) message.
    pub(crate) fn resolve(self) -> Result<(Option<i64>, String)> {
        let (seq, message) = match self {
            Self::None => (None, String::new()),
            Self::Seq(seq) => (Some(seq), String::new()),
            Self::Options(opts) => (opts.seq, opts.message),
        };

        if let Some(seq) = seq {
            if seq < 0 {
                return Err(CronbeatsError::Validation(
                    "progress seq must be a non-negative integer".to_string(),
                ));
            }
        }

        Ok((seq, truncate_chars(message, MAX_MESSAGE_CHARS)))
    }
}

impl From<()> for ProgressInput {
    fn from(_: ()) -> Self {
        Self::None
    }
}

impl From<i64> for ProgressInput {
    fn from(seq: i64) -> Self {
        Self::Seq(seq)
    }
}

// Unsuffixed literals fall back to i32, so the narrower widths convert too.
impl From<i32> for ProgressInput {
    fn from(seq: i32) -> Self {
        Self::Seq(i64::from(seq))
    }
}

impl From<u32> for ProgressInput {
    fn from(seq: u32) -> Self {
        Self::Seq(i64::from(seq))
    }
}

impl From<ProgressOptions> for ProgressInput {
    fn from(opts: ProgressOptions) -> Self {
        Self::Options(opts)
    }
}

impl From<&str> for ProgressInput {
    fn from(message: &str) -> Self {
        Self::Options(ProgressOptions::new().message(message))
    }
}

impl From<String> for ProgressInput {
    fn from(message: String) -> Self {
        Self::Options(ProgressOptions::new().message(message))
    }
}

/// Truncate by character count. Byte slicing would panic mid-codepoint.
fn truncate_chars(message: String, max: usize) -> String {
    if message.chars().count() <= max {
        return message;
    }
    message.chars().take(max).collect()
}
