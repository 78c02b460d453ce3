use std::fmt;

use thiserror::Error;

/// Recoverable per-line failures raised while decoding or parsing the stream.
///
/// These never abort the fold: the offending line is skipped and the error is
/// recorded as a [`Diagnostic`] against the line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("malformed frame: {reason}")]
    MalformedFrame { reason: String },

    #[error("delta carries no kind and no segment is open")]
    OrphanDelta,
}

impl StreamError {
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFrame {
            reason: reason.into(),
        }
    }
}

/// A recoverable error pinned to the 1-based stream line that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: StreamError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

/// Abnormal end of the underlying byte stream (connection reset, read error).
///
/// Terminal for the stream: the transcript is finalized as `Failed` with the
/// carried message, keeping everything accumulated so far.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportFailure {
    pub message: String,
}

impl TransportFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for TransportFailure {
    fn from(error: std::io::Error) -> Self {
        Self::new(format!("read failed: {error}"))
    }
}
