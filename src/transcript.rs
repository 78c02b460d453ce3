use serde::{Deserialize, Serialize};

use crate::delta::SegmentKind;

/// A finalized, contiguous, single-kind run of text in the transcript.
///
/// `text` is exactly the ordered concatenation of the delta contents folded
/// into the segment between the delta that opened it and the one that closed
/// it. `position` is the segment's 0-based index in the closed list at the
/// time it was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
    pub position: usize,
}

/// Lifecycle state of a transcript.
///
/// `Streaming` is the only state in which the open segment may still change;
/// every other state is terminal and accepts no further mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptStatus {
    Streaming,
    Completed,
    Cancelled,
    Failed { reason: String },
}

impl TranscriptStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Streaming)
    }
}

/// The full ordered output of one streamed turn.
///
/// Invariant: `status == Streaming` iff `open` may still change. Once
/// terminal, `open` is `None` and its content has been folded into
/// `segments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub segments: Vec<Segment>,
    pub open: Option<Segment>,
    pub status: TranscriptStatus,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            open: None,
            status: TranscriptStatus::Streaming,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Concatenation of all segment text in arrival order, open segment last.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push_str(&segment.text);
        }
        if let Some(open) = &self.open {
            out.push_str(&open.text);
        }
        out
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only snapshot of a transcript mid-assembly, used for live rendering.
///
/// A pure projection: closed segments plus the open segment, published only
/// after a transition completes, so a reader never observes a torn buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptView {
    pub segments: Vec<Segment>,
    pub open: Option<Segment>,
    pub status: TranscriptStatus,
}

impl TranscriptView {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Concatenation of all segment text in arrival order, open segment last.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push_str(&segment.text);
        }
        if let Some(open) = &self.open {
            out.push_str(&open.text);
        }
        out
    }
}
