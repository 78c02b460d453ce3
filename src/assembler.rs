use tracing::{debug, warn};

use crate::delta::{parse_delta, Delta, SegmentKind};
use crate::error::{Diagnostic, StreamError};
use crate::frame::{decode_line, FrameEvent};
use crate::transcript::{Segment, Transcript, TranscriptStatus, TranscriptView};

/// Final product of one assembled stream: the immutable transcript plus the
/// recoverable diagnostics collected along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    pub transcript: Transcript,
    pub diagnostics: Vec<Diagnostic>,
}

/// State machine folding an ordered delta sequence into typed segments.
///
/// Tracks a single "currently open" segment and closes it on any kind change,
/// so segments stay contiguous and in strict arrival order. Re-opening a
/// previously closed kind starts a new segment; it never mutates an old one.
///
/// Recoverable input errors (malformed frames, orphan deltas) skip the bad
/// unit and are recorded as diagnostics; only stream-end, explicit error,
/// transport failure, or cancellation move the status out of `Streaming`.
#[derive(Debug, Default)]
pub struct SegmentAssembler {
    open: Option<(SegmentKind, String)>,
    closed: Vec<Segment>,
    terminal: Option<TranscriptStatus>,
    diagnostics: Vec<Diagnostic>,
    line: usize,
}

impl SegmentAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line from the stream.
    ///
    /// Lines arriving after a terminal state are dropped.
    pub fn push_line(&mut self, line: &str) {
        self.line += 1;
        if self.is_terminal() {
            debug!(line = self.line, "dropping line after terminal state");
            return;
        }

        match decode_line(line) {
            Ok(FrameEvent::Ignore) => {}
            Ok(FrameEvent::Data(value)) => match parse_delta(&value) {
                Ok(delta) => self.push_delta(delta),
                Err(error) => self.record(error),
            },
            Ok(FrameEvent::StreamEnd) => self.finish(),
            Ok(FrameEvent::ExplicitError(message)) => self.fail(message),
            Err(error) => self.record(error),
        }
    }

    /// Fold one parsed delta into the open segment.
    pub fn push_delta(&mut self, delta: Delta) {
        if self.is_terminal() {
            return;
        }

        let open_kind = self.open.as_ref().map(|(kind, _)| *kind);
        let Some(effective_kind) = delta.kind.or(open_kind) else {
            self.record(StreamError::OrphanDelta);
            return;
        };

        match &mut self.open {
            // Same kind: append, never replace. Replacing would lose the
            // text accumulated from earlier deltas.
            Some((kind, buffer)) if *kind == effective_kind => {
                buffer.push_str(&delta.content);
            }
            Some(_) => {
                self.close_open();
                self.open = Some((effective_kind, delta.content));
            }
            None => {
                self.open = Some((effective_kind, delta.content));
            }
        }
    }

    /// Normal completion: explicit `done` or end of input without one.
    pub fn finish(&mut self) {
        self.transition(TranscriptStatus::Completed);
    }

    /// Terminal failure signaled by the server or the transport.
    ///
    /// Partial output is preserved: the open segment is finalized before the
    /// status changes.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.transition(TranscriptStatus::Failed {
            reason: reason.into(),
        });
    }

    /// Cooperative cancellation. Idempotent; keeps all accumulated text.
    pub fn cancel(&mut self) {
        self.transition(TranscriptStatus::Cancelled);
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    #[must_use]
    pub fn status(&self) -> TranscriptStatus {
        self.terminal
            .clone()
            .unwrap_or(TranscriptStatus::Streaming)
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Current read-only snapshot: closed segments plus the open segment.
    ///
    /// Computed from the fold state, never cached, so it cannot drift.
    #[must_use]
    pub fn view(&self) -> TranscriptView {
        TranscriptView {
            segments: self.closed.clone(),
            open: self.open.as_ref().map(|(kind, buffer)| Segment {
                kind: *kind,
                text: buffer.clone(),
                position: self.closed.len(),
            }),
            status: self.status(),
        }
    }

    /// Consume the assembler and produce the final transcript.
    ///
    /// An assembler that never saw a terminal marker is completed here: the
    /// caller consuming it is the end of input.
    #[must_use]
    pub fn into_outcome(mut self) -> StreamOutcome {
        if !self.is_terminal() {
            self.finish();
        }

        let status = self.status();
        StreamOutcome {
            transcript: Transcript {
                segments: self.closed,
                open: None,
                status,
            },
            diagnostics: self.diagnostics,
        }
    }

    fn transition(&mut self, status: TranscriptStatus) {
        if self.is_terminal() {
            return;
        }

        self.close_open();
        debug!(segments = self.closed.len(), ?status, "stream terminal");
        self.terminal = Some(status);
    }

    fn close_open(&mut self) {
        if let Some((kind, text)) = self.open.take() {
            let position = self.closed.len();
            debug!(kind = kind.as_str(), position, "segment closed");
            self.closed.push(Segment {
                kind,
                text,
                position,
            });
        }
    }

    fn record(&mut self, error: StreamError) {
        warn!(line = self.line, %error, "skipping unusable stream unit");
        self.diagnostics.push(Diagnostic {
            line: self.line,
            error,
        });
    }
}

/// Fold a complete line sequence in one shot.
///
/// Replaying the same sequence always yields an identical outcome.
pub fn assemble_lines<I, S>(lines: I) -> StreamOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut assembler = SegmentAssembler::new();
    for line in lines {
        assembler.push_line(line.as_ref());
    }
    assembler.into_outcome()
}
