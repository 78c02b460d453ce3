//! Streaming transcript assembly for chat turns.
//!
//! Consumes a line-oriented event stream of typed text fragments and
//! reconstructs an ordered, typed transcript that can be rendered live as it
//! arrives and persisted once the stream ends.
//!
//! Invariant: one assembler consumes one ordered line sequence. Closed
//! segments are always in strict arrival order; the open segment grows by
//! appending, never by replacement, and any kind change closes it.

pub mod assembler;
pub mod delta;
pub mod error;
pub mod frame;
pub mod framing;
pub mod runner;
pub mod source;
pub mod transcript;

pub use assembler::{assemble_lines, SegmentAssembler, StreamOutcome};
pub use delta::{parse_delta, Delta, SegmentKind};
pub use error::{Diagnostic, StreamError, TransportFailure};
pub use frame::{decode_line, FrameEvent};
pub use framing::LineFramer;
pub use runner::{drive, start, start_with_cancel, StreamHandle};
pub use source::{
    cancel_requested, new_cancel_signal, CancelSignal, LineSource, ReaderLineSource,
    ScriptedLineSource,
};
pub use transcript::{Segment, Transcript, TranscriptStatus, TranscriptView};
