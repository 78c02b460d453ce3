use std::collections::VecDeque;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::TransportFailure;
use crate::framing::LineFramer;

/// Shared cooperative cancellation flag, checked between lines.
pub type CancelSignal = Arc<AtomicBool>;

#[must_use]
pub fn new_cancel_signal() -> CancelSignal {
    Arc::new(AtomicBool::new(false))
}

#[must_use]
pub fn cancel_requested(cancel: &CancelSignal) -> bool {
    cancel.load(Ordering::Acquire)
}

/// A lazy, finite, non-restartable sequence of decoded text lines.
///
/// `Ok(None)` is a clean end of stream; `Err` is an abnormal transport end.
/// Implementations check their cancel signal between lines, never mid-read.
pub trait LineSource {
    fn next_line(&mut self) -> Result<Option<String>, TransportFailure>;
}

const READ_CHUNK_SIZE: usize = 4096;

/// Reference line source over any byte reader.
///
/// Frames bytes incrementally through [`LineFramer`], so lines split across
/// read chunks come out whole. When the cancel signal is set, stops pulling
/// from the reader and reports end of stream; the driver decides whether
/// that end is a completion or a cancellation.
pub struct ReaderLineSource<R> {
    reader: R,
    framer: LineFramer,
    pending: VecDeque<String>,
    cancel: Option<CancelSignal>,
    exhausted: bool,
}

impl<R: Read> ReaderLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            framer: LineFramer::default(),
            pending: VecDeque::new(),
            cancel: None,
            exhausted: false,
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(cancel_requested)
    }
}

impl<R: Read> LineSource for ReaderLineSource<R> {
    fn next_line(&mut self) -> Result<Option<String>, TransportFailure> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Ok(Some(line));
            }
            if self.exhausted {
                return Ok(None);
            }
            if self.cancelled() {
                return Ok(None);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    self.exhausted = true;
                    self.pending.extend(self.framer.finish());
                }
                Ok(read) => {
                    self.pending.extend(self.framer.feed(&chunk[..read]));
                }
                Err(error) if error.kind() == std::io::ErrorKind::Interrupted => {}
                Err(error) => return Err(TransportFailure::from(error)),
            }
        }
    }
}

/// In-memory line feed for tests and deterministic replays.
///
/// Optionally ends with a transport failure instead of a clean end, to
/// exercise abnormal-termination paths.
#[derive(Debug, Default)]
pub struct ScriptedLineSource {
    lines: VecDeque<String>,
    failure: Option<TransportFailure>,
}

impl ScriptedLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            failure: None,
        }
    }

    /// End the feed with a transport failure once the lines run out.
    #[must_use]
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(TransportFailure::new(message));
        self
    }
}

impl LineSource for ScriptedLineSource {
    fn next_line(&mut self) -> Result<Option<String>, TransportFailure> {
        if let Some(line) = self.lines.pop_front() {
            return Ok(Some(line));
        }
        match self.failure.take() {
            Some(failure) => Err(failure),
            None => Ok(None),
        }
    }
}
