use chat_transcript::{LineFramer, SegmentAssembler, StreamOutcome, TranscriptView};

/// Incremental fold from raw response-body chunks to an assembled transcript.
///
/// Chunk boundaries land anywhere; lines are reassembled by [`LineFramer`]
/// before the assembler sees them, so a delta split across two network reads
/// is indistinguishable from one that arrived whole.
#[derive(Debug, Default)]
pub struct TranscriptFold {
    framer: LineFramer,
    assembler: SegmentAssembler,
}

impl TranscriptFold {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk. Returns true once the stream reached a terminal
    /// state, after which further chunks are dropped.
    pub fn feed(&mut self, chunk: &[u8]) -> bool {
        self.feed_with(chunk, |_| {})
    }

    /// As [`TranscriptFold::feed`], publishing a snapshot after every line
    /// processed, not just after every chunk.
    pub fn feed_with<F>(&mut self, chunk: &[u8], mut observe: F) -> bool
    where
        F: FnMut(TranscriptView),
    {
        for line in self.framer.feed(chunk) {
            self.assembler.push_line(&line);
            observe(self.assembler.view());
            if self.assembler.is_terminal() {
                return true;
            }
        }
        self.assembler.is_terminal()
    }

    /// Signal clean end of the byte stream: drain any unterminated trailing
    /// line, then complete.
    pub fn finish(&mut self) {
        if let Some(line) = self.framer.finish() {
            self.assembler.push_line(&line);
        }
        self.assembler.finish();
    }

    /// Terminal transport failure; accumulated segments are preserved.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.assembler.fail(reason);
    }

    /// Cooperative cancellation; accumulated segments are preserved.
    pub fn cancel(&mut self) {
        self.assembler.cancel();
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.assembler.is_terminal()
    }

    #[must_use]
    pub fn view(&self) -> TranscriptView {
        self.assembler.view()
    }

    #[must_use]
    pub fn into_outcome(self) -> StreamOutcome {
        self.assembler.into_outcome()
    }
}
