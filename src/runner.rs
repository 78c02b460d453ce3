use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::assembler::{SegmentAssembler, StreamOutcome};
use crate::source::{cancel_requested, new_cancel_signal, CancelSignal, LineSource};
use crate::transcript::{Transcript, TranscriptStatus, TranscriptView};

/// Fold a line source into a transcript, publishing a snapshot after every
/// processed line.
///
/// The cancel signal is checked between lines only; cancelling mid-segment
/// preserves all text accumulated so far. Snapshots are published only after
/// a transition completes, never mid-mutation.
pub fn drive<S, F>(source: &mut S, cancel: &CancelSignal, mut publish: F) -> StreamOutcome
where
    S: LineSource,
    F: FnMut(TranscriptView),
{
    let mut assembler = SegmentAssembler::new();

    loop {
        if cancel_requested(cancel) {
            assembler.cancel();
            break;
        }

        match source.next_line() {
            Ok(Some(line)) => {
                assembler.push_line(&line);
                publish(assembler.view());
                if assembler.is_terminal() {
                    break;
                }
            }
            Ok(None) => {
                // A source that stopped because of cancellation must not
                // read as a normal completion.
                if cancel_requested(cancel) {
                    assembler.cancel();
                } else {
                    assembler.finish();
                }
                break;
            }
            Err(failure) => {
                assembler.fail(failure.message);
                break;
            }
        }
    }

    publish(assembler.view());
    assembler.into_outcome()
}

/// Handle to a stream being assembled on a worker thread.
///
/// `snapshot` is non-blocking and always current; `cancel` requests a
/// cooperative stop; `result` joins the worker and yields the final
/// immutable transcript.
pub struct StreamHandle {
    shared: Arc<Mutex<TranscriptView>>,
    cancel: CancelSignal,
    join: JoinHandle<StreamOutcome>,
}

impl StreamHandle {
    #[must_use]
    pub fn snapshot(&self) -> TranscriptView {
        lock_unpoisoned(&self.shared).clone()
    }

    /// Request a cooperative stop. Idempotent.
    pub fn cancel(&self) {
        self.cancel
            .store(true, std::sync::atomic::Ordering::Release);
    }

    /// Clone of the signal driving this stream, for sharing with a line
    /// source that wants to stop pulling early.
    #[must_use]
    pub fn cancel_signal(&self) -> CancelSignal {
        Arc::clone(&self.cancel)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Block until the stream reaches a terminal state.
    pub fn result(self) -> StreamOutcome {
        match self.join.join() {
            Ok(outcome) => outcome,
            // A panicking worker must not poison the caller; whatever was
            // last published is the preserved partial output.
            Err(_) => {
                let view = lock_unpoisoned(&self.shared).clone();
                debug!("stream worker panicked; finalizing published snapshot as failed");
                let mut segments = view.segments;
                if let Some(open) = view.open {
                    segments.push(open);
                }
                StreamOutcome {
                    transcript: Transcript {
                        segments,
                        open: None,
                        status: TranscriptStatus::Failed {
                            reason: "stream worker panicked".to_string(),
                        },
                    },
                    diagnostics: Vec::new(),
                }
            }
        }
    }
}

/// Begin consuming a line source on a dedicated worker thread.
pub fn start<S>(source: S) -> std::io::Result<StreamHandle>
where
    S: LineSource + Send + 'static,
{
    start_with_cancel(source, new_cancel_signal())
}

/// As [`start`], sharing a caller-held cancel signal.
pub fn start_with_cancel<S>(
    mut source: S,
    cancel: CancelSignal,
) -> std::io::Result<StreamHandle>
where
    S: LineSource + Send + 'static,
{
    let shared = Arc::new(Mutex::new(SegmentAssembler::new().view()));
    let worker_shared = Arc::clone(&shared);
    let worker_cancel = Arc::clone(&cancel);

    let join = thread::Builder::new()
        .name("transcript-stream".to_string())
        .spawn(move || {
            drive(&mut source, &worker_cancel, |view| {
                *lock_unpoisoned(&worker_shared) = view;
            })
        })?;

    Ok(StreamHandle {
        shared,
        cancel,
        join,
    })
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
