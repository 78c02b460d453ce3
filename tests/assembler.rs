use chat_transcript::{assemble_lines, SegmentKind, StreamError, TranscriptStatus};
use pretty_assertions::assert_eq;

#[test]
fn single_kind_stream_concatenates_in_arrival_order() {
    let outcome = assemble_lines([
        "data: {\"type\":\"answer\",\"content\":\"The \"}",
        "data: {\"content\":\"answer \"}",
        "data: {\"content\":\"is 42.\"}",
        "data: {\"type\":\"done\"}",
    ]);

    let transcript = outcome.transcript;
    assert_eq!(transcript.status, TranscriptStatus::Completed);
    assert_eq!(transcript.segments.len(), 1);
    assert_eq!(transcript.segments[0].kind, SegmentKind::Answer);
    assert_eq!(transcript.segments[0].text, "The answer is 42.");
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn alternating_kinds_produce_three_segments_not_two() {
    let outcome = assemble_lines([
        "data: {\"type\":\"reasoning\",\"content\":\"first\"}",
        "data: {\"type\":\"answer\",\"content\":\"middle\"}",
        "data: {\"type\":\"reasoning\",\"content\":\"second\"}",
        "data: {\"type\":\"done\"}",
    ]);

    let segments = outcome.transcript.segments;
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0].kind, SegmentKind::Reasoning);
    assert_eq!(segments[0].text, "first");
    assert_eq!(segments[1].kind, SegmentKind::Answer);
    assert_eq!(segments[2].kind, SegmentKind::Reasoning);
    // A reappearing kind opens a new segment; the earlier one is untouched.
    assert_eq!(segments[2].text, "second");
    assert_eq!(
        segments.iter().map(|s| s.position).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn empty_content_kind_change_still_creates_a_boundary() {
    let outcome = assemble_lines([
        "data: {\"type\":\"reasoning\",\"content\":\"thinking\"}",
        "data: {\"type\":\"tool\",\"content\":\"\"}",
        "data: {\"type\":\"answer\",\"content\":\"done thinking\"}",
        "data: {\"type\":\"done\"}",
    ]);

    let segments = outcome.transcript.segments;
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[1].kind, SegmentKind::ToolCall);
    assert_eq!(segments[1].text, "");
    assert_eq!(segments[2].text, "done thinking");
}

#[test]
fn malformed_line_between_deltas_does_not_corrupt_their_segment() {
    let outcome = assemble_lines([
        "data: {\"type\":\"answer\",\"content\":\"left\"}",
        "data: {not json at all",
        "data: {\"content\":\" right\"}",
        "data: {\"type\":\"done\"}",
    ]);

    assert_eq!(outcome.transcript.segments.len(), 1);
    assert_eq!(outcome.transcript.segments[0].text, "left right");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].line, 2);
    assert!(matches!(
        outcome.diagnostics[0].error,
        StreamError::MalformedFrame { .. }
    ));
}

#[test]
fn unrecognized_kind_is_skipped_with_a_diagnostic() {
    let outcome = assemble_lines([
        "data: {\"type\":\"answer\",\"content\":\"kept\"}",
        "data: {\"type\":\"interpretive_dance\",\"content\":\"dropped\"}",
        "data: {\"type\":\"done\"}",
    ]);

    assert_eq!(outcome.transcript.segments.len(), 1);
    assert_eq!(outcome.transcript.segments[0].text, "kept");
    assert_eq!(outcome.diagnostics.len(), 1);
}

#[test]
fn kindless_delta_before_any_segment_is_an_orphan() {
    let outcome = assemble_lines([
        "data: {\"content\":\"who do I belong to\"}",
        "data: {\"type\":\"answer\",\"content\":\"ok\"}",
        "data: {\"type\":\"done\"}",
    ]);

    assert_eq!(outcome.transcript.segments.len(), 1);
    assert_eq!(outcome.transcript.segments[0].text, "ok");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].error, StreamError::OrphanDelta);
    assert_eq!(outcome.diagnostics[0].line, 1);
}

#[test]
fn blank_and_comment_lines_are_ignored_without_diagnostics() {
    let outcome = assemble_lines([
        "",
        ": keep-alive",
        "data: {\"type\":\"answer\",\"content\":\"42\"}",
        "",
        "data: {\"type\":\"done\"}",
    ]);

    assert_eq!(outcome.transcript.status, TranscriptStatus::Completed);
    assert_eq!(outcome.transcript.segments.len(), 1);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn explicit_error_finalizes_with_partial_output_preserved() {
    let outcome = assemble_lines([
        "data: {\"type\":\"reasoning\",\"content\":\"a\"}",
        "data: {\"type\":\"error\",\"message\":\"boom\"}",
    ]);

    let transcript = outcome.transcript;
    assert_eq!(
        transcript.status,
        TranscriptStatus::Failed {
            reason: "boom".to_string()
        }
    );
    assert_eq!(transcript.segments.len(), 1);
    assert_eq!(transcript.segments[0].kind, SegmentKind::Reasoning);
    assert_eq!(transcript.segments[0].text, "a");
    assert!(transcript.open.is_none());
}

#[test]
fn reasoning_then_answer_example_from_the_wire() {
    let outcome = assemble_lines([
        "data: {\"type\":\"reasoning\",\"content\":\"Let's \"}",
        "data: {\"type\":\"reasoning\",\"content\":\"think.\"}",
        "data: {\"type\":\"answer\",\"content\":\"42\"}",
        "data: {\"type\":\"done\"}",
    ]);

    let transcript = outcome.transcript;
    assert_eq!(transcript.status, TranscriptStatus::Completed);
    assert_eq!(transcript.segments.len(), 2);
    assert_eq!(transcript.segments[0].kind, SegmentKind::Reasoning);
    assert_eq!(transcript.segments[0].text, "Let's think.");
    assert_eq!(transcript.segments[1].kind, SegmentKind::Answer);
    assert_eq!(transcript.segments[1].text, "42");
}

#[test]
fn done_token_literal_terminates_like_a_done_event() {
    let outcome = assemble_lines([
        "data: {\"type\":\"answer\",\"content\":\"done\"}",
        "data: [DONE]",
    ]);

    assert_eq!(outcome.transcript.status, TranscriptStatus::Completed);
    assert_eq!(outcome.transcript.segments.len(), 1);
}

#[test]
fn lines_after_the_terminator_are_dropped() {
    let outcome = assemble_lines([
        "data: {\"type\":\"answer\",\"content\":\"final\"}",
        "data: {\"type\":\"done\"}",
        "data: {\"type\":\"answer\",\"content\":\"straggler\"}",
    ]);

    assert_eq!(outcome.transcript.segments.len(), 1);
    assert_eq!(outcome.transcript.segments[0].text, "final");
}

#[test]
fn replaying_the_same_lines_yields_an_identical_transcript() {
    let lines = [
        "data: {\"type\":\"reasoning\",\"content\":\"r1\"}",
        "data: {bad frame",
        "data: {\"type\":\"answer\",\"content\":\"a1\"}",
        "data: {\"content\":\"a2\"}",
        "data: {\"type\":\"done\"}",
    ];

    let first = assemble_lines(lines);
    let second = assemble_lines(lines);
    assert_eq!(first, second);
}
