use serde_json::Value;

use crate::error::StreamError;

/// Prefix marking a data-carrying line in the event stream.
pub const DATA_PREFIX: &str = "data:";

/// Literal terminator token some transports emit instead of a `done` event.
pub const DONE_TOKEN: &str = "[DONE]";

/// One classified line from the event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// A well-formed data payload to be parsed into a delta.
    Data(Value),
    /// The stream announced normal completion.
    StreamEnd,
    /// The server signaled failure mid-stream.
    ExplicitError(String),
    /// Blank line, comment, or transport keep-alive.
    Ignore,
}

/// Classify one line of the stream.
///
/// Pure function of the line. A payload that fails to parse as JSON is a
/// recoverable [`StreamError::MalformedFrame`], not a stream abort.
pub fn decode_line(line: &str) -> Result<FrameEvent, StreamError> {
    // The terminator token is also valid as a bare line.
    if line.trim() == DONE_TOKEN {
        return Ok(FrameEvent::StreamEnd);
    }

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(FrameEvent::Ignore);
    };

    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(FrameEvent::Ignore);
    }
    if payload == DONE_TOKEN {
        return Ok(FrameEvent::StreamEnd);
    }

    let value: Value = serde_json::from_str(payload)
        .map_err(|error| StreamError::malformed(format!("invalid JSON payload: {error}")))?;

    match value.get("type").and_then(Value::as_str) {
        Some("done") => Ok(FrameEvent::StreamEnd),
        Some("error") => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("stream error without message")
                .to_string();
            Ok(FrameEvent::ExplicitError(message))
        }
        _ => Ok(FrameEvent::Data(value)),
    }
}
