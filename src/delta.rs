use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StreamError;

/// Closed set of segment kinds a stream may carry.
///
/// An unrecognized tag in input is a malformed frame, never a silently
/// accepted new kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Reasoning,
    Answer,
    #[serde(rename = "tool")]
    ToolCall,
}

impl SegmentKind {
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "reasoning" => Self::Reasoning,
            "answer" => Self::Answer,
            "tool" => Self::ToolCall,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reasoning => "reasoning",
            Self::Answer => "answer",
            Self::ToolCall => "tool",
        }
    }
}

/// One parsed increment of streamed content.
///
/// `kind: None` means "continue the previous kind". `content` is an increment
/// of text, never the full accumulated text; an empty string is valid and may
/// still carry a kind change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub kind: Option<SegmentKind>,
    pub content: String,
}

/// Parse a data-frame payload into a [`Delta`].
pub fn parse_delta(value: &Value) -> Result<Delta, StreamError> {
    let content = match value.get("content") {
        Some(Value::String(text)) => text.clone(),
        Some(other) => {
            return Err(StreamError::malformed(format!(
                "'content' must be a string, got {}",
                value_type_name(other)
            )))
        }
        None => return Err(StreamError::malformed("missing required 'content' field")),
    };

    let kind = match value.get("type") {
        None | Some(Value::Null) => None,
        Some(Value::String(tag)) => Some(
            SegmentKind::parse(tag)
                .ok_or_else(|| StreamError::malformed(format!("unrecognized segment kind '{tag}'")))?,
        ),
        Some(other) => {
            return Err(StreamError::malformed(format!(
                "'type' must be a string, got {}",
                value_type_name(other)
            )))
        }
    };

    Ok(Delta { kind, content })
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
