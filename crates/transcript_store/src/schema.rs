use chat_transcript::{Segment, SegmentKind, TranscriptStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptRecordType {
    Transcript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentRecordType {
    Segment,
}

/// First line of a transcript file: identity, version, and terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptHeader {
    #[serde(rename = "type")]
    pub record_type: TranscriptRecordType,
    pub version: u32,
    pub transcript_id: String,
    pub created_at: String,
    pub status: TranscriptStatus,
}

impl TranscriptHeader {
    #[must_use]
    pub fn v1(
        transcript_id: impl Into<String>,
        created_at: impl Into<String>,
        status: TranscriptStatus,
    ) -> Self {
        Self {
            record_type: TranscriptRecordType::Transcript,
            version: 1,
            transcript_id: transcript_id.into(),
            created_at: created_at.into(),
            status,
        }
    }
}

/// One finalized segment, stored in position order after the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentRecord {
    #[serde(rename = "type")]
    pub record_type: SegmentRecordType,
    pub position: usize,
    pub kind: SegmentKind,
    pub text: String,
}

impl SegmentRecord {
    #[must_use]
    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            record_type: SegmentRecordType::Segment,
            position: segment.position,
            kind: segment.kind,
            text: segment.text.clone(),
        }
    }

    #[must_use]
    pub fn into_segment(self) -> Segment {
        Segment {
            kind: self.kind,
            text: self.text,
            position: self.position,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum JsonLine {
    Header(TranscriptHeader),
    Segment(SegmentRecord),
}
