use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chat_transcript::Transcript;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::TranscriptStoreError;
use crate::paths::{transcript_file_name, transcript_root};
use crate::schema::{JsonLine, SegmentRecord, TranscriptHeader};

/// A transcript read back from disk, with its stored identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTranscript {
    pub header: TranscriptHeader,
    pub transcript: Transcript,
}

/// Writes finalized transcripts as one JSONL file each and reads them back
/// with strict validation.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    root: PathBuf,
}

impl TranscriptStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a terminal transcript. Refuses a transcript that is still
    /// streaming: its open segment has not been folded yet.
    pub fn save(&self, transcript: &Transcript) -> Result<PathBuf, TranscriptStoreError> {
        if !transcript.status.is_terminal() {
            return Err(TranscriptStoreError::StillStreaming);
        }

        let dir = transcript_root(&self.root);
        fs::create_dir_all(&dir)
            .map_err(|source| TranscriptStoreError::io("creating transcript directory", &dir, source))?;

        let transcript_id = Uuid::new_v4().to_string();
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(TranscriptStoreError::ClockFormat)?;
        let path = dir.join(transcript_file_name(&created_at, &transcript_id));

        let header = TranscriptHeader::v1(transcript_id, created_at, transcript.status.clone());
        let mut contents = serde_json::to_string(&header)
            .map_err(|source| TranscriptStoreError::json_serialize(&path, source))?;
        contents.push('\n');

        for segment in &transcript.segments {
            let record = SegmentRecord::from_segment(segment);
            contents.push_str(
                &serde_json::to_string(&record)
                    .map_err(|source| TranscriptStoreError::json_serialize(&path, source))?,
            );
            contents.push('\n');
        }

        fs::write(&path, contents)
            .map_err(|source| TranscriptStoreError::io("writing transcript file", &path, source))?;
        Ok(path)
    }

    /// Read one transcript file back, validating record order, version, and
    /// position contiguity.
    pub fn load(path: &Path) -> Result<StoredTranscript, TranscriptStoreError> {
        let path_buf = path.to_path_buf();
        let file = fs::File::open(path)
            .map_err(|source| TranscriptStoreError::io("opening transcript file", &path_buf, source))?;
        let reader = BufReader::new(file);

        let mut header: Option<TranscriptHeader> = None;
        let mut segments = Vec::new();

        for (line_index, line_result) in reader.lines().enumerate() {
            let line_number = line_index + 1;
            let line = line_result
                .map_err(|source| TranscriptStoreError::io_line(&path_buf, line_number, source))?;
            if line.trim().is_empty() {
                continue;
            }

            let parsed: JsonLine = serde_json::from_str(&line)
                .map_err(|source| TranscriptStoreError::json_line(&path_buf, line_number, source))?;

            if header.is_none() {
                match parsed {
                    JsonLine::Header(parsed_header) => {
                        if parsed_header.version != 1 {
                            return Err(TranscriptStoreError::UnsupportedVersion {
                                path: path_buf,
                                line: line_number,
                                found: parsed_header.version,
                            });
                        }
                        header = Some(parsed_header);
                    }
                    JsonLine::Segment(_) => {
                        return Err(TranscriptStoreError::InvalidHeaderRecord {
                            path: path_buf,
                            line: line_number,
                        });
                    }
                }
                continue;
            }

            match parsed {
                JsonLine::Header(_) => {
                    return Err(TranscriptStoreError::InvalidSegmentRecord {
                        path: path_buf,
                        line: line_number,
                    });
                }
                JsonLine::Segment(record) => {
                    let expected = segments.len();
                    if record.position != expected {
                        return Err(TranscriptStoreError::NonContiguousPosition {
                            path: path_buf,
                            line: line_number,
                            expected,
                            found: record.position,
                        });
                    }
                    segments.push(record.into_segment());
                }
            }
        }

        let header =
            header.ok_or(TranscriptStoreError::MissingHeader { path: path_buf })?;
        let transcript = Transcript {
            segments,
            open: None,
            status: header.status.clone(),
        };

        Ok(StoredTranscript { header, transcript })
    }

    /// Paths of every stored transcript under this root, sorted by file name
    /// (and therefore by creation timestamp).
    pub fn list(&self) -> Result<Vec<PathBuf>, TranscriptStoreError> {
        let dir = transcript_root(&self.root);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|source| TranscriptStoreError::io("listing transcript directory", &dir, source))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|source| TranscriptStoreError::io("listing transcript directory", &dir, source))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "jsonl") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}
