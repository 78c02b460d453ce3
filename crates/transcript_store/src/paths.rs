use std::path::{Path, PathBuf};

pub const TRANSCRIPT_DIR: [&str; 2] = [".chat", "transcripts"];

#[must_use]
pub fn transcript_root(base: &Path) -> PathBuf {
    base.join(TRANSCRIPT_DIR[0]).join(TRANSCRIPT_DIR[1])
}

#[must_use]
pub fn sanitize_timestamp_for_filename(timestamp: &str) -> String {
    timestamp
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' => '-',
            _ => c,
        })
        .collect()
}

#[must_use]
pub fn transcript_file_name(created_at: &str, transcript_id: &str) -> String {
    format!(
        "{}_{}.jsonl",
        sanitize_timestamp_for_filename(created_at),
        transcript_id
    )
}

#[cfg(test)]
mod tests {
    use super::{sanitize_timestamp_for_filename, transcript_file_name};

    #[test]
    fn timestamps_are_safe_for_filenames() {
        assert_eq!(
            sanitize_timestamp_for_filename("2026-08-06T10:30:00Z"),
            "2026-08-06T10-30-00Z"
        );
    }

    #[test]
    fn file_name_combines_timestamp_and_id() {
        assert_eq!(
            transcript_file_name("2026-08-06T10:30:00Z", "abc"),
            "2026-08-06T10-30-00Z_abc.jsonl"
        );
    }
}
