//! Transport-only streaming chat client primitives.
//!
//! This crate owns request building, retry, and response-body folding for the
//! chat backend's streaming endpoint. It contains no UI coupling and no
//! session CRUD; the transcript semantics live in `chat_transcript`, which
//! this crate drives with the raw bytes it receives.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod retry;
pub mod stream;
pub mod url;

pub use client::{ChatApiClient, ChatRequest};
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use stream::TranscriptFold;
pub use url::normalize_chat_url;
