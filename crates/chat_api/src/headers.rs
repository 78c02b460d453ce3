use std::collections::BTreeMap;

use crate::config::ChatApiConfig;

pub const HEADER_SESSION_ID: &str = "session_id";
pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CACHE_CONTROL: &str = "cache-control";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for streaming chat requests.
pub fn build_headers(config: &ChatApiConfig) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    headers.insert(HEADER_ACCEPT.to_owned(), "text/event-stream".to_owned());
    headers.insert(HEADER_CACHE_CONTROL.to_owned(), "no-cache".to_owned());

    if let Some(user_agent) = config.user_agent.as_deref() {
        if !user_agent.trim().is_empty() {
            headers.insert(HEADER_USER_AGENT.to_owned(), user_agent.trim().to_owned());
        }
    }

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    if let Some(session_id) = &config.session_id {
        if !session_id.trim().is_empty() {
            headers.insert(HEADER_SESSION_ID.to_owned(), session_id.trim().to_owned());
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::{build_headers, HEADER_ACCEPT, HEADER_SESSION_ID};
    use crate::config::ChatApiConfig;

    #[test]
    fn always_requests_an_event_stream() {
        let headers = build_headers(&ChatApiConfig::default());
        assert_eq!(
            headers.get(HEADER_ACCEPT).map(String::as_str),
            Some("text/event-stream")
        );
    }

    #[test]
    fn session_id_is_included_only_when_non_empty() {
        let headers = build_headers(&ChatApiConfig::default().with_session_id("  "));
        assert!(!headers.contains_key(HEADER_SESSION_ID));

        let headers = build_headers(&ChatApiConfig::default().with_session_id("abc"));
        assert_eq!(headers.get(HEADER_SESSION_ID).map(String::as_str), Some("abc"));
    }

    #[test]
    fn extra_headers_are_lowercased_and_merged() {
        let config = ChatApiConfig::default().insert_header("X-Trace-Id", "t-1");
        let headers = build_headers(&config);
        assert_eq!(headers.get("x-trace-id").map(String::as_str), Some("t-1"));
    }
}
