use std::future::Future;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chat_transcript::{CancelSignal, StreamOutcome, TranscriptView};
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::headers::build_headers;
use crate::retry::{is_retryable_http_error, retry_delay_ms, MAX_RETRIES};
use crate::stream::TranscriptFold;
use crate::url::normalize_chat_url;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// One streaming chat turn request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            conversation_id: None,
        }
    }

    #[must_use]
    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

/// HTTP client that turns a streaming chat response into a transcript.
#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, ChatApiError> {
        let headers = build_headers(&self.config);
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                    ChatApiError::InvalidBaseUrl(format!("invalid header key: {key}"))
                })?,
                HeaderValue::from_str(&value).map_err(|_| {
                    ChatApiError::InvalidBaseUrl(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &ChatRequest,
    ) -> Result<reqwest::RequestBuilder, ChatApiError> {
        let headers = self.build_headers()?;
        Ok(self
            .http
            .get(self.normalized_endpoint())
            .headers(headers)
            .query(request))
    }

    pub async fn send_with_retry(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancelSignal>,
    ) -> Result<Response, ChatApiError> {
        let mut last_status: Option<StatusCode> = None;
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            if is_cancelled(cancellation) {
                return Err(ChatApiError::Cancelled);
            }

            let response = self.build_request(request)?.send();
            let response = await_or_cancel(response, cancellation)
                .await?
                .map_err(ChatApiError::from);

            match response {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response);
                    }

                    let status = response.status();
                    last_status = Some(status);
                    let body = await_or_cancel(response.text(), cancellation)
                        .await?
                        .unwrap_or_else(|_| {
                            status
                                .canonical_reason()
                                .unwrap_or("request failed")
                                .to_string()
                        });
                    let message = parse_error_message(status, &body);
                    last_error = Some(message.clone());

                    if attempt < MAX_RETRIES && is_retryable_http_error(status.as_u16(), &body) {
                        debug!(attempt, %status, "retrying streaming chat request");
                        await_or_cancel(tokio::time::sleep(retry_delay_ms(attempt)), cancellation)
                            .await?;
                        continue;
                    }

                    return Err(ChatApiError::Status(status, message));
                }
                Err(error) => {
                    let message = error.to_string();
                    last_error = Some(message.clone());
                    if attempt < MAX_RETRIES {
                        debug!(attempt, "retrying streaming chat request after send error");
                        await_or_cancel(tokio::time::sleep(retry_delay_ms(attempt)), cancellation)
                            .await?;
                        continue;
                    }
                    return Err(ChatApiError::RetryExhausted {
                        status: last_status,
                        last_error,
                    });
                }
            }
        }

        Err(ChatApiError::RetryExhausted {
            status: last_status,
            last_error,
        })
    }

    /// Stream one chat turn, publishing a transcript snapshot after every
    /// processed line.
    ///
    /// Failures before the stream opens are `Err`. Once streaming has begun,
    /// cancellation and transport errors finalize the transcript
    /// (`Cancelled` / `Failed`) and return it: accumulated segments are
    /// never discarded.
    pub async fn stream_with_observer<F>(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancelSignal>,
        mut on_view: F,
    ) -> Result<StreamOutcome, ChatApiError>
    where
        F: FnMut(TranscriptView),
    {
        let response = self.send_with_retry(request, cancellation).await?;
        let mut bytes = response.bytes_stream();
        let mut fold = TranscriptFold::new();

        loop {
            if is_cancelled(cancellation) {
                fold.cancel();
                break;
            }

            match await_or_cancel(bytes.next(), cancellation).await {
                Err(ChatApiError::Cancelled) => {
                    fold.cancel();
                    break;
                }
                Err(error) => return Err(error),
                Ok(None) => {
                    fold.finish();
                    break;
                }
                Ok(Some(Err(error))) => {
                    fold.fail(format!("connection lost: {error}"));
                    break;
                }
                Ok(Some(Ok(chunk))) => {
                    if fold.feed_with(&chunk, &mut on_view) {
                        break;
                    }
                }
            }
        }

        on_view(fold.view());
        Ok(fold.into_outcome())
    }

    /// Stream one chat turn to its final transcript.
    pub async fn stream_transcript(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancelSignal>,
    ) -> Result<StreamOutcome, ChatApiError> {
        self.stream_with_observer(request, cancellation, |_| {}).await
    }
}

fn is_cancelled(cancel: Option<&CancelSignal>) -> bool {
    cancel.is_some_and(|signal| signal.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancelSignal>,
) -> Result<F::Output, ChatApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(ChatApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(ChatApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatApiClient, ChatRequest};
    use crate::config::ChatApiConfig;

    #[test]
    fn endpoint_is_normalized_from_the_configured_base() {
        let client = ChatApiClient::new(ChatApiConfig::new("http://localhost:9000"))
            .expect("client should build");
        assert_eq!(client.normalized_endpoint(), "http://localhost:9000/api/chat");
    }

    #[test]
    fn request_builds_with_query_parameters() {
        let client =
            ChatApiClient::new(ChatApiConfig::default()).expect("client should build");
        let request = ChatRequest::new("hello").with_conversation_id("c-7");
        let built = client
            .build_request(&request)
            .expect("request should build")
            .build()
            .expect("request should finalize");

        let url = built.url().as_str();
        assert!(url.starts_with("http://127.0.0.1:8000/api/chat?"));
        assert!(url.contains("query=hello"));
        assert!(url.contains("conversation_id=c-7"));
    }
}
