use bytes::Bytes;
use futures::Stream;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_ERRORS, STREAM_EVENTS,
};
use crate::types::{ChatCompletionChunk, ChatCompletionRequest};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/";

/// Client for the OpenAI chat-completions API.
///
/// No request timeout is enforced by default; streamed completions can be
/// long-lived. Use [`OpenAi::with_options`] to set one.
#[derive(Debug, Clone)]
pub struct OpenAi {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
}

impl OpenAi {
    /// Create a new OpenAI client.
    ///
    /// The API key can be provided directly or read from the OPENAI_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var("OPENAI_API_KEY").map_err(|_| {
                Error::authentication(
                    "API key not provided and OPENAI_API_KEY environment variable not set",
                )
            })?,
        };

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            api_key,
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .expect("API key should be valid"),
        );
        headers
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        // Get headers we might need for error processing
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // Try to parse error response body
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
            param: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        // Try to parse as JSON first
        let parsed_error = serde_json::from_str::<ErrorResponse>(&error_body).ok();
        let error_type = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.error_type.clone());
        let error_message = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| error_body.clone());
        let error_param = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.param.clone());

        // Map HTTP status code to appropriate error type
        match status_code {
            400 => Error::bad_request(error_message, error_param),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message, request_id),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_type, error_message, request_id),
        }
    }

    /// Send a chat-completion request and get a streaming response.
    ///
    /// Returns a stream of ChatCompletionChunk objects that can be processed
    /// incrementally. The stream ends when the server sends its `[DONE]`
    /// marker.
    pub async fn stream_chat(
        &self,
        mut request: ChatCompletionRequest,
    ) -> Result<impl Stream<Item = Result<ChatCompletionChunk>> + Send + use<>> {
        request.stream = true;

        let url = format!("{}chat/completions", self.base_url);

        CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                if e.is_timeout() {
                    Error::timeout(format!("Request timed out: {}", e), None)
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        // Get the byte stream from the response
        let stream = response.bytes_stream();

        // Create an SSE processor
        Ok(process_sse(stream))
    }
}

/// One parsed frame of the SSE stream.
enum Frame {
    /// A decoded chunk (or a decode failure for one event).
    Chunk(Result<ChatCompletionChunk>),

    /// The `[DONE]` end-of-stream marker.
    Done,

    /// An event with no data payload; skipped.
    Skip,
}

/// Process a stream of bytes into a stream of chat-completion chunks.
///
/// This function takes a byte stream from an HTTP response and converts it
/// into parsed ChatCompletionChunk objects, handling SSE framing, buffering,
/// and error conditions.
pub(crate) fn process_sse<S, E>(byte_stream: S) -> impl Stream<Item = Result<ChatCompletionChunk>>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    // Convert transport errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    // Use a state machine to process the SSE stream
    let buffer = String::new();

    stream::unfold(
        (stream, buffer),
        move |(mut stream, mut buffer)| async move {
            loop {
                // First check if we have a complete frame in the buffer
                match extract_frame(&buffer) {
                    Some((Frame::Done, _)) => return None,
                    Some((Frame::Skip, remaining)) => {
                        buffer = remaining;
                        continue;
                    }
                    Some((Frame::Chunk(chunk), remaining)) => {
                        buffer = remaining;
                        if chunk.is_err() {
                            STREAM_ERRORS.click();
                        } else {
                            STREAM_EVENTS.click();
                        }
                        return Some((chunk, (stream, buffer)));
                    }
                    None => {}
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => buffer.push_str(&text),
                        Err(e) => {
                            STREAM_ERRORS.click();
                            return Some((
                                Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {e}"),
                                    Some(Box::new(e)),
                                )),
                                (stream, buffer),
                            ));
                        }
                    },
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer)));
                    }
                    None => {
                        // End of stream without a [DONE] marker
                        return None;
                    }
                }
            }
        },
    )
}

/// Extract a complete SSE frame from a buffer string.
///
/// Events are delimited by double newlines; the payload is carried on a
/// `data:` line, with `[DONE]` marking end of stream.
fn extract_frame(buffer: &str) -> Option<(Frame, String)> {
    let (event_text, rest) = buffer.split_once("\n\n")?;
    let rest = rest.to_string();

    // Take the last data: line of the event
    let mut data = None;
    for line in event_text.lines() {
        if let Some(value) = line.strip_prefix("data:") {
            data = Some(value.trim());
        }
    }

    match data {
        Some("[DONE]") => Some((Frame::Done, rest)),
        Some(json_str) => match serde_json::from_str::<ChatCompletionChunk>(json_str) {
            Ok(chunk) => Some((Frame::Chunk(Ok(chunk)), rest)),
            Err(e) => Some((
                Frame::Chunk(Err(Error::serialization(
                    format!("Failed to parse event JSON: {e}"),
                    Some(Box::new(e)),
                ))),
                rest,
            )),
        },
        None => Some((Frame::Skip, rest)),
    }
}
