//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent
//! - Issuing one GET (or configured method) per claimed frontier entry
//! - Streaming the body chunk by chunk into a per-request buffer
//! - Decoding bytes with the configured page encoding
//! - Classifying failures

use crate::config::CrawlConfig;
use crate::crawler::supervisor::{Supervised, TimeoutSupervisor};
use crate::state::{FetchState, FrontierEntry};
use crate::SpiderError;
use encoding_rs::{CoderResult, Decoder};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Status was OK and the body was read to the end
    Success {
        /// Decoded page text
        body: String,
        /// Raw bytes received
        bytes: usize,
    },

    /// Response status other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Connection, DNS, TLS or body read failure
    NetworkError {
        /// The underlying transport error
        error: reqwest::Error,
    },

    /// The request's state machine refused a step
    PipelineError {
        error: SpiderError,
    },

    /// The per-request deadline expired
    TimedOut,

    /// The crawl was stopped while the request was outstanding
    Aborted,
}

impl FetchResult {
    /// Terminal fetch state this result corresponds to
    pub fn state(&self) -> FetchState {
        match self {
            Self::Success { .. } => FetchState::Done,
            Self::HttpError { .. } | Self::NetworkError { .. } | Self::PipelineError { .. } => {
                FetchState::Failed
            }
            Self::TimedOut => FetchState::TimedOut,
            Self::Aborted => FetchState::Aborted,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpError { status_code } => Some(*status_code),
            Self::Success { .. } => Some(StatusCode::OK.as_u16()),
            _ => None,
        }
    }

    /// Converts a failed result into the matching error for `url`
    pub fn into_error(self, url: &str) -> Option<SpiderError> {
        match self {
            Self::Success { .. } | Self::Aborted => None,
            Self::HttpError { status_code } => Some(SpiderError::Status {
                url: url.to_string(),
                status: status_code,
            }),
            Self::NetworkError { error } => Some(SpiderError::Http {
                url: url.to_string(),
                source: error,
            }),
            Self::PipelineError { error } => Some(error),
            Self::TimedOut => Some(SpiderError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

/// Everything one in-flight request owns
///
/// Created when a slot claims a frontier entry and dropped when the fetch
/// completes, fails, times out or is aborted. Never shared between tasks.
pub struct RequestState {
    pub url: String,
    pub depth: u32,
    pub slot: usize,
    state: FetchState,
    decoder: Decoder,
    text: String,
    bytes_read: usize,
    status: Option<u16>,
}

impl RequestState {
    pub fn new(entry: FrontierEntry, slot: usize, encoding: &'static encoding_rs::Encoding) -> Self {
        Self {
            url: entry.url,
            depth: entry.depth,
            slot,
            state: FetchState::Requesting,
            decoder: encoding.new_decoder(),
            text: String::new(),
            bytes_read: 0,
            status: None,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// Moves to `next`, rejecting transitions the pipeline never makes
    pub fn advance(&mut self, next: FetchState) -> Result<(), SpiderError> {
        if !self.state.can_transition_to(next) {
            return Err(SpiderError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Decodes one body chunk and appends it to the accumulated text
    ///
    /// Multi-byte sequences split across chunks are carried over by the
    /// decoder.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<(), SpiderError> {
        self.advance(FetchState::Streaming)?;
        self.bytes_read += chunk.len();
        self.decode(chunk, false);
        Ok(())
    }

    /// Flushes the decoder, marks the request done and takes the text
    pub fn finish_body(&mut self) -> Result<String, SpiderError> {
        self.advance(FetchState::Done)?;
        self.decode(&[], true);
        Ok(std::mem::take(&mut self.text))
    }

    fn decode(&mut self, mut src: &[u8], last: bool) {
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len() + 16);
            self.text.reserve(needed);

            let (result, read, _had_errors) = self.decoder.decode_to_string(src, &mut self.text, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }
}

/// Builds an HTTP client with the configured user agent
///
/// No client-wide timeout is set; deadlines are enforced per request by the
/// [`TimeoutSupervisor`].
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.request_timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page, streaming its body into `request`
///
/// # Request Flow
///
/// 1. Send the request with the fixed Accept header and method
/// 2. Non-OK status → `HttpError`, nothing is read
/// 3. Read body chunks until the stream reports end of body
/// 4. Hand back the decoded text
///
/// The stop flag is checked after the headers arrive and after every chunk.
pub async fn fetch_page(
    client: &Client,
    request: &mut RequestState,
    config: &CrawlConfig,
    cancel: &CancellationToken,
) -> FetchResult {
    let sent = client
        .request(config.method.clone(), request.url.as_str())
        .header(ACCEPT, config.accept.as_str())
        .send()
        .await;

    let mut response = match sent {
        Ok(response) => response,
        Err(e) => return transport_failure(request, e),
    };

    if cancel.is_cancelled() {
        return fail(request, FetchResult::Aborted);
    }

    let status = response.status();
    request.status = Some(status.as_u16());
    if status != StatusCode::OK {
        return fail(
            request,
            FetchResult::HttpError {
                status_code: status.as_u16(),
            },
        );
    }

    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                if cancel.is_cancelled() {
                    return fail(request, FetchResult::Aborted);
                }
                tracing::trace!("{}: read {} bytes", request.url, chunk.len());
                if let Err(error) = request.push_chunk(&chunk) {
                    return fail(request, FetchResult::PipelineError { error });
                }
            }
            Ok(None) => break,
            Err(e) => return transport_failure(request, e),
        }
    }

    // An empty body never entered Streaming
    if request.state() == FetchState::Requesting {
        if let Err(error) = request.advance(FetchState::Streaming) {
            return fail(request, FetchResult::PipelineError { error });
        }
    }

    let bytes = request.bytes_read();
    match request.finish_body() {
        Ok(body) => FetchResult::Success { body, bytes },
        Err(error) => fail(request, FetchResult::PipelineError { error }),
    }
}

/// Fetches one page under the supervisor's deadline and stop flag
pub async fn fetch_supervised(
    client: &Client,
    request: &mut RequestState,
    config: &CrawlConfig,
    supervisor: &TimeoutSupervisor,
) -> FetchResult {
    let outcome = supervisor
        .supervise(fetch_page(client, request, config, supervisor.cancel_token()))
        .await;

    match outcome {
        Supervised::Completed(result) => result,
        Supervised::TimedOut => fail(request, FetchResult::TimedOut),
        Supervised::Aborted => fail(request, FetchResult::Aborted),
    }
}

/// Moves the request into the result's terminal state and returns the result
///
/// A request that already reached a terminal state keeps it.
fn fail(request: &mut RequestState, result: FetchResult) -> FetchResult {
    if request.state().is_terminal() {
        return result;
    }
    if let Err(e) = request.advance(result.state()) {
        tracing::debug!("{}: {}", request.url, e);
    }
    result
}

fn transport_failure(request: &mut RequestState, error: reqwest::Error) -> FetchResult {
    tracing::debug!("{}: {}", request.url, describe_error(&error));
    fail(request, FetchResult::NetworkError { error })
}

/// Short description of a transport error
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}
