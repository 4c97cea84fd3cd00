use std::env;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_TTFB,
};
use crate::sse::process_sse;
use crate::types::{ChatCompletion, ChatCompletionChunk, ChatCompletionParams};

const DEFAULT_API_URL: &str = "https://api.x.ai/v1/";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GROK_API_KEY";

/// Upper bound on a whole call, streaming included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// A boxed stream of completion chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk>> + Send>>;

/// Client for the xAI chat-completions API.
#[derive(Clone)]
pub struct XaiClient {
    api_key: Option<String>,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl fmt::Debug for XaiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XaiClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl XaiClient {
    /// Create a new client.
    ///
    /// The API key can be provided directly or read from the `GROK_API_KEY` environment
    /// variable.  A missing key is not reported here: the first request fails with an
    /// authentication error instead.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key.or_else(|| env::var(API_KEY_ENV).ok());
        let base_url = normalize_base_url(base_url.as_deref().unwrap_or(DEFAULT_API_URL))?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that sees every request, chunk and response.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are sent to, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::authentication(format!(
                "API key not provided and {API_KEY_ENV} environment variable not set"
            ))
        })?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| Error::authentication("API key contains invalid header characters"))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };
        let (error_type, error_message) = parse_error_body(&error_body);
        error_for_status(status_code, error_type, error_message, retry_after)
    }

    async fn post(&self, params: &ChatCompletionParams, accept: &'static str) -> Result<Response> {
        let mut headers = self.default_headers()?;
        headers.insert(header::ACCEPT, HeaderValue::from_static(accept));
        let url = format!("{}chat/completions", self.base_url);

        if let Some(logger) = &self.logger {
            logger.log_request(params);
        }
        tracing::debug!(
            model = %params.model,
            messages = params.messages.len(),
            search = params.search_parameters.is_some(),
            stream = params.stream,
            "sending chat completion request"
        );

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(params)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.map_send_error(e)
            })?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            let err = Self::process_error_response(response).await;
            tracing::warn!(error = %err, "chat completion request rejected");
            return Err(err);
        }
        Ok(response)
    }

    /// Send a request and wait for the complete, non-streamed answer.
    pub async fn send(&self, params: ChatCompletionParams) -> Result<ChatCompletion> {
        let params = params.with_stream(false);
        let response = self.post(&params, "application/json").await?;

        let completion = response.json::<ChatCompletion>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {e}"),
                Some(Box::new(e)),
            )
        })?;
        if let Some(logger) = &self.logger {
            logger.log_response(&completion);
        }
        Ok(completion)
    }

    /// Send a request and get the answer as a stream of chunks.
    ///
    /// Each chunk carries only the text added since the previous one; see
    /// [`AccumulatingStream`](crate::AccumulatingStream) for the cumulative view.
    pub async fn stream(&self, params: ChatCompletionParams) -> Result<ChunkStream> {
        let params = params.with_stream(true);
        let start = Instant::now();
        let response = self.post(&params, "text/event-stream").await?;
        STREAM_TTFB.add(start.elapsed().as_secs_f64());

        let chunks = process_sse(response.bytes_stream());
        match self.logger.clone() {
            Some(logger) => Ok(Box::pin(chunks.inspect(move |chunk| {
                if let Ok(chunk) = chunk {
                    logger.log_stream_chunk(chunk);
                }
            }))),
            None => Ok(Box::pin(chunks)),
        }
    }
}

/// Validate `base_url` and make sure relative paths join beneath it.
fn normalize_base_url(base_url: &str) -> Result<String> {
    let parsed = Url::parse(base_url)?;
    if parsed.cannot_be_a_base() {
        return Err(Error::url(
            format!("{base_url} cannot be used as a base URL"),
            None,
        ));
    }
    let mut base = parsed.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}

/// Map a non-success status code to the matching [`Error`] variant.
fn error_for_status(
    status_code: u16,
    error_type: Option<String>,
    message: String,
    retry_after: Option<u64>,
) -> Error {
    match status_code {
        400 | 422 => Error::bad_request(message, None),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, error_type, message),
    }
}

/// Pull `error.type` and `error.message` out of an error body, falling back to the raw
/// body when it is not the expected JSON.
fn parse_error_body(body: &str) -> (Option<String>, String) {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorDetail {
        Object {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
        },
        Text(String),
    }

    match serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|response| response.error)
    {
        Some(ErrorDetail::Object {
            error_type,
            message,
        }) => (error_type, message.unwrap_or_else(|| body.to_string())),
        Some(ErrorDetail::Text(message)) => (None, message),
        None => (None, body.to_string()),
    }
}
