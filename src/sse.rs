//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! The chat-completions endpoint frames every chunk as a `data: {json}` event, separated by
//! blank lines, and ends the stream with `data: [DONE]`.  This module turns the raw byte
//! stream of an HTTP response into a stream of [`ChatCompletionChunk`]s.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::observability::{STREAM_BYTES, STREAM_ERRORS, STREAM_EVENTS};
use crate::types::ChatCompletionChunk;
use crate::{Error, Result};

const DONE_MARKER: &str = "[DONE]";

/// One decoded SSE event.
#[derive(Debug)]
enum Frame {
    Chunk(ChatCompletionChunk),
    Done,
    Skip,
}

/// Where the stream stands with respect to the `[DONE]` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    /// The body closed without `[DONE]`; the truncation error is still owed.
    Truncated,
    Finished,
}

fn truncated() -> Error {
    STREAM_ERRORS.click();
    Error::streaming("stream ended before [DONE]", None)
}

/// Process a stream of bytes into a stream of completion chunks.
///
/// The returned stream ends cleanly only after the `[DONE]` marker.  A body that closes
/// before it yields [`Error::Streaming`] after any trailing chunk, so an answer cut off
/// mid-way is never mistaken for a complete one.  Transport errors are passed through as
/// [`Error::Streaming`]; a chunk that fails to decode yields an error but does not end the
/// stream.
pub fn process_sse<S, E>(byte_stream: S) -> impl Stream<Item = Result<ChatCompletionChunk>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    // Bytes rather than a String: a multi-byte character may straddle two reads.
    let buffer: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer, Phase::Open),
        move |(mut stream, mut buffer, phase)| async move {
            match phase {
                Phase::Open => {}
                Phase::Truncated => {
                    return Some((Err(truncated()), (stream, Vec::new(), Phase::Finished)));
                }
                Phase::Finished => return None,
            }
            loop {
                if let Some((frame, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    match frame {
                        Ok(Frame::Chunk(chunk)) => {
                            STREAM_EVENTS.click();
                            return Some((Ok(chunk), (stream, buffer, Phase::Open)));
                        }
                        Ok(Frame::Done) => return None,
                        Ok(Frame::Skip) => continue,
                        Err(err) => {
                            STREAM_ERRORS.click();
                            return Some((Err(err), (stream, buffer, Phase::Open)));
                        }
                    }
                }

                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
                    }
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer, Phase::Finished)));
                    }
                    None => {
                        // A final event without the trailing blank line.
                        if buffer.iter().any(|b| !b.is_ascii_whitespace()) {
                            buffer.extend_from_slice(b"\n\n");
                            if let Some((frame, _)) = extract_event(&buffer) {
                                return match frame {
                                    Ok(Frame::Chunk(chunk)) => {
                                        STREAM_EVENTS.click();
                                        Some((Ok(chunk), (stream, Vec::new(), Phase::Truncated)))
                                    }
                                    Ok(Frame::Done) => None,
                                    Ok(Frame::Skip) => Some((
                                        Err(truncated()),
                                        (stream, Vec::new(), Phase::Finished),
                                    )),
                                    Err(err) => {
                                        STREAM_ERRORS.click();
                                        Some((Err(err), (stream, Vec::new(), Phase::Truncated)))
                                    }
                                };
                            }
                        }
                        return Some((Err(truncated()), (stream, Vec::new(), Phase::Finished)));
                    }
                }
            }
        },
    )
}

/// Extract a complete SSE event from the front of `buffer`.
///
/// Returns `None` while no blank line has been seen yet.
fn extract_event(buffer: &[u8]) -> Option<(Result<Frame>, Vec<u8>)> {
    let end = buffer.windows(2).position(|window| window == b"\n\n")?;
    let rest = buffer[end + 2..].to_vec();
    let event_text = match std::str::from_utf8(&buffer[..end]) {
        Ok(text) => text,
        Err(e) => return Some((Err(e.into()), rest)),
    };
    Some((parse_event(event_text), rest))
}

/// Parse the lines of one event.
///
/// Comment lines (leading `:`) and fields other than `data` are ignored; several `data`
/// lines are joined with newlines as the SSE format prescribes.
fn parse_event(event_text: &str) -> Result<Frame> {
    let mut data: Option<String> = None;
    for line in event_text.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            match data.as_mut() {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => data = Some(value.to_string()),
            }
        }
    }

    let Some(data) = data else {
        return Ok(Frame::Skip);
    };
    let data = data.trim();
    if data.is_empty() {
        return Ok(Frame::Skip);
    }
    if data == DONE_MARKER {
        return Ok(Frame::Done);
    }

    #[derive(Deserialize)]
    struct StreamError {
        error: ErrorBody,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        #[serde(rename = "type")]
        error_type: Option<String>,
    }

    if let Ok(StreamError { error }) = serde_json::from_str::<StreamError>(data) {
        let message = error.message.unwrap_or_else(|| data.to_string());
        return Err(match error.error_type {
            Some(error_type) => Error::streaming(format!("{error_type}: {message}"), None),
            None => Error::streaming(message, None),
        });
    }

    serde_json::from_str::<ChatCompletionChunk>(data)
        .map(Frame::Chunk)
        .map_err(|e| {
            Error::serialization(
                format!("Failed to parse chunk JSON: {e}"),
                Some(Box::new(e)),
            )
        })
}
