//! Logging trait for chat client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture and log all
//! API interactions passing through the [`XaiClient`](crate::XaiClient).

use crate::types::{ChatCompletion, ChatCompletionChunk, ChatCompletionParams};

/// A trait for logging chat client operations.
///
/// Implement this trait to keep an audit trail of every question asked and every answer
/// received, for instance to review what sources an answer relied on.
///
/// # Example
///
/// ```rust,ignore
/// use juriste::{ChatCompletion, ChatCompletionChunk, ChatCompletionParams, ClientLogger};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, params: &ChatCompletionParams) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Request: {}", serde_json::to_string(params).unwrap()).unwrap();
///     }
///
///     fn log_stream_chunk(&self, chunk: &ChatCompletionChunk) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Chunk: {}", serde_json::to_string(chunk).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, completion: &ChatCompletion) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Response: {}", serde_json::to_string(completion).unwrap()).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, params: &ChatCompletionParams);

    /// Log an individual streaming chunk.
    ///
    /// Called once for each [`ChatCompletionChunk`] decoded from a streaming response.
    fn log_stream_chunk(&self, chunk: &ChatCompletionChunk);

    /// Log a complete response from a non-streaming `send` call.
    fn log_response(&self, completion: &ChatCompletion);
}
