//! Accumulates streamed chunks into cumulative snapshots and a final response.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde_json::Value;

use crate::types::{ChatCompletionChunk, CompletionUsage, FinishReason};
use crate::{Error, Result};

/// The state of a response after one more chunk.
///
/// `content` is the whole answer so far, never a delta: a view replaces what it displayed
/// with this text instead of appending to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSnapshot {
    /// Answer text received so far.
    pub content: String,
    /// Reasoning text received so far; empty when the model exposes none.
    pub reasoning_content: String,
    /// The chunk that produced this snapshot.
    pub chunk: ChatCompletionChunk,
}

/// A response assembled from a fully drained stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    /// Complete answer text.
    pub content: String,
    /// Raw citations from the last chunk that carried any.
    pub citations: Option<Vec<Value>>,
    /// Usage counters from the last chunk that carried any.
    pub usage: Option<CompletionUsage>,
    /// Complete reasoning trace, if the model produced one.
    pub reasoning_content: Option<String>,
    /// Why generation stopped.
    pub finish_reason: Option<FinishReason>,
    /// Model that answered, as reported by the service.
    pub model: Option<String>,
}

/// A stream wrapper that accumulates [`ChatCompletionChunk`]s into a [`ChatResponse`].
///
/// Every chunk is turned into a [`StreamSnapshot`] carrying the cumulative text so that the
/// caller can re-render as tokens arrive.  When the inner stream is fully drained the
/// accumulated response is sent via the oneshot channel returned by `new()`.  If the inner
/// stream yields an error the channel is closed without a response: the request cannot be
/// resumed, and the text seen so far stays available through [`Self::content`].
pub struct AccumulatingStream {
    inner: Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk>> + Send>>,
    response_tx: Option<tokio::sync::oneshot::Sender<ChatResponse>>,
    response: ChatResponse,
    reasoning: String,
}

impl AccumulatingStream {
    /// Wraps a chunk stream.
    ///
    /// Returns the stream and a receiver that will contain the accumulated response once
    /// the stream is fully drained.
    pub fn new<S>(stream: S) -> (Self, tokio::sync::oneshot::Receiver<ChatResponse>)
    where
        S: Stream<Item = Result<ChatCompletionChunk>> + Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let this = Self {
            inner: Box::pin(stream),
            response_tx: Some(tx),
            response: ChatResponse::default(),
            reasoning: String::new(),
        };
        (this, rx)
    }

    /// Answer text accumulated so far.
    pub fn content(&self) -> &str {
        &self.response.content
    }

    fn accumulate_chunk(&mut self, chunk: &ChatCompletionChunk) {
        if let Some(model) = &chunk.model {
            self.response.model = Some(model.clone());
        }
        if let Some(choice) = chunk.first_choice() {
            if let Some(text) = &choice.delta.content {
                self.response.content.push_str(text);
            }
            if let Some(text) = &choice.delta.reasoning_content {
                self.reasoning.push_str(text);
            }
            if choice.finish_reason.is_some() {
                self.response.finish_reason = choice.finish_reason;
            }
        }
        if let Some(citations) = &chunk.citations {
            self.response.citations = Some(citations.clone());
        }
        if chunk.usage.is_some() {
            self.response.usage = chunk.usage;
        }
    }

    fn snapshot(&self, chunk: ChatCompletionChunk) -> StreamSnapshot {
        StreamSnapshot {
            content: self.response.content.clone(),
            reasoning_content: self.reasoning.clone(),
            chunk,
        }
    }

    fn finalize(&mut self) -> ChatResponse {
        let mut response = std::mem::take(&mut self.response);
        let reasoning = std::mem::take(&mut self.reasoning);
        if !reasoning.is_empty() {
            response.reasoning_content = Some(reasoning);
        }
        response
    }
}

impl Stream for AccumulatingStream {
    type Item = Result<StreamSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                self.accumulate_chunk(&chunk);
                Poll::Ready(Some(Ok(self.snapshot(chunk))))
            }
            Poll::Ready(Some(Err(e))) => {
                self.response_tx.take();
                Poll::Ready(Some(Err::<StreamSnapshot, Error>(e)))
            }
            Poll::Ready(None) => {
                if let Some(tx) = self.response_tx.take() {
                    let response = self.finalize();
                    let _ = tx.send(response);
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, stream};
    use serde_json::json;

    #[tokio::test]
    async fn snapshots_carry_cumulative_text() {
        let chunks = vec![
            Ok(ChatCompletionChunk::text("Le ")),
            Ok(ChatCompletionChunk::text("principe ")),
            Ok(ChatCompletionChunk::text("général")),
        ];
        let (acc, rx) = AccumulatingStream::new(stream::iter(chunks));
        let snapshots: Vec<_> = acc.map(|s| s.unwrap().content).collect().await;
        assert_eq!(
            snapshots,
            vec!["Le ", "Le principe ", "Le principe général"]
        );

        let response = rx.await.expect("response delivered");
        assert_eq!(response.content, "Le principe général");
        assert!(response.citations.is_none());
        assert!(response.usage.is_none());
        assert!(response.reasoning_content.is_none());
    }

    #[tokio::test]
    async fn citations_usage_and_reasoning_are_kept() {
        let usage = CompletionUsage::new(30).with_reasoning_tokens(7);
        let chunks = vec![
            Ok(ChatCompletionChunk::reasoning("Je cherche l'article.")),
            Ok(ChatCompletionChunk::text("Article 1240.")),
            Ok(ChatCompletionChunk::default()
                .with_citations(vec![json!("https://www.legifrance.gouv.fr/a")])
                .with_usage(usage)),
        ];
        let (mut acc, rx) = AccumulatingStream::new(stream::iter(chunks));
        let mut last = None;
        while let Some(snapshot) = acc.next().await {
            last = Some(snapshot.unwrap());
        }
        let last = last.unwrap();
        assert_eq!(last.content, "Article 1240.");
        assert_eq!(last.reasoning_content, "Je cherche l'article.");

        let response = rx.await.unwrap();
        assert_eq!(response.citations.as_ref().map(Vec::len), Some(1));
        assert_eq!(response.usage, Some(usage));
        assert_eq!(
            response.reasoning_content.as_deref(),
            Some("Je cherche l'article.")
        );
    }

    #[tokio::test]
    async fn error_closes_the_channel() {
        let chunks = vec![
            Ok(ChatCompletionChunk::text("Le principe gén")),
            Err(Error::streaming("connection reset", None)),
        ];
        let (mut acc, rx) = AccumulatingStream::new(stream::iter(chunks));
        assert!(acc.next().await.unwrap().is_ok());
        assert!(acc.next().await.unwrap().is_err());
        assert_eq!(acc.content(), "Le principe gén");
        assert!(acc.next().await.is_none());
        assert!(rx.await.is_err());
    }
}
