//! The Chat Gateway: turns local conversation state into one streamed chat request.

use std::fmt;
use std::time::Instant;

use futures::StreamExt;

use crate::accumulating_stream::AccumulatingStream;
use crate::citation::{Citation, normalize_citations};
use crate::client::{ChunkStream, XaiClient};
use crate::conversation::Message;
use crate::observability::STREAM_DURATION;
use crate::render::Renderer;
use crate::search::SearchConfig;
use crate::types::{ChatCompletionParams, ChatMessageParam, CompletionUsage, MessageRole, Model};
use crate::{Error, Result};

/// Anything that can answer a chat request with a stream of chunks.
///
/// [`XaiClient`] is the production transport; tests substitute scripted ones.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Issue `params` as a streaming request.
    async fn stream_chat(&self, params: ChatCompletionParams) -> Result<ChunkStream>;
}

#[async_trait::async_trait]
impl ChatTransport for XaiClient {
    async fn stream_chat(&self, params: ChatCompletionParams) -> Result<ChunkStream> {
        self.stream(params).await
    }
}

/// A completed answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantTurn {
    /// Full answer text.
    pub text: String,
    /// Sources behind the answer; `None` when the service returned none.
    pub citations: Option<Vec<Citation>>,
    /// Usage counters, when the service reported them.
    pub usage: Option<CompletionUsage>,
    /// The model's reasoning, when it exposed one.
    pub reasoning_trace: Option<String>,
}

/// A turn that failed before the answer was complete.
#[derive(Debug)]
pub struct GatewayError {
    /// What went wrong.
    pub error: Error,
    /// Answer text received before the failure; possibly empty.
    pub partial_text: String,
}

impl GatewayError {
    fn new(error: Error, partial_text: impl Into<String>) -> Self {
        Self {
            error,
            partial_text: partial_text.into(),
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Builds requests for one model and one system prompt, and streams their answers.
///
/// The gateway holds no conversation state: the caller passes the history on every turn.
/// There is no retry and no cancellation; a turn runs until the stream ends or fails.
pub struct ChatGateway<T: ChatTransport> {
    transport: T,
    model: Model,
    system_prompt: String,
}

impl<T: ChatTransport> ChatGateway<T> {
    /// Create a gateway.
    pub fn new(transport: T, model: Model, system_prompt: impl Into<String>) -> Self {
        Self {
            transport,
            model,
            system_prompt: system_prompt.into(),
        }
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The system instruction sent first in every request.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for `prompt`.
    ///
    /// Messages are the system prompt, then every user message of `history` in order, then
    /// `prompt`.  Assistant answers in `history` are not replayed.  Search parameters are
    /// attached unless `search` is off, in which case the field is left out entirely.
    pub fn build_request(
        &self,
        prompt: &str,
        history: &[Message],
        search: &SearchConfig,
    ) -> ChatCompletionParams {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessageParam::system(self.system_prompt.as_str()));
        messages.extend(
            history
                .iter()
                .filter(|message| message.role() == MessageRole::User)
                .map(|message| ChatMessageParam::user(message.content())),
        );
        messages.push(ChatMessageParam::user(prompt));
        ChatCompletionParams::new(self.model.clone(), messages)
            .with_stream(true)
            .with_search_parameters(search.to_parameters())
    }

    /// Run one turn.
    ///
    /// `renderer` sees the cumulative answer after every chunk.  On failure the text received
    /// so far is returned alongside the error; the request cannot be resumed.
    pub async fn run_turn(
        &self,
        prompt: &str,
        history: &[Message],
        search: &SearchConfig,
        renderer: &mut dyn Renderer,
    ) -> std::result::Result<AssistantTurn, GatewayError> {
        let params = self.build_request(prompt, history, search);
        tracing::debug!(
            model = %self.model,
            messages = params.messages.len(),
            search = %search.mode(),
            "starting chat turn"
        );
        let start = Instant::now();
        let stream = self
            .transport
            .stream_chat(params)
            .await
            .map_err(|error| GatewayError::new(error, String::new()))?;

        let (mut accumulator, response_rx) = AccumulatingStream::new(stream);
        while let Some(snapshot) = accumulator.next().await {
            match snapshot {
                Ok(snapshot) => renderer.print_partial(&snapshot.content),
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        received = accumulator.content().len(),
                        "stream failed mid-answer"
                    );
                    return Err(GatewayError::new(error, accumulator.content()));
                }
            }
        }
        STREAM_DURATION.add(start.elapsed().as_secs_f64());

        let response = response_rx.await.map_err(|_| {
            GatewayError::new(
                Error::streaming("stream ended without a final response", None),
                accumulator.content(),
            )
        })?;
        let citations = response
            .citations
            .as_deref()
            .map(|raw| normalize_citations(Some(raw)))
            .filter(|citations| !citations.is_empty());
        tracing::debug!(
            chars = response.content.len(),
            citations = citations.as_ref().map_or(0, Vec::len),
            usage = response.usage.is_some(),
            "chat turn complete"
        );
        Ok(AssistantTurn {
            text: response.content,
            citations,
            usage: response.usage,
            reasoning_trace: response.reasoning_content,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::stream;
    use serde_json::json;

    use super::*;
    use crate::cost::{CostBreakdown, UsageReport};
    use crate::types::{ChatCompletionChunk, SearchMode};

    struct ScriptedTransport {
        script: Mutex<Vec<Vec<Result<ChatCompletionChunk>>>>,
        requests: Mutex<Vec<ChatCompletionParams>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Vec<Result<ChatCompletionChunk>>>) -> Self {
            Self {
                script: Mutex::new(script),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn stream_chat(&self, params: ChatCompletionParams) -> Result<ChunkStream> {
            self.requests.lock().unwrap().push(params);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(Error::authentication("no API key configured"));
            }
            let chunks = script.remove(0);
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    #[derive(Default)]
    struct Recorder {
        partials: Vec<String>,
    }

    impl Renderer for Recorder {
        fn print_partial(&mut self, text: &str) {
            self.partials.push(text.to_string());
        }
        fn print_reasoning(&mut self, _: &str) {}
        fn finish_response(&mut self) {}
        fn print_citations(&mut self, _: &[Citation]) {}
        fn print_cost(&mut self, _: &UsageReport, _: &CostBreakdown) {}
        fn print_error(&mut self, _: &str) {}
        fn print_info(&mut self, _: &str) {}
    }

    fn gateway(script: Vec<Vec<Result<ChatCompletionChunk>>>) -> ChatGateway<ScriptedTransport> {
        ChatGateway::new(ScriptedTransport::new(script), Model::default(), "Tu es juriste.")
    }

    #[test]
    fn request_replays_only_user_messages() {
        let gateway = gateway(Vec::new());
        let history = vec![
            Message::user("q1"),
            Message::assistant("a1", Vec::new()),
            Message::user("q2"),
            Message::assistant("a2", Vec::new()),
        ];
        let params = gateway.build_request("q3", &history, &SearchConfig::default());
        let contents: Vec<_> = params.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Tu es juriste.", "q1", "q2", "q3"]);
        assert_eq!(params.messages[0].role, MessageRole::System);
        assert!(params.stream);
    }

    #[test]
    fn search_off_omits_the_field() {
        let gateway = gateway(Vec::new());
        let off = SearchConfig::new(SearchMode::Off, true);
        let json = serde_json::to_value(gateway.build_request("q", &[], &off)).unwrap();
        assert!(json.get("search_parameters").is_none());

        let on = SearchConfig::new(SearchMode::Auto, true);
        let json = serde_json::to_value(gateway.build_request("q", &[], &on)).unwrap();
        let search = &json["search_parameters"];
        assert_eq!(search["mode"], "auto");
        assert_eq!(search["return_citations"], true);
        assert_eq!(search["max_search_results"], 6);
        assert_eq!(search["sources"][0]["type"], "web");
    }

    #[tokio::test]
    async fn turn_streams_cumulative_text() {
        let gateway = gateway(vec![vec![
            Ok(ChatCompletionChunk::text("Selon ")),
            Ok(ChatCompletionChunk::text("l'article 1240")),
            Ok(ChatCompletionChunk::default()
                .with_citations(vec![
                    json!({"title": "Code civil", "url": "https://legifrance.gouv.fr/x"}),
                    json!("Raw text ref"),
                ])
                .with_usage(CompletionUsage::new(12))),
        ]]);
        let mut recorder = Recorder::default();
        let turn = gateway
            .run_turn("q", &[], &SearchConfig::default(), &mut recorder)
            .await
            .unwrap();
        assert_eq!(turn.text, "Selon l'article 1240");
        assert_eq!(turn.citations.as_ref().map(Vec::len), Some(2));
        assert_eq!(turn.usage, Some(CompletionUsage::new(12)));
        assert!(turn.reasoning_trace.is_none());
        assert_eq!(
            recorder.partials,
            vec!["Selon ", "Selon l'article 1240", "Selon l'article 1240"]
        );
    }

    #[tokio::test]
    async fn empty_citation_list_is_absent() {
        let gateway = gateway(vec![vec![Ok(
            ChatCompletionChunk::text("Oui.").with_citations(Vec::new())
        )]]);
        let turn = gateway
            .run_turn("q", &[], &SearchConfig::default(), &mut Recorder::default())
            .await
            .unwrap();
        assert!(turn.citations.is_none());
    }

    #[tokio::test]
    async fn failure_keeps_partial_text() {
        let gateway = gateway(vec![vec![
            Ok(ChatCompletionChunk::text("Le principe gén")),
            Err(Error::streaming("connection reset", None)),
        ]]);
        let err = gateway
            .run_turn("q", &[], &SearchConfig::default(), &mut Recorder::default())
            .await
            .unwrap_err();
        assert_eq!(err.partial_text, "Le principe gén");
        assert!(err.error.is_streaming());
    }

    #[tokio::test]
    async fn request_failure_has_no_partial_text() {
        let gateway = gateway(Vec::new());
        let err = gateway
            .run_turn("q", &[], &SearchConfig::default(), &mut Recorder::default())
            .await
            .unwrap_err();
        assert!(err.error.is_authentication());
        assert!(err.partial_text.is_empty());
        assert_eq!(gateway.transport().requests.lock().unwrap().len(), 1);
    }
}
