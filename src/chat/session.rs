//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation,
//! runs one turn at a time through the gateway and turns failures into
//! assistant messages.

use std::time::Instant;

use crate::chat::config::ChatConfig;
use crate::citation::Citation;
use crate::client::XaiClient;
use crate::conversation::{Conversation, Message};
use crate::cost::{CostBreakdown, Pricing, UsageReport};
use crate::gateway::{ChatGateway, ChatTransport};
use crate::observability::{SOURCES_CONSULTED, TURN_DURATION, TURNS_COMPLETED, TURNS_FAILED};
use crate::render::Renderer;
use crate::search::SearchConfig;
use crate::types::{Model, SearchMode};

/// Prefix of the assistant message recorded for a failed turn.
pub const ERROR_MARKER: &str = "Erreur: ";

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The answer arrived in full.
    Completed {
        /// Cost estimate of the answer.
        cost: CostBreakdown,
        /// Token and source counts behind the estimate.
        usage: UsageReport,
        /// Sources behind the answer.
        citations: Vec<Citation>,
        /// The model's reasoning, when it exposed one.
        reasoning: Option<String>,
    },
    /// The request or the stream failed.
    Failed {
        /// The assistant message recorded for the turn.
        message: String,
    },
}

impl TurnOutcome {
    /// True if the answer arrived in full.
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed { .. })
    }
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Turns whose answer arrived in full.
    pub completed_turns: u64,
    /// Turns that ended in an error message.
    pub failed_turns: u64,
    /// The search mode for the next request.
    pub search_mode: SearchMode,
    /// Whether citations are requested.
    pub return_citations: bool,
    /// Sum of the cost estimates of every completed turn.
    pub total_cost: f64,
}

/// A chat session that manages conversation state and API interactions.
///
/// Every submitted prompt adds exactly two messages to the conversation: the prompt, then
/// either the answer or an error message starting with [`ERROR_MARKER`].  A failed turn does
/// not affect the following ones.
pub struct ChatSession<T: ChatTransport> {
    gateway: ChatGateway<T>,
    conversation: Conversation,
    search_mode: SearchMode,
    return_citations: bool,
    pricing: Pricing,
    completed_turns: u64,
    failed_turns: u64,
    total_cost: f64,
}

impl ChatSession<XaiClient> {
    /// Creates a new chat session with the given client and configuration.
    pub fn new(client: XaiClient, config: &ChatConfig) -> Self {
        Self::with_transport(client, config)
    }
}

impl<T: ChatTransport> ChatSession<T> {
    /// Creates a new chat session over any transport.
    pub fn with_transport(transport: T, config: &ChatConfig) -> Self {
        Self {
            gateway: ChatGateway::new(
                transport,
                config.model.clone(),
                config.system_prompt.as_str(),
            ),
            conversation: Conversation::new(),
            search_mode: config.search_mode,
            return_citations: config.return_citations,
            pricing: Pricing::default(),
            completed_turns: 0,
            failed_turns: 0,
            total_cost: 0.0,
        }
    }

    /// Uses `pricing` for the cost estimates of later turns.
    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }

    /// Submits a prompt and streams the answer through `renderer`.
    ///
    /// This method:
    /// 1. Adds the user message to the conversation
    /// 2. Streams the answer, re-rendering the cumulative text on every chunk
    /// 3. Renders reasoning, citations and the cost estimate
    /// 4. Adds the answer, or the error message, to the conversation
    ///
    /// Text received before a failure is not kept.
    pub async fn submit(&mut self, prompt: &str, renderer: &mut dyn Renderer) -> TurnOutcome {
        let start = Instant::now();
        self.conversation.append(Message::user(prompt));
        let search = SearchConfig::new(self.search_mode, self.return_citations);
        let result = self
            .gateway
            .run_turn(
                prompt,
                self.conversation.history_excluding_last(),
                &search,
                renderer,
            )
            .await;
        renderer.finish_response();
        TURN_DURATION.add(start.elapsed().as_secs_f64());

        match result {
            Ok(turn) => {
                let citations = turn.citations.unwrap_or_default();
                let usage =
                    UsageReport::build(prompt, &turn.text, turn.usage.as_ref(), citations.len());
                let cost = self.pricing.estimate(&usage);

                if let Some(reasoning) = &turn.reasoning_trace {
                    renderer.print_reasoning(reasoning);
                }
                renderer.print_citations(&citations);
                renderer.print_cost(&usage, &cost);

                TURNS_COMPLETED.click();
                SOURCES_CONSULTED.count(usage.num_sources);
                self.completed_turns += 1;
                self.total_cost += cost.total_cost;
                tracing::info!(
                    sources = usage.num_sources,
                    cost = cost.total_cost,
                    "turn completed"
                );

                self.conversation
                    .append(Message::assistant(turn.text, citations.clone()));
                TurnOutcome::Completed {
                    cost,
                    usage,
                    citations,
                    reasoning: turn.reasoning_trace,
                }
            }
            Err(err) => {
                let message = format!("{ERROR_MARKER}{}", err.error);
                TURNS_FAILED.click();
                self.failed_turns += 1;
                tracing::warn!(
                    error = %err.error,
                    discarded = err.partial_text.len(),
                    "turn failed"
                );
                renderer.print_error(&message);
                self.conversation
                    .append(Message::assistant(message.as_str(), Vec::new()));
                TurnOutcome::Failed { message }
            }
        }
    }

    /// Every message of the conversation, oldest first.
    pub fn history(&self) -> &[Message] {
        self.conversation.all()
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        self.gateway.model()
    }

    /// The gateway turns run through.
    pub fn gateway(&self) -> &ChatGateway<T> {
        &self.gateway
    }

    /// Changes the search mode for later requests.
    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.search_mode = mode;
    }

    /// Returns the search mode for the next request.
    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    /// Turns citations on or off for later requests.
    pub fn set_citations(&mut self, return_citations: bool) {
        self.return_citations = return_citations;
    }

    /// Whether citations are requested.
    pub fn return_citations(&self) -> bool {
        self.return_citations
    }

    /// Prices used for cost estimates.
    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.model().clone(),
            message_count: self.message_count(),
            completed_turns: self.completed_turns,
            failed_turns: self.failed_turns,
            search_mode: self.search_mode,
            return_citations: self.return_citations,
            total_cost: self.total_cost,
        }
    }
}
