use serde::{Deserialize, Serialize};

/// Breakdown of the completion tokens.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionTokensDetails {
    /// Tokens spent on hidden reasoning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u64>,
}

/// Usage counters reported by the API for a completed response.
///
/// Every field is optional: the service omits counters it does not track, and the
/// streaming endpoint only reports them on the last chunk.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionUsage {
    /// Tokens in the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,

    /// Tokens in the generated answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,

    /// Sum of prompt and completion tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,

    /// Breakdown of the completion tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens_details: Option<CompletionTokensDetails>,

    /// Number of web sources the search consulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_sources_used: Option<u64>,
}

impl CompletionUsage {
    /// Create usage counters with only the completion tokens set.
    pub fn new(completion_tokens: u64) -> Self {
        Self {
            completion_tokens: Some(completion_tokens),
            ..Self::default()
        }
    }

    /// Set the reasoning tokens.
    pub fn with_reasoning_tokens(mut self, tokens: u64) -> Self {
        self.completion_tokens_details = Some(CompletionTokensDetails {
            reasoning_tokens: Some(tokens),
        });
        self
    }

    /// Set the number of sources consulted.
    pub fn with_num_sources_used(mut self, sources: u64) -> Self {
        self.num_sources_used = Some(sources);
        self
    }

    /// Reasoning tokens, zero when the API did not report any.
    pub fn reasoning_tokens(&self) -> u64 {
        self.completion_tokens_details
            .and_then(|details| details.reasoning_tokens)
            .unwrap_or(0)
    }
}
