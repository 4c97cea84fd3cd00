//! Per-answer cost estimate.
//!
//! The service does not report prompt tokens for a streamed answer, so the input side of the
//! estimate is always derived from the prompt's word count.  The output side uses the
//! reported completion and reasoning counters when they are present and falls back to the
//! same word-count heuristic otherwise.  Either way the result is an estimate, not a bill.

use std::fmt;

use crate::types::CompletionUsage;

/// Tokens assumed per word.
///
/// This is a deliberately coarse heuristic: French legal prose tokenizes at roughly three
/// tokens per word, but the figure is not exact for any particular text.
pub const TOKENS_PER_WORD: u64 = 3;

/// Prices used to turn token and source counts into dollars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    /// Dollars per million input tokens.
    pub input_per_million: f64,
    /// Dollars per million completion tokens.
    pub output_per_million: f64,
    /// Dollars per million reasoning tokens.
    pub reasoning_per_million: f64,
    /// Dollars per source consulted by the live search.
    pub per_source: f64,
}

impl Pricing {
    /// Grok 4 list prices: 3$ / 1M input, 15$ / 1M output, reasoning billed as output,
    /// 0.025$ per source consulted.
    pub const GROK_4: Pricing = Pricing {
        input_per_million: 3.0,
        output_per_million: 15.0,
        reasoning_per_million: 15.0,
        per_source: 0.025,
    };

    /// The most a search limited to `max_results` sources can cost.
    pub fn max_search_cost(&self, max_results: u32) -> f64 {
        f64::from(max_results) * self.per_source
    }

    /// Cost breakdown for `usage`.
    pub fn estimate(&self, usage: &UsageReport) -> CostBreakdown {
        let token_cost = usage.input_tokens as f64 * self.input_per_million / 1e6
            + usage.completion_tokens as f64 * self.output_per_million / 1e6
            + usage.reasoning_tokens as f64 * self.reasoning_per_million / 1e6;
        let search_cost = usage.num_sources as f64 * self.per_source;
        CostBreakdown {
            token_cost,
            search_cost,
            total_cost: token_cost + search_cost,
        }
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Pricing::GROK_4
    }
}

/// Where the output token counts of a [`UsageReport`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageSource {
    /// Completion and reasoning tokens were reported by the API.
    Reported,
    /// Every count was estimated from word counts.
    Estimated,
}

/// Token and source counts for one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageReport {
    /// Prompt tokens; always estimated from the prompt's word count.
    pub input_tokens: u64,
    /// Answer tokens.
    pub completion_tokens: u64,
    /// Hidden reasoning tokens, zero when unknown.
    pub reasoning_tokens: u64,
    /// Sources consulted by the live search.
    pub num_sources: u64,
    /// Whether the output counts are reported or estimated.
    pub source: UsageSource,
}

impl UsageReport {
    /// Build a report for one answer.
    ///
    /// With usage counters present, completion and reasoning tokens are taken from them
    /// (a missing completion count is still estimated from `response`).  Without counters,
    /// both sides are estimated from word counts.  `num_sources` is the number of sources the
    /// search consulted, or the number of citations returned when the API did not say.
    pub fn build(
        prompt: &str,
        response: &str,
        usage: Option<&CompletionUsage>,
        citation_count: usize,
    ) -> Self {
        let input_tokens = estimate_tokens(prompt);
        let reported_sources = usage.and_then(|usage| usage.num_sources_used);
        let num_sources = reported_sources.unwrap_or(citation_count as u64);
        match usage {
            Some(usage) => UsageReport {
                input_tokens,
                completion_tokens: usage
                    .completion_tokens
                    .unwrap_or_else(|| estimate_tokens(response)),
                reasoning_tokens: usage.reasoning_tokens(),
                num_sources,
                source: UsageSource::Reported,
            },
            None => UsageReport {
                input_tokens,
                completion_tokens: estimate_tokens(response),
                reasoning_tokens: 0,
                num_sources,
                source: UsageSource::Estimated,
            },
        }
    }

    /// Every billed token: input, completion and reasoning.
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.completion_tokens + self.reasoning_tokens
    }
}

/// Dollar amounts for one answer.
///
/// Every amount is non-negative; `search_cost` is zero exactly when no source was consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostBreakdown {
    /// Cost of input, completion and reasoning tokens.
    pub token_cost: f64,
    /// Cost of the sources consulted.
    pub search_cost: f64,
    /// Sum of both.
    pub total_cost: f64,
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:.4} (tokens ${:.4}, search ${:.3})",
            self.total_cost, self.token_cost, self.search_cost
        )
    }
}

/// Number of words in `text`.
///
/// Words are separated by whitespace; the parts of a hyphenated compound such as
/// "allez-vous" count separately.
pub fn word_count(text: &str) -> u64 {
    text.split_whitespace()
        .flat_map(|word| word.split('-'))
        .filter(|part| !part.is_empty())
        .count() as u64
}

/// Heuristic token count for `text`; see [`TOKENS_PER_WORD`].
pub fn estimate_tokens(text: &str) -> u64 {
    word_count(text) * TOKENS_PER_WORD
}
