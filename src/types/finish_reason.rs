use serde::{Deserialize, Serialize};

/// Why the model stopped generating.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished its answer.
    Stop,

    /// The answer hit the token limit.
    Length,

    /// The answer was withheld by a content filter.
    ContentFilter,

    /// The model asked for a tool call.
    ToolCalls,

    /// A reason this crate does not know about.
    #[serde(other)]
    Other,
}
