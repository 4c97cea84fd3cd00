// Public modules
pub mod chat_completion;
pub mod chat_completion_chunk;
pub mod chat_completion_params;
pub mod completion_usage;
pub mod finish_reason;
pub mod message_param;
pub mod model;
pub mod search_parameters;

// Re-exports
pub use chat_completion::{ChatCompletion, CompletionChoice, CompletionMessage};
pub use chat_completion_chunk::{ChatCompletionChunk, ChunkChoice, ChunkDelta};
pub use chat_completion_params::ChatCompletionParams;
pub use completion_usage::{CompletionTokensDetails, CompletionUsage};
pub use finish_reason::FinishReason;
pub use message_param::{ChatMessageParam, MessageRole};
pub use model::{KnownModel, Model};
pub use search_parameters::{SearchMode, SearchParameters, SearchSource};
