// Public modules
pub mod accumulating_stream;
pub mod chat;
pub mod citation;
pub mod client;
pub mod client_logger;
pub mod conversation;
pub mod cost;
pub mod error;
pub mod gateway;
pub mod render;
pub mod search;
pub mod sse;
pub mod types;

mod observability;

// Re-exports
pub use accumulating_stream::{AccumulatingStream, ChatResponse, StreamSnapshot};
pub use citation::{Citation, normalize_citations};
pub use client::{ChunkStream, XaiClient};
pub use client_logger::ClientLogger;
pub use conversation::{Conversation, Message};
pub use cost::{CostBreakdown, Pricing, UsageReport, UsageSource};
pub use error::{Error, Result};
pub use gateway::{AssistantTurn, ChatGateway, ChatTransport, GatewayError};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use search::SearchConfig;
pub use types::*;
