use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{CompletionUsage, FinishReason, MessageRole};

/// The message of a non-streamed choice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionMessage {
    /// Role of the author, normally the assistant.
    pub role: MessageRole,

    /// Answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Reasoning trace, when the model exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}

/// One choice of a non-streamed completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionChoice {
    /// Index of the choice.
    #[serde(default)]
    pub index: u32,

    /// The generated message.
    pub message: CompletionMessage,

    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// Response of a non-streamed `chat/completions` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    /// Completion identifier.
    #[serde(default)]
    pub id: String,

    /// Model that answered.
    #[serde(default)]
    pub model: String,

    /// Generated choices.
    pub choices: Vec<CompletionChoice>,

    /// Sources backing the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Value>>,

    /// Usage counters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<CompletionUsage>,
}

impl ChatCompletion {
    /// Text of the first choice, empty when the model produced none.
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or("")
    }

    /// Reasoning trace of the first choice.
    pub fn reasoning_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.reasoning_content.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completion_deserialization() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "abc",
            "model": "grok-4",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Oui.", "reasoning_content": "..."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2}
        }))
        .unwrap();
        assert_eq!(completion.content(), "Oui.");
        assert_eq!(completion.reasoning_content(), Some("..."));
        assert!(completion.citations.is_none());
    }

    #[test]
    fn empty_choices_have_empty_content() {
        let completion: ChatCompletion =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(completion.content(), "");
        assert!(completion.reasoning_content().is_none());
    }
}
