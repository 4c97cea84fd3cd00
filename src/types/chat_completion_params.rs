use serde::{Deserialize, Serialize};

use crate::types::{ChatMessageParam, Model, SearchParameters};

/// Body of a `POST chat/completions` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionParams {
    /// The model that will answer.
    pub model: Model,

    /// Conversation sent to the model, system instructions first.
    pub messages: Vec<ChatMessageParam>,

    /// Whether the answer is delivered as server-sent events.
    #[serde(default)]
    pub stream: bool,

    /// Live search configuration; omitted entirely when search is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_parameters: Option<SearchParameters>,
}

impl ChatCompletionParams {
    /// Create a non-streaming request without search.
    pub fn new(model: Model, messages: Vec<ChatMessageParam>) -> Self {
        Self {
            model,
            messages,
            stream: false,
            search_parameters: None,
        }
    }

    /// Request a streamed answer.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Attach or clear the search parameters.
    pub fn with_search_parameters(mut self, search_parameters: Option<SearchParameters>) -> Self {
        self.search_parameters = search_parameters;
        self
    }

    /// Append a message to the request.
    pub fn push_message(&mut self, message: ChatMessageParam) {
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KnownModel, SearchMode, SearchSource};
    use serde_json::{json, to_value};

    #[test]
    fn params_without_search_omit_the_field() {
        let params = ChatCompletionParams::new(
            Model::Known(KnownModel::Grok4),
            vec![ChatMessageParam::user("Bonjour")],
        )
        .with_stream(true);
        assert_eq!(
            to_value(&params).unwrap(),
            json!({
                "model": "grok-4",
                "messages": [{"role": "user", "content": "Bonjour"}],
                "stream": true
            })
        );
    }

    #[test]
    fn params_with_search() {
        let params = ChatCompletionParams::new(Model::default(), Vec::new())
            .with_search_parameters(Some(SearchParameters {
                mode: SearchMode::On,
                return_citations: false,
                sources: vec![SearchSource::web(["juricaf.org"])],
                max_search_results: 6,
            }));
        let value = to_value(&params).unwrap();
        assert_eq!(value["search_parameters"]["mode"], json!("on"));
        assert_eq!(value["search_parameters"]["max_search_results"], json!(6));
    }
}
