//! The Conversation Store: every message of the running session, in order.
//!
//! Messages are appended and never changed or removed.  There is no size cap; the model's
//! own context window is the only bound on how much history is useful.

use serde::{Deserialize, Serialize};

use crate::citation::Citation;
use crate::types::MessageRole;

/// One entry of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    citations: Option<Vec<Citation>>,
}

impl Message {
    /// A message typed by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            citations: None,
        }
    }

    /// An answer from the assistant.
    ///
    /// An empty citation list is stored as no citations at all.
    pub fn assistant(content: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            citations: if citations.is_empty() {
                None
            } else {
                Some(citations)
            },
        }
    }

    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            citations: None,
        }
    }

    /// Who wrote the message.
    pub fn role(&self) -> MessageRole {
        self.role
    }

    /// The text of the message.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Sources backing an assistant answer.
    pub fn citations(&self) -> Option<&[Citation]> {
        self.citations.as_deref()
    }
}

/// Ordered, append-only message history for one session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// An empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` at the end.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Every message, oldest first.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Every message but the most recent one.
    pub fn history_excluding_last(&self) -> &[Message] {
        match self.messages.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if nothing was appended yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order_without_dedup() {
        let mut conversation = Conversation::new();
        conversation.append(Message::user("Bonjour"));
        conversation.append(Message::user("Bonjour"));
        conversation.append(Message::assistant("Bonjour !", Vec::new()));
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.all()[0].content(), "Bonjour");
        assert_eq!(conversation.all()[2].role(), MessageRole::Assistant);
    }

    #[test]
    fn history_excluding_last() {
        let mut conversation = Conversation::new();
        assert!(conversation.history_excluding_last().is_empty());

        conversation.append(Message::user("q1"));
        assert!(conversation.history_excluding_last().is_empty());

        conversation.append(Message::assistant("a1", Vec::new()));
        conversation.append(Message::user("q2"));
        let history = conversation.history_excluding_last();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content(), "a1");
        assert_eq!(conversation.last().map(Message::content), Some("q2"));
    }

    #[test]
    fn empty_citations_are_absent() {
        let message = Message::assistant("réponse", Vec::new());
        assert!(message.citations().is_none());

        let message = Message::assistant("réponse", vec![Citation::plain("art. 9")]);
        assert_eq!(message.citations().map(<[Citation]>::len), Some(1));
    }
}
