//! In-memory, append-only conversation.

use chrono::{DateTime, Utc};
use llm::{GenerateResult, HistoryTurn, ImageData, Source};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub image: Option<ImageData>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl Message {
    pub fn user(text: impl Into<String>, image: Option<ImageData>) -> Self {
        Message {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            image,
            sources: Vec::new(),
        }
    }

    pub fn assistant(result: GenerateResult) -> Self {
        Message {
            id: Uuid::new_v4(),
            text: result.text,
            sender: Sender::Assistant,
            timestamp: Utc::now(),
            image: None,
            sources: result.sources,
        }
    }

    pub fn to_history_turn(&self) -> HistoryTurn {
        match self.sender {
            Sender::User => HistoryTurn::user(self.text.clone()),
            Sender::Assistant => HistoryTurn::assistant(self.text.clone()),
        }
    }
}

/// Messages in send order. Nothing is ever edited or removed.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Most recent assistant message
    pub fn last_reply(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Assistant)
    }

    /// Every message as a provider-facing turn, oldest first.
    pub fn history(&self) -> Vec<HistoryTurn> {
        self.messages.iter().map(Message::to_history_turn).collect()
    }
}
