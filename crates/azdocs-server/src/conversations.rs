//! In-memory conversation storage, partitioned by user.

use std::collections::HashMap;

use azdocs_shared::protocol::{ChatReply, HistoryMessage, HistoryResponse};
use azdocs_shared::types::{Conversation, ConversationId, Sender};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

/// Titles derived from the first question are cut to this many characters.
const MAX_TITLE_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct StoredConversation {
    pub id: ConversationId,
    pub title: String,
    pub messages: Vec<HistoryMessage>,
    pub last_updated: DateTime<Utc>,
}

impl StoredConversation {
    fn summary(&self) -> Conversation {
        Conversation::new(self.id.clone(), self.title.clone())
    }
}

#[derive(Default)]
pub struct ConversationStore {
    by_user: Mutex<HashMap<String, Vec<StoredConversation>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty conversation. Ids are `seconds.micros` timestamps,
    /// bumped until unique for the user.
    pub async fn create(&self, user_id: &str, title: &str) -> Conversation {
        let mut by_user = self.by_user.lock().await;
        let chats = by_user.entry(user_id.to_string()).or_default();

        let now = Utc::now();
        let mut micros = now.timestamp_micros();
        let id = loop {
            let candidate = ConversationId::new(format!(
                "{}.{:06}",
                micros.div_euclid(1_000_000),
                micros.rem_euclid(1_000_000)
            ));
            if !chats.iter().any(|c| c.id == candidate) {
                break candidate;
            }
            micros += 1;
        };

        let stored = StoredConversation {
            id,
            title: title.to_string(),
            messages: Vec::new(),
            last_updated: now,
        };
        let summary = stored.summary();
        chats.push(stored);

        debug!(user = %user_id, chat_id = %summary.id, "conversation created");
        summary
    }

    /// All conversations of a user, most recently updated first.
    pub async fn list(&self, user_id: &str) -> Vec<Conversation> {
        let by_user = self.by_user.lock().await;
        let mut chats: Vec<&StoredConversation> = by_user
            .get(user_id)
            .map(|chats| chats.iter().collect())
            .unwrap_or_default();
        chats.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        chats.into_iter().map(StoredConversation::summary).collect()
    }

    pub async fn history(&self, user_id: &str, chat_id: &ConversationId) -> Option<HistoryResponse> {
        let by_user = self.by_user.lock().await;
        by_user
            .get(user_id)?
            .iter()
            .find(|c| &c.id == chat_id)
            .map(|c| HistoryResponse {
                messages: c.messages.clone(),
            })
    }

    /// Previous messages of a conversation, empty when it does not exist.
    pub async fn messages(&self, user_id: &str, chat_id: &ConversationId) -> Vec<HistoryMessage> {
        self.history(user_id, chat_id)
            .await
            .map(|h| h.messages)
            .unwrap_or_default()
    }

    /// Record a question and its answer. Unknown conversation ids are
    /// created on the fly, titled after the question.
    pub async fn record_exchange(
        &self,
        user_id: &str,
        chat_id: &ConversationId,
        question: &str,
        reply: &ChatReply,
    ) {
        let mut by_user = self.by_user.lock().await;
        let chats = by_user.entry(user_id.to_string()).or_default();

        let now = Utc::now();
        let index = match chats.iter().position(|c| &c.id == chat_id) {
            Some(index) => index,
            None => {
                chats.push(StoredConversation {
                    id: chat_id.clone(),
                    title: question.chars().take(MAX_TITLE_CHARS).collect(),
                    messages: Vec::new(),
                    last_updated: now,
                });
                chats.len() - 1
            }
        };

        let chat = &mut chats[index];
        let next_id = chat.messages.len() as u64 + 1;
        chat.messages.push(HistoryMessage {
            id: Some(next_id.to_string().into()),
            text: question.to_string(),
            sender: Sender::User,
            references: Vec::new(),
            timestamp: Some(now.to_rfc3339()),
        });
        chat.messages.push(HistoryMessage {
            id: Some((next_id + 1).to_string().into()),
            text: reply.text.clone(),
            sender: Sender::Bot,
            references: reply.references.clone(),
            timestamp: Some(now.to_rfc3339()),
        });
        chat.last_updated = now;
    }
}
