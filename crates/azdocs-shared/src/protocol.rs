//! JSON bodies exchanged with the backend HTTP API.
//!
//! Field names follow what the backend actually sends, including the mixed
//! snake_case / camelCase conventions of its different endpoints.

use serde::{Deserialize, Serialize};

use crate::types::{ConversationId, Message, Reference, Sender};

/// `POST /api/chat` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub chat_id: ConversationId,
    pub message: String,
}

/// `POST /api/chat` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ConversationId>,
}

/// A message as stored by the backend. The text has been sent under both
/// `text` and `content`, and the id as either a string or a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(alias = "content")]
    pub text: String,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// `GET /api/chats/{chatId}` response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

impl HistoryResponse {
    /// Convert to transcript messages, numbering them from `first_id` in
    /// the order received. Server-side ids are discarded.
    pub fn into_messages(self, first_id: u64) -> Vec<Message> {
        self.messages
            .into_iter()
            .zip(first_id..)
            .map(|(m, id)| Message {
                id,
                text: m.text,
                sender: m.sender,
                references: m.references,
                is_error: false,
            })
            .collect()
    }
}

/// `POST /api/chats/new` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConversationRequest {
    pub title: String,
}

/// Successful `POST /api/upload/pdf` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub blob_url: String,
}

/// Error body returned by the backend. Different handlers have used
/// `error`, `detail` and `message` for the human-readable text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn into_message(self) -> Option<String> {
        self.error.or(self.detail).or(self.message)
    }
}
