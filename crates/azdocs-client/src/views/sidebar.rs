//! Conversation list and active-conversation selection.

use azdocs_shared::constants::DEFAULT_CHAT_TITLE;
use azdocs_shared::types::{Conversation, ConversationId};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct ConversationList {
    conversations: Vec<Conversation>,
    active: Option<ConversationId>,
}

impl ConversationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active(&self) -> Option<&ConversationId> {
        self.active.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    /// Replace the list with a fetch result. A failed fetch leaves the list
    /// empty.
    pub fn apply_list(&mut self, result: Result<Vec<Conversation>, ApiError>) {
        self.conversations = result.unwrap_or_else(|e| {
            warn!(error = %e, "failed to load conversations");
            Vec::new()
        });
    }

    /// Fetch the conversation list from the backend.
    pub async fn refresh(&mut self, api: &ApiClient) {
        let result = api.list_conversations().await;
        self.apply_list(result);
    }

    /// Start a conversation without asking the backend: a client-minted id
    /// titled after its position in the list. It is put first and made
    /// active. The id never collides with one already listed.
    pub fn new_local(&mut self) -> Conversation {
        let id = ConversationId::mint_unique(|candidate| self.get(candidate).is_some());
        let conversation = Conversation::new(
            id,
            format!("{} {}", DEFAULT_CHAT_TITLE, self.conversations.len() + 1),
        );
        self.push_active(conversation.clone());
        conversation
    }

    /// Ask the backend for a new conversation, falling back to
    /// [`new_local`](Self::new_local) if it cannot be reached.
    pub async fn create(&mut self, api: &ApiClient, title: Option<&str>) -> Conversation {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CHAT_TITLE);

        match api.create_conversation(title).await {
            Ok(conversation) => {
                info!(chat_id = %conversation.id, "conversation created");
                self.push_active(conversation.clone());
                conversation
            }
            Err(e) => {
                warn!(error = %e, "failed to create conversation on the backend, starting a local one");
                self.new_local()
            }
        }
    }

    /// Make `id` the active conversation. Ids not in the list are still
    /// accepted (a conversation may be opened by link); the return value
    /// tells whether it was known.
    pub fn select(&mut self, id: ConversationId) -> bool {
        let known = self.get(&id).is_some();
        self.active = Some(id);
        known
    }

    fn push_active(&mut self, conversation: Conversation) {
        self.active = Some(conversation.id.clone());
        self.conversations.insert(0, conversation);
    }
}
