//! Transcript state machine for one conversation.
//!
//! ```text
//! Idle ──select──▶ LoadingHistory ──apply_history──▶ Ready
//!                        ▲                            │  ▲
//!                        └──────── select ────────────┤  │ complete_send
//!                                                     ▼  │
//!                                                   Sending
//! ```
//!
//! Every request the view starts is described by a ticket carrying the
//! view's generation at the time. Selecting a conversation bumps the
//! generation, so answers to requests started before the switch are
//! recognised as stale and dropped.

use azdocs_shared::constants::SEND_FAILED_TEXT;
use azdocs_shared::protocol::ChatReply;
use azdocs_shared::types::{ConversationId, Message, Sender};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    /// No conversation selected.
    Idle,
    LoadingHistory,
    Ready,
    /// A message is awaiting its reply.
    Sending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Shown optimistically, reply outstanding.
    Pending,
    Confirmed,
    /// The backend never answered this message.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub message: Message,
    pub status: EntryStatus,
}

impl TranscriptEntry {
    fn confirmed(message: Message) -> Self {
        Self {
            message,
            status: EntryStatus::Confirmed,
        }
    }
}

/// A history load in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTicket {
    generation: u64,
    chat_id: ConversationId,
}

impl HistoryTicket {
    pub fn chat_id(&self) -> &ConversationId {
        &self.chat_id
    }
}

/// A message send in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    generation: u64,
    chat_id: ConversationId,
    message_id: u64,
    text: String,
}

impl SendTicket {
    pub fn chat_id(&self) -> &ConversationId {
        &self.chat_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug)]
pub struct ChatView {
    chat_id: Option<ConversationId>,
    phase: ChatPhase,
    entries: Vec<TranscriptEntry>,
    generation: u64,
    next_message_id: u64,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            chat_id: None,
            phase: ChatPhase::Idle,
            entries: Vec::new(),
            generation: 0,
            next_message_id: 1,
        }
    }

    pub fn chat_id(&self) -> Option<&ConversationId> {
        self.chat_id.as_ref()
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().map(|e| &e.message)
    }

    /// Switch to `chat_id` (or to no conversation). Whatever was in flight
    /// is abandoned and the transcript starts over.
    pub fn select(&mut self, chat_id: Option<ConversationId>) -> Option<HistoryTicket> {
        self.generation += 1;
        self.entries.clear();
        self.chat_id = chat_id.clone();

        match chat_id {
            Some(chat_id) => {
                debug!(chat_id = %chat_id, generation = self.generation, "loading history");
                self.phase = ChatPhase::LoadingHistory;
                Some(HistoryTicket {
                    generation: self.generation,
                    chat_id,
                })
            }
            None => {
                self.phase = ChatPhase::Idle;
                None
            }
        }
    }

    /// Install the result of a history load. A failed load leaves an empty
    /// transcript. Returns `false` if the ticket was stale and ignored.
    pub fn apply_history(
        &mut self,
        ticket: HistoryTicket,
        result: Result<Vec<Message>, ApiError>,
    ) -> bool {
        if !self.is_current(ticket.generation) || self.phase != ChatPhase::LoadingHistory {
            debug!(chat_id = %ticket.chat_id, "discarding stale history");
            return false;
        }

        let messages = result.unwrap_or_else(|e| {
            warn!(chat_id = %ticket.chat_id, error = %e, "failed to load history");
            Vec::new()
        });

        for mut message in messages {
            message.id = self.mint_message_id();
            self.entries.push(TranscriptEntry::confirmed(message));
        }
        self.phase = ChatPhase::Ready;
        true
    }

    /// Append the user's message optimistically and hand back the request
    /// to make. Refused without a conversation, while not `Ready`, or for
    /// blank text.
    pub fn begin_send(&mut self, text: &str) -> Option<SendTicket> {
        let text = text.trim();
        if text.is_empty() || self.phase != ChatPhase::Ready {
            return None;
        }
        let chat_id = self.chat_id.clone()?;

        let message_id = self.mint_message_id();
        self.entries.push(TranscriptEntry {
            message: Message::user(message_id, text),
            status: EntryStatus::Pending,
        });
        self.phase = ChatPhase::Sending;

        Some(SendTicket {
            generation: self.generation,
            chat_id,
            message_id,
            text: text.to_string(),
        })
    }

    /// Settle a send: the user's entry is confirmed or marked failed, and
    /// either the reply or a synthesized error message is appended. The
    /// user's entry is never removed. Returns `false` for stale tickets.
    pub fn complete_send(&mut self, ticket: SendTicket, result: Result<ChatReply, ApiError>) -> bool {
        if !self.is_current(ticket.generation) || self.phase != ChatPhase::Sending {
            debug!(chat_id = %ticket.chat_id, "discarding stale reply");
            return false;
        }

        let (status, reply) = match result {
            Ok(reply) => {
                let id = self.mint_message_id();
                (EntryStatus::Confirmed, Message::bot(id, reply.text, reply.references))
            }
            Err(e) => {
                warn!(chat_id = %ticket.chat_id, error = %e, "failed to send message");
                let id = self.mint_message_id();
                (EntryStatus::Failed, Message::error(id, SEND_FAILED_TEXT))
            }
        };

        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.message.id == ticket.message_id && e.message.sender == Sender::User)
        {
            entry.status = status;
        }
        self.entries.push(TranscriptEntry::confirmed(reply));
        self.phase = ChatPhase::Ready;
        true
    }

    /// Select a conversation and load its history.
    pub async fn open(&mut self, api: &ApiClient, chat_id: ConversationId) {
        if let Some(ticket) = self.select(Some(chat_id)) {
            let result = api.get_chat_history(ticket.chat_id()).await;
            self.apply_history(ticket, result);
        }
    }

    /// Send a message and wait for the reply. Returns `false` when the send
    /// was refused.
    pub async fn send(&mut self, api: &ApiClient, text: &str) -> bool {
        let Some(ticket) = self.begin_send(text) else {
            return false;
        };
        let result = api.send_message(ticket.chat_id(), ticket.text()).await;
        self.complete_send(ticket, result)
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn mint_message_id(&mut self) -> u64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }
}
