//! View state machines. Each view owns its own state; none of them touch
//! the session store.

pub mod chat;
pub mod sidebar;
pub mod upload;

pub use chat::{ChatPhase, ChatView, EntryStatus, TranscriptEntry};
pub use sidebar::ConversationList;
pub use upload::{format_file_size, UploadItem, UploadResult, UploadStatus, UploadView};
